use std::sync::Arc;

use crate::{config::Config, subscribers::Subscribe};

use super::executor::Executor;

/// Builder for constructing an [`Executor`] with optional subscribers.
pub struct ExecutorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ExecutorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability, replacing any added so far.
    ///
    /// Subscribers receive runtime events (attempt lifecycle, failures, retries)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Adds the built-in subscribers enabled by crate features.
    ///
    /// Currently this is the [`LogWriter`](crate::LogWriter) when `logging` is on.
    pub fn with_default_subscribers(self) -> Self {
        #[cfg(feature = "logging")]
        {
            self.with_subscriber(Arc::new(crate::subscribers::LogWriter::new()))
        }
        #[cfg(not(feature = "logging"))]
        {
            self
        }
    }

    /// Builds the executor.
    ///
    /// Spawns subscriber workers, so it must run inside a tokio runtime unless
    /// no subscribers were added.
    pub fn build(self) -> Executor {
        Executor::new(self.cfg, self.subscribers)
    }
}
