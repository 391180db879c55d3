//! # Example: concurrency
//!
//! Runs six sleeping tasks, at most four at a time, with retries enabled.
//! One task asks for a sleep that is too long and fails on every attempt.
//!
//! ## Flow
//! ```text
//! execute(tasks, limit=4, retries=2, delay=2s)
//!   ├─► round 1: pause(1) pause(1) pause(10)✗ pause(1) | pause(2) pause(1)
//!   ├─► RetryScheduled(#2), sleep 2s
//!   ├─► round 2: pause(10)✗
//!   ├─► RetryScheduled(#2), sleep 2s
//!   ├─► round 3: pause(10)✗   (no rounds left)
//!   └─► [1, 1, <error>, 1, 2, 1]
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=taskrunner=debug cargo run --example concurrency
//! ```

use std::time::Duration;

use taskrunner::{Outcome, TaskError, TaskFn, TaskRef};
use tracing_subscriber::EnvFilter;

async fn pause(seconds: u64) -> Result<u64, TaskError> {
    if seconds > 5 {
        return Err(TaskError::fail("can't sleep for too long"));
    }
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    println!("slept for {seconds} seconds");
    Ok(seconds)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskrunner=info")),
        )
        .init();

    let tasks: Vec<TaskRef<u64>> = [1, 1, 10, 1, 2, 1]
        .into_iter()
        .map(|secs| -> TaskRef<u64> { TaskFn::arc(format!("pause-{secs}"), move || pause(secs)) })
        .collect();

    let results = taskrunner::execute(tasks, 4, true, 2, 2).await?;

    for (i, outcome) in results.iter().enumerate() {
        match outcome {
            Outcome::Success(secs) => println!("#{i}: ok({secs})"),
            Outcome::Failure(err) => println!("#{i}: failed ({err})"),
        }
    }
    Ok(())
}
