use std::fmt;

/// Identity of one input task across all of its attempts.
///
/// Assigned from the task's input position when the executor launches it, so
/// ordering by `SlotId` restores input order regardless of completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Creates a slot id for the given input position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Input position of the task.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
