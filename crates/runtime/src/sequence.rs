use std::cell::Cell;

/// Monotonic request tags for fire-and-forget queries.
///
/// Each issued request gets a strictly increasing number; a response is
/// current only if no newer request has been issued since.
#[derive(Debug, Default)]
pub struct RequestSequence {
    last_issued: Cell<u64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        let next = self.last_issued.get() + 1;
        self.last_issued.set(next);
        next
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued.get()
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.last_issued.get()
    }
}
