//! Log of spawned child process ids.

use crate::ring::RingBuffer;
use nix::unistd::Pid;

/// The most recent pids returned by `fork`, oldest first.
///
/// This is a plain historical log; entries are never pruned when the process exits.
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    pids: RingBuffer<Pid>,
}

impl ProcessRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            pids: RingBuffer::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, pid: Pid) {
        self.pids.push_evicting_oldest(pid);
    }

    pub fn list(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}
