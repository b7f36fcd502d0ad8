//! Per-group FIFO work queue (§4.F).
//!
//! On split/merge, items that no longer apply to a group are not
//! removed — removing from the middle of a FIFO is exactly the
//! operation a drain loop shouldn't need to reason about — they're
//! marked invalid in place and the drainer skips them.

use std::collections::VecDeque;

use super::ribout::{PeerId, RibOutId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueId {
    Bulk,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemKind {
    /// The named table has fresh updates to encode for this RibOut.
    RibOut { ribout: RibOutId, queue_id: QueueId },
    /// A previously send-blocked peer became ready again.
    Peer { peer: PeerId },
}

struct Entry {
    kind: WorkItemKind,
    valid: bool,
}

#[derive(Default)]
pub struct WorkQueue {
    items: VecDeque<Entry>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: WorkItemKind) {
        self.items.push_back(Entry { kind, valid: true });
    }

    /// Pops the next valid item, discarding any invalidated ones ahead
    /// of it from the front of the queue.
    pub fn pop(&mut self) -> Option<WorkItemKind> {
        while let Some(entry) = self.items.pop_front() {
            if entry.valid {
                return Some(entry.kind);
            }
        }
        None
    }

    /// Marks every queued item referencing `ribout` invalid, e.g. when
    /// a split moves that RibOut to a different group.
    pub fn invalidate_ribout(&mut self, ribout: RibOutId) {
        for entry in self.items.iter_mut() {
            if let WorkItemKind::RibOut { ribout: r, .. } = entry.kind
                && r == ribout
            {
                entry.valid = false;
            }
        }
    }

    pub fn invalidate_peer(&mut self, peer: PeerId) {
        for entry in self.items.iter_mut() {
            if let WorkItemKind::Peer { peer: p } = entry.kind
                && p == peer
            {
                entry.valid = false;
            }
        }
    }

    /// Drains every still-valid item into a new queue, preserving FIFO
    /// order — used when a split redistributes in-flight work to the
    /// resulting group that now owns it.
    pub fn drain_valid_into(&mut self, predicate: impl Fn(&WorkItemKind) -> bool) -> WorkQueue {
        let mut moved = WorkQueue::new();
        let mut kept = VecDeque::new();
        for entry in self.items.drain(..) {
            if entry.valid && predicate(&entry.kind) {
                moved.items.push_back(entry);
            } else {
                kept.push_back(entry);
            }
        }
        self.items = kept;
        moved
    }

    pub fn is_empty(&self) -> bool {
        self.items.iter().all(|e| !e.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidated_items_are_skipped_not_removed() {
        let mut q = WorkQueue::new();
        q.push(WorkItemKind::Peer { peer: 1 });
        q.push(WorkItemKind::Peer { peer: 2 });
        q.invalidate_peer(1);
        assert_eq!(q.pop(), Some(WorkItemKind::Peer { peer: 2 }));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn drain_valid_into_preserves_fifo_order() {
        let mut q = WorkQueue::new();
        q.push(WorkItemKind::RibOut { ribout: 1, queue_id: QueueId::Bulk });
        q.push(WorkItemKind::RibOut { ribout: 2, queue_id: QueueId::Bulk });
        let mut moved = q.drain_valid_into(|k| matches!(k, WorkItemKind::RibOut { ribout: 1, .. }));
        assert_eq!(moved.pop(), Some(WorkItemKind::RibOut { ribout: 1, queue_id: QueueId::Bulk }));
        assert_eq!(moved.pop(), None);
        assert_eq!(q.pop(), Some(WorkItemKind::RibOut { ribout: 2, queue_id: QueueId::Bulk }));
    }
}
