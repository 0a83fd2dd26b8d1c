// Reorder Buffer - restores submission order from completion order

use crate::domain::{JobId, JobResult};
use std::collections::BTreeMap;

/// Holds results that finished ahead of a lower id
///
/// With `preserve_order` cleared the buffer is a pass-through and results
/// leave in arrival order.
pub struct ReorderBuffer {
    pending: BTreeMap<JobId, JobResult>,
    next_id: JobId,
    preserve_order: bool,
}

impl ReorderBuffer {
    pub fn new(preserve_order: bool) -> Self {
        Self {
            pending: BTreeMap::new(),
            next_id: 0,
            preserve_order,
        }
    }

    pub fn push(&mut self, result: JobResult) {
        self.pending.insert(result.id, result);
    }

    /// Next result that may be forwarded, if any
    pub fn pop_ready(&mut self) -> Option<JobResult> {
        if !self.preserve_order {
            return self.pending.pop_first().map(|(_, result)| result);
        }
        let (&id, _) = self.pending.first_key_value()?;
        if id != self.next_id {
            return None;
        }
        self.next_id += 1;
        self.pending.pop_first().map(|(_, result)| result)
    }

    /// Number of results waiting for a lower id
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Everything still held, lowest id first, regardless of gaps
    pub fn drain_remaining(&mut self) -> impl Iterator<Item = JobResult> {
        std::mem::take(&mut self.pending).into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(buffer: &mut ReorderBuffer) -> Vec<JobId> {
        std::iter::from_fn(|| buffer.pop_ready())
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn test_out_of_order_results_are_held_back() {
        let mut buffer = ReorderBuffer::new(true);

        buffer.push(JobResult::valid(2, 1));
        buffer.push(JobResult::valid(1, 1));
        assert!(drain(&mut buffer).is_empty());
        assert_eq!(buffer.pending(), 2);

        buffer.push(JobResult::valid(0, 1));
        assert_eq!(drain(&mut buffer), vec![0, 1, 2]);
        assert_eq!(buffer.pending(), 0);
    }

    #[test]
    fn test_pass_through_when_order_not_preserved() {
        let mut buffer = ReorderBuffer::new(false);

        buffer.push(JobResult::valid(3, 1));
        assert_eq!(drain(&mut buffer), vec![3]);
        buffer.push(JobResult::pending(0));
        assert_eq!(drain(&mut buffer), vec![0]);
    }

    #[test]
    fn test_drain_remaining_skips_gaps() {
        let mut buffer = ReorderBuffer::new(true);
        buffer.push(JobResult::valid(4, 1));
        buffer.push(JobResult::valid(2, 1));

        let ids: Vec<JobId> = buffer.drain_remaining().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(buffer.pending(), 0);
    }
}
