//! Persistent partial partitions built up by the segmentation search.

use std::rc::Rc;

#[derive(Debug)]
struct Node {
    init: PartitionParameters,
    last: usize,
}

/// Split indices of a partial partition, oldest first.
///
/// Appending shares the existing prefix, so every DP cell can keep its own list
/// without copying its predecessor's.
#[derive(Clone, Debug, Default)]
pub struct PartitionParameters {
    node: Option<Rc<Node>>,
    len: usize,
}

impl PartitionParameters {
    /// No split indices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A new list with `index` appended; `self` is left untouched.
    pub fn push(&self, index: usize) -> Self {
        Self {
            node: Some(Rc::new(Node {
                init: self.clone(),
                last: index,
            })),
            len: self.len + 1,
        }
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no index was pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed index.
    pub fn last(&self) -> Option<usize> {
        self.node.as_ref().map(|n| n.last)
    }

    /// Indices in push order.
    pub fn to_vec(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.node.as_ref();
        while let Some(node) = cursor {
            out.push(node.last);
            cursor = node.init.node.as_ref();
        }
        out.reverse();
        out
    }
}

/// Best partial segmentation ending at some search index.
#[derive(Clone, Debug)]
pub struct Answer {
    /// Lowest elliptic grade over the runs so far.
    pub grade: f64,
    /// Start index of every run so far.
    pub partition: PartitionParameters,
}

impl Answer {
    /// Pair a grade with its partition.
    pub fn new(grade: f64, partition: PartitionParameters) -> Self {
        Self { grade, partition }
    }

    /// Extend by one run that starts at index `from` and grades `run_grade`.
    pub(crate) fn extend(&self, from: usize, run_grade: f64) -> Self {
        Self::new(self.grade.min(run_grade), self.partition.push(from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_shares_prefix() {
        let base = PartitionParameters::empty().push(0).push(3);
        let left = base.push(5);
        let right = base.push(6);
        assert_eq!(base.to_vec(), vec![0, 3]);
        assert_eq!(left.to_vec(), vec![0, 3, 5]);
        assert_eq!(right.to_vec(), vec![0, 3, 6]);
        assert_eq!(right.len(), 3);
        assert_eq!(right.last(), Some(6));
        assert!(PartitionParameters::empty().is_empty());
        assert_eq!(PartitionParameters::empty().last(), None);
    }

    #[test]
    fn test_answer_extend_takes_bottleneck() {
        let a = Answer::new(0.8, PartitionParameters::empty());
        let b = a.extend(0, 0.6).extend(2, 0.9);
        assert_eq!(b.grade, 0.6);
        assert_eq!(b.partition.to_vec(), vec![0, 2]);
    }
}
