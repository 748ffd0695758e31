use serde::{Deserialize, Serialize};

/// One correspondence between a node of the first graph and a node of the second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePair {
    pub first: usize,
    pub second: usize,
}

impl NodePair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    /// The same correspondence seen from the other graph
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }
}

impl std::fmt::Display for NodePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.first, self.second)
    }
}

/// Sequence direction from one node to a neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Before,
    After,
    Same,
}

impl Orientation {
    /// Direction of `neighbor` relative to `node`
    pub fn of(node: usize, neighbor: usize) -> Self {
        match neighbor.cmp(&node) {
            std::cmp::Ordering::Less => Self::Before,
            std::cmp::Ordering::Greater => Self::After,
            std::cmp::Ordering::Equal => Self::Same,
        }
    }

    /// True if `k` lies on the same side of `i` as `l` lies of `j`.
    ///
    /// Coincident nodes never agree, so a pair involving a self-contact is
    /// never consistent.
    pub fn agrees(i: usize, k: usize, j: usize, l: usize) -> bool {
        let a = Self::of(i, k);
        a != Self::Same && a == Self::of(j, l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_of() {
        assert_eq!(Orientation::of(5, 2), Orientation::Before);
        assert_eq!(Orientation::of(5, 9), Orientation::After);
        assert_eq!(Orientation::of(5, 5), Orientation::Same);
    }

    #[test]
    fn test_agrees() {
        assert!(Orientation::agrees(3, 1, 10, 4));
        assert!(Orientation::agrees(3, 7, 10, 40));
        assert!(!Orientation::agrees(3, 1, 10, 40));
        assert!(!Orientation::agrees(3, 3, 10, 10));
    }

    #[test]
    fn test_node_pair_swapped() {
        let pair = NodePair::new(2, 7);
        assert_eq!(pair.swapped(), NodePair::new(7, 2));
        assert_eq!(pair.to_string(), "2 -> 7");
    }
}
