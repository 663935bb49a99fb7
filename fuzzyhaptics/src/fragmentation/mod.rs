//! Segmentation of a fuzzy spline into elliptic runs.
//!
//! A curve is cut at candidate times into the fewest runs that each recognise as a
//! line, circular arc or elliptic arc, choosing among those partitions the one whose
//! weakest run has the highest grade.

mod elliptic_arcs;
mod identifier;
mod partition;


pub use elliptic_arcs::{search_parameters, EllipticalArcsSegmentation, SEARCH_STEP};
pub use identifier::{MemoizingEllipticIdentifier, ResultAsElliptic};
pub use partition::{Answer, PartitionParameters};

use crate::curve::{Range, SplineCurve};

/// One run of a segmented curve.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    range: Range,
    curve: SplineCurve,
}

impl Fragment {
    /// The part of `curve` over `range`.
    pub fn new(curve: &SplineCurve, range: Range) -> Self {
        Self {
            range,
            curve: curve.part(range),
        }
    }

    /// Time span of the run.
    pub fn range(&self) -> Range {
        self.range
    }

    /// Sub-curve of the run.
    pub fn curve(&self) -> &SplineCurve {
        &self.curve
    }
}
