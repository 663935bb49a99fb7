//! Memoised elliptic identification of sub-curves.

use crate::curve::{Range, SplineCurve};
use crate::recognition::{PrimitiveType, RecognitionResult, Recognizer};

/// Recognition result reduced to what the segmentation needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResultAsElliptic {
    /// The sub-curve is a line, circular arc or elliptic arc.
    pub is_elliptic: bool,
    /// One minus the larger free-curve grade.
    pub grade: f64,
}

impl ResultAsElliptic {
    /// Result for an empty or reversed span.
    pub const NONE: Self = Self {
        is_elliptic: false,
        grade: 0.0,
    };

    /// Reduce a recognition result.
    pub fn from_result(result: &RecognitionResult) -> Self {
        let free = result
            .grade(PrimitiveType::ClosedFreeCurve)
            .max(result.grade(PrimitiveType::OpenFreeCurve));
        Self {
            is_elliptic: !matches!(
                result.kind(),
                PrimitiveType::ClosedFreeCurve | PrimitiveType::OpenFreeCurve
            ),
            grade: (1.0 - free).clamp(0.0, 1.0),
        }
    }
}

/// Identifies the sub-curve between two search parameters, once per pair.
pub struct MemoizingEllipticIdentifier<'a, R: ?Sized> {
    recognizer: &'a R,
    curve: &'a SplineCurve,
    ts: &'a [f64],
    table: Vec<Option<ResultAsElliptic>>,
}

impl<'a, R: Recognizer + ?Sized> MemoizingEllipticIdentifier<'a, R> {
    /// Identifier over `curve` at the search parameters `ts`.
    pub fn new(recognizer: &'a R, curve: &'a SplineCurve, ts: &'a [f64]) -> Self {
        Self {
            recognizer,
            curve,
            ts,
            table: vec![None; ts.len() * ts.len()],
        }
    }

    /// Number of search parameters.
    pub fn len(&self) -> usize {
        self.ts.len()
    }

    /// Whether there are no search parameters.
    pub fn is_empty(&self) -> bool {
        self.ts.is_empty()
    }

    /// Search parameters.
    pub fn params(&self) -> &[f64] {
        self.ts
    }

    /// Identify the sub-curve from `ts[i]` to `ts[j]`.
    ///
    /// Spans with `i >= j` or an index past the end are never elliptic.
    pub fn identify(&mut self, i: usize, j: usize) -> ResultAsElliptic {
        let n = self.ts.len();
        if i >= j || j >= n {
            return ResultAsElliptic::NONE;
        }
        let cell = i * n + j;
        if let Some(hit) = self.table[cell] {
            return hit;
        }
        let part = self.curve.part(Range::new(self.ts[i], self.ts[j]));
        let result = ResultAsElliptic::from_result(&self.recognizer.recognize(&part));
        self.table[cell] = Some(result);
        result
    }

    /// Whether `ts[i]..ts[j]` is elliptic.
    pub fn is_elliptic(&mut self, i: usize, j: usize) -> bool {
        self.identify(i, j).is_elliptic
    }

    /// Number of spans recognised so far.
    pub fn computed(&self) -> usize {
        self.table.iter().filter(|c| c.is_some()).count()
    }
}
