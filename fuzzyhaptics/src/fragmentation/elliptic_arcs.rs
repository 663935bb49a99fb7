//! Bottleneck-optimal segmentation of a curve into elliptic runs.

use tracing::{debug, warn};

use super::identifier::MemoizingEllipticIdentifier;
use super::partition::{Answer, PartitionParameters};
use super::Fragment;
use crate::curve::{ParametricCurve, Range, SplineCurve};
use crate::error::SegmentationError;
use crate::recognition::{OpenRecognizer, Recognizer};

/// Spacing of generated search parameters (s).
pub const SEARCH_STEP: f64 = 0.1;

/// Positions a split index may take in some minimum-run partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NarrowedInterval {
    first: usize,
    last: usize,
}

/// Splits a curve into the fewest elliptic runs, maximising the lowest run grade.
#[derive(Clone, Debug, Default)]
pub struct EllipticalArcsSegmentation<R = OpenRecognizer> {
    recognizer: R,
}

impl<R: Recognizer> EllipticalArcsSegmentation<R> {
    /// Segmentation driven by `recognizer`.
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }

    /// Recognizer in use.
    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Interior split parameters of the best partition of `params`.
    ///
    /// `params` are candidate split times, end points included. Among partitions into
    /// the fewest elliptic runs the one whose weakest run grades highest is returned;
    /// when no such partition exists every partition is admissible.
    pub fn best_divided_parameters(
        &self,
        curve: &SplineCurve,
        params: &[f64],
    ) -> Result<Vec<f64>, SegmentationError> {
        validate(curve, params)?;
        let n = params.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let mut ident = MemoizingEllipticIdentifier::new(&self.recognizer, curve, params);
        let indices = if all_adjacent_elliptic(&mut ident) {
            narrowed_search(&mut ident)?
        } else {
            warn!(params = n, "no elliptic partition, searching every partition");
            unconstrained_search(&mut ident)
        };
        debug!(
            params = n,
            splits = indices.len(),
            identified = ident.computed(),
            "segmentation"
        );
        Ok(indices.into_iter().map(|i| params[i]).collect())
    }

    /// Same partitions as [`Self::best_divided_parameters`], by a layered search over
    /// every split position.
    pub fn exhaustive_divided_parameters(
        &self,
        curve: &SplineCurve,
        params: &[f64],
    ) -> Result<Vec<f64>, SegmentationError> {
        validate(curve, params)?;
        let n = params.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let mut ident = MemoizingEllipticIdentifier::new(&self.recognizer, curve, params);
        let indices = if all_adjacent_elliptic(&mut ident) {
            layered_search(&mut ident)?
        } else {
            unconstrained_search(&mut ident)
        };
        Ok(indices.into_iter().map(|i| params[i]).collect())
    }

    /// Cut `curve` into fragments at its best split parameters.
    pub fn create_fragments(
        &self,
        curve: &SplineCurve,
    ) -> Result<Vec<Fragment>, SegmentationError> {
        let params = search_parameters(curve);
        let splits = self.best_divided_parameters(curve, &params)?;
        let range = curve.range();
        let mut bounds = Vec::with_capacity(splits.len() + 2);
        bounds.push(range.start());
        bounds.extend(splits);
        bounds.push(range.end());
        Ok(bounds
            .windows(2)
            .map(|w| Fragment::new(curve, Range::new(w[0], w[1])))
            .collect())
    }
}

/// Candidate split times every [`SEARCH_STEP`] seconds, end points included.
pub fn search_parameters(curve: &SplineCurve) -> Vec<f64> {
    let range = curve.range();
    let num = ((range.length() / SEARCH_STEP).round() as usize).max(1);
    let mut params: Vec<f64> = (0..=num)
        .map(|i| range.clamp(range.denormalize(i as f64 / num as f64)))
        .collect();
    params[0] = range.start();
    params[num] = range.end();
    params.dedup();
    params
}

fn validate(curve: &SplineCurve, params: &[f64]) -> Result<(), SegmentationError> {
    let range = curve.range();
    for (index, &value) in params.iter().enumerate() {
        if !value.is_finite() {
            return Err(SegmentationError::NonFinite { index });
        }
        if !range.contains(value) {
            return Err(SegmentationError::OutOfRange {
                value,
                start: range.start(),
                end: range.end(),
            });
        }
        if index > 0 && params[index - 1] >= value {
            return Err(SegmentationError::NotIncreasing {
                index,
                previous: params[index - 1],
                value,
            });
        }
    }
    Ok(())
}

fn all_adjacent_elliptic<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> bool {
    (1..ident.len()).all(|j| ident.is_elliptic(j - 1, j))
}

/// Furthest reach of each run, walking greedily from the start.
fn left_greedy<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Vec<usize> {
    let n = ident.len();
    let mut ls = vec![0];
    for i in 0..n {
        let last = ls[ls.len() - 1];
        if i == n - 1 {
            ls.push(n - 1);
        } else if !ident.is_elliptic(last, i + 1) {
            ls.push(i);
        }
    }
    ls
}

/// Earliest position of each split, given the greedy reaches `ls`.
fn right_greedy_from<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
    ls: &[usize],
) -> Vec<usize> {
    let m = ls.len() - 1;
    let mut rs = vec![ls[m]];
    for p in (1..m).rev() {
        let next = rs[rs.len() - 1];
        let mut ri = ls[p - 1] + 1;
        for r in (ls[p - 1] + 1..=ls[p]).rev() {
            if !ident.is_elliptic(r, next) {
                ri = r + 1;
                break;
            }
        }
        rs.push(ri);
    }
    rs.push(0);
    rs.reverse();
    rs
}

/// Earliest start of each run, walking greedily from the end.
fn right_greedy<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Vec<usize> {
    let n = ident.len();
    let mut rs = vec![n - 1];
    for i in (0..n).rev() {
        let first = rs[rs.len() - 1];
        if i == 0 {
            rs.push(0);
        } else if !ident.is_elliptic(i - 1, first) {
            rs.push(i);
        }
    }
    rs.reverse();
    rs
}

/// Latest position of each split, given the greedy starts `rs`.
fn left_greedy_from<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
    rs: &[usize],
) -> Vec<usize> {
    let m = rs.len() - 1;
    let mut ls = vec![0];
    for p in 1..m {
        let previous = ls[ls.len() - 1];
        let mut li = rs[p + 1] - 1;
        for l in rs[p]..rs[p + 1] {
            if !ident.is_elliptic(previous, l) {
                li = l - 1;
                break;
            }
        }
        ls.push(li);
    }
    ls.push(rs[m]);
    ls
}

/// Range of every split index, from whichever pass pair gives fewer runs.
fn narrow<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Vec<NarrowedInterval> {
    let zip = |rs: &[usize], ls: &[usize]| -> Vec<NarrowedInterval> {
        rs.iter()
            .zip(ls)
            .map(|(&first, &last)| NarrowedInterval { first, last })
            .collect()
    };
    let ls = left_greedy(ident);
    let rs = right_greedy_from(ident, &ls);
    let forward = zip(&rs, &ls);

    let rs = right_greedy(ident);
    let ls = left_greedy_from(ident, &rs);
    let backward = zip(&rs, &ls);

    if forward.len() < backward.len() {
        forward
    } else {
        backward
    }
}

fn narrowed_search<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Result<Vec<usize>, SegmentationError> {
    let n = ident.len();
    let intervals = narrow(ident);
    let mut answers: Vec<Option<Answer>> = Vec::with_capacity(n);
    answers.push(Some(Answer::new(1.0, PartitionParameters::empty())));

    let mut current = 0;
    for j in 1..n {
        if intervals.get(current + 1).is_some_and(|iv| iv.first == j) {
            current += 1;
        }
        if current > 0 && j <= intervals[current].last {
            let k = arg_max_bisection(ident, &answers, intervals[current - 1], j)?;
            let base = answers[k].as_ref().ok_or(SegmentationError::MissingAnswer(k))?;
            let next = base.extend(k, ident.identify(k, j).grade);
            answers.push(Some(next));
        } else {
            answers.push(None);
        }
    }
    let last = answers[n - 1]
        .as_ref()
        .ok_or(SegmentationError::MissingAnswer(n - 1))?;
    Ok(last.partition.to_vec().into_iter().skip(1).collect())
}

/// Best split index in `interval` for a run ending at `j`.
///
/// Bisects on the assumption that the candidate grade rises then falls across the
/// interval.
fn arg_max_bisection<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
    answers: &[Option<Answer>],
    interval: NarrowedInterval,
    j: usize,
) -> Result<usize, SegmentationError> {
    let (mut a, mut b) = (interval.first, interval.last);
    loop {
        if a >= b {
            return Ok(if a == b {
                a
            } else {
                b.clamp(interval.first, interval.last)
            });
        }
        let k = a + (b - a).div_ceil(2);
        if !ident.is_elliptic(k, j) {
            a = k + 1;
            continue;
        }
        let here = candidate_grade(ident, answers, interval, j, Some(k))?;
        if here < candidate_grade(ident, answers, interval, j, Some(k + 1))? {
            a = k + 1;
        } else if here <= candidate_grade(ident, answers, interval, j, k.checked_sub(1))? {
            b = k - 1;
        } else {
            return Ok(k);
        }
    }
}

/// Bottleneck of splitting at `k` for a run ending at `j`; zero outside `interval`.
fn candidate_grade<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
    answers: &[Option<Answer>],
    interval: NarrowedInterval,
    j: usize,
    k: Option<usize>,
) -> Result<f64, SegmentationError> {
    let Some(k) = k.filter(|k| (interval.first..=interval.last).contains(k)) else {
        return Ok(0.0);
    };
    let answer = answers
        .get(k)
        .and_then(Option::as_ref)
        .ok_or(SegmentationError::MissingAnswer(k))?;
    let result = ident.identify(k, j);
    Ok(if result.is_elliptic {
        result.grade.min(answer.grade)
    } else {
        f64::NEG_INFINITY
    })
}

/// Best bottleneck over every partition, elliptic or not.
fn unconstrained_search<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Vec<usize> {
    let n = ident.len();
    let mut answers: Vec<Answer> = Vec::with_capacity(n);
    answers.push(Answer::new(1.0, PartitionParameters::empty()));
    for j in 1..n {
        let mut best: Option<Answer> = None;
        for k in 0..j {
            let candidate = answers[k].extend(k, ident.identify(k, j).grade);
            if best.as_ref().map_or(true, |b| better(&candidate, b)) {
                best = Some(candidate);
            }
        }
        if let Some(best) = best {
            answers.push(best);
        }
    }
    answers[n - 1].partition.to_vec().into_iter().skip(1).collect()
}

/// Best partition into exactly the fewest elliptic runs, found layer by layer.
fn layered_search<R: Recognizer + ?Sized>(
    ident: &mut MemoizingEllipticIdentifier<'_, R>,
) -> Result<Vec<usize>, SegmentationError> {
    let n = ident.len();
    let mut layer: Vec<Option<Answer>> = vec![None; n];
    layer[0] = Some(Answer::new(1.0, PartitionParameters::empty()));
    for _runs in 1..n {
        let mut next: Vec<Option<Answer>> = vec![None; n];
        for (j, cell) in next.iter_mut().enumerate().skip(1) {
            for (k, previous) in layer.iter().enumerate().take(j) {
                let Some(previous) = previous else { continue };
                let result = ident.identify(k, j);
                if !result.is_elliptic {
                    continue;
                }
                let candidate = previous.extend(k, result.grade);
                if cell.as_ref().map_or(true, |c| candidate.grade > c.grade) {
                    *cell = Some(candidate);
                }
            }
        }
        if let Some(done) = &next[n - 1] {
            return Ok(done.partition.to_vec().into_iter().skip(1).collect());
        }
        layer = next;
    }
    Err(SegmentationError::MissingAnswer(n - 1))
}

/// Higher grade wins, then fewer runs.
fn better(candidate: &Answer, best: &Answer) -> bool {
    candidate.grade > best.grade
        || (candidate.grade == best.grade && candidate.partition.len() < best.partition.len())
}
