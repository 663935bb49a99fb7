//! Fuzzy numbers and necessity/possibility truth values.
//!
//! A fuzzy number here is symmetric and triangular: a vertex (the most plausible
//! value) and a fuzziness (the half-width of its support). Comparing two of them
//! yields a [`TruthValue`], the pair of dual bounds on "how certainly" and "how
//! plausibly" one is contained in the other.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A necessity/possibility pair with `0 <= necessity <= possibility <= 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawTruthValue")
)]
pub struct TruthValue {
    necessity: f64,
    possibility: f64,
}

impl TruthValue {
    /// Create a truth value.
    ///
    /// Both bounds are clamped to [0, 1] and necessity is capped by possibility, so the
    /// ordering invariant holds for any input. NaN inputs become 0.
    pub fn new(necessity: f64, possibility: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let possibility = clamp(possibility);
        Self {
            necessity: clamp(necessity).min(possibility),
            possibility,
        }
    }

    /// Necessity.
    pub fn necessity(&self) -> f64 {
        self.necessity
    }

    /// Possibility.
    pub fn possibility(&self) -> f64 {
        self.possibility
    }

    /// Build a truth value, rejecting pairs that [`TruthValue::new`] would have to
    /// repair.
    pub fn checked(necessity: f64, possibility: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("necessity", necessity), ("possibility", possibility)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold { name, value });
            }
        }
        if necessity > possibility {
            return Err(ConfigError::InvertedTruthValue {
                necessity,
                possibility,
            });
        }
        Ok(Self {
            necessity,
            possibility,
        })
    }

    /// Inclusion of a fuzzy quantity with fuzziness `own` in one with fuzziness
    /// `other`, their vertices `distance` apart.
    ///
    /// * necessity  = `max((other - distance) / sum, 0)`
    /// * possibility = `max((sum - distance) / sum, 0)`
    ///
    /// where `sum = own + other`. Two crisp quantities (`sum == 0`) are certainly
    /// included when they coincide and certainly not otherwise; an infinite spread
    /// gives `(0, 1)`.
    ///
    /// Coinciding crisp quantities deliberately give `(1, 1)` rather than a
    /// half-certain `(0.5, 1)`: a perfectly still stylus must
    /// read as staying, which needs necessity above the default 0.5 threshold.
    pub(crate) fn inclusion(distance: f64, own: f64, other: f64) -> Self {
        let sum = own + other;
        if sum.is_infinite() {
            return Self::new(0.0, 1.0);
        }
        if sum == 0.0 {
            return if distance == 0.0 {
                Self::new(1.0, 1.0)
            } else {
                Self::new(0.0, 0.0)
            };
        }
        let necessity = ((other - distance) / sum).max(0.0);
        let possibility = ((sum - distance) / sum).max(0.0);
        Self::new(necessity, possibility)
    }
}

/// Wire form of a [`TruthValue`], checked on conversion.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawTruthValue {
    necessity: f64,
    possibility: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTruthValue> for TruthValue {
    type Error = ConfigError;

    fn try_from(raw: RawTruthValue) -> Result<Self, Self::Error> {
        Self::checked(raw.necessity, raw.possibility)
    }
}

/// A one-dimensional symmetric fuzzy number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyValue {
    vertex: f64,
    fuzziness: f64,
}

impl FuzzyValue {
    /// Create a fuzzy number. Negative fuzziness is clamped to zero.
    pub fn new(vertex: f64, fuzziness: f64) -> Self {
        Self {
            vertex,
            fuzziness: fuzziness.max(0.0),
        }
    }

    /// Most plausible value.
    pub fn vertex(&self) -> f64 {
        self.vertex
    }

    /// Half-width of the support.
    pub fn fuzziness(&self) -> f64 {
        self.fuzziness
    }

    /// Necessity and possibility that `self` is contained in `other`.
    ///
    /// The relation is asymmetric: necessity measures how much of `self` fits inside
    /// `other`'s spread, so it uses `other.fuzziness`, while possibility only asks
    /// whether the supports overlap.
    pub fn included_in(&self, other: &FuzzyValue) -> TruthValue {
        TruthValue::inclusion(
            (other.vertex - self.vertex).abs(),
            self.fuzziness,
            other.fuzziness,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inclusion_is_asymmetric() {
        let a = FuzzyValue::new(0.0, 1.0);
        let b = FuzzyValue::new(1.0, 3.0);

        // sum 4, distance 1
        let ab = a.included_in(&b);
        assert_relative_eq!(ab.necessity(), (3.0 - 1.0) / 4.0, epsilon = 1e-12);
        assert_relative_eq!(ab.possibility(), (4.0 - 1.0) / 4.0, epsilon = 1e-12);

        let ba = b.included_in(&a);
        assert_relative_eq!(ba.necessity(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(ba.possibility(), ab.possibility(), epsilon = 1e-12);
    }

    #[test]
    fn test_crisp_equal_values_do_not_produce_nan() {
        let a = FuzzyValue::new(2.5, 0.0);
        let tv = a.included_in(&FuzzyValue::new(2.5, 0.0));
        assert!(!tv.necessity().is_nan());
        assert!(!tv.possibility().is_nan());
        assert_eq!(tv, TruthValue::new(1.0, 1.0));
    }

    #[test]
    fn test_checked_rejects_what_new_would_repair() {
        assert_eq!(TruthValue::checked(0.2, 0.7), Ok(TruthValue::new(0.2, 0.7)));
        assert_eq!(
            TruthValue::checked(0.9, 0.1),
            Err(ConfigError::InvertedTruthValue {
                necessity: 0.9,
                possibility: 0.1
            })
        );
        assert!(matches!(
            TruthValue::checked(0.5, 1.5),
            Err(ConfigError::Threshold { name: "possibility", .. })
        ));
        assert!(TruthValue::checked(f64::NAN, 0.5).is_err());
    }

    #[test]
    fn test_crisp_distinct_values_are_excluded() {
        let tv = FuzzyValue::new(0.0, 0.0).included_in(&FuzzyValue::new(1.0, 0.0));
        assert_eq!(tv, TruthValue::new(0.0, 0.0));
    }

    #[test]
    fn test_infinite_spread() {
        let tv = FuzzyValue::new(0.0, f64::INFINITY).included_in(&FuzzyValue::new(1.0, 1.0));
        assert_eq!(tv, TruthValue::new(0.0, 1.0));
    }

    #[test]
    fn test_far_values_clamp_to_zero() {
        let tv = FuzzyValue::new(0.0, 1.0).included_in(&FuzzyValue::new(10.0, 1.0));
        assert_eq!(tv.necessity(), 0.0);
        assert_eq!(tv.possibility(), 0.0);
    }

    #[test]
    fn test_truth_value_keeps_order_invariant() {
        let tv = TruthValue::new(0.9, 0.4);
        assert!(tv.necessity() <= tv.possibility());
        let tv = TruthValue::new(-1.0, 2.0);
        assert_eq!(tv.necessity(), 0.0);
        assert_eq!(tv.possibility(), 1.0);
    }
}
