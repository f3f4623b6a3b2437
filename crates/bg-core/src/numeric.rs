use core::fmt;

use crate::{BgError, BgResult};

/// Floating point type for every measured and derived value.
pub type Real = f64;

/// Absolute and relative tolerance for comparing two reals.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
        }
    }
}

/// True when `a` and `b` agree within the absolute or the relative tolerance.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> BgResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BgError::NonFinite { what, value: v })
    }
}

/// Where a value sits relative to a [`Band`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RangeFlag {
    Low,
    Normal,
    High,
}

impl RangeFlag {
    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for RangeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Closed interval `[low, high]`.
///
/// Used both for reference ("normal") ranges and for the wider plausibility
/// limits enforced at panel entry. Both ends are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Band {
    pub low: Real,
    pub high: Real,
}

impl Band {
    pub const fn new(low: Real, high: Real) -> Self {
        Self { low, high }
    }

    /// Build a band, rejecting non-finite or inverted limits.
    pub fn checked(low: Real, high: Real, what: &'static str) -> BgResult<Self> {
        ensure_finite(low, what)?;
        ensure_finite(high, what)?;
        if low >= high {
            return Err(BgError::InvalidBand { what, low, high });
        }
        Ok(Self { low, high })
    }

    pub fn contains(&self, value: Real) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn flag(&self, value: Real) -> RangeFlag {
        if value < self.low {
            RangeFlag::Low
        } else if value > self.high {
            RangeFlag::High
        } else {
            RangeFlag::Normal
        }
    }

    pub fn midpoint(&self) -> Real {
        0.5 * (self.low + self.high)
    }

    /// Same band widened symmetrically by `margin` on both ends.
    pub fn widened(&self, margin: Real) -> Self {
        Self {
            low: self.low - margin,
            high: self.high + margin,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_tolerance_bounds_ph_agreement() {
        let tol = Tolerances {
            abs: 0.05,
            rel: 0.0,
        };
        assert!(nearly_equal(7.40, 7.44, tol));
        assert!(nearly_equal(7.40, 7.36, tol));
        assert!(!nearly_equal(7.40, 7.46, tol));
    }

    #[test]
    fn relative_tolerance_scales_with_magnitude() {
        let tol = Tolerances {
            abs: 0.0,
            rel: 0.01,
        };
        assert!(nearly_equal(140.0, 141.0, tol));
        assert!(!nearly_equal(4.0, 4.1, tol));
    }

    #[test]
    fn non_finite_values_name_the_field() {
        let err = ensure_finite(Real::INFINITY, "band low").unwrap_err();
        assert_eq!(
            err,
            BgError::NonFinite {
                what: "band low",
                value: Real::INFINITY,
            }
        );
        assert!(err.to_string().contains("band low"));
        assert_eq!(ensure_finite(7.4, "pH"), Ok(7.4));
    }

    #[test]
    fn band_edges_are_inclusive() {
        let band = Band::new(7.35, 7.45);
        assert_eq!(band.flag(7.35), RangeFlag::Normal);
        assert_eq!(band.flag(7.45), RangeFlag::Normal);
        assert_eq!(band.flag(7.34), RangeFlag::Low);
        assert_eq!(band.flag(7.46), RangeFlag::High);
    }

    #[test]
    fn checked_band_rejects_inverted_limits() {
        assert!(Band::checked(16.0, 8.0, "anion gap").is_err());
        assert!(Band::checked(8.0, 8.0, "anion gap").is_err());
        assert!(Band::checked(Real::NAN, 8.0, "anion gap").is_err());
        assert_eq!(
            Band::checked(8.0, 16.0, "anion gap").unwrap(),
            Band::new(8.0, 16.0)
        );
    }

    #[test]
    fn widened_band_keeps_midpoint() {
        let band = Band::new(3.0, 5.0).widened(0.5);
        assert_eq!(band, Band::new(2.5, 5.5));
        assert_eq!(band.midpoint(), 4.0);
    }
}
