//! Unit handling at the panel boundary.
//!
//! Internally every gas tension is in kPa. Readings may arrive as bare numbers
//! (interpreted in the panel's declared [`UnitSystem`]) or as text carrying
//! their own unit, e.g. `"40 mmHg"`, `"5.3kPa"`, `"3.2 g/dL"`. A tagged unit
//! always wins over the declared system.

use std::fmt;

use bg_core::mmhg_to_kpa;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyte::{Analyte, Quantity};

/// Unit system declared for bare numeric gas tensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Kpa,
    Mmhg,
}

impl UnitSystem {
    /// Convert a bare gas tension in this system to kPa.
    pub fn gas_tension_to_kpa(self, value: f64) -> f64 {
        match self {
            Self::Kpa => value,
            Self::Mmhg => mmhg_to_kpa(value),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kpa => write!(f, "kPa"),
            Self::Mmhg => write!(f, "mmHg"),
        }
    }
}

/// Error in unit parsing or conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unit not recognized for this quantity
    #[error("Unknown unit '{unit}' for {quantity}")]
    UnknownUnit { unit: String, quantity: Quantity },

    /// Value cannot be represented in canonical units (e.g. non-positive [H+])
    #[error("Value {value} out of range: {reason}")]
    OutOfRange { value: f64, reason: String },
}

/// Parse a text reading for `analyte` into its canonical unit.
///
/// Bare numbers without a unit tag use `declared` for gas tensions and the
/// canonical unit for everything else.
pub fn parse_reading(
    raw_text: &str,
    analyte: Analyte,
    declared: UnitSystem,
) -> Result<f64, UnitError> {
    let (value, unit) = split_value_and_unit(raw_text)?;
    let unit = unit.to_lowercase();
    let quantity = analyte.quantity();

    let canonical = match quantity {
        Quantity::Ph => parse_ph(value, &unit)?,
        Quantity::GasTension => match unit.as_str() {
            "kpa" => value,
            "mmhg" | "mm hg" | "torr" => mmhg_to_kpa(value),
            "" => declared.gas_tension_to_kpa(value),
            _ => return Err(unknown(&unit, quantity)),
        },
        Quantity::Concentration => match unit.as_str() {
            "mmol/l" | "mmol" | "meq/l" | "mm" | "" => value,
            _ => return Err(unknown(&unit, quantity)),
        },
        Quantity::Protein => match unit.as_str() {
            "g/l" | "" => value,
            "g/dl" => value * 10.0,
            _ => return Err(unknown(&unit, quantity)),
        },
    };

    Ok(canonical)
}

/// pH is dimensionless; a hydrogen ion concentration in nmol/L is accepted
/// and converted with `pH = 9 - log10([H+])`.
fn parse_ph(value: f64, unit: &str) -> Result<f64, UnitError> {
    match unit {
        "" => Ok(value),
        "nmol/l" | "nmol" => {
            if value <= 0.0 {
                return Err(UnitError::OutOfRange {
                    value,
                    reason: "[H+] must be positive".to_string(),
                });
            }
            Ok(9.0 - value.log10())
        }
        _ => Err(unknown(unit, Quantity::Ph)),
    }
}

fn unknown(unit: &str, quantity: Quantity) -> UnitError {
    UnitError::UnknownUnit {
        unit: unit.to_string(),
        quantity,
    }
}

fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    // Find where the numeric part ends
    let split_idx = trimmed
        .char_indices()
        .find(|&(i, c)| {
            let sign = (c == '-' || c == '+') && i == 0;
            !(c.is_ascii_digit() || c == '.' || sign)
        })
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let num_part = num_part.trim();
    let unit_part = unit_part.trim();

    let value: f64 = num_part.parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;

    Ok((value, unit_part.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_tension_in_mmhg() {
        let v = parse_reading("40 mmHg", Analyte::PCo2, UnitSystem::Kpa).unwrap();
        assert!((v - 40.0 / 7.5).abs() < 1e-12);
    }

    #[test]
    fn gas_tension_tag_overrides_declared_system() {
        let v = parse_reading("5.3kPa", Analyte::PCo2, UnitSystem::Mmhg).unwrap();
        assert_eq!(v, 5.3);
    }

    #[test]
    fn bare_gas_tension_follows_declared_system() {
        assert_eq!(parse_reading("90", Analyte::PO2, UnitSystem::Mmhg).unwrap(), 12.0);
        assert_eq!(parse_reading("12", Analyte::PO2, UnitSystem::Kpa).unwrap(), 12.0);
    }

    #[test]
    fn negative_base_excess() {
        assert_eq!(
            parse_reading("-4.5 mmol/L", Analyte::BaseExcess, UnitSystem::Kpa).unwrap(),
            -4.5
        );
    }

    #[test]
    fn albumin_in_g_per_dl() {
        let v = parse_reading("3.2 g/dL", Analyte::Albumin, UnitSystem::Kpa).unwrap();
        assert!((v - 32.0).abs() < 1e-12);
    }

    #[test]
    fn hydrogen_ion_converts_to_ph() {
        let v = parse_reading("40 nmol/L", Analyte::Ph, UnitSystem::Kpa).unwrap();
        assert!((v - 7.397_94).abs() < 1e-4);
    }

    #[test]
    fn reject_unknown_unit() {
        assert!(matches!(
            parse_reading("24 g/L", Analyte::Hco3, UnitSystem::Kpa),
            Err(UnitError::UnknownUnit { unit, .. }) if unit == "g/l"
        ));
    }

    #[test]
    fn reject_non_numeric() {
        assert!(matches!(
            parse_reading("high", Analyte::Sodium, UnitSystem::Kpa),
            Err(UnitError::ParseError(_))
        ));
    }
}
