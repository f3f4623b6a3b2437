//! Analyte catalogue: names, units, normal ranges and plausibility limits.
//!
//! Both tables are static. Normal ranges drive the low/normal/high flags shown
//! next to each value; plausibility limits are the wider bounds a value must
//! satisfy to be accepted into a panel at all.

use std::fmt;

use bg_core::Band;
use serde::{Deserialize, Serialize};

/// Dimension/quantity family of an analyte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// pH (dimensionless; `[H+]` in nmol/L is also accepted)
    Ph,
    /// Gas tension (canonical: kPa)
    GasTension,
    /// Electrolyte or buffer concentration (canonical: mmol/L)
    Concentration,
    /// Plasma protein (canonical: g/L)
    Protein,
}

impl Quantity {
    /// Canonical unit label.
    pub fn unit_label(self) -> &'static str {
        match self {
            Self::Ph => "",
            Self::GasTension => "kPa",
            Self::Concentration => "mmol/L",
            Self::Protein => "g/L",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ph => write!(f, "pH"),
            Self::GasTension => write!(f, "Gas Tension"),
            Self::Concentration => write!(f, "Concentration"),
            Self::Protein => write!(f, "Protein Concentration"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Analyte {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "pCO2")]
    PCo2,
    #[serde(rename = "HCO3")]
    Hco3,
    #[serde(rename = "pO2")]
    PO2,
    #[serde(rename = "base_excess")]
    BaseExcess,
    #[serde(rename = "Na")]
    Sodium,
    #[serde(rename = "Cl")]
    Chloride,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "albumin")]
    Albumin,
}

impl Analyte {
    /// Every analyte in report order.
    pub const ALL: [Analyte; 9] = [
        Analyte::Ph,
        Analyte::PCo2,
        Analyte::Hco3,
        Analyte::PO2,
        Analyte::BaseExcess,
        Analyte::Sodium,
        Analyte::Chloride,
        Analyte::Potassium,
        Analyte::Albumin,
    ];

    /// Canonical key used in raw mappings and serialized output.
    pub fn key(self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::PCo2 => "pCO2",
            Self::Hco3 => "HCO3",
            Self::PO2 => "pO2",
            Self::BaseExcess => "base_excess",
            Self::Sodium => "Na",
            Self::Chloride => "Cl",
            Self::Potassium => "K",
            Self::Albumin => "albumin",
        }
    }

    /// Resolve a raw mapping key, case-insensitively and with common aliases.
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-' | '⁻' | '+' | '⁺'))
            .collect::<String>()
            .to_lowercase()
            .replace('₂', "2")
            .replace('₃', "3");

        let analyte = match normalized.as_str() {
            "ph" => Self::Ph,
            "pco2" | "paco2" => Self::PCo2,
            "hco3" | "bicarbonate" | "bicarb" => Self::Hco3,
            "po2" | "pao2" => Self::PO2,
            "baseexcess" | "be" | "abe" | "sbe" => Self::BaseExcess,
            "na" | "sodium" => Self::Sodium,
            "cl" | "chloride" => Self::Chloride,
            "k" | "potassium" => Self::Potassium,
            "albumin" | "alb" => Self::Albumin,
            _ => return None,
        };
        Some(analyte)
    }

    pub fn quantity(self) -> Quantity {
        match self {
            Self::Ph => Quantity::Ph,
            Self::PCo2 | Self::PO2 => Quantity::GasTension,
            Self::Hco3 | Self::BaseExcess | Self::Sodium | Self::Chloride | Self::Potassium => {
                Quantity::Concentration
            }
            Self::Albumin => Quantity::Protein,
        }
    }

    pub fn unit_label(self) -> &'static str {
        self.quantity().unit_label()
    }

    /// Reference ("normal") range in canonical units.
    pub fn normal_range(self) -> Band {
        match self {
            Self::Ph => Band::new(7.35, 7.45),
            Self::PCo2 => Band::new(4.5, 6.0),
            Self::Hco3 => Band::new(22.0, 28.0),
            Self::PO2 => Band::new(11.0, 13.0),
            Self::BaseExcess => Band::new(-2.0, 2.0),
            Self::Sodium => Band::new(135.0, 145.0),
            Self::Chloride => Band::new(98.0, 107.0),
            Self::Potassium => Band::new(3.5, 5.0),
            Self::Albumin => Band::new(35.0, 50.0),
        }
    }

    /// Absolute plausibility limits in canonical units. Values outside are
    /// rejected at panel entry.
    pub fn plausible_range(self) -> Band {
        match self {
            Self::Ph => Band::new(6.8, 7.8),
            Self::PCo2 => Band::new(2.0, 12.0),
            Self::Hco3 => Band::new(10.0, 45.0),
            Self::PO2 => Band::new(5.0, 20.0),
            Self::BaseExcess => Band::new(-20.0, 20.0),
            Self::Sodium => Band::new(120.0, 160.0),
            Self::Chloride => Band::new(80.0, 120.0),
            Self::Potassium => Band::new(1.5, 9.0),
            Self::Albumin => Band::new(5.0, 60.0),
        }
    }
}

impl fmt::Display for Analyte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_key() {
        for analyte in Analyte::ALL {
            assert_eq!(Analyte::from_key(analyte.key()), Some(analyte));
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Analyte::from_key("Bicarbonate"), Some(Analyte::Hco3));
        assert_eq!(Analyte::from_key("HCO3-"), Some(Analyte::Hco3));
        assert_eq!(Analyte::from_key("HCO₃⁻"), Some(Analyte::Hco3));
        assert_eq!(Analyte::from_key("PaCO2"), Some(Analyte::PCo2));
        assert_eq!(Analyte::from_key("pO₂"), Some(Analyte::PO2));
        assert_eq!(Analyte::from_key("Base Excess"), Some(Analyte::BaseExcess));
        assert_eq!(Analyte::from_key("sodium"), Some(Analyte::Sodium));
        assert_eq!(Analyte::from_key("lactate"), None);
    }

    #[test]
    fn plausibility_is_wider_than_normal() {
        for analyte in Analyte::ALL {
            let normal = analyte.normal_range();
            let plausible = analyte.plausible_range();
            assert!(plausible.low < normal.low, "{analyte}");
            assert!(plausible.high > normal.high, "{analyte}");
        }
    }

    #[test]
    fn serializes_as_canonical_key() {
        let json = serde_json::to_string(&Analyte::BaseExcess).unwrap();
        assert_eq!(json, "\"base_excess\"");
        let back: Analyte = serde_json::from_str("\"pCO2\"").unwrap();
        assert_eq!(back, Analyte::PCo2);
    }
}
