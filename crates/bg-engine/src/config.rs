//! Engine configuration.
//!
//! Only the tunable clinical constants live here. The analyte normal ranges
//! and plausibility limits are fixed tables in `bg-panel`.

use std::path::Path;

use bg_core::{Band, MMHG_PER_KPA};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Normal anion gap [mmol/L]; above `high` is a high-gap acidosis.
    pub anion_gap_band: Band,
    /// Normal A-a gradient on room air [kPa].
    pub aa_gradient_band: Band,
    /// Half-width of the expected pCO2 window for metabolic disorders [kPa].
    pub metabolic_pco2_tolerance_kpa: f64,
    /// Half-width of the expected HCO3 window for respiratory disorders [mmol/L].
    pub respiratory_hco3_tolerance: f64,
    /// Albumin at which no anion gap correction applies [g/L].
    pub reference_albumin_g_l: f64,
    /// Anion gap rise per 10 g/L albumin deficit [mmol/L].
    pub albumin_correction_per_10g: f64,
    /// Largest accepted |measured pH - Henderson-Hasselbalch pH|.
    pub consistency_tolerance_ph: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anion_gap_band: Band::new(8.0, 16.0),
            aa_gradient_band: Band::new(2.0, 4.0),
            metabolic_pco2_tolerance_kpa: 2.0 / MMHG_PER_KPA,
            respiratory_hco3_tolerance: 2.0,
            reference_albumin_g_l: 40.0,
            albumin_correction_per_10g: 2.5,
            consistency_tolerance_ph: 0.05,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> EngineResult<()> {
        Band::checked(
            self.anion_gap_band.low,
            self.anion_gap_band.high,
            "anion_gap_band",
        )?;
        Band::checked(
            self.aa_gradient_band.low,
            self.aa_gradient_band.high,
            "aa_gradient_band",
        )?;

        let non_negative = [
            ("metabolic_pco2_tolerance_kpa", self.metabolic_pco2_tolerance_kpa),
            ("respiratory_hco3_tolerance", self.respiratory_hco3_tolerance),
            ("albumin_correction_per_10g", self.albumin_correction_per_10g),
            ("consistency_tolerance_ph", self.consistency_tolerance_ph),
        ];
        for (what, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig {
                    what,
                    reason: format!("must be finite and non-negative, got {value}"),
                });
            }
        }

        if !self.reference_albumin_g_l.is_finite() || self.reference_albumin_g_l <= 0.0 {
            return Err(EngineError::InvalidConfig {
                what: "reference_albumin_g_l",
                reason: format!("must be positive, got {}", self.reference_albumin_g_l),
            });
        }

        Ok(())
    }
}
