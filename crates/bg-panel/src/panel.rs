//! Validated, immutable value panel and the boundary validator that builds it.

use std::collections::BTreeMap;

use bg_core::{Band, Pressure, RangeFlag, kpa, kpa_value};
use serde::Serialize;
use tracing::debug;

use crate::analyte::Analyte;
use crate::error::{BoundViolation, PanelError, PanelResult};
use crate::raw::{Chronicity, RawPanel, RawReading};
use crate::units::{UnitSystem, parse_reading};

/// Plausible patient age range [years].
const AGE_RANGE: Band = Band::new(0.0, 120.0);

/// One present analyte with its reference band and flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnalyteReading {
    pub analyte: Analyte,
    pub value: f64,
    pub unit: &'static str,
    pub normal_range: Band,
    pub flag: RangeFlag,
}

/// A validated set of blood gas values.
///
/// Every present value lies within its plausibility limits and is stored in
/// canonical units (gas tensions in kPa). There is no way to mutate a panel
/// after construction; a new analysis builds a new panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RawPanel")]
pub struct ValuePanel {
    ph: Option<f64>,
    pco2: Option<Pressure>,
    hco3: Option<f64>,
    po2: Option<Pressure>,
    base_excess: Option<f64>,
    sodium: Option<f64>,
    chloride: Option<f64>,
    potassium: Option<f64>,
    albumin: Option<f64>,
    age_years: Option<f64>,
    chronicity: Option<Chronicity>,
    clinical_info: Option<String>,
}

impl ValuePanel {
    pub fn ph(&self) -> Option<f64> {
        self.ph
    }

    pub fn pco2(&self) -> Option<Pressure> {
        self.pco2
    }

    pub fn pco2_kpa(&self) -> Option<f64> {
        self.pco2.map(kpa_value)
    }

    pub fn hco3(&self) -> Option<f64> {
        self.hco3
    }

    pub fn po2(&self) -> Option<Pressure> {
        self.po2
    }

    pub fn po2_kpa(&self) -> Option<f64> {
        self.po2.map(kpa_value)
    }

    pub fn base_excess(&self) -> Option<f64> {
        self.base_excess
    }

    pub fn sodium(&self) -> Option<f64> {
        self.sodium
    }

    pub fn chloride(&self) -> Option<f64> {
        self.chloride
    }

    pub fn potassium(&self) -> Option<f64> {
        self.potassium
    }

    pub fn albumin(&self) -> Option<f64> {
        self.albumin
    }

    pub fn age_years(&self) -> Option<f64> {
        self.age_years
    }

    pub fn chronicity(&self) -> Option<Chronicity> {
        self.chronicity
    }

    pub fn clinical_info(&self) -> Option<&str> {
        self.clinical_info.as_deref()
    }

    /// Canonical value of `analyte` (gas tensions in kPa).
    pub fn get(&self, analyte: Analyte) -> Option<f64> {
        match analyte {
            Analyte::Ph => self.ph,
            Analyte::PCo2 => self.pco2_kpa(),
            Analyte::Hco3 => self.hco3,
            Analyte::PO2 => self.po2_kpa(),
            Analyte::BaseExcess => self.base_excess,
            Analyte::Sodium => self.sodium,
            Analyte::Chloride => self.chloride,
            Analyte::Potassium => self.potassium,
            Analyte::Albumin => self.albumin,
        }
    }

    pub fn has(&self, analyte: Analyte) -> bool {
        self.get(analyte).is_some()
    }

    /// The subset of `required` that is absent, in the given order.
    pub fn missing(&self, required: &[Analyte]) -> Vec<Analyte> {
        required
            .iter()
            .copied()
            .filter(|a| !self.has(*a))
            .collect()
    }

    /// Flag for a present analyte against its normal range.
    pub fn flag(&self, analyte: Analyte) -> Option<RangeFlag> {
        self.get(analyte).map(|v| analyte.normal_range().flag(v))
    }

    /// All present analytes in report order, flagged against normal ranges.
    pub fn readings(&self) -> Vec<AnalyteReading> {
        Analyte::ALL
            .iter()
            .filter_map(|&analyte| {
                self.get(analyte).map(|value| {
                    let band = analyte.normal_range();
                    AnalyteReading {
                        analyte,
                        value,
                        unit: analyte.unit_label(),
                        normal_range: band,
                        flag: band.flag(value),
                    }
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Analyte::ALL.iter().all(|a| !self.has(*a))
    }

    fn set(&mut self, analyte: Analyte, value: f64) {
        match analyte {
            Analyte::Ph => self.ph = Some(value),
            Analyte::PCo2 => self.pco2 = Some(kpa(value)),
            Analyte::Hco3 => self.hco3 = Some(value),
            Analyte::PO2 => self.po2 = Some(kpa(value)),
            Analyte::BaseExcess => self.base_excess = Some(value),
            Analyte::Sodium => self.sodium = Some(value),
            Analyte::Chloride => self.chloride = Some(value),
            Analyte::Potassium => self.potassium = Some(value),
            Analyte::Albumin => self.albumin = Some(value),
        }
    }

    fn empty() -> Self {
        Self {
            ph: None,
            pco2: None,
            hco3: None,
            po2: None,
            base_excess: None,
            sodium: None,
            chloride: None,
            potassium: None,
            albumin: None,
            age_years: None,
            chronicity: None,
            clinical_info: None,
        }
    }
}

impl From<ValuePanel> for RawPanel {
    fn from(panel: ValuePanel) -> Self {
        let values: BTreeMap<String, Option<RawReading>> = Analyte::ALL
            .iter()
            .filter_map(|&a| {
                panel
                    .get(a)
                    .map(|v| (a.key().to_string(), Some(RawReading::Number(v))))
            })
            .collect();

        RawPanel {
            units: UnitSystem::Kpa,
            values,
            age: panel.age_years,
            chronicity: panel.chronicity,
            clinical_info: panel.clinical_info,
        }
    }
}

/// Validate a raw mapping and build an immutable [`ValuePanel`].
///
/// Every present value is converted to canonical units and checked against
/// [`Analyte::plausible_range`]; the first implausible value fails the whole
/// panel with [`PanelError::OutOfBounds`]. Missing values are never an error.
pub fn validate_and_build_panel(raw: &RawPanel) -> PanelResult<ValuePanel> {
    let mut panel = ValuePanel::empty();
    let mut seen: BTreeMap<Analyte, &str> = BTreeMap::new();

    for (key, reading) in &raw.values {
        let analyte = Analyte::from_key(key).ok_or_else(|| PanelError::UnknownAnalyte {
            key: key.clone(),
        })?;

        if seen.insert(analyte, key.as_str()).is_some() {
            return Err(PanelError::DuplicateAnalyte {
                analyte,
                key: key.clone(),
            });
        }

        let Some(reading) = reading else {
            continue;
        };

        let value = canonical_value(analyte, reading, raw.units)?;
        check_plausible(analyte, value)?;
        panel.set(analyte, value);
    }

    if let Some(age) = raw.age {
        if !age.is_finite() || !AGE_RANGE.contains(age) {
            return Err(PanelError::InvalidContext {
                field: "age",
                reason: format!("{age} is outside {AGE_RANGE} years"),
            });
        }
        panel.age_years = Some(age);
    }

    panel.chronicity = raw.chronicity;
    panel.clinical_info = raw
        .clinical_info
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    debug!(
        analytes = panel.readings().len(),
        units = %raw.units,
        "built value panel"
    );

    Ok(panel)
}

fn canonical_value(analyte: Analyte, reading: &RawReading, units: UnitSystem) -> PanelResult<f64> {
    let value = match reading {
        RawReading::Number(v) => {
            if analyte.quantity() == crate::Quantity::GasTension {
                units.gas_tension_to_kpa(*v)
            } else {
                *v
            }
        }
        RawReading::Text(text) => parse_reading(text, analyte, units)
            .map_err(|source| PanelError::Unit { analyte, source })?,
    };

    if !value.is_finite() {
        return Err(PanelError::NonFinite { analyte, value });
    }
    Ok(value)
}

fn check_plausible(analyte: Analyte, value: f64) -> PanelResult<()> {
    let bounds = analyte.plausible_range();
    if value < bounds.low {
        return Err(PanelError::OutOfBounds {
            analyte,
            value,
            bound: BoundViolation::Lower(bounds.low),
        });
    }
    if value > bounds.high {
        return Err(PanelError::OutOfBounds {
            analyte,
            value,
            bound: BoundViolation::Upper(bounds.high),
        });
    }
    Ok(())
}
