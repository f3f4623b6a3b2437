//! Raw, unvalidated panel input as handed over by an external collaborator.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::units::UnitSystem;

/// One raw value: a bare number or text with an optional unit tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Number(f64),
    Text(String),
}

impl From<f64> for RawReading {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RawReading {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawReading {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Time course of a respiratory disturbance; selects the renal compensation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chronicity {
    Acute,
    Chronic,
}

impl fmt::Display for Chronicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acute => write!(f, "acute"),
            Self::Chronic => write!(f, "chronic"),
        }
    }
}

/// Unvalidated analysis request.
///
/// `values` maps analyte names (canonical keys or aliases) to optional
/// readings; `null` means "not measured".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPanel {
    #[serde(default)]
    pub units: UnitSystem,
    pub values: BTreeMap<String, Option<RawReading>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronicity: Option<Chronicity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_info: Option<String>,
}

impl RawPanel {
    pub fn new(units: UnitSystem) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    /// Wrap a flat analyte mapping, e.g. the JSON object returned by an
    /// extraction step.
    pub fn from_values(units: UnitSystem, values: BTreeMap<String, Option<RawReading>>) -> Self {
        Self {
            units,
            values,
            ..Self::default()
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawReading>) -> Self {
        self.values.insert(key.into(), Some(value.into()));
        self
    }

    /// Record an analyte as explicitly not measured.
    pub fn with_missing(mut self, key: impl Into<String>) -> Self {
        self.values.insert(key.into(), None);
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_chronicity(mut self, chronicity: Chronicity) -> Self {
        self.chronicity = Some(chronicity);
        self
    }

    pub fn with_clinical_info(mut self, info: impl Into<String>) -> Self {
        self.clinical_info = Some(info.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_deserialize_untagged() {
        let raw: RawPanel = serde_json::from_str(
            r#"{"units": "mmhg", "values": {"pH": 7.31, "pCO2": "60 mmHg", "K": null}}"#,
        )
        .unwrap();
        assert_eq!(raw.units, UnitSystem::Mmhg);
        assert_eq!(raw.values["pH"], Some(RawReading::Number(7.31)));
        assert_eq!(raw.values["pCO2"], Some(RawReading::Text("60 mmHg".into())));
        assert_eq!(raw.values["K"], None);
    }

    #[test]
    fn units_default_to_kpa() {
        let raw: RawPanel = serde_json::from_str(r#"{"values": {}}"#).unwrap();
        assert_eq!(raw.units, UnitSystem::Kpa);
        assert!(raw.chronicity.is_none());
    }

    #[test]
    fn unknown_top_level_fields_are_rejected() {
        let res: Result<RawPanel, _> = serde_json::from_str(r#"{"values": {}, "fio2": 0.4}"#);
        assert!(res.is_err());
    }
}
