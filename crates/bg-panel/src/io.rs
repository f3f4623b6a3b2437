//! Loading raw panels from JSON or YAML.
//!
//! Two shapes are accepted: the full [`RawPanel`] document, or a flat
//! analyte mapping (`{"pH": 7.35, "pCO2": 5.5, ...}`) which is taken to be
//! in kPa.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PanelError, PanelResult};
use crate::raw::{RawPanel, RawReading};
use crate::units::UnitSystem;

#[derive(Deserialize)]
#[serde(untagged)]
enum PanelDocument {
    Full(RawPanel),
    Flat(BTreeMap<String, Option<RawReading>>),
}

impl From<PanelDocument> for RawPanel {
    fn from(doc: PanelDocument) -> Self {
        match doc {
            PanelDocument::Full(raw) => raw,
            PanelDocument::Flat(values) => RawPanel::from_values(UnitSystem::Kpa, values),
        }
    }
}

pub fn from_json_str(content: &str) -> PanelResult<RawPanel> {
    let doc: PanelDocument = serde_json::from_str(content)?;
    Ok(doc.into())
}

pub fn from_yaml_str(content: &str) -> PanelResult<RawPanel> {
    let doc: PanelDocument = serde_yaml::from_str(content)?;
    Ok(doc.into())
}

pub fn load_json(path: &Path) -> PanelResult<RawPanel> {
    let content = std::fs::read_to_string(path)?;
    from_json_str(&content)
}

pub fn load_yaml(path: &Path) -> PanelResult<RawPanel> {
    let content = std::fs::read_to_string(path)?;
    from_yaml_str(&content)
}

/// Load a raw panel, picking the format from the file extension.
pub fn load_path(path: &Path) -> PanelResult<RawPanel> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") => load_json(path),
        Some("yaml") | Some("yml") => load_yaml(path),
        _ => Err(PanelError::UnsupportedFile {
            path: path.display().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_json_mapping_is_kpa() {
        let raw = from_json_str(r#"{"pH": 7.35, "pCO2": 5.5, "albumin": null}"#).unwrap();
        assert_eq!(raw.units, UnitSystem::Kpa);
        assert_eq!(raw.values.len(), 3);
        assert_eq!(raw.values["albumin"], None);
    }

    #[test]
    fn full_yaml_document() {
        let yaml = r#"
units: mmhg
age: 67
chronicity: chronic
clinical_info: COPD
values:
  pH: 7.34
  pCO2: 60
  HCO3: "31 mmol/L"
"#;
        let raw = from_yaml_str(yaml).unwrap();
        assert_eq!(raw.units, UnitSystem::Mmhg);
        assert_eq!(raw.age, Some(67.0));
        assert_eq!(raw.values["pCO2"], Some(RawReading::Number(60.0)));
        assert_eq!(raw.values["HCO3"], Some(RawReading::Text("31 mmol/L".into())));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_path(Path::new("panel.txt")).unwrap_err();
        assert!(matches!(err, PanelError::UnsupportedFile { .. }));
    }
}
