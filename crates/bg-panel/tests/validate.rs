//! Integration tests for the panel boundary.

use bg_core::RangeFlag;
use bg_panel::{
    Analyte, BoundViolation, PanelError, RawPanel, UnitSystem, from_json_str,
    validate_and_build_panel,
};

#[test]
fn extraction_style_mapping_validates() {
    // Shape produced by report extraction: flat, kPa, nulls for missing values
    let raw = from_json_str(
        r#"{
            "pH": 7.35,
            "pCO2": 5.5,
            "pO2": 12.0,
            "HCO3": 24,
            "base_excess": -1,
            "Na": 140,
            "Cl": 102,
            "K": 4.0,
            "albumin": null
        }"#,
    )
    .unwrap();

    let panel = validate_and_build_panel(&raw).expect("panel should validate");
    assert_eq!(panel.readings().len(), 8);
    assert_eq!(panel.albumin(), None);
    assert!(panel.readings().iter().all(|r| r.flag == RangeFlag::Normal));
}

#[test]
fn every_analyte_rejects_just_outside_its_limits() {
    for analyte in Analyte::ALL {
        let bounds = analyte.plausible_range();

        let below = RawPanel::new(UnitSystem::Kpa).with(analyte.key(), bounds.low - 0.01);
        match validate_and_build_panel(&below) {
            Err(PanelError::OutOfBounds { analyte: a, bound, .. }) => {
                assert_eq!(a, analyte);
                assert_eq!(bound, BoundViolation::Lower(bounds.low));
            }
            other => panic!("{analyte}: expected lower bound error, got {other:?}"),
        }

        let above = RawPanel::new(UnitSystem::Kpa).with(analyte.key(), bounds.high + 0.01);
        match validate_and_build_panel(&above) {
            Err(PanelError::OutOfBounds { analyte: a, bound, .. }) => {
                assert_eq!(a, analyte);
                assert_eq!(bound, BoundViolation::Upper(bounds.high));
            }
            other => panic!("{analyte}: expected upper bound error, got {other:?}"),
        }
    }
}

#[test]
fn out_of_bounds_is_never_clamped() {
    let raw = RawPanel::new(UnitSystem::Kpa)
        .with("pH", 7.30)
        .with("pCO2", 1.5);
    let err = validate_and_build_panel(&raw).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("pCO2"));
    assert!(msg.contains("2"));
}

#[test]
fn text_readings_with_mixed_units() {
    let raw = RawPanel::new(UnitSystem::Kpa)
        .with("PaCO2", "60 mmHg")
        .with("PaO2", "9.5 kPa")
        .with("Albumin", "2.8 g/dL")
        .with("H+", 0.0)
        .with_missing("K");
    // "H+" is not an analyte alias
    assert!(matches!(
        validate_and_build_panel(&raw),
        Err(PanelError::UnknownAnalyte { .. })
    ));

    let raw = RawPanel::new(UnitSystem::Kpa)
        .with("PaCO2", "60 mmHg")
        .with("PaO2", "9.5 kPa")
        .with("Albumin", "2.8 g/dL")
        .with("pH", "46 nmol/L");
    let panel = validate_and_build_panel(&raw).unwrap();
    assert!((panel.pco2_kpa().unwrap() - 8.0).abs() < 1e-12);
    assert_eq!(panel.po2_kpa(), Some(9.5));
    assert!((panel.albumin().unwrap() - 28.0).abs() < 1e-12);
    assert!((panel.ph().unwrap() - 7.337).abs() < 1e-3);
}

#[test]
fn unit_errors_name_the_analyte() {
    let raw = RawPanel::new(UnitSystem::Kpa).with("HCO3", "24 kPa");
    let err = validate_and_build_panel(&raw).unwrap_err();
    assert_eq!(err.analyte(), Some(Analyte::Hco3));
}
