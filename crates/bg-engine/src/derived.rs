//! Derived quantities: anion gap, albumin correction, expected compensation,
//! A-a gradient and the Henderson-Hasselbalch consistency check.
//!
//! Each quantity is computed independently. A missing input marks only that
//! quantity as [`Derived::NotComputable`]; it never prevents the others.

use std::fmt;

use bg_core::constants::{
    CARBONIC_PKA, CO2_SOLUBILITY_MMOL_PER_KPA, INSPIRED_PO2_KPA, REFERENCE_HCO3,
    REFERENCE_PCO2_MMHG, RESPIRATORY_QUOTIENT_FACTOR,
};
use bg_core::{Band, RangeFlag, Tolerances, kpa_to_mmhg, mmhg_to_kpa, nearly_equal};
use bg_panel::{Analyte, Chronicity, ValuePanel};
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::disorder::PrimaryDisorder;

/// Why a quantity or classifier step could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unavailable {
    pub subject: &'static str,
    pub missing: Vec<Analyte>,
    pub reason: String,
}

impl Unavailable {
    pub fn missing(subject: &'static str, missing: Vec<Analyte>) -> Self {
        let names: Vec<&str> = missing.iter().map(|a| a.key()).collect();
        Self {
            subject,
            reason: format!("requires {}", names.join(", ")),
            missing,
        }
    }

    pub fn because(subject: &'static str, reason: impl Into<String>) -> Self {
        Self {
            subject,
            missing: Vec::new(),
            reason: reason.into(),
        }
    }

    /// A step blocked by an earlier one inherits its missing analytes.
    pub fn blocked_by(subject: &'static str, upstream: &Unavailable) -> Self {
        Self {
            subject,
            missing: upstream.missing.clone(),
            reason: format!("{} undetermined", upstream.subject),
        }
    }

    /// False when every input was present but the values could not be
    /// reconciled.
    pub fn lacks_data(&self) -> bool {
        !self.missing.is_empty()
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.reason)
    }
}

/// A quantity that may not be computable from the panel at hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Derived<T> {
    Value(T),
    NotComputable(Unavailable),
}

impl<T> Derived<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotComputable(_) => None,
        }
    }

    pub fn unavailable(&self) -> Option<&Unavailable> {
        match self {
            Self::Value(_) => None,
            Self::NotComputable(u) => Some(u),
        }
    }

    pub fn is_computable(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Which anion gap value the classifier should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnionGapBasis {
    Raw,
    AlbuminCorrected,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrectedAnionGap {
    pub value: f64,
    pub raw: f64,
    pub albumin_g_l: f64,
    /// Amount added to the raw gap (negative when albumin is above reference).
    pub correction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveAnionGap {
    pub value: f64,
    pub basis: AnionGapBasis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AaGradient {
    /// Alveolar pO2 from the room-air approximation [kPa].
    pub alveolar_po2_kpa: f64,
    pub arterial_po2_kpa: f64,
    pub gradient_kpa: f64,
    pub normal_band: Band,
    /// True when the upper limit was widened for the patient's age.
    pub age_adjusted: bool,
    pub flag: RangeFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HendersonCheck {
    pub calculated_ph: f64,
    pub measured_ph: f64,
    pub difference: f64,
    pub consistent: bool,
}

/// Compensation rule selected for the primary disorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationFormula {
    /// pCO2 = 1.5 x HCO3 + 8 (mmHg)
    Winters,
    /// pCO2 = 0.7 x HCO3 + 21 (mmHg)
    MetabolicAlkalosis,
    /// HCO3 rises 1 per 10 mmHg pCO2
    AcuteRespiratoryAcidosis,
    /// HCO3 rises 3.5 per 10 mmHg pCO2
    ChronicRespiratoryAcidosis,
    /// HCO3 falls 2 per 10 mmHg pCO2
    AcuteRespiratoryAlkalosis,
    /// HCO3 falls 5 per 10 mmHg pCO2
    ChronicRespiratoryAlkalosis,
}

impl CompensationFormula {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Winters => "Winter's formula: pCO2 = (1.5 x HCO3 + 8) / 7.5 kPa",
            Self::MetabolicAlkalosis => "pCO2 = (0.7 x HCO3 + 21) / 7.5 kPa",
            Self::AcuteRespiratoryAcidosis => "HCO3 = 24 + 1 per 1.33 kPa rise in pCO2 (acute)",
            Self::ChronicRespiratoryAcidosis => {
                "HCO3 = 24 + 3.5 per 1.33 kPa rise in pCO2 (chronic)"
            }
            Self::AcuteRespiratoryAlkalosis => "HCO3 = 24 - 2 per 1.33 kPa fall in pCO2 (acute)",
            Self::ChronicRespiratoryAlkalosis => {
                "HCO3 = 24 - 5 per 1.33 kPa fall in pCO2 (chronic)"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedCompensation {
    pub formula: CompensationFormula,
    /// The variable that should move to compensate (pCO2 or HCO3).
    pub counter: Analyte,
    /// Expected value in the counter-variable's canonical unit.
    pub expected: f64,
    /// `expected` plus or minus the configured tolerance.
    pub window: Band,
    /// Set when no chronicity hint was given and the acute or chronic rule
    /// was picked as the one nearer the measured HCO3.
    pub chronicity_inferred: bool,
}

impl ExpectedCompensation {
    pub fn unit(&self) -> &'static str {
        self.counter.unit_label()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedQuantities {
    pub anion_gap: Derived<f64>,
    pub corrected_anion_gap: Derived<CorrectedAnionGap>,
    pub expected_compensation: Derived<ExpectedCompensation>,
    pub aa_gradient: Derived<AaGradient>,
    pub henderson_hasselbalch: Derived<HendersonCheck>,
}

impl DerivedQuantities {
    /// Compute every quantity that does not depend on classification.
    ///
    /// `expected_compensation` starts as not computable; see
    /// [`DerivedQuantities::with_expected_compensation`].
    pub fn compute(panel: &ValuePanel, cfg: &EngineConfig) -> Self {
        let anion_gap = anion_gap(panel);
        let corrected_anion_gap = corrected_anion_gap(panel, &anion_gap, cfg);
        let aa_gradient = aa_gradient(panel, cfg);
        let henderson_hasselbalch = henderson_check(panel, cfg);

        debug!(
            anion_gap = ?anion_gap.value(),
            corrected = corrected_anion_gap.is_computable(),
            aa_gradient = ?aa_gradient.value().map(|g| g.gradient_kpa),
            "derived quantities computed"
        );

        Self {
            anion_gap,
            corrected_anion_gap,
            expected_compensation: Derived::NotComputable(Unavailable::because(
                "expected compensation",
                "primary disorder not classified",
            )),
            aa_gradient,
            henderson_hasselbalch,
        }
    }

    pub fn with_expected_compensation(
        mut self,
        panel: &ValuePanel,
        primary: Option<PrimaryDisorder>,
        cfg: &EngineConfig,
    ) -> Self {
        self.expected_compensation = match primary {
            Some(p) => expected_compensation(panel, p, cfg),
            None => Derived::NotComputable(Unavailable::because(
                "expected compensation",
                "primary disorder undetermined",
            )),
        };
        self
    }

    /// Albumin-corrected gap when available, otherwise the raw gap.
    pub fn effective_anion_gap(&self) -> Option<EffectiveAnionGap> {
        if let Some(c) = self.corrected_anion_gap.value() {
            return Some(EffectiveAnionGap {
                value: c.value,
                basis: AnionGapBasis::AlbuminCorrected,
            });
        }
        self.anion_gap.value().map(|&value| EffectiveAnionGap {
            value,
            basis: AnionGapBasis::Raw,
        })
    }
}

/// `Na - (Cl + HCO3)`.
pub fn anion_gap(panel: &ValuePanel) -> Derived<f64> {
    match (panel.sodium(), panel.chloride(), panel.hco3()) {
        (Some(na), Some(cl), Some(hco3)) => Derived::Value(na - (cl + hco3)),
        _ => Derived::NotComputable(Unavailable::missing(
            "anion gap",
            panel.missing(&[Analyte::Sodium, Analyte::Chloride, Analyte::Hco3]),
        )),
    }
}

/// `AG + ((40 - albumin) / 10) * 2.5` with reference and factor from config.
pub fn corrected_anion_gap(
    panel: &ValuePanel,
    anion_gap: &Derived<f64>,
    cfg: &EngineConfig,
) -> Derived<CorrectedAnionGap> {
    let Some(&raw) = anion_gap.value() else {
        let mut missing = panel.missing(&[Analyte::Sodium, Analyte::Chloride, Analyte::Hco3]);
        missing.extend(panel.missing(&[Analyte::Albumin]));
        return Derived::NotComputable(Unavailable::missing("corrected anion gap", missing));
    };
    let Some(albumin) = panel.albumin() else {
        return Derived::NotComputable(Unavailable::missing(
            "corrected anion gap",
            vec![Analyte::Albumin],
        ));
    };

    let correction =
        (cfg.reference_albumin_g_l - albumin) / 10.0 * cfg.albumin_correction_per_10g;
    Derived::Value(CorrectedAnionGap {
        value: raw + correction,
        raw,
        albumin_g_l: albumin,
        correction,
    })
}

/// Room-air alveolar gas equation: `PAO2 = 20 - 1.2 x PaCO2`, gradient `PAO2 - PaO2`.
pub fn aa_gradient(panel: &ValuePanel, cfg: &EngineConfig) -> Derived<AaGradient> {
    let (Some(po2), Some(pco2)) = (panel.po2_kpa(), panel.pco2_kpa()) else {
        return Derived::NotComputable(Unavailable::missing(
            "A-a gradient",
            panel.missing(&[Analyte::PO2, Analyte::PCo2]),
        ));
    };

    let alveolar = INSPIRED_PO2_KPA - pco2 * RESPIRATORY_QUOTIENT_FACTOR;
    let gradient = alveolar - po2;

    let mut band = cfg.aa_gradient_band;
    let mut age_adjusted = false;
    if let Some(age) = panel.age_years() {
        // Age/4 + 4 mmHg, only ever widening the configured band
        let age_upper = mmhg_to_kpa(age / 4.0 + 4.0);
        if age_upper > band.high {
            band.high = age_upper;
            age_adjusted = true;
        }
    }

    Derived::Value(AaGradient {
        alveolar_po2_kpa: alveolar,
        arterial_po2_kpa: po2,
        gradient_kpa: gradient,
        normal_band: band,
        age_adjusted,
        flag: band.flag(gradient),
    })
}

/// `pH = 6.1 + log10(HCO3 / (0.23 x pCO2))`, compared with the measured pH.
pub fn henderson_check(panel: &ValuePanel, cfg: &EngineConfig) -> Derived<HendersonCheck> {
    let (Some(ph), Some(pco2), Some(hco3)) = (panel.ph(), panel.pco2_kpa(), panel.hco3()) else {
        return Derived::NotComputable(Unavailable::missing(
            "Henderson-Hasselbalch check",
            panel.missing(&[Analyte::Ph, Analyte::PCo2, Analyte::Hco3]),
        ));
    };

    let calculated = CARBONIC_PKA + (hco3 / (CO2_SOLUBILITY_MMOL_PER_KPA * pco2)).log10();
    let tol = Tolerances {
        abs: cfg.consistency_tolerance_ph,
        rel: 0.0,
    };
    Derived::Value(HendersonCheck {
        calculated_ph: calculated,
        measured_ph: ph,
        difference: ph - calculated,
        consistent: nearly_equal(ph, calculated, tol),
    })
}

/// Expected value of the compensating variable for `primary`.
///
/// Metabolic disorders predict pCO2 from HCO3; respiratory disorders predict
/// HCO3 from pCO2. All mmHg-based rules convert through the single
/// [`MMHG_PER_KPA`](bg_core::MMHG_PER_KPA) divisor.
pub fn expected_compensation(
    panel: &ValuePanel,
    primary: PrimaryDisorder,
    cfg: &EngineConfig,
) -> Derived<ExpectedCompensation> {
    const SUBJECT: &str = "expected compensation";

    match primary {
        PrimaryDisorder::Normal => Derived::NotComputable(Unavailable::because(
            SUBJECT,
            "no primary disorder, no compensation expected",
        )),
        PrimaryDisorder::MetabolicAcidosis | PrimaryDisorder::MetabolicAlkalosis => {
            let Some(hco3) = panel.hco3() else {
                return Derived::NotComputable(Unavailable::missing(SUBJECT, vec![Analyte::Hco3]));
            };
            let (formula, expected_mmhg) = if primary == PrimaryDisorder::MetabolicAcidosis {
                (CompensationFormula::Winters, 1.5 * hco3 + 8.0)
            } else {
                (CompensationFormula::MetabolicAlkalosis, 0.7 * hco3 + 21.0)
            };
            let expected = mmhg_to_kpa(expected_mmhg);
            Derived::Value(ExpectedCompensation {
                formula,
                counter: Analyte::PCo2,
                expected,
                window: Band::new(expected, expected).widened(cfg.metabolic_pco2_tolerance_kpa),
                chronicity_inferred: false,
            })
        }
        PrimaryDisorder::RespiratoryAcidosis | PrimaryDisorder::RespiratoryAlkalosis => {
            let Some(pco2) = panel.pco2_kpa() else {
                return Derived::NotComputable(Unavailable::missing(SUBJECT, vec![Analyte::PCo2]));
            };
            let (chronicity, chronicity_inferred) = match panel.chronicity() {
                Some(chronicity) => (chronicity, false),
                None => (nearer_chronicity(primary, pco2, panel.hco3()), true),
            };
            let expected = respiratory_expected_hco3(primary, pco2, chronicity);
            Derived::Value(ExpectedCompensation {
                formula: respiratory_formula(primary, chronicity),
                counter: Analyte::Hco3,
                expected,
                window: Band::new(expected, expected).widened(cfg.respiratory_hco3_tolerance),
                chronicity_inferred,
            })
        }
    }
}

/// Expected HCO3 for a respiratory disorder at `pco2_kpa` under one chronicity.
pub fn respiratory_expected_hco3(
    primary: PrimaryDisorder,
    pco2_kpa: f64,
    chronicity: Chronicity,
) -> f64 {
    let pco2_mmhg = kpa_to_mmhg(pco2_kpa);
    let per_10 = (pco2_mmhg - REFERENCE_PCO2_MMHG) / 10.0;
    let slope = match (primary, chronicity) {
        (PrimaryDisorder::RespiratoryAlkalosis, Chronicity::Acute) => 2.0,
        (PrimaryDisorder::RespiratoryAlkalosis, Chronicity::Chronic) => 5.0,
        (_, Chronicity::Acute) => 1.0,
        (_, Chronicity::Chronic) => 3.5,
    };
    REFERENCE_HCO3 + slope * per_10
}

/// Chronicity whose expected HCO3 lies nearer the measured value. Acute
/// when HCO3 is absent or equidistant.
fn nearer_chronicity(primary: PrimaryDisorder, pco2_kpa: f64, hco3: Option<f64>) -> Chronicity {
    let Some(hco3) = hco3 else {
        return Chronicity::Acute;
    };
    let acute = respiratory_expected_hco3(primary, pco2_kpa, Chronicity::Acute);
    let chronic = respiratory_expected_hco3(primary, pco2_kpa, Chronicity::Chronic);
    if (hco3 - chronic).abs() < (hco3 - acute).abs() {
        Chronicity::Chronic
    } else {
        Chronicity::Acute
    }
}

fn respiratory_formula(primary: PrimaryDisorder, chronicity: Chronicity) -> CompensationFormula {
    match (primary, chronicity) {
        (PrimaryDisorder::RespiratoryAlkalosis, Chronicity::Acute) => {
            CompensationFormula::AcuteRespiratoryAlkalosis
        }
        (PrimaryDisorder::RespiratoryAlkalosis, Chronicity::Chronic) => {
            CompensationFormula::ChronicRespiratoryAlkalosis
        }
        (_, Chronicity::Acute) => CompensationFormula::AcuteRespiratoryAcidosis,
        (_, Chronicity::Chronic) => CompensationFormula::ChronicRespiratoryAcidosis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_panel::{RawPanel, UnitSystem, validate_and_build_panel};

    fn panel(raw: RawPanel) -> ValuePanel {
        validate_and_build_panel(&raw).unwrap()
    }

    fn kpa() -> RawPanel {
        RawPanel::new(UnitSystem::Kpa)
    }

    #[test]
    fn anion_gap_requires_all_three() {
        let p = panel(kpa().with("Na", 140.0).with("Cl", 110.0).with("HCO3", 15.0));
        assert_eq!(anion_gap(&p), Derived::Value(15.0));

        let p = panel(kpa().with("Na", 140.0).with("HCO3", 15.0));
        let derived = anion_gap(&p);
        let why = derived.unavailable().unwrap();
        assert_eq!(why.missing, vec![Analyte::Chloride]);
        assert!(why.reason.contains("Cl"));
    }

    #[test]
    fn albumin_correction_adds_for_hypoalbuminaemia() {
        // Na 140, Cl 104, HCO3 26 -> AG 10
        let p = panel(
            kpa()
                .with("Na", 140.0)
                .with("Cl", 104.0)
                .with("HCO3", 26.0)
                .with("albumin", 20.0),
        );
        let cfg = EngineConfig::default();
        let ag = anion_gap(&p);
        let corrected = corrected_anion_gap(&p, &ag, &cfg);
        let c = corrected.value().unwrap();
        assert_eq!(c.raw, 10.0);
        assert_eq!(c.correction, 5.0);
        assert_eq!(c.value, 15.0);
    }

    #[test]
    fn corrected_gap_reports_missing_albumin() {
        let p = panel(kpa().with("Na", 140.0).with("Cl", 104.0).with("HCO3", 26.0));
        let cfg = EngineConfig::default();
        let derived = DerivedQuantities::compute(&p, &cfg);
        assert_eq!(
            derived.corrected_anion_gap.unavailable().unwrap().missing,
            vec![Analyte::Albumin]
        );
        assert_eq!(
            derived.effective_anion_gap(),
            Some(EffectiveAnionGap {
                value: 10.0,
                basis: AnionGapBasis::Raw
            })
        );
    }

    #[test]
    fn aa_gradient_room_air() {
        let p = panel(kpa().with("pO2", 8.0).with("pCO2", 6.0));
        let g = aa_gradient(&p, &EngineConfig::default());
        let g = g.value().unwrap();
        assert!((g.alveolar_po2_kpa - 12.8).abs() < 1e-9);
        assert!((g.gradient_kpa - 4.8).abs() < 1e-9);
        assert_eq!(g.flag, RangeFlag::High);
        assert!(!g.age_adjusted);
    }

    #[test]
    fn aa_gradient_widens_with_age_only_upwards() {
        let cfg = EngineConfig::default();
        let young = panel(kpa().with("pO2", 8.0).with("pCO2", 6.0).with_age(30.0));
        assert!(!aa_gradient(&young, &cfg).value().unwrap().age_adjusted);

        // 120 years: (30 + 4) / 7.5 = 4.53 kPa
        let old = panel(kpa().with("pO2", 8.4).with("pCO2", 6.0).with_age(120.0));
        let g = aa_gradient(&old, &cfg);
        let g = g.value().unwrap();
        assert!(g.age_adjusted);
        assert!((g.normal_band.high - 34.0 / 7.5).abs() < 1e-9);
        assert_eq!(g.flag, RangeFlag::Normal);
    }

    #[test]
    fn henderson_check_flags_inconsistent_panels() {
        let cfg = EngineConfig::default();
        let good = panel(kpa().with("pH", 7.40).with("pCO2", 5.3).with("HCO3", 24.0));
        assert!(henderson_check(&good, &cfg).value().unwrap().consistent);

        let bad = panel(kpa().with("pH", 7.60).with("pCO2", 5.3).with("HCO3", 24.0));
        assert!(!henderson_check(&bad, &cfg).value().unwrap().consistent);
    }

    #[test]
    fn winters_formula_in_kpa() {
        let p = panel(kpa().with("HCO3", 12.0).with("pCO2", 3.5));
        let cfg = EngineConfig::default();
        let exp = expected_compensation(&p, PrimaryDisorder::MetabolicAcidosis, &cfg);
        let exp = exp.value().unwrap();
        assert_eq!(exp.formula, CompensationFormula::Winters);
        assert_eq!(exp.counter, Analyte::PCo2);
        // (1.5 * 12 + 8) / 7.5 = 26 / 7.5
        assert!((exp.expected - 26.0 / 7.5).abs() < 1e-12);
        assert!((exp.window.high - 28.0 / 7.5).abs() < 1e-12);
        assert!((exp.window.low - 24.0 / 7.5).abs() < 1e-12);
    }

    #[test]
    fn respiratory_window_depends_on_chronicity() {
        let cfg = EngineConfig::default();
        // pCO2 60 mmHg = 8 kPa: acute expectation 26, chronic 31
        let near_acute = panel(kpa().with("pCO2", 8.0).with("HCO3", 25.0));
        let exp = expected_compensation(&near_acute, PrimaryDisorder::RespiratoryAcidosis, &cfg);
        let exp = exp.value().unwrap();
        assert_eq!(exp.formula, CompensationFormula::AcuteRespiratoryAcidosis);
        assert!(exp.chronicity_inferred);
        assert!((exp.expected - 26.0).abs() < 1e-9);
        assert!((exp.window.low - 24.0).abs() < 1e-9);
        assert!((exp.window.high - 28.0).abs() < 1e-9);

        let near_chronic = panel(kpa().with("pCO2", 8.0).with("HCO3", 30.0));
        let exp = expected_compensation(&near_chronic, PrimaryDisorder::RespiratoryAcidosis, &cfg);
        let exp = exp.value().unwrap();
        assert_eq!(exp.formula, CompensationFormula::ChronicRespiratoryAcidosis);
        assert!((exp.expected - 31.0).abs() < 1e-9);

        let no_hco3 = panel(kpa().with("pCO2", 8.0));
        let exp = expected_compensation(&no_hco3, PrimaryDisorder::RespiratoryAcidosis, &cfg);
        assert_eq!(
            exp.value().unwrap().formula,
            CompensationFormula::AcuteRespiratoryAcidosis
        );

        let chronic = panel(kpa().with("pCO2", 8.0).with_chronicity(Chronicity::Chronic));
        let exp = expected_compensation(&chronic, PrimaryDisorder::RespiratoryAcidosis, &cfg);
        let exp = exp.value().unwrap();
        assert_eq!(exp.formula, CompensationFormula::ChronicRespiratoryAcidosis);
        assert!(!exp.chronicity_inferred);
        assert!((exp.expected - 31.0).abs() < 1e-9);
    }

    #[test]
    fn respiratory_alkalosis_lowers_expected_hco3() {
        // pCO2 30 mmHg = 4 kPa
        let primary = PrimaryDisorder::RespiratoryAlkalosis;
        let acute = respiratory_expected_hco3(primary, 4.0, Chronicity::Acute);
        let chronic = respiratory_expected_hco3(primary, 4.0, Chronicity::Chronic);
        assert!((acute - 22.0).abs() < 1e-9);
        assert!((chronic - 19.0).abs() < 1e-9);
    }

    #[test]
    fn missing_driver_marks_compensation_not_computable() {
        let p = panel(kpa().with("pCO2", 3.5));
        let cfg = EngineConfig::default();
        let exp = expected_compensation(&p, PrimaryDisorder::MetabolicAcidosis, &cfg);
        assert_eq!(exp.unavailable().unwrap().missing, vec![Analyte::Hco3]);
    }

    #[test]
    fn missing_inputs_never_block_other_quantities() {
        let p = panel(kpa().with("pO2", 9.0).with("pCO2", 5.0));
        let d = DerivedQuantities::compute(&p, &EngineConfig::default());
        assert!(!d.anion_gap.is_computable());
        assert!(!d.corrected_anion_gap.is_computable());
        assert!(!d.henderson_hasselbalch.is_computable());
        assert!(d.aa_gradient.is_computable());
    }
}
