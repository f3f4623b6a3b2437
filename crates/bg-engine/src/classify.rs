//! Rule-based acid-base classifier.
//!
//! Steps run in a fixed order: pH, primary disturbance, anion gap,
//! compensation, oxygenation. A step that lacks data yields
//! [`Assessment::InsufficientData`]; ambiguity never raises an error and is
//! resolved through the mixed-disorder flag instead.

use bg_core::constants::{REFERENCE_HCO3, reference_pco2_kpa};
use bg_core::{Band, RangeFlag};
use bg_panel::{Analyte, Chronicity, ValuePanel};
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::derived::{
    AaGradient, AnionGapBasis, Derived, DerivedQuantities, ExpectedCompensation, Unavailable,
    expected_compensation, respiratory_expected_hco3,
};
use crate::disorder::{
    AnionGapCategory, CompensationStatus, Direction, PhStatus, PrimaryDisorder, System,
};

/// pO2 below which hypoxaemia is respiratory failure [kPa].
const RESPIRATORY_FAILURE_PO2_KPA: f64 = 8.0;

/// Outcome of one classifier step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Assessment<T> {
    Assessed(T),
    InsufficientData(Unavailable),
}

impl<T> Assessment<T> {
    pub fn assessed(&self) -> Option<&T> {
        match self {
            Self::Assessed(v) => Some(v),
            Self::InsufficientData(_) => None,
        }
    }

    pub fn insufficient(&self) -> Option<&Unavailable> {
        match self {
            Self::Assessed(_) => None,
            Self::InsufficientData(u) => Some(u),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryAssessment {
    pub disorder: PrimaryDisorder,
    pub pco2_flag: Option<RangeFlag>,
    pub hco3_flag: Option<RangeFlag>,
    /// Second process read directly off the deviations: pCO2 and HCO3 both
    /// push pH the same way.
    pub concurrent: Option<PrimaryDisorder>,
    /// pCO2 and HCO3 both abnormal in opposing directions; left to the
    /// compensation step to decide between compensation and a mixed disorder.
    pub candidate_mixed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnionGapAssessment {
    pub category: AnionGapCategory,
    pub value: Option<f64>,
    pub basis: Option<AnionGapBasis>,
}

impl AnionGapAssessment {
    fn not_applicable() -> Self {
        Self {
            category: AnionGapCategory::NotApplicable,
            value: None,
            basis: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompensationAssessment {
    pub status: CompensationStatus,
    pub expected: Option<ExpectedCompensation>,
    /// Measured counter-variable in canonical units.
    pub measured: Option<f64>,
    /// Additional process implied when the counter-variable misses its window.
    pub implied: Option<PrimaryDisorder>,
    /// Whether the miss indicates a second primary disorder.
    pub indicates_mixed: bool,
    /// HCO3 sits between the acute and chronic expectations of a
    /// respiratory disorder that is not known to be acute.
    pub evolving: bool,
}

impl CompensationAssessment {
    fn none_expected() -> Self {
        Self {
            status: CompensationStatus::NoneExpected,
            expected: None,
            measured: None,
            implied: None,
            indicates_mixed: false,
            evolving: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RespiratoryFailure {
    /// Hypoxaemia with normal or low pCO2.
    Type1,
    /// Hypoxaemia with raised pCO2.
    Type2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OxygenationAssessment {
    pub po2_kpa: f64,
    pub flag: RangeFlag,
    pub respiratory_failure: Option<RespiratoryFailure>,
    pub aa_gradient: Option<AaGradient>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixedDisorder {
    pub present: bool,
    /// Every process identified, primary first.
    pub disorders: Vec<PrimaryDisorder>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub ph_status: Assessment<PhStatus>,
    pub primary: Assessment<PrimaryAssessment>,
    pub anion_gap: Assessment<AnionGapAssessment>,
    pub compensation: Assessment<CompensationAssessment>,
    pub mixed_disorder: MixedDisorder,
    pub oxygenation: Assessment<OxygenationAssessment>,
}

impl ClassificationResult {
    pub fn primary_disorder(&self) -> Option<PrimaryDisorder> {
        self.primary.assessed().map(|p| p.disorder)
    }

    pub fn anion_gap_category(&self) -> Option<AnionGapCategory> {
        self.anion_gap.assessed().map(|a| a.category)
    }

    pub fn compensation_status(&self) -> Option<CompensationStatus> {
        self.compensation.assessed().map(|c| c.status)
    }
}

/// Run steps 1-5 over a validated panel and its derived quantities.
pub fn classify(
    panel: &ValuePanel,
    derived: &DerivedQuantities,
    cfg: &EngineConfig,
) -> ClassificationResult {
    let ph_status = ph_step(panel);
    debug!(?ph_status, "step 1: pH");

    let primary = primary_step(panel, &ph_status);
    debug!(primary = ?primary.assessed().map(|p| p.disorder), "step 2: primary disturbance");

    let anion_gap = anion_gap_step(&primary, derived, cfg);
    debug!(category = ?anion_gap.assessed().map(|a| a.category), "step 3: anion gap");

    let compensation = compensation_step(panel, &primary, cfg);
    debug!(status = ?compensation.assessed().map(|c| c.status), "step 4: compensation");

    let mixed_disorder = mixed_disorder(&primary, &compensation);

    let oxygenation = oxygenation_step(panel, derived);
    debug!(po2_flag = ?oxygenation.assessed().map(|o| o.flag), "step 5: oxygenation");

    ClassificationResult {
        ph_status,
        primary,
        anion_gap,
        compensation,
        mixed_disorder,
        oxygenation,
    }
}

fn ph_step(panel: &ValuePanel) -> Assessment<PhStatus> {
    let Some(ph) = panel.ph() else {
        return Assessment::InsufficientData(Unavailable::missing("pH", vec![Analyte::Ph]));
    };
    let status = match Analyte::Ph.normal_range().flag(ph) {
        RangeFlag::Low => PhStatus::Acidaemia,
        RangeFlag::Normal => PhStatus::Normal,
        RangeFlag::High => PhStatus::Alkalaemia,
    };
    Assessment::Assessed(status)
}

/// Signed push of one system on pH; `magnitude` is the fractional deviation
/// from the reference value.
#[derive(Debug, Clone, Copy)]
struct Push {
    system: System,
    /// Set only when the variable is outside its normal range.
    abnormal: Option<Direction>,
    /// Direction relative to the reference value, even inside the normal range.
    trend: Option<Direction>,
    magnitude: f64,
}

fn respiratory_push(pco2: f64) -> Push {
    let reference = reference_pco2_kpa();
    let abnormal = match Analyte::PCo2.normal_range().flag(pco2) {
        RangeFlag::High => Some(Direction::Acidosis),
        RangeFlag::Low => Some(Direction::Alkalosis),
        RangeFlag::Normal => None,
    };
    Push {
        system: System::Respiratory,
        abnormal,
        trend: trend(pco2 - reference, Direction::Acidosis),
        magnitude: (pco2 - reference).abs() / reference,
    }
}

fn metabolic_push(hco3: f64) -> Push {
    let abnormal = match Analyte::Hco3.normal_range().flag(hco3) {
        RangeFlag::Low => Some(Direction::Acidosis),
        RangeFlag::High => Some(Direction::Alkalosis),
        RangeFlag::Normal => None,
    };
    Push {
        system: System::Metabolic,
        abnormal,
        trend: trend(hco3 - REFERENCE_HCO3, Direction::Alkalosis),
        magnitude: (hco3 - REFERENCE_HCO3).abs() / REFERENCE_HCO3,
    }
}

fn trend(delta: f64, rising: Direction) -> Option<Direction> {
    if delta > 0.0 {
        Some(rising)
    } else if delta < 0.0 {
        Some(rising.opposite())
    } else {
        None
    }
}

fn dominant<'a>(a: &'a Push, b: &'a Push) -> (&'a Push, &'a Push) {
    if b.magnitude > a.magnitude {
        (b, a)
    } else {
        (a, b)
    }
}

fn primary_step(
    panel: &ValuePanel,
    ph_status: &Assessment<PhStatus>,
) -> Assessment<PrimaryAssessment> {
    const SUBJECT: &str = "primary disturbance";

    let (Assessment::Assessed(ph_status), Some(ph)) = (ph_status, panel.ph()) else {
        return Assessment::InsufficientData(Unavailable::missing(SUBJECT, vec![Analyte::Ph]));
    };
    let pushes: Vec<Push> = [
        panel.pco2_kpa().map(respiratory_push),
        panel.hco3().map(metabolic_push),
    ]
    .into_iter()
    .flatten()
    .collect();
    if pushes.is_empty() {
        return Assessment::InsufficientData(Unavailable::missing(
            SUBJECT,
            vec![Analyte::PCo2, Analyte::Hco3],
        ));
    }

    let mut result = PrimaryAssessment {
        disorder: PrimaryDisorder::Normal,
        pco2_flag: panel.flag(Analyte::PCo2),
        hco3_flag: panel.flag(Analyte::Hco3),
        concurrent: None,
        candidate_mixed: false,
    };

    let ph_direction = match ph_status {
        PhStatus::Acidaemia => Some(Direction::Acidosis),
        PhStatus::Alkalaemia => Some(Direction::Alkalosis),
        PhStatus::Normal => None,
    };

    let abnormal: Vec<&Push> = pushes.iter().filter(|p| p.abnormal.is_some()).collect();

    match ph_direction {
        Some(direction) => {
            let matching: Vec<&Push> = abnormal
                .iter()
                .copied()
                .filter(|p| p.abnormal == Some(direction))
                .collect();
            match matching.as_slice() {
                [only] => {
                    result.disorder = PrimaryDisorder::from_parts(only.system, direction);
                    result.candidate_mixed = abnormal
                        .iter()
                        .any(|p| p.abnormal == Some(direction.opposite()));
                }
                [a, b] => {
                    let (main, other) = dominant(a, b);
                    result.disorder = PrimaryDisorder::from_parts(main.system, direction);
                    result.concurrent = Some(PrimaryDisorder::from_parts(other.system, direction));
                }
                _ => {
                    // Nothing outside its range explains the pH; fall back to
                    // the larger in-range trend in the pH direction.
                    let Some(main) = pushes
                        .iter()
                        .filter(|p| p.trend == Some(direction))
                        .max_by(|a, b| a.magnitude.total_cmp(&b.magnitude))
                    else {
                        return Assessment::InsufficientData(Unavailable::because(
                            SUBJECT,
                            format!(
                                "inconsistent values: neither pCO2 nor HCO3 deviates towards \
                                 {ph_status}; check the Henderson-Hasselbalch result and the sample"
                            ),
                        ));
                    };
                    result.disorder = PrimaryDisorder::from_parts(main.system, direction);
                }
            }
        }
        None => match abnormal.as_slice() {
            [] => {}
            [only] => {
                if let Some(direction) = only.abnormal {
                    result.disorder = PrimaryDisorder::from_parts(only.system, direction);
                }
            }
            [a, b] => {
                let (main, other) = dominant(a, b);
                if a.abnormal == b.abnormal {
                    if let Some(direction) = main.abnormal {
                        result.disorder = PrimaryDisorder::from_parts(main.system, direction);
                        result.concurrent =
                            Some(PrimaryDisorder::from_parts(other.system, direction));
                    }
                } else {
                    // Opposing deviations with a normal pH: the side of 7.40
                    // the pH sits on names the primary process.
                    let midpoint = Analyte::Ph.normal_range().midpoint();
                    let side = trend(ph - midpoint, Direction::Alkalosis);
                    let chosen = match side {
                        Some(side) => abnormal
                            .iter()
                            .copied()
                            .find(|p| p.abnormal == Some(side))
                            .unwrap_or(main),
                        None => main,
                    };
                    if let Some(direction) = chosen.abnormal {
                        result.disorder = PrimaryDisorder::from_parts(chosen.system, direction);
                    }
                    result.candidate_mixed = true;
                }
            }
            _ => {}
        },
    }

    Assessment::Assessed(result)
}

fn anion_gap_step(
    primary: &Assessment<PrimaryAssessment>,
    derived: &DerivedQuantities,
    cfg: &EngineConfig,
) -> Assessment<AnionGapAssessment> {
    const SUBJECT: &str = "anion gap";

    let primary = match primary {
        Assessment::Assessed(primary) => primary,
        Assessment::InsufficientData(why) => {
            return Assessment::InsufficientData(Unavailable::blocked_by(SUBJECT, why));
        }
    };
    if primary.disorder != PrimaryDisorder::MetabolicAcidosis {
        return Assessment::Assessed(AnionGapAssessment::not_applicable());
    }

    let Some(gap) = derived.effective_anion_gap() else {
        let missing = derived
            .anion_gap
            .unavailable()
            .map(|u| u.missing.clone())
            .unwrap_or_default();
        return Assessment::InsufficientData(Unavailable::missing(SUBJECT, missing));
    };

    let category = if gap.value > cfg.anion_gap_band.high {
        AnionGapCategory::High
    } else {
        AnionGapCategory::Normal
    };
    Assessment::Assessed(AnionGapAssessment {
        category,
        value: Some(gap.value),
        basis: Some(gap.basis),
    })
}

fn compensation_step(
    panel: &ValuePanel,
    primary: &Assessment<PrimaryAssessment>,
    cfg: &EngineConfig,
) -> Assessment<CompensationAssessment> {
    const SUBJECT: &str = "compensation";

    let primary = match primary {
        Assessment::Assessed(primary) => primary,
        Assessment::InsufficientData(why) => {
            return Assessment::InsufficientData(Unavailable::blocked_by(SUBJECT, why));
        }
    };
    let disorder = primary.disorder;
    if disorder == PrimaryDisorder::Normal {
        return Assessment::Assessed(CompensationAssessment::none_expected());
    }

    let expected = match expected_compensation(panel, disorder, cfg) {
        Derived::Value(e) => e,
        Derived::NotComputable(why) => {
            return Assessment::InsufficientData(Unavailable {
                subject: SUBJECT,
                ..why
            });
        }
    };
    let Some(measured) = panel.get(expected.counter) else {
        return Assessment::InsufficientData(Unavailable::missing(SUBJECT, vec![expected.counter]));
    };

    // Direction the counter-variable must move to compensate.
    let compensating_rise = matches!(
        disorder,
        PrimaryDisorder::MetabolicAlkalosis | PrimaryDisorder::RespiratoryAcidosis
    );
    let window = expected.window;

    let status = if window.contains(measured) {
        CompensationStatus::Appropriate
    } else if (measured < window.low) == compensating_rise {
        CompensationStatus::Inadequate
    } else {
        CompensationStatus::Excessive
    };

    let evolving = status != CompensationStatus::Appropriate
        && evolving_respiratory_compensation(panel, disorder, measured, cfg);
    let status = if evolving {
        CompensationStatus::Inadequate
    } else {
        status
    };

    // A counter-variable that moved too little or too far reads as a second
    // process of the other system.
    let implied = if status == CompensationStatus::Appropriate || evolving {
        None
    } else {
        let other = match disorder.system() {
            Some(System::Metabolic) => System::Respiratory,
            _ => System::Metabolic,
        };
        let measured_push = match (other, measured > window.high) {
            (System::Respiratory, true) | (System::Metabolic, false) => Direction::Acidosis,
            (System::Respiratory, false) | (System::Metabolic, true) => Direction::Alkalosis,
        };
        Some(PrimaryDisorder::from_parts(other, measured_push))
    };

    Assessment::Assessed(CompensationAssessment {
        status,
        expected: Some(expected),
        measured: Some(measured),
        implied,
        indicates_mixed: implied.is_some(),
        evolving,
    })
}

/// HCO3 that has moved past the acute expectation without reaching the
/// chronic one. Unless the disorder is known to be acute this is
/// compensation still developing, not a second disorder.
fn evolving_respiratory_compensation(
    panel: &ValuePanel,
    disorder: PrimaryDisorder,
    measured_hco3: f64,
    cfg: &EngineConfig,
) -> bool {
    if disorder.system() != Some(System::Respiratory)
        || panel.chronicity() == Some(Chronicity::Acute)
    {
        return false;
    }
    let Some(pco2) = panel.pco2_kpa() else {
        return false;
    };
    let acute = respiratory_expected_hco3(disorder, pco2, Chronicity::Acute);
    let chronic = respiratory_expected_hco3(disorder, pco2, Chronicity::Chronic);
    Band::new(acute.min(chronic), acute.max(chronic))
        .widened(cfg.respiratory_hco3_tolerance)
        .contains(measured_hco3)
}

fn mixed_disorder(
    primary: &Assessment<PrimaryAssessment>,
    compensation: &Assessment<CompensationAssessment>,
) -> MixedDisorder {
    let Some(primary) = primary.assessed() else {
        return MixedDisorder {
            present: false,
            disorders: Vec::new(),
            description: None,
        };
    };

    let mut disorders = Vec::new();
    if primary.disorder != PrimaryDisorder::Normal {
        disorders.push(primary.disorder);
    }
    let mut notes: Vec<String> = Vec::new();

    if let Some(concurrent) = primary.concurrent {
        disorders.push(concurrent);
        notes.push(format!(
            "{} and {} both drive pH the same way",
            primary.disorder, concurrent
        ));
    }

    match compensation {
        Assessment::Assessed(c) if c.indicates_mixed => {
            if let Some(implied) = c.implied {
                if !disorders.contains(&implied) {
                    disorders.push(implied);
                }
                notes.push(format!("{} with concomitant {}", c.status, implied));
            }
        }
        Assessment::InsufficientData(_) if primary.candidate_mixed => {
            notes.push(
                "opposing pCO2 and HCO3 deviations; compensation could not be assessed".to_string(),
            );
        }
        _ => {}
    }

    let present = disorders.len() > 1;
    MixedDisorder {
        present,
        disorders,
        description: (!notes.is_empty()).then(|| notes.join("; ")),
    }
}

fn oxygenation_step(
    panel: &ValuePanel,
    derived: &DerivedQuantities,
) -> Assessment<OxygenationAssessment> {
    let Some(po2) = panel.po2_kpa() else {
        return Assessment::InsufficientData(Unavailable::missing(
            "oxygenation",
            vec![Analyte::PO2],
        ));
    };

    let respiratory_failure = if po2 < RESPIRATORY_FAILURE_PO2_KPA {
        match panel.flag(Analyte::PCo2) {
            Some(RangeFlag::High) => Some(RespiratoryFailure::Type2),
            _ => Some(RespiratoryFailure::Type1),
        }
    } else {
        None
    };

    Assessment::Assessed(OxygenationAssessment {
        po2_kpa: po2,
        flag: Analyte::PO2.normal_range().flag(po2),
        respiratory_failure,
        aa_gradient: derived.aa_gradient.value().copied(),
    })
}
