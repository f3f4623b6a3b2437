//! Interpretation composer.
//!
//! Assembles the panel, derived quantities and classification into five
//! ordered findings plus a final impression. Output is structured data;
//! turning it into prose is left to the presentation layer.

use bg_core::{Band, RangeFlag};
use bg_panel::{Analyte, AnalyteReading, Chronicity, ValuePanel};
use serde::Serialize;
use tracing::warn;

use crate::classify::{Assessment, ClassificationResult, RespiratoryFailure};
use crate::config::EngineConfig;
use crate::derived::{AnionGapBasis, DerivedQuantities, Unavailable};
use crate::differential::differentials;
use crate::disorder::{AnionGapCategory, CompensationStatus, PhStatus, PrimaryDisorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationStep {
    PhAssessment,
    PrimaryDisturbance,
    AnionGap,
    Compensation,
    Oxygenation,
}

impl InterpretationStep {
    pub const ALL: [InterpretationStep; 5] = [
        Self::PhAssessment,
        Self::PrimaryDisturbance,
        Self::AnionGap,
        Self::Compensation,
        Self::Oxygenation,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::PhAssessment => 1,
            Self::PrimaryDisturbance => 2,
            Self::AnionGap => 3,
            Self::Compensation => 4,
            Self::Oxygenation => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::PhAssessment => "pH Assessment",
            Self::PrimaryDisturbance => "Primary Disturbance",
            Self::AnionGap => "Anion Gap",
            Self::Compensation => "Compensation Assessment",
            Self::Oxygenation => "Oxygenation & A-a Gradient",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Normal,
    Abnormal,
    NotApplicable,
    InsufficientData,
    /// Every input was present but the values contradict each other.
    Indeterminate,
}

/// One number cited by a finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub reference: Option<Band>,
    pub flag: Option<RangeFlag>,
}

impl Evidence {
    fn measured(reading: &AnalyteReading) -> Self {
        Self {
            name: reading.analyte.key(),
            value: reading.value,
            unit: reading.unit,
            reference: Some(reading.normal_range),
            flag: Some(reading.flag),
        }
    }

    fn against(name: &'static str, value: f64, unit: &'static str, band: Band) -> Self {
        Self {
            name,
            value,
            unit,
            reference: Some(band),
            flag: Some(band.flag(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub step: InterpretationStep,
    pub number: u8,
    pub title: &'static str,
    pub status: FindingStatus,
    pub label: String,
    pub evidence: Vec<Evidence>,
    pub notes: Vec<String>,
}

impl Finding {
    fn new(step: InterpretationStep, status: FindingStatus, label: impl Into<String>) -> Self {
        Self {
            step,
            number: step.number(),
            title: step.title(),
            status,
            label: label.into(),
            evidence: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn insufficient(step: InterpretationStep, why: &Unavailable) -> Self {
        let (status, label) = if why.lacks_data() {
            (
                FindingStatus::InsufficientData,
                format!("insufficient data for {}", why.subject),
            )
        } else {
            (
                FindingStatus::Indeterminate,
                format!("{} undetermined", why.subject),
            )
        };
        Self::new(step, status, label).with_note(why.reason.clone())
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note(note);
        self
    }

    fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalImpression {
    pub diagnosis: String,
    pub primary: Option<PrimaryDisorder>,
    pub anion_gap_category: Option<AnionGapCategory>,
    pub compensation: Option<CompensationStatus>,
    pub compensation_description: String,
    pub mixed_disorder: bool,
    pub mixed_disorder_note: Option<String>,
    pub differentials: Vec<&'static str>,
    pub clinical_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpretationResult {
    pub panel: ValuePanel,
    pub readings: Vec<AnalyteReading>,
    pub derived: DerivedQuantities,
    pub classification: ClassificationResult,
    pub findings: Vec<Finding>,
    pub impression: FinalImpression,
}

impl InterpretationResult {
    pub fn finding(&self, step: InterpretationStep) -> Option<&Finding> {
        self.findings.iter().find(|f| f.step == step)
    }
}

pub fn compose(
    panel: &ValuePanel,
    derived: &DerivedQuantities,
    classification: &ClassificationResult,
    cfg: &EngineConfig,
) -> InterpretationResult {
    let readings = panel.readings();
    let findings = vec![
        ph_finding(&readings, derived, classification),
        primary_finding(&readings, classification),
        anion_gap_finding(derived, classification, cfg),
        compensation_finding(classification),
        oxygenation_finding(&readings, classification),
    ];

    InterpretationResult {
        panel: panel.clone(),
        readings,
        derived: derived.clone(),
        classification: classification.clone(),
        findings,
        impression: impression(panel, classification),
    }
}

fn reading(readings: &[AnalyteReading], analyte: Analyte) -> Option<Evidence> {
    readings
        .iter()
        .find(|r| r.analyte == analyte)
        .map(Evidence::measured)
}

fn ph_finding(
    readings: &[AnalyteReading],
    derived: &DerivedQuantities,
    c: &ClassificationResult,
) -> Finding {
    let step = InterpretationStep::PhAssessment;
    let status = match &c.ph_status {
        Assessment::Assessed(status) => *status,
        Assessment::InsufficientData(why) => return Finding::insufficient(step, why),
    };

    let finding_status = if status == PhStatus::Normal {
        FindingStatus::Normal
    } else {
        FindingStatus::Abnormal
    };
    let mut f = Finding::new(step, finding_status, status.to_string());
    f.evidence.extend(reading(readings, Analyte::Ph));

    if status == PhStatus::Normal
        && c
            .primary_disorder()
            .is_some_and(|p| p != PrimaryDisorder::Normal)
    {
        f.note("normal pH with abnormal pCO2/HCO3: compensated or mixed disorder");
    }

    if let Some(hh) = derived.henderson_hasselbalch.value() {
        if !hh.consistent {
            warn!(
                measured = hh.measured_ph,
                calculated = hh.calculated_ph,
                "panel fails Henderson-Hasselbalch consistency check"
            );
            f.note(format!(
                "measured pH differs from calculated pH {:.2} by {:+.2}; \
                 check sample or transcription",
                hh.calculated_ph, hh.difference
            ));
        }
    }
    f
}

fn primary_finding(readings: &[AnalyteReading], c: &ClassificationResult) -> Finding {
    let step = InterpretationStep::PrimaryDisturbance;
    let p = match &c.primary {
        Assessment::Assessed(p) => p,
        Assessment::InsufficientData(why) => return Finding::insufficient(step, why),
    };

    let status = if p.disorder == PrimaryDisorder::Normal {
        FindingStatus::Normal
    } else {
        FindingStatus::Abnormal
    };
    let mut f = Finding::new(step, status, p.disorder.label());
    for analyte in [Analyte::PCo2, Analyte::Hco3, Analyte::BaseExcess] {
        f.evidence.extend(reading(readings, analyte));
    }

    if let Some(concurrent) = p.concurrent {
        f.note(format!("concurrent {concurrent}"));
    }
    if p.candidate_mixed {
        f.note("pCO2 and HCO3 deviate in opposing directions");
    }

    if let Some(be) = readings.iter().find(|r| r.analyte == Analyte::BaseExcess) {
        match (be.flag, p.disorder) {
            (RangeFlag::Low, PrimaryDisorder::MetabolicAcidosis)
            | (RangeFlag::High, PrimaryDisorder::MetabolicAlkalosis) => {
                f.note(format!("base excess {:+.1} supports a metabolic process", be.value));
            }
            (RangeFlag::Low, _) => f.note(format!(
                "base excess {:+.1} indicates a metabolic acidotic component",
                be.value
            )),
            (RangeFlag::High, _) => f.note(format!(
                "base excess {:+.1} indicates a metabolic alkalotic component",
                be.value
            )),
            (RangeFlag::Normal, _) => {}
        }
    }
    f
}

fn anion_gap_finding(
    derived: &DerivedQuantities,
    c: &ClassificationResult,
    cfg: &EngineConfig,
) -> Finding {
    let step = InterpretationStep::AnionGap;
    let ag = match &c.anion_gap {
        Assessment::Assessed(ag) => ag,
        Assessment::InsufficientData(why) => return Finding::insufficient(step, why),
    };

    if ag.category == AnionGapCategory::NotApplicable {
        let mut f = Finding::new(step, FindingStatus::NotApplicable, "not applicable");
        if let Some(primary) = c.primary_disorder() {
            f.note(format!("anion gap is assessed for metabolic acidosis; primary is {primary}"));
        }
        // Still worth citing when it was computable
        if let Some(&raw) = derived.anion_gap.value() {
            f.evidence
                .push(Evidence::against("anion_gap", raw, "mmol/L", cfg.anion_gap_band));
        }
        return f;
    }

    let status = if ag.category == AnionGapCategory::High {
        FindingStatus::Abnormal
    } else {
        FindingStatus::Normal
    };
    let mut f = Finding::new(step, status, ag.category.to_string());

    if let Some(&raw) = derived.anion_gap.value() {
        f.evidence
            .push(Evidence::against("anion_gap", raw, "mmol/L", cfg.anion_gap_band));
    }
    match derived.corrected_anion_gap.value() {
        Some(corrected) => {
            f.evidence.push(Evidence::against(
                "corrected_anion_gap",
                corrected.value,
                "mmol/L",
                cfg.anion_gap_band,
            ));
            f.note(format!(
                "corrected for albumin {} g/L ({:+.1} mmol/L)",
                corrected.albumin_g_l, corrected.correction
            ));
            if corrected.raw <= cfg.anion_gap_band.high && corrected.value > cfg.anion_gap_band.high
            {
                f.note("hypoalbuminaemia masks a high anion gap");
            }
        }
        None => f.note("albumin not supplied; anion gap not corrected"),
    }
    if ag.basis == Some(AnionGapBasis::Raw) && ag.value.is_some_and(|v| v < cfg.anion_gap_band.low)
    {
        f.note("low anion gap; consider hypoalbuminaemia or laboratory error");
    }
    f
}

fn compensation_finding(c: &ClassificationResult) -> Finding {
    let step = InterpretationStep::Compensation;
    let comp = match &c.compensation {
        Assessment::Assessed(comp) => comp,
        Assessment::InsufficientData(why) => return Finding::insufficient(step, why),
    };

    let status = match comp.status {
        CompensationStatus::NoneExpected => FindingStatus::NotApplicable,
        CompensationStatus::Appropriate => FindingStatus::Normal,
        CompensationStatus::Inadequate | CompensationStatus::Excessive => FindingStatus::Abnormal,
    };
    let mut f = Finding::new(step, status, comp.status.to_string());

    if let (Some(expected), Some(measured)) = (comp.expected, comp.measured) {
        f.evidence.push(Evidence::against(
            expected.counter.key(),
            measured,
            expected.unit(),
            expected.window,
        ));
        f.note(expected.formula.describe());
    }
    if comp.evolving {
        f.note("HCO3 between the acute and chronic expectations: compensation still developing");
    }
    if let Some(implied) = comp.implied {
        f.note(format!("indicates concomitant {implied}"));
    }
    if c.mixed_disorder.present {
        f.note("mixed disorder");
    }
    f
}

fn oxygenation_finding(readings: &[AnalyteReading], c: &ClassificationResult) -> Finding {
    let step = InterpretationStep::Oxygenation;
    let o = match &c.oxygenation {
        Assessment::Assessed(o) => o,
        Assessment::InsufficientData(why) => return Finding::insufficient(step, why),
    };

    let label = match (o.flag, o.respiratory_failure) {
        (_, Some(RespiratoryFailure::Type1)) => "type 1 respiratory failure",
        (_, Some(RespiratoryFailure::Type2)) => "type 2 respiratory failure",
        (RangeFlag::Low, None) => "hypoxaemia",
        (RangeFlag::Normal, None) => "normal oxygenation",
        (RangeFlag::High, None) => "hyperoxaemia",
    };
    let gradient_raised = o
        .aa_gradient
        .is_some_and(|g| g.flag == RangeFlag::High);
    let status = if o.flag.is_normal() && !gradient_raised {
        FindingStatus::Normal
    } else {
        FindingStatus::Abnormal
    };

    let mut f = Finding::new(step, status, label);
    f.evidence.extend(reading(readings, Analyte::PO2));

    match o.aa_gradient {
        Some(g) => {
            f.evidence
                .push(Evidence::against("aa_gradient", g.gradient_kpa, "kPa", g.normal_band));
            if gradient_raised {
                f.note("raised A-a gradient: impaired gas exchange");
            } else if o.flag == RangeFlag::Low {
                f.note("normal A-a gradient: hypoventilation or low inspired oxygen");
            }
            if g.age_adjusted {
                f.note("A-a upper limit adjusted for age");
            }
            f.note("A-a gradient assumes room air");
        }
        None => f.note("A-a gradient not computable without pCO2"),
    }
    f
}

fn impression(panel: &ValuePanel, c: &ClassificationResult) -> FinalImpression {
    let primary = c.primary_disorder();
    let anion_gap_category = c.anion_gap_category();

    let diagnosis = match primary {
        None => match c.primary.insufficient() {
            Some(why) if !why.lacks_data() => "indeterminate: inconsistent values".to_string(),
            _ => "indeterminate".to_string(),
        },
        Some(PrimaryDisorder::MetabolicAcidosis) => match anion_gap_category {
            Some(AnionGapCategory::High) => "high anion gap metabolic acidosis".to_string(),
            Some(AnionGapCategory::Normal) => "normal anion gap metabolic acidosis".to_string(),
            _ => PrimaryDisorder::MetabolicAcidosis.label().to_string(),
        },
        Some(
            p @ (PrimaryDisorder::RespiratoryAcidosis | PrimaryDisorder::RespiratoryAlkalosis),
        ) => match panel.chronicity() {
            Some(Chronicity::Acute) => format!("acute {p}"),
            Some(Chronicity::Chronic) => format!("chronic {p}"),
            None => p.label().to_string(),
        },
        Some(p) => p.label().to_string(),
    };

    let compensation_description = match &c.compensation {
        Assessment::Assessed(comp) => comp.status.to_string(),
        Assessment::InsufficientData(why) => format!("not assessed: {}", why.reason),
    };

    FinalImpression {
        diagnosis,
        primary,
        anion_gap_category,
        compensation: c.compensation_status(),
        compensation_description,
        mixed_disorder: c.mixed_disorder.present,
        mixed_disorder_note: c.mixed_disorder.description.clone(),
        differentials: primary
            .map(|p| differentials(p, anion_gap_category))
            .unwrap_or_default(),
        clinical_context: panel.clinical_info().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use bg_panel::{RawPanel, UnitSystem, validate_and_build_panel};

    fn run(raw: RawPanel) -> InterpretationResult {
        let cfg = EngineConfig::default();
        let panel = validate_and_build_panel(&raw).unwrap();
        let derived = DerivedQuantities::compute(&panel, &cfg);
        let classification = classify(&panel, &derived, &cfg);
        let derived =
            derived.with_expected_compensation(&panel, classification.primary_disorder(), &cfg);
        compose(&panel, &derived, &classification, &cfg)
    }

    #[test]
    fn five_findings_in_order() {
        let r = run(
            RawPanel::new(UnitSystem::Kpa)
                .with("pH", 7.40)
                .with("pCO2", 5.3)
                .with("HCO3", 24.0),
        );
        let numbers: Vec<u8> = r.findings.iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(r.findings[0].status, FindingStatus::Normal);
        assert_eq!(r.findings[2].status, FindingStatus::NotApplicable);
        assert_eq!(r.findings[4].status, FindingStatus::InsufficientData);
        assert_eq!(r.impression.diagnosis, "normal acid-base status");
        assert!(r.impression.differentials.is_empty());
    }

    #[test]
    fn inconsistent_panel_is_noted() {
        // pH 7.40 with pCO2 5.3 and HCO3 12 computes to roughly 7.09
        let r = run(
            RawPanel::new(UnitSystem::Kpa)
                .with("pH", 7.40)
                .with("pCO2", 5.3)
                .with("HCO3", 12.0),
        );
        let f = r.finding(InterpretationStep::PhAssessment).unwrap();
        assert!(f.notes.iter().any(|n| n.contains("calculated pH")));
    }

    #[test]
    fn contradictory_values_are_not_reported_as_missing_data() {
        let r = run(
            RawPanel::new(UnitSystem::Kpa)
                .with("pH", 7.30)
                .with("pCO2", 4.0)
                .with("HCO3", 30.0),
        );
        let primary = r.finding(InterpretationStep::PrimaryDisturbance).unwrap();
        assert_eq!(primary.status, FindingStatus::Indeterminate);
        assert_eq!(primary.label, "primary disturbance undetermined");
        assert!(primary.notes[0].contains("Henderson-Hasselbalch"));

        let ph = r.finding(InterpretationStep::PhAssessment).unwrap();
        assert!(ph.notes.iter().any(|n| n.contains("calculated pH")));
        assert_eq!(
            r.impression.diagnosis,
            "indeterminate: inconsistent values"
        );
    }

    #[test]
    fn missing_inputs_do_not_stop_other_steps() {
        let r = run(
            RawPanel::new(UnitSystem::Kpa)
                .with("pCO2", 5.3)
                .with("HCO3", 24.0)
                .with("pO2", 12.0),
        );
        let ph = r.finding(InterpretationStep::PhAssessment).unwrap();
        assert_eq!(ph.status, FindingStatus::InsufficientData);
        let o = r.finding(InterpretationStep::Oxygenation).unwrap();
        assert_eq!(o.status, FindingStatus::Normal);
        assert_eq!(r.impression.diagnosis, "indeterminate");
    }

    #[test]
    fn high_gap_acidosis_diagnosis_and_context() {
        let r = run(
            RawPanel::new(UnitSystem::Kpa)
                .with("pH", 7.25)
                .with("pCO2", 3.4)
                .with("HCO3", 12.0)
                .with("Na", 140.0)
                .with("Cl", 100.0)
                .with_clinical_info("  known type 1 diabetic  "),
        );
        assert_eq!(r.impression.diagnosis, "high anion gap metabolic acidosis");
        assert_eq!(r.impression.differentials[0], "Diabetic ketoacidosis");
        assert_eq!(
            r.impression.clinical_context.as_deref(),
            Some("known type 1 diabetic")
        );
        let ag = r.finding(InterpretationStep::AnionGap).unwrap();
        assert!(ag.notes.iter().any(|n| n.contains("not corrected")));
    }
}
