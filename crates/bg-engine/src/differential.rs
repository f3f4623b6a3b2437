//! Static lookup of common causes, keyed by primary disorder and anion gap.

use crate::disorder::{AnionGapCategory, PrimaryDisorder};

const RESPIRATORY_ACIDOSIS: &[&str] = &[
    "COPD exacerbation",
    "Pneumonia",
    "Respiratory muscle weakness",
    "Opioid overdose",
    "Obesity hypoventilation",
];

const RESPIRATORY_ALKALOSIS: &[&str] = &[
    "Anxiety/hyperventilation",
    "Pulmonary embolism",
    "Pregnancy",
    "Salicylate poisoning (early)",
    "High altitude",
];

const HIGH_GAP_METABOLIC_ACIDOSIS: &[&str] = &[
    "Diabetic ketoacidosis",
    "Lactic acidosis",
    "Renal failure",
    "Toxins (methanol, ethylene glycol)",
];

const NORMAL_GAP_METABOLIC_ACIDOSIS: &[&str] = &[
    "Diarrhoea",
    "Renal tubular acidosis",
    "Acetazolamide use",
];

const METABOLIC_ALKALOSIS: &[&str] = &[
    "Vomiting/NG suction",
    "Diuretic use",
    "Hyperaldosteronism",
    "Hypokalaemia",
];

/// Suggested differential for a primary disorder.
///
/// Metabolic acidosis with an unknown gap returns both gap lists, high first.
pub fn differentials(
    primary: PrimaryDisorder,
    anion_gap: Option<AnionGapCategory>,
) -> Vec<&'static str> {
    match primary {
        PrimaryDisorder::Normal => Vec::new(),
        PrimaryDisorder::RespiratoryAcidosis => RESPIRATORY_ACIDOSIS.to_vec(),
        PrimaryDisorder::RespiratoryAlkalosis => RESPIRATORY_ALKALOSIS.to_vec(),
        PrimaryDisorder::MetabolicAlkalosis => METABOLIC_ALKALOSIS.to_vec(),
        PrimaryDisorder::MetabolicAcidosis => match anion_gap {
            Some(AnionGapCategory::High) => HIGH_GAP_METABOLIC_ACIDOSIS.to_vec(),
            Some(AnionGapCategory::Normal) => NORMAL_GAP_METABOLIC_ACIDOSIS.to_vec(),
            _ => HIGH_GAP_METABOLIC_ACIDOSIS
                .iter()
                .chain(NORMAL_GAP_METABOLIC_ACIDOSIS)
                .copied()
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_selects_metabolic_acidosis_list() {
        assert!(
            differentials(PrimaryDisorder::MetabolicAcidosis, Some(AnionGapCategory::High))
                .contains(&"Diabetic ketoacidosis")
        );
        assert!(
            differentials(PrimaryDisorder::MetabolicAcidosis, Some(AnionGapCategory::Normal))
                .contains(&"Diarrhoea")
        );
        assert_eq!(differentials(PrimaryDisorder::MetabolicAcidosis, None).len(), 7);
    }

    #[test]
    fn normal_has_no_differential() {
        assert!(differentials(PrimaryDisorder::Normal, None).is_empty());
    }
}
