//! Enumerated acid-base states shared by the calculator, classifier and composer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Step 1 outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhStatus {
    Acidaemia,
    Normal,
    Alkalaemia,
}

impl fmt::Display for PhStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acidaemia => write!(f, "acidaemia"),
            Self::Normal => write!(f, "normal pH"),
            Self::Alkalaemia => write!(f, "alkalaemia"),
        }
    }
}

/// Which way a process pushes pH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Acidosis,
    Alkalosis,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Acidosis => Self::Alkalosis,
            Self::Alkalosis => Self::Acidosis,
        }
    }
}

/// Respiratory (pCO2-driven) or metabolic (HCO3-driven).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum System {
    Respiratory,
    Metabolic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryDisorder {
    Normal,
    RespiratoryAcidosis,
    RespiratoryAlkalosis,
    MetabolicAcidosis,
    MetabolicAlkalosis,
}

impl PrimaryDisorder {
    pub fn from_parts(system: System, direction: Direction) -> Self {
        match (system, direction) {
            (System::Respiratory, Direction::Acidosis) => Self::RespiratoryAcidosis,
            (System::Respiratory, Direction::Alkalosis) => Self::RespiratoryAlkalosis,
            (System::Metabolic, Direction::Acidosis) => Self::MetabolicAcidosis,
            (System::Metabolic, Direction::Alkalosis) => Self::MetabolicAlkalosis,
        }
    }

    pub fn system(self) -> Option<System> {
        match self {
            Self::Normal => None,
            Self::RespiratoryAcidosis | Self::RespiratoryAlkalosis => Some(System::Respiratory),
            Self::MetabolicAcidosis | Self::MetabolicAlkalosis => Some(System::Metabolic),
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Normal => None,
            Self::RespiratoryAcidosis | Self::MetabolicAcidosis => Some(Direction::Acidosis),
            Self::RespiratoryAlkalosis | Self::MetabolicAlkalosis => Some(Direction::Alkalosis),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal acid-base status",
            Self::RespiratoryAcidosis => "respiratory acidosis",
            Self::RespiratoryAlkalosis => "respiratory alkalosis",
            Self::MetabolicAcidosis => "metabolic acidosis",
            Self::MetabolicAlkalosis => "metabolic alkalosis",
        }
    }
}

impl fmt::Display for PrimaryDisorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnionGapCategory {
    Normal,
    High,
    NotApplicable,
}

impl fmt::Display for AnionGapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal anion gap"),
            Self::High => write!(f, "high anion gap"),
            Self::NotApplicable => write!(f, "not applicable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationStatus {
    NoneExpected,
    Appropriate,
    Inadequate,
    Excessive,
}

impl fmt::Display for CompensationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoneExpected => write!(f, "no compensation expected"),
            Self::Appropriate => write!(f, "appropriate compensation"),
            Self::Inadequate => write!(f, "inadequate compensation"),
            Self::Excessive => write!(f, "excessive compensation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip() {
        for system in [System::Respiratory, System::Metabolic] {
            for direction in [Direction::Acidosis, Direction::Alkalosis] {
                let d = PrimaryDisorder::from_parts(system, direction);
                assert_eq!(d.system(), Some(system));
                assert_eq!(d.direction(), Some(direction));
            }
        }
        assert_eq!(PrimaryDisorder::Normal.system(), None);
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&PrimaryDisorder::MetabolicAcidosis).unwrap();
        assert_eq!(json, "\"metabolic_acidosis\"");
        let json = serde_json::to_string(&CompensationStatus::NoneExpected).unwrap();
        assert_eq!(json, "\"none_expected\"");
    }
}
