//! bg-engine: acid-base interpretation of a validated blood gas panel.
//!
//! Provides:
//! - Derived quantities (anion gap, albumin-corrected gap, expected
//!   compensation, A-a gradient, Henderson-Hasselbalch check)
//! - The five-step rule-based classifier
//! - A composer that assembles findings and a final impression
//!
//! Interpretation is a pure function of the panel and configuration. Missing
//! inputs surface as markers inside the result rather than as errors.
//!
//! # Example
//!
//! ```
//! use bg_engine::{PrimaryDisorder, interpret};
//! use bg_panel::{RawPanel, UnitSystem, validate_and_build_panel};
//!
//! let raw = RawPanel::new(UnitSystem::Kpa)
//!     .with("pH", 7.25)
//!     .with("pCO2", 3.4)
//!     .with("HCO3", 12.0);
//! let panel = validate_and_build_panel(&raw).unwrap();
//!
//! let result = interpret(&panel);
//! assert_eq!(
//!     result.impression.primary,
//!     Some(PrimaryDisorder::MetabolicAcidosis)
//! );
//! ```

pub mod classify;
pub mod compose;
pub mod config;
pub mod derived;
pub mod differential;
pub mod disorder;
pub mod error;

use bg_panel::ValuePanel;
use tracing::debug;

pub use bg_panel::validate_and_build_panel;
pub use classify::{
    AnionGapAssessment, Assessment, ClassificationResult, CompensationAssessment, MixedDisorder,
    OxygenationAssessment, PrimaryAssessment, RespiratoryFailure, classify,
};
pub use compose::{
    Evidence, FinalImpression, Finding, FindingStatus, InterpretationResult, InterpretationStep,
    compose,
};
pub use config::EngineConfig;
pub use derived::{
    AaGradient, AnionGapBasis, CompensationFormula, CorrectedAnionGap, Derived, DerivedQuantities,
    EffectiveAnionGap, ExpectedCompensation, HendersonCheck, Unavailable,
};
pub use differential::differentials;
pub use disorder::{
    AnionGapCategory, CompensationStatus, Direction, PhStatus, PrimaryDisorder, System,
};
pub use error::{EngineError, EngineResult};

/// Interpreter bound to a validated configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run derived quantities, classification and composition over `panel`.
    pub fn interpret(&self, panel: &ValuePanel) -> InterpretationResult {
        let cfg = &self.config;
        let derived = DerivedQuantities::compute(panel, cfg);
        let classification = classify(panel, &derived, cfg);
        // Expected compensation is keyed on the classified primary
        let derived =
            derived.with_expected_compensation(panel, classification.primary_disorder(), cfg);

        let result = compose(panel, &derived, &classification, cfg);
        debug!(
            diagnosis = %result.impression.diagnosis,
            mixed = result.impression.mixed_disorder,
            "interpretation complete"
        );
        result
    }
}

/// Interpret `panel` with the default configuration.
pub fn interpret(panel: &ValuePanel) -> InterpretationResult {
    Engine::default().interpret(panel)
}
