//! bg-panel: the boundary of the blood gas engine.
//!
//! Turns a raw analyte mapping (however it was obtained: form entry, OCR,
//! remote extraction) into an immutable, unit-consistent [`ValuePanel`].
//!
//! Provides:
//! - `Analyte` with the static normal-range and plausibility tables
//! - unit-tagged text readings (`"40 mmHg"`, `"3.2 g/dL"`)
//! - `validate_and_build_panel`, which rejects implausible values instead of clamping
//! - JSON/YAML loading of raw panels
//!
//! # Example
//!
//! ```
//! use bg_panel::{RawPanel, UnitSystem, validate_and_build_panel};
//!
//! let raw = RawPanel::new(UnitSystem::Kpa)
//!     .with("pH", 7.25)
//!     .with("pCO2", 5.0)
//!     .with("HCO3", 15.0);
//!
//! let panel = validate_and_build_panel(&raw).unwrap();
//! assert_eq!(panel.ph(), Some(7.25));
//! ```

pub mod analyte;
pub mod error;
pub mod io;
pub mod panel;
pub mod raw;
pub mod units;

// Re-exports for ergonomics
pub use analyte::{Analyte, Quantity};
pub use error::{BoundViolation, PanelError, PanelResult};
pub use io::{from_json_str, from_yaml_str, load_json, load_path, load_yaml};
pub use panel::{AnalyteReading, ValuePanel, validate_and_build_panel};
pub use raw::{Chronicity, RawPanel, RawReading};
pub use units::{UnitError, UnitSystem, parse_reading};
