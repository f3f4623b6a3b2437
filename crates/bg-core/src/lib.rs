//! bg-core: stable foundation for bloodgas.
//!
//! Contains:
//! - units (uom pressure types + kPa/mmHg constructors)
//! - numeric (Real + tolerances + float helpers + reference bands)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{BgError, BgResult};
pub use numeric::*;
pub use units::*;
