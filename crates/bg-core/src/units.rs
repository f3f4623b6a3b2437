// bg-core/src/units.rs

use uom::si::f64::Pressure as UomPressure;
use uom::si::pressure::kilopascal;

/// Gas tension (pCO2, pO2). Canonical unit internally is kPa.
pub type Pressure = UomPressure;

/// Fixed clinical divisor for converting mmHg to kPa.
///
/// Blood gas teaching material uses 7.5 rather than the exact 7.500 62, and
/// every compensation formula in the engine goes through this one constant.
pub const MMHG_PER_KPA: f64 = 7.5;

#[inline]
pub fn kpa(v: f64) -> Pressure {
    Pressure::new::<kilopascal>(v)
}

/// Build a pressure from an mmHg reading using [`MMHG_PER_KPA`].
#[inline]
pub fn mmhg(v: f64) -> Pressure {
    kpa(mmhg_to_kpa(v))
}

#[inline]
pub fn kpa_value(p: Pressure) -> f64 {
    p.get::<kilopascal>()
}

#[inline]
pub fn mmhg_to_kpa(v: f64) -> f64 {
    v / MMHG_PER_KPA
}

#[inline]
pub fn kpa_to_mmhg(v: f64) -> f64 {
    v * MMHG_PER_KPA
}

pub mod constants {
    /// Reference arterial pCO2 [mmHg].
    pub const REFERENCE_PCO2_MMHG: f64 = 40.0;

    /// Reference plasma bicarbonate [mmol/L].
    pub const REFERENCE_HCO3: f64 = 24.0;

    /// Room-air alveolar gas equation constants (kPa).
    pub const INSPIRED_PO2_KPA: f64 = 20.0;
    pub const RESPIRATORY_QUOTIENT_FACTOR: f64 = 1.2;

    /// CO2 solubility coefficient [mmol/L per kPa] and pKa for the
    /// Henderson-Hasselbalch relation.
    pub const CO2_SOLUBILITY_MMOL_PER_KPA: f64 = 0.23;
    pub const CARBONIC_PKA: f64 = 6.1;

    #[inline]
    pub fn reference_pco2_kpa() -> f64 {
        super::mmhg_to_kpa(REFERENCE_PCO2_MMHG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let p = kpa(5.3);
        assert!((kpa_value(p) - 5.3).abs() < 1e-12);
    }

    #[test]
    fn mmhg_uses_fixed_divisor() {
        assert!((kpa_value(mmhg(40.0)) - 40.0 / 7.5).abs() < 1e-12);
        assert!((kpa_to_mmhg(mmhg_to_kpa(55.0)) - 55.0).abs() < 1e-12);
    }

    #[test]
    fn reference_pco2_is_forty_mmhg() {
        assert!((constants::reference_pco2_kpa() - 5.333_333).abs() < 1e-5);
    }
}
