use thiserror::Error;

pub type BgResult<T> = Result<T, BgError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BgError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid band for {what}: low {low} must be below high {high}")]
    InvalidBand {
        what: &'static str,
        low: f64,
        high: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_field() {
        let err = BgError::InvalidBand {
            what: "anion gap",
            low: 16.0,
            high: 8.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("anion gap"));
        assert!(msg.contains("16"));
    }
}
