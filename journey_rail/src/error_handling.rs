// error_handling.rs - Configuration errors surfaced once at scene construction

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Curve needs at least 2 control points, got {found}")]
    TooFewControlPoints { found: usize },

    #[error("Control points {index} and {next} coincide; segment is degenerate", next = .index + 1)]
    DegenerateSegment { index: usize },

    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Section list is empty")]
    NoSections,

    #[error("Section '{id}' has malformed interval [{start}, {end}]")]
    InvalidInterval { id: String, start: f64, end: f64 },

    #[error("Section '{next}' starts before section '{previous}' ends")]
    OverlappingSections { previous: String, next: String },

    #[error("Duplicate section id: {0}")]
    DuplicateSectionId(String),

    #[error("Unknown section id: {0}")]
    UnknownSection(String),

    #[error("Invalid color '{value}' in section '{section}'")]
    InvalidColor { section: String, value: String },

    #[error("Failed to read scene file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SceneError>;

/// Reject NaN and values outside `(0, 1]` for per-tick smoothing factors.
pub fn check_factor(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter {
            name,
            reason: format!("{value} is outside (0, 1]"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_factor_bounds() {
        assert!(check_factor("alpha", 0.08).is_ok());
        assert!(check_factor("alpha", 1.0).is_ok());
        assert!(check_factor("alpha", 0.0).is_err());
        assert!(check_factor("alpha", 1.5).is_err());
        assert!(check_factor("alpha", f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = SceneError::DegenerateSegment { index: 2 };
        assert_eq!(err.to_string(), "Control points 2 and 3 coincide; segment is degenerate");

        let err = SceneError::InvalidInterval { id: "intro".into(), start: 0.5, end: 0.2 };
        assert!(err.to_string().contains("intro"));
    }
}
