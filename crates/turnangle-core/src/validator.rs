//! Strict parsing of a model response into a steering angle.
//!
//! A response is accepted only if, after trimming surrounding whitespace, it is
//! exactly one decimal floating-point literal. Anything else (words, units,
//! several numbers, locale-specific separators) is `FailNotNumeric`.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::range::AngleRange;
use crate::verdict::Verdict;

lazy_static! {
    /// Invariant-culture decimal literal: optional sign, digits with an
    /// optional `.`, optional exponent. ASCII digits only.
    static ref DECIMAL_LITERAL: Regex = Regex::new(
        r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$"
    ).unwrap();

    /// First signed decimal number embedded anywhere in free text.
    static ref EMBEDDED_NUMBER: Regex = Regex::new(
        r"[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)"
    ).unwrap();
}

/// Why a response could not be read as a single number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAngleError {
    #[error("response is empty")]
    Empty,

    #[error("response contains interior whitespace: {0:?}")]
    InteriorWhitespace(String),

    #[error("response is not a decimal literal: {0:?}")]
    NotALiteral(String),
}

/// Parse a raw response into an angle without checking the range.
pub fn parse_angle(raw: &str) -> Result<f64, ParseAngleError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ParseAngleError::Empty);
    }

    // Multi-token answers ("15 degrees") are rejected even if a number could
    // be pulled out of them.
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ParseAngleError::InteriorWhitespace(trimmed.to_string()));
    }

    if !DECIMAL_LITERAL.is_match(trimmed) {
        return Err(ParseAngleError::NotALiteral(trimmed.to_string()));
    }

    trimmed
        .parse::<f64>()
        .map_err(|_| ParseAngleError::NotALiteral(trimmed.to_string()))
}

/// Validate a raw response against the steering range.
pub fn validate(raw: &str) -> Verdict {
    AngleValidator::new().validate(raw)
}

/// Looser variant: take the first number found anywhere in the text.
///
/// Accepts answers such as "The angle is 15 degrees" that [`validate`]
/// rejects.
pub fn validate_lenient(raw: &str) -> Verdict {
    AngleValidator::new().validate_lenient(raw)
}

/// Validator for the fixed steering range.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleValidator {
    range: AngleRange,
}

impl AngleValidator {
    /// Validator for the steering range `[-180, 180]`.
    pub fn new() -> Self {
        Self {
            range: AngleRange::STEERING,
        }
    }

    pub fn range(&self) -> AngleRange {
        self.range
    }

    pub fn validate(&self, raw: &str) -> Verdict {
        match parse_angle(raw) {
            Ok(angle) => self.judge(angle),
            Err(_) => Verdict::FailNotNumeric,
        }
    }

    pub fn validate_lenient(&self, raw: &str) -> Verdict {
        EMBEDDED_NUMBER
            .find(raw)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|angle| self.judge(angle))
            .unwrap_or(Verdict::FailNotNumeric)
    }

    fn judge(&self, angle: f64) -> Verdict {
        if self.range.contains(angle) {
            Verdict::Pass { angle }
        } else {
            Verdict::FailOutOfRange { angle }
        }
    }
}
