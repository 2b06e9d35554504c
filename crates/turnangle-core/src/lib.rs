//! # turnangle-core
//!
//! Deterministic validation of steering-angle responses.
//!
//! A vision model is asked to answer with one numeric steering angle. This
//! crate decides whether the text it returned is exactly that:
//! - a single decimal number, nothing else
//! - inside the inclusive range `[-180, 180]`
//!
//! ## Key Guarantees
//!
//! 1. **Pure**: no I/O, no shared state; same input always gives the same verdict
//! 2. **Total**: never panics and never errors; every failure is a [`Verdict`] variant
//! 3. **Thread-safe**: all state is immutable constants
//!
//! ## Example
//!
//! ```rust
//! use turnangle_core::{validate, Verdict};
//!
//! match validate("  -15\n") {
//!     Verdict::Pass { angle } => println!("PASS: {}", angle),
//!     Verdict::FailNotNumeric => println!("FAIL: not a number"),
//!     Verdict::FailOutOfRange { angle } => println!("FAIL: {} out of range", angle),
//! }
//! ```

pub mod range;
pub mod validator;
pub mod verdict;

// Re-export main types at crate root
pub use range::{is_in_range, AngleRange, MAX_TURN_ANGLE, MIN_TURN_ANGLE};
pub use validator::{parse_angle, validate, validate_lenient, AngleValidator, ParseAngleError};
pub use verdict::Verdict;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports_agree() {
        assert_eq!(AngleRange::STEERING.min, MIN_TURN_ANGLE);
        assert_eq!(AngleRange::STEERING.max, MAX_TURN_ANGLE);
        assert_eq!(validate("100"), AngleValidator::new().validate("100"));
    }

    #[test]
    fn test_validate_agrees_with_is_in_range() {
        for raw in ["-180", "-181", "0", "179.99", "180", "181", "200"] {
            let angle: f64 = raw.parse().unwrap();
            assert_eq!(validate(raw).is_pass(), is_in_range(angle), "{raw}");
        }
    }
}
