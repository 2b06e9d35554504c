//! The outcome of validating a model response.

use serde::{Deserialize, Serialize};

/// Tagged result of [`validate`](crate::validate).
///
/// Failures are variants, not errors: callers decide how a failure maps to
/// console output or a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The response is a single number inside the allowed range.
    Pass {
        #[serde(with = "angle_repr")]
        angle: f64,
    },

    /// The response is not exactly one numeric literal.
    FailNotNumeric,

    /// The response parsed, but the angle lies outside the allowed range.
    FailOutOfRange {
        #[serde(with = "angle_repr")]
        angle: f64,
    },
}

/// Angles as JSON numbers, except non-finite values, which JSON cannot hold
/// and are written as `"inf"`, `"-inf"` or `"nan"`.
mod angle_repr {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(angle: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if angle.is_finite() {
            serializer.serialize_f64(*angle)
        } else if angle.is_nan() {
            serializer.serialize_str("nan")
        } else if angle.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AngleVisitor)
    }

    struct AngleVisitor;

    impl<'de> Visitor<'de> for AngleVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or one of \"inf\", \"-inf\", \"nan\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    /// The parsed angle, if parsing succeeded.
    pub fn angle(&self) -> Option<f64> {
        match self {
            Verdict::Pass { angle } | Verdict::FailOutOfRange { angle } => Some(*angle),
            Verdict::FailNotNumeric => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_accessor() {
        assert_eq!(Verdict::Pass { angle: 12.5 }.angle(), Some(12.5));
        assert_eq!(Verdict::FailOutOfRange { angle: 200.0 }.angle(), Some(200.0));
        assert_eq!(Verdict::FailNotNumeric.angle(), None);
    }

    #[test]
    fn test_only_pass_is_pass() {
        assert!(Verdict::Pass { angle: 0.0 }.is_pass());
        assert!(!Verdict::FailNotNumeric.is_pass());
        assert!(!Verdict::FailOutOfRange { angle: -181.0 }.is_pass());
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Verdict::Pass { angle: -15.0 }).unwrap();
        assert_eq!(json["verdict"], "pass");
        assert_eq!(json["angle"], -15.0);

        let json = serde_json::to_value(Verdict::FailNotNumeric).unwrap();
        assert_eq!(json, serde_json::json!({ "verdict": "fail_not_numeric" }));

        let parsed: Verdict =
            serde_json::from_str(r#"{"verdict":"fail_out_of_range","angle":181.0}"#).unwrap();
        assert_eq!(parsed, Verdict::FailOutOfRange { angle: 181.0 });

        let parsed: Verdict = serde_json::from_str(r#"{"verdict":"pass","angle":-15}"#).unwrap();
        assert_eq!(parsed, Verdict::Pass { angle: -15.0 });
    }

    #[test]
    fn test_overflowing_angle_survives_json() {
        let verdict = crate::validate("1e999");
        let text = serde_json::to_string(&verdict).unwrap();
        assert_eq!(text, r#"{"verdict":"fail_out_of_range","angle":"inf"}"#);
        assert_eq!(serde_json::from_str::<Verdict>(&text).unwrap(), verdict);

        let verdict = crate::validate("-1e999");
        let text = serde_json::to_string(&verdict).unwrap();
        assert!(text.contains(r#""angle":"-inf""#));
        assert_eq!(serde_json::from_str::<Verdict>(&text).unwrap(), verdict);
    }

    #[test]
    fn test_nan_angle_written_as_text() {
        let text = serde_json::to_string(&Verdict::FailOutOfRange { angle: f64::NAN }).unwrap();
        assert!(text.contains(r#""angle":"nan""#));

        let parsed: Verdict = serde_json::from_str(&text).unwrap();
        assert!(parsed.angle().unwrap().is_nan());
    }

    #[test]
    fn test_unknown_angle_text_rejected() {
        let result = serde_json::from_str::<Verdict>(r#"{"verdict":"pass","angle":"left"}"#);
        assert!(result.is_err());
    }
}
