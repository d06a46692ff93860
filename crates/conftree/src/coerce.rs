//! Scalar coercion rules behind the typed accessors.

use crate::duration::parse_duration;
use crate::error::TreeError;
use crate::path::Path;
use crate::value::{Scalar, TreeValue};
use std::time::Duration;

/// A type a located scalar can be coerced into.
pub trait Coerce: Sized {
    /// Name used in type-mismatch errors.
    const EXPECTED: &'static str;

    /// Coerce `value`, found at `path`, into `Self`.
    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError>;
}

fn mismatch<T: Coerce>(value: &TreeValue, path: &Path) -> TreeError {
    TreeError::TypeMismatch {
        path: path.clone(),
        expected: T::EXPECTED,
        found: value.kind(),
    }
}

fn parse_failure<T: Coerce>(input: &str, path: &Path) -> TreeError {
    TreeError::ParseFailure {
        path: path.clone(),
        target: T::EXPECTED,
        input: input.to_string(),
    }
}

/// Boolean text as accepted by configuration files and environment overlays.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

impl Coerce for bool {
    const EXPECTED: &'static str = "bool";

    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError> {
        match value {
            TreeValue::Scalar(Scalar::Bool(b)) => Ok(*b),
            TreeValue::Scalar(Scalar::String(s)) => {
                parse_bool(s).ok_or_else(|| parse_failure::<Self>(s, path))
            }
            other => Err(mismatch::<Self>(other, path)),
        }
    }
}

impl Coerce for i64 {
    const EXPECTED: &'static str = "int";

    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError> {
        match value {
            TreeValue::Scalar(Scalar::Int(i)) => Ok(*i),
            TreeValue::Scalar(Scalar::Float(x)) => {
                // i64::MAX as f64 rounds up to 2^63, hence the strict bound.
                if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64 {
                    Ok(*x as i64)
                } else {
                    Err(TreeError::NotIntegral {
                        path: path.clone(),
                        value: *x,
                    })
                }
            }
            TreeValue::Scalar(Scalar::String(s)) => {
                s.parse().map_err(|_| parse_failure::<Self>(s, path))
            }
            other => Err(mismatch::<Self>(other, path)),
        }
    }
}

impl Coerce for f64 {
    const EXPECTED: &'static str = "float";

    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError> {
        match value {
            TreeValue::Scalar(Scalar::Float(x)) => Ok(*x),
            TreeValue::Scalar(Scalar::Int(i)) => Ok(*i as f64),
            TreeValue::Scalar(Scalar::String(s)) => {
                s.parse().map_err(|_| parse_failure::<Self>(s, path))
            }
            other => Err(mismatch::<Self>(other, path)),
        }
    }
}

impl Coerce for String {
    const EXPECTED: &'static str = "string";

    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError> {
        match value {
            TreeValue::Scalar(scalar) => Ok(scalar.to_string()),
            other => Err(mismatch::<Self>(other, path)),
        }
    }
}

impl Coerce for Duration {
    const EXPECTED: &'static str = "duration";

    fn coerce(value: &TreeValue, path: &Path) -> Result<Self, TreeError> {
        match value {
            TreeValue::Scalar(Scalar::String(s)) => {
                parse_duration(s).ok_or_else(|| parse_failure::<Self>(s, path))
            }
            other => Err(mismatch::<Self>(other, path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NodeKind;

    fn at() -> Path {
        Path::parse("x").unwrap()
    }

    #[test]
    fn test_bool() {
        assert!(bool::coerce(&TreeValue::from(true), &at()).unwrap());
        assert!(bool::coerce(&TreeValue::from("True"), &at()).unwrap());
        assert!(!bool::coerce(&TreeValue::from("0"), &at()).unwrap());
        assert!(matches!(
            bool::coerce(&TreeValue::from("yes"), &at()),
            Err(TreeError::ParseFailure { target: "bool", .. })
        ));
        assert_eq!(
            bool::coerce(&TreeValue::from(1), &at()).unwrap_err(),
            TreeError::TypeMismatch {
                path: at(),
                expected: "bool",
                found: NodeKind::Int
            }
        );
    }

    #[test]
    fn test_int() {
        assert_eq!(i64::coerce(&TreeValue::from(42), &at()).unwrap(), 42);
        assert_eq!(i64::coerce(&TreeValue::from(3.0), &at()).unwrap(), 3);
        assert_eq!(i64::coerce(&TreeValue::from("-7"), &at()).unwrap(), -7);
        assert!(matches!(
            i64::coerce(&TreeValue::from(3.5), &at()),
            Err(TreeError::NotIntegral { .. })
        ));
        assert!(matches!(
            i64::coerce(&TreeValue::from(f64::NAN), &at()),
            Err(TreeError::NotIntegral { .. })
        ));
        assert!(matches!(
            i64::coerce(&TreeValue::from("3.0"), &at()),
            Err(TreeError::ParseFailure { .. })
        ));
        assert!(matches!(
            i64::coerce(&TreeValue::from(false), &at()),
            Err(TreeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_float() {
        assert_eq!(f64::coerce(&TreeValue::from(2), &at()).unwrap(), 2.0);
        assert_eq!(f64::coerce(&TreeValue::from("0.25"), &at()).unwrap(), 0.25);
        assert!(f64::coerce(&TreeValue::mapping(), &at()).is_err());
    }

    #[test]
    fn test_string_formats_scalars() {
        assert_eq!(String::coerce(&TreeValue::from(true), &at()).unwrap(), "true");
        assert_eq!(String::coerce(&TreeValue::from(12), &at()).unwrap(), "12");
        assert_eq!(String::coerce(&TreeValue::from(0.5), &at()).unwrap(), "0.5");
        assert!(String::coerce(&TreeValue::sequence(), &at()).is_err());
        assert!(String::coerce(&TreeValue::Null, &at()).is_err());
    }

    #[test]
    fn test_duration_only_from_string() {
        assert_eq!(
            Duration::coerce(&TreeValue::from("1m30s"), &at()).unwrap(),
            Duration::from_secs(90)
        );
        assert!(matches!(
            Duration::coerce(&TreeValue::from(5), &at()),
            Err(TreeError::TypeMismatch {
                expected: "duration",
                ..
            })
        ));
        assert!(matches!(
            Duration::coerce(&TreeValue::from("soon"), &at()),
            Err(TreeError::ParseFailure { .. })
        ));
    }
}
