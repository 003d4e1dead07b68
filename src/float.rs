//! Serde helpers for `f64` fields that may hold NaN or infinities.
//!
//! JSON has no literal for non-finite numbers, so they are written as the
//! strings `"NaN"`, `"inf"` and `"-inf"`. Finite values stay plain numbers.
//! Use with `#[serde(with = "crate::float")]` and the `option` / `vec`
//! submodules for wrapped fields.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

struct Float(f64);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            serializer.collect_str(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Float {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FloatVisitor;

        impl Visitor<'_> for FloatVisitor {
            type Value = Float;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Float, E> {
                Ok(Float(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Float, E> {
                Ok(Float(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Float, E> {
                Ok(Float(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Float, E> {
                v.parse()
                    .map(Float)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(FloatVisitor)
    }
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    Float(*value).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Float::deserialize(deserializer).map(|f| f.0)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(Float).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        Ok(Option::<Float>::deserialize(deserializer)?.map(|f| f.0))
    }
}

pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&v| Float(v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Float>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|f| f.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "crate::float")]
        plain: f64,
        #[serde(with = "crate::float::option")]
        maybe: Option<f64>,
        #[serde(with = "crate::float::vec")]
        many: Vec<f64>,
    }

    #[test]
    fn test_non_finite_values_are_strings() {
        let sample = Sample {
            plain: f64::NAN,
            maybe: Some(f64::NEG_INFINITY),
            many: vec![1.5, f64::INFINITY],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"plain":"NaN","maybe":"-inf","many":[1.5,"inf"]}"#);

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert!(back.plain.is_nan());
        assert_eq!(back.maybe, Some(f64::NEG_INFINITY));
        assert_eq!(back.many, vec![1.5, f64::INFINITY]);
    }

    #[test]
    fn test_plain_numbers_and_null_still_read() {
        let back: Sample =
            serde_json::from_str(r#"{"plain":3,"maybe":null,"many":[0.25,-2]}"#).unwrap();
        assert_eq!(back.plain, 3.0);
        assert_eq!(back.maybe, None);
        assert_eq!(back.many, vec![0.25, -2.0]);

        let bad = r#"{"plain":"fast","maybe":null,"many":[]}"#;
        assert!(serde_json::from_str::<Sample>(bad).is_err());
    }
}
