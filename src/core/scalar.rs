//! Custom scalar codecs
//!
//! A codec moves a scalar between three shapes:
//!
//! - the *wire* form sent to and received from clients (JSON),
//! - the *internal* form stored on parent values (JSON produced by the
//!   entity's `Serialize` impl),
//! - a *literal* written directly in the operation text.
//!
//! Codecs are looked up by scalar name through a [`ScalarRegistry`] built
//! once at startup.

use crate::core::error::{EngineError, EngineResult};
use chrono::{DateTime, NaiveDate, Utc};
use graphql_parser::query::Value as GqlValue;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Bidirectional coercion for one custom scalar type
pub trait ScalarCodec: Send + Sync {
    /// Scalar name as declared in the schema
    fn name(&self) -> &'static str;

    /// Internal value to wire value (outbound)
    fn serialize(&self, internal: &Value) -> EngineResult<Value>;

    /// Wire value to internal value (variables, inbound)
    fn parse_value(&self, wire: &Value) -> EngineResult<Value>;

    /// Operation-text literal to internal value.
    ///
    /// Returns `None` for literal shapes the scalar does not accept; this is
    /// read as "no value", not as an error.
    fn parse_literal(&self, literal: &GqlValue<'_, String>) -> Option<Value>;
}

/// `Date` scalar: milliseconds since the Unix epoch on the wire
#[derive(Debug, Clone, Copy, Default)]
pub struct DateScalar;

/// Plain-date layouts accepted by [`DateScalar::parse`], read as UTC midnight
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m-%d-%Y", "%m/%d/%Y", "%Y/%m/%d"];

impl DateScalar {
    pub const NAME: &'static str = "Date";

    /// Date to epoch milliseconds
    pub fn to_millis(date: &DateTime<Utc>) -> i64 {
        date.timestamp_millis()
    }

    /// Epoch milliseconds to date
    pub fn from_millis(millis: i64) -> EngineResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            EngineError::coercion(Self::NAME, format!("{} is out of range", millis))
        })
    }

    /// Build a date from anything date construction accepts: epoch
    /// milliseconds as a number or numeric string, RFC 3339 text, or a
    /// plain calendar date.
    pub fn parse(wire: &Value) -> EngineResult<DateTime<Utc>> {
        match wire {
            Value::Number(n) => {
                if let Some(millis) = n.as_i64() {
                    Self::from_millis(millis)
                } else if let Some(millis) = n.as_f64().filter(|f| f.is_finite()) {
                    Self::from_millis(millis.trunc() as i64)
                } else {
                    Err(EngineError::coercion(Self::NAME, format!("invalid number {}", n)))
                }
            }
            Value::String(s) => Self::parse_str(s.trim()),
            other => Err(EngineError::coercion(
                Self::NAME,
                format!("expected a string or a number, got {}", other),
            )),
        }
    }

    fn parse_str(s: &str) -> EngineResult<DateTime<Utc>> {
        if let Ok(millis) = s.parse::<i64>() {
            return Self::from_millis(millis);
        }
        if let Ok(date) = DateTime::parse_from_rfc3339(s) {
            return Ok(date.with_timezone(&Utc));
        }
        DATE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDate::parse_from_str(s, layout).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| EngineError::coercion(Self::NAME, format!("invalid date '{}'", s)))
    }

    fn to_internal(date: DateTime<Utc>) -> EngineResult<Value> {
        serde_json::to_value(date).map_err(|e| EngineError::coercion(Self::NAME, e.to_string()))
    }
}

impl ScalarCodec for DateScalar {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn serialize(&self, internal: &Value) -> EngineResult<Value> {
        let date: DateTime<Utc> = serde_json::from_value(internal.clone())
            .or_else(|_| Self::parse(internal))?;
        Ok(Value::from(Self::to_millis(&date)))
    }

    fn parse_value(&self, wire: &Value) -> EngineResult<Value> {
        Self::to_internal(Self::parse(wire)?)
    }

    fn parse_literal(&self, literal: &GqlValue<'_, String>) -> Option<Value> {
        match literal {
            GqlValue::Int(n) => n
                .as_i64()
                .and_then(|millis| Self::from_millis(millis).ok())
                .and_then(|date| Self::to_internal(date).ok()),
            _ => None,
        }
    }
}

/// Registry of custom scalar codecs, keyed by scalar name
#[derive(Clone, Default)]
pub struct ScalarRegistry {
    codecs: HashMap<String, Arc<dyn ScalarCodec>>,
}

impl ScalarRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every scalar the movie schema declares
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(DateScalar);
        registry
    }

    /// Register (or replace) a codec under its own name
    pub fn register(&mut self, codec: impl ScalarCodec + 'static) {
        self.codecs
            .insert(codec.name().to_string(), Arc::new(codec));
    }

    /// Look up the codec for a scalar name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScalarCodec>> {
        self.codecs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::query::Number;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_serialize_emits_epoch_millis() {
        let internal = serde_json::to_value(ymd(1992, 11, 25)).unwrap();
        let wire = DateScalar.serialize(&internal).unwrap();
        assert_eq!(wire, json!(722649600000_i64));
    }

    #[test]
    fn test_millis_round_trip() {
        for millis in [0_i64, 722649600000, -86_400_000, 1_700_000_000_123] {
            let internal = DateScalar.parse_value(&json!(millis)).unwrap();
            assert_eq!(DateScalar.serialize(&internal).unwrap(), json!(millis));
        }
    }

    #[test]
    fn test_parse_value_accepts_date_strings() {
        let expected = json!(ymd(1992, 11, 25).timestamp_millis());
        for text in ["11-25-1992", "1992-11-25", "1992-11-25T00:00:00Z", "722649600000"] {
            let internal = DateScalar.parse_value(&json!(text)).unwrap();
            assert_eq!(DateScalar.serialize(&internal).unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = DateScalar.parse_value(&json!("not a date")).unwrap_err();
        assert!(matches!(err, EngineError::ScalarCoercion { .. }));
        assert!(DateScalar.parse_value(&json!(true)).is_err());
        assert!(DateScalar.parse_value(&json!({ "year": 1992 })).is_err());
    }

    #[test]
    fn test_parse_literal_accepts_only_ints() {
        let int = GqlValue::<String>::Int(Number::from(722649600_i32));
        let parsed = DateScalar.parse_literal(&int).unwrap();
        assert_eq!(DateScalar.serialize(&parsed).unwrap(), json!(722649600));

        let others = [
            GqlValue::<String>::String("1992-11-25".into()),
            GqlValue::Float(1.5),
            GqlValue::Boolean(true),
            GqlValue::Null,
            GqlValue::Enum("TODAY".into()),
            GqlValue::List(vec![]),
        ];
        for literal in &others {
            assert_eq!(DateScalar.parse_literal(literal), None, "{:?}", literal);
        }
    }

    #[test]
    fn test_registry_defaults() {
        let registry = ScalarRegistry::with_defaults();
        assert!(registry.contains("Date"));
        assert!(registry.get("Decimal").is_none());
        assert_eq!(registry.get("Date").unwrap().name(), "Date");
    }
}
