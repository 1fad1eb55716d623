//! Input and output coercion against the schema model
//!
//! Inbound values come in two shapes: literals written in the operation text
//! and JSON variables. Both are coerced to the *internal* JSON form handed to
//! resolvers. Outbound leaf values are checked against their declared scalar
//! or enum and custom scalars go through their codec.

use crate::core::error::{EngineError, EngineResult};
use crate::core::scalar::ScalarRegistry;
use crate::server::exposure::graphql::schema::{SchemaModel, TypeKind, TypeRef};
use graphql_parser::query::Value as GqlValue;
use serde_json::{Map, Value};

/// Coerces values against one schema and its scalar codecs
#[derive(Clone, Copy)]
pub struct Coercer<'a> {
    schema: &'a SchemaModel,
    scalars: &'a ScalarRegistry,
}

impl<'a> Coercer<'a> {
    pub fn new(schema: &'a SchemaModel, scalars: &'a ScalarRegistry) -> Self {
        Self { schema, scalars }
    }

    /// Coerce a literal from the operation text to `ty`.
    ///
    /// Variables met inside the literal are looked up in `variables` and
    /// coerced as JSON input.
    pub fn literal(
        &self,
        ty: &TypeRef,
        value: &GqlValue<'_, String>,
        variables: &Map<String, Value>,
    ) -> EngineResult<Value> {
        if let GqlValue::Variable(name) = value {
            let raw = variables.get(name).cloned().unwrap_or(Value::Null);
            return self.input(ty, &raw);
        }

        match ty {
            TypeRef::NonNull(inner) => {
                if matches!(value, GqlValue::Null) {
                    return Err(EngineError::Query(format!(
                        "Expected value of non-null type {}, found null",
                        ty
                    )));
                }
                self.literal(inner, value, variables)
            }
            _ if matches!(value, GqlValue::Null) => Ok(Value::Null),
            TypeRef::List(inner) => match value {
                GqlValue::List(items) => items
                    .iter()
                    .map(|item| self.literal(inner, item, variables))
                    .collect::<EngineResult<Vec<_>>>()
                    .map(Value::Array),
                single => Ok(Value::Array(vec![self.literal(inner, single, variables)?])),
            },
            TypeRef::Named(name) => self.named_literal(name, value, variables),
        }
    }

    fn named_literal(
        &self,
        name: &str,
        value: &GqlValue<'_, String>,
        variables: &Map<String, Value>,
    ) -> EngineResult<Value> {
        match self.schema.kind_of(name) {
            Some(TypeKind::Scalar) => {
                if let Some(codec) = self.scalars.get(name) {
                    return Ok(codec.parse_literal(value).unwrap_or(Value::Null));
                }
                let json = match value {
                    GqlValue::Int(n) => n.as_i64().map(Value::from).unwrap_or(Value::Null),
                    GqlValue::Float(f) => Value::from(*f),
                    GqlValue::String(s) => Value::String(s.clone()),
                    GqlValue::Boolean(b) => Value::Bool(*b),
                    _ => return Err(invalid_literal(name)),
                };
                // string literals are not numbers, even if they look like one
                match (name, value) {
                    ("Int" | "Float", GqlValue::String(_)) => Err(invalid_literal(name)),
                    ("String" | "Boolean", GqlValue::Int(_) | GqlValue::Float(_)) => {
                        Err(invalid_literal(name))
                    }
                    ("ID", GqlValue::Float(_) | GqlValue::Boolean(_)) => Err(invalid_literal(name)),
                    _ => self.builtin_input(name, &json),
                }
            }
            Some(TypeKind::Enum) => match value {
                GqlValue::Enum(symbol) if self.schema.enum_has_value(name, symbol) => {
                    Ok(Value::String(symbol.clone()))
                }
                _ => Err(EngineError::coercion(
                    name,
                    format!("value {:?} is not a member of the enum", value),
                )),
            },
            Some(TypeKind::InputObject) => {
                let GqlValue::Object(fields) = value else {
                    return Err(EngineError::Query(format!(
                        "Expected an object for input type {}",
                        name
                    )));
                };
                let provided = fields
                    .iter()
                    .map(|(key, v)| (key.as_str(), v))
                    .collect::<Vec<_>>();
                self.input_object(name, &provided, |ty, v| self.literal(ty, v, variables))
            }
            _ => Err(EngineError::Query(format!("{} is not an input type", name))),
        }
    }

    /// Coerce a JSON input value (a variable or a default) to `ty`
    pub fn input(&self, ty: &TypeRef, value: &Value) -> EngineResult<Value> {
        match ty {
            TypeRef::NonNull(inner) => {
                if value.is_null() {
                    return Err(EngineError::Query(format!(
                        "Expected value of non-null type {}, found null",
                        ty
                    )));
                }
                self.input(inner, value)
            }
            _ if value.is_null() => Ok(Value::Null),
            TypeRef::List(inner) => match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| self.input(inner, item))
                    .collect::<EngineResult<Vec<_>>>()
                    .map(Value::Array),
                single => Ok(Value::Array(vec![self.input(inner, single)?])),
            },
            TypeRef::Named(name) => match self.schema.kind_of(name) {
                Some(TypeKind::Scalar) => match self.scalars.get(name) {
                    Some(codec) => codec.parse_value(value),
                    None => self.builtin_input(name, value),
                },
                Some(TypeKind::Enum) => match value.as_str() {
                    Some(symbol) if self.schema.enum_has_value(name, symbol) => {
                        Ok(Value::String(symbol.to_string()))
                    }
                    _ => Err(EngineError::coercion(
                        name.as_str(),
                        format!("value {} is not a member of the enum", value),
                    )),
                },
                Some(TypeKind::InputObject) => {
                    let Value::Object(fields) = value else {
                        return Err(EngineError::Query(format!(
                            "Expected an object for input type {}",
                            name
                        )));
                    };
                    let provided = fields
                        .iter()
                        .map(|(key, v)| (key.as_str(), v))
                        .collect::<Vec<_>>();
                    self.input_object(name, &provided, |ty, v| self.input(ty, v))
                }
                _ => Err(EngineError::Query(format!("{} is not an input type", name))),
            },
        }
    }

    /// Shared input-object walk for literals and JSON.
    ///
    /// Unknown fields are rejected, so nested object graphs never reach a
    /// resolver through an input type.
    fn input_object<V>(
        &self,
        name: &str,
        provided: &[(&str, &V)],
        coerce: impl Fn(&TypeRef, &V) -> EngineResult<Value>,
    ) -> EngineResult<Value> {
        let declared = self
            .schema
            .input_fields(name)
            .ok_or_else(|| EngineError::Query(format!("Unknown input type {}", name)))?;

        if let Some((unknown, _)) = provided.iter().find(|(key, _)| !declared.contains_key(*key)) {
            return Err(EngineError::Query(format!(
                "Field \"{}\" is not defined by type {}",
                unknown, name
            )));
        }

        let mut out = Map::new();
        for (field_name, field) in declared {
            let given = provided
                .iter()
                .find(|(key, _)| *key == field_name.as_str())
                .map(|(_, v)| *v);

            match (given, &field.default) {
                (Some(v), _) => {
                    out.insert(field_name.clone(), coerce(&field.ty, v)?);
                }
                (None, Some(default)) => {
                    out.insert(field_name.clone(), self.input(&field.ty, default)?);
                }
                (None, None) if field.ty.is_non_null() => {
                    return Err(EngineError::Query(format!(
                        "Field {}.{} of required type {} was not provided",
                        name, field_name, field.ty
                    )));
                }
                (None, None) => {}
            }
        }
        Ok(Value::Object(out))
    }

    fn builtin_input(&self, name: &str, value: &Value) -> EngineResult<Value> {
        let coerced = match name {
            "Int" => value
                .as_i64()
                .filter(|n| i32::try_from(*n).is_ok())
                .map(Value::from),
            "Float" => value.as_f64().map(Value::from),
            "String" => value.as_str().map(|s| Value::String(s.to_string())),
            "Boolean" => value.as_bool().map(Value::Bool),
            "ID" => match value {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Number(n) if n.is_i64() || n.is_u64() => Some(Value::String(n.to_string())),
                _ => None,
            },
            _ => None,
        };
        coerced.ok_or_else(|| EngineError::coercion(name, format!("invalid input {}", value)))
    }

    /// Coerce a resolved leaf value to its declared scalar or enum
    pub fn output(&self, type_name: &str, value: &Value) -> EngineResult<Value> {
        match self.schema.kind_of(type_name) {
            Some(TypeKind::Enum) => match value.as_str() {
                Some(symbol) if self.schema.enum_has_value(type_name, symbol) => {
                    Ok(value.clone())
                }
                _ => Err(EngineError::coercion(
                    type_name,
                    format!("value {} is not a member of the enum", value),
                )),
            },
            Some(TypeKind::Scalar) => match self.scalars.get(type_name) {
                Some(codec) => codec.serialize(value),
                None => self.builtin_output(type_name, value),
            },
            _ => Err(EngineError::Query(format!(
                "{} is not a leaf type",
                type_name
            ))),
        }
    }

    fn builtin_output(&self, name: &str, value: &Value) -> EngineResult<Value> {
        let coerced = match (name, value) {
            ("Int", Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .filter(|n| i32::try_from(*n).is_ok())
                .map(Value::from),
            ("Int", Value::Bool(b)) => Some(Value::from(i32::from(*b))),
            ("Float", Value::Number(n)) => n.as_f64().map(Value::from),
            ("String", Value::String(_)) => Some(value.clone()),
            ("String", Value::Number(_) | Value::Bool(_)) => Some(Value::String(value.to_string())),
            ("Boolean", Value::Bool(_)) => Some(value.clone()),
            ("ID", Value::String(_)) => Some(value.clone()),
            ("ID", Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Some(Value::String(n.to_string()))
            }
            _ => None,
        };
        coerced.ok_or_else(|| EngineError::coercion(name, format!("cannot represent {}", value)))
    }
}

fn invalid_literal(name: &str) -> EngineError {
    EngineError::coercion(name, "invalid literal")
}
