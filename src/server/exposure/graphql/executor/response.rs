//! Request and response envelopes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a GraphQL request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(default)]
    pub variables: Option<Map<String, Value>>,

    #[serde(default)]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Attach variables. Anything but a JSON object is ignored.
    pub fn with_variables(mut self, variables: Value) -> Self {
        if let Value::Object(map) = variables {
            self.variables = Some(map);
        }
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// One step of a response path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A field-level failure: the field resolved to null and this entry explains
/// why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub path: Vec<PathSegment>,
}

/// Result of executing one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResponse {
    pub data: Value,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl GraphQLResponse {
    /// Serialize to the JSON body sent to clients
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("data".to_string(), self.data.clone());
        if !self.errors.is_empty() {
            body.insert(
                "errors".to_string(),
                serde_json::to_value(&self.errors).unwrap_or(Value::Null),
            );
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_camel_case_operation_name() {
        let request: GraphQLRequest = serde_json::from_value(json!({
            "query": "query A { movies { id } }",
            "operationName": "A",
            "variables": { "id": "x" }
        }))
        .unwrap();
        assert_eq!(request.operation_name.as_deref(), Some("A"));
        assert_eq!(request.variables.unwrap()["id"], json!("x"));
    }

    #[test]
    fn test_errors_are_omitted_when_empty() {
        let response = GraphQLResponse {
            data: json!({ "movies": [] }),
            errors: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": { "movies": [] } })
        );
        assert_eq!(response.to_json(), json!({ "data": { "movies": [] } }));
    }

    #[test]
    fn test_error_path_mixes_keys_and_indices() {
        let response = GraphQLResponse {
            data: json!({ "movies": [{ "actor": null }] }),
            errors: vec![FieldError {
                message: "boom".to_string(),
                path: vec![
                    PathSegment::Key("movies".to_string()),
                    PathSegment::Index(0),
                    PathSegment::Key("actor".to_string()),
                ],
            }],
        };
        assert_eq!(
            response.to_json()["errors"],
            json!([{ "message": "boom", "path": ["movies", 0, "actor"] }])
        );
    }
}
