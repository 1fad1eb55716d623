//! Utility functions for GraphQL execution

use graphql_parser::query::{Directive, Value as GqlValue};
use serde_json::{Map, Value, json};

/// Convert GraphQL value to JSON
///
/// Variables are resolved against `variables`; an unbound variable reads as
/// null.
pub fn gql_value_to_json_with(value: &GqlValue<String>, variables: &Map<String, Value>) -> Value {
    match value {
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => i.as_i64().map(Value::from).unwrap_or(Value::Null),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|v| gql_value_to_json_with(v, variables))
                .collect(),
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json_with(v, variables));
            }
            Value::Object(map)
        }
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
    }
}

/// Convert a constant GraphQL value (schema defaults, variable defaults) to
/// JSON
pub fn gql_value_to_json(value: &GqlValue<String>) -> Value {
    gql_value_to_json_with(value, &Map::new())
}

/// Evaluate `@skip(if:)` / `@include(if:)` on a selection
///
/// A directive whose condition cannot be read as a boolean is ignored.
pub fn should_include(directives: &[Directive<'_, String>], variables: &Map<String, Value>) -> bool {
    for directive in directives {
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name.as_str() == "if")
            .and_then(|(_, value)| gql_value_to_json_with(value, variables).as_bool());

        match (directive.name.as_str(), condition) {
            ("skip", Some(true)) => return false,
            ("include", Some(false)) => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::query::{Definition, OperationDefinition, Selection, parse_query};

    fn included(query: &str, variables: &Map<String, Value>) -> bool {
        let doc = parse_query::<String>(query).unwrap();
        let Definition::Operation(OperationDefinition::SelectionSet(set)) = &doc.definitions[0]
        else {
            panic!("expected a shorthand query");
        };
        let Selection::Field(field) = &set.items[0] else {
            panic!("expected a field");
        };
        should_include(&field.directives, variables)
    }

    #[test]
    fn test_gql_value_to_json_resolves_variables() {
        let doc = parse_query::<String>(r#"{ movie(id: $id, tags: ["a", $tag]) { id } }"#).unwrap();
        let Definition::Operation(OperationDefinition::SelectionSet(set)) = &doc.definitions[0]
        else {
            panic!("expected a shorthand query");
        };
        let Selection::Field(field) = &set.items[0] else {
            panic!("expected a field");
        };

        let mut variables = Map::new();
        variables.insert("id".to_string(), json!("naeeurehnin"));

        assert_eq!(
            gql_value_to_json_with(&field.arguments[0].1, &variables),
            json!("naeeurehnin")
        );
        assert_eq!(
            gql_value_to_json_with(&field.arguments[1].1, &variables),
            json!(["a", null])
        );
    }

    #[test]
    fn test_skip_and_include() {
        let vars = Map::new();
        assert!(included("{ movies }", &vars));
        assert!(!included("{ movies @skip(if: true) }", &vars));
        assert!(included("{ movies @skip(if: false) }", &vars));
        assert!(!included("{ movies @include(if: false) }", &vars));
        assert!(included("{ movies @include(if: true) }", &vars));
    }

    #[test]
    fn test_directive_conditions_from_variables() {
        let mut vars = Map::new();
        vars.insert("hide".to_string(), json!(true));
        assert!(!included("{ movies @skip(if: $hide) }", &vars));

        vars.insert("hide".to_string(), json!(false));
        assert!(included("{ movies @skip(if: $hide) }", &vars));

        // unbound variable: directive ignored
        assert!(included("{ movies @include(if: $missing) }", &vars));
    }
}
