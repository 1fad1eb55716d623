//! Core GraphQL executor orchestration

use graphql_parser::query::{Definition, OperationDefinition, Type, VariableDefinition, parse_query};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::field_resolver::{ExecutionCtx, execute_selection_set};
use super::resolvers::ResolverMap;
use super::response::{GraphQLRequest, GraphQLResponse};
use super::utils;
use crate::core::context::OperationContext;
use crate::core::error::{EngineError, EngineResult};
use crate::core::scalar::ScalarRegistry;
use crate::server::exposure::graphql::schema::{SchemaModel, TypeKind};
use crate::server::host::ServerHost;

/// GraphQL executor for the movie schema
///
/// Built once per process: the schema, the resolver map and the scalar
/// codecs are fixed at construction and shared by every request.
#[derive(Clone)]
pub struct GraphQLExecutor {
    host: Arc<ServerHost>,
    schema: Arc<SchemaModel>,
    resolvers: Arc<ResolverMap>,
    scalars: Arc<ScalarRegistry>,
}

impl GraphQLExecutor {
    /// Create an executor for the movie schema with the default resolvers
    /// and scalar codecs
    pub fn new(host: Arc<ServerHost>) -> EngineResult<Self> {
        Self::with_parts(
            host,
            SchemaModel::movies()?,
            ResolverMap::movies(),
            ScalarRegistry::with_defaults(),
        )
    }

    /// Assemble an executor from explicit parts.
    ///
    /// Fails if a resolver is registered for a field the schema does not
    /// declare, or if a custom scalar has no codec.
    pub fn with_parts(
        host: Arc<ServerHost>,
        schema: SchemaModel,
        resolvers: ResolverMap,
        scalars: ScalarRegistry,
    ) -> EngineResult<Self> {
        for (type_name, field_name) in resolvers.keys() {
            if schema.field(type_name, field_name).is_none() {
                return Err(EngineError::Config(format!(
                    "Resolver registered for unknown field {}.{}",
                    type_name, field_name
                )));
            }
        }

        if let Some(missing) = schema.custom_scalars().find(|name| !scalars.contains(name)) {
            return Err(EngineError::Config(format!(
                "No codec registered for scalar {}",
                missing
            )));
        }

        Ok(Self {
            host,
            schema: Arc::new(schema),
            resolvers: Arc::new(resolvers),
            scalars: Arc::new(scalars),
        })
    }

    /// Schema SDL served by this executor
    pub fn sdl(&self) -> &str {
        self.schema.sdl()
    }

    pub fn host(&self) -> &Arc<ServerHost> {
        &self.host
    }

    /// Execute one request.
    ///
    /// Field failures are reported inside the response. `Err` is reserved for
    /// requests that cannot run at all (parse failure, no or unknown
    /// operation, subscriptions).
    pub async fn execute(
        &self,
        request: GraphQLRequest,
        context: OperationContext,
    ) -> EngineResult<GraphQLResponse> {
        let doc = parse_query::<String>(&request.query)
            .map_err(|e| EngineError::Query(format!("Failed to parse query: {}", e)))?;

        let mut operations = Vec::new();
        let mut fragments = HashMap::new();
        for definition in &doc.definitions {
            match definition {
                Definition::Operation(op) => operations.push(op),
                Definition::Fragment(fragment) => {
                    fragments.insert(fragment.name.clone(), fragment);
                }
            }
        }

        let operation = select_operation(&operations, request.operation_name.as_deref())?;

        let (root_type, selection_set, variable_definitions, serial) = match operation {
            OperationDefinition::SelectionSet(set) => (self.schema.query_type(), set, &[][..], false),
            OperationDefinition::Query(query) => (
                self.schema.query_type(),
                &query.selection_set,
                &query.variable_definitions[..],
                false,
            ),
            OperationDefinition::Mutation(mutation) => (
                self.schema
                    .mutation_type()
                    .ok_or_else(|| EngineError::Query("Schema does not support mutations".into()))?,
                &mutation.selection_set,
                &mutation.variable_definitions[..],
                true,
            ),
            OperationDefinition::Subscription(_) => {
                return Err(EngineError::Query("Subscriptions are not supported".into()));
            }
        };

        let variables = self.prepare_variables(
            variable_definitions,
            request.variables.unwrap_or_default(),
        )?;

        tracing::debug!(
            operation = ?operation_name(operation),
            root = %root_type,
            authenticated = context.is_authenticated(),
            "executing GraphQL operation"
        );

        let ctx = ExecutionCtx::new(
            self.host.clone(),
            self.schema.clone(),
            self.scalars.clone(),
            self.resolvers.clone(),
            fragments,
            variables,
            Arc::new(context),
        );

        let root_value = Value::Object(Map::new());
        let selections: Vec<_> = selection_set.items.iter().collect();
        let data = execute_selection_set(&ctx, root_type, &root_value, &selections, &[], serial)
            .await
            .map(Value::Object)
            .unwrap_or(Value::Null);

        Ok(GraphQLResponse {
            data,
            errors: ctx.into_errors(),
        })
    }

    /// Apply variable defaults and check that required variables were
    /// supplied. Values are coerced later, against the argument they are
    /// used in, so a bad value fails that field only.
    fn prepare_variables(
        &self,
        definitions: &[VariableDefinition<'_, String>],
        mut provided: Map<String, Value>,
    ) -> EngineResult<Map<String, Value>> {
        for definition in definitions {
            let type_name = named_type(&definition.var_type);
            if !matches!(
                self.schema.kind_of(type_name),
                Some(TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
            ) {
                return Err(EngineError::Query(format!(
                    "Variable \"${}\" cannot be of non-input type {}",
                    definition.name, type_name
                )));
            }

            if provided.contains_key(&definition.name) {
                continue;
            }
            match &definition.default_value {
                Some(default) => {
                    provided.insert(definition.name.clone(), utils::gql_value_to_json(default));
                }
                None if matches!(definition.var_type, Type::NonNullType(_)) => {
                    return Err(EngineError::Query(format!(
                        "Variable \"${}\" of required type was not provided",
                        definition.name
                    )));
                }
                None => {}
            }
        }
        Ok(provided)
    }
}

fn select_operation<'d, 'q>(
    operations: &[&'d OperationDefinition<'q, String>],
    name: Option<&str>,
) -> EngineResult<&'d OperationDefinition<'q, String>> {
    match (operations, name) {
        ([], _) => Err(EngineError::Query("No operation found in query".into())),
        (_, Some(name)) => operations
            .iter()
            .copied()
            .find(|op| operation_name(op) == Some(name))
            .ok_or_else(|| EngineError::Query(format!("Unknown operation named \"{}\"", name))),
        ([single], None) => Ok(*single),
        (_, None) => Err(EngineError::Query(
            "Must provide operation name if query contains multiple operations".into(),
        )),
    }
}

fn operation_name<'d>(operation: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

fn named_type<'a>(ty: &'a Type<'_, String>) -> &'a str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}
