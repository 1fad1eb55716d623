//! Field collection, resolution and value completion
//!
//! Every field is resolved in isolation: a resolver error, a failed argument
//! or an uncoercible leaf turns that field into `null` and records one error
//! with its response path. A `null` in a non-null position propagates to the
//! nearest nullable ancestor.

use futures::future::{BoxFuture, FutureExt, join_all};
use graphql_parser::query::{Field, FragmentDefinition, Selection, TypeCondition};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::coercion::Coercer;
use super::resolvers::{ResolverContext, ResolverMap};
use super::response::{FieldError, PathSegment};
use super::utils;
use crate::core::context::OperationContext;
use crate::core::error::{EngineError, EngineResult};
use crate::core::scalar::ScalarRegistry;
use crate::server::exposure::graphql::schema::{FieldDef, SchemaModel, TypeKind, TypeRef};
use crate::server::host::ServerHost;

/// State for one operation
///
/// `'d` is the borrow of the parsed document, `'q` the text it was parsed
/// from.
pub struct ExecutionCtx<'d, 'q> {
    pub host: Arc<ServerHost>,
    pub schema: Arc<SchemaModel>,
    pub scalars: Arc<ScalarRegistry>,
    pub resolvers: Arc<ResolverMap>,
    pub fragments: HashMap<String, &'d FragmentDefinition<'q, String>>,
    pub variables: Map<String, Value>,
    pub operation: Arc<OperationContext>,
    errors: Mutex<Vec<FieldError>>,
}

/// Fields of one selection set grouped by response key, in document order
type FieldGroups<'d, 'q> = IndexMap<String, Vec<&'d Field<'q, String>>>;

impl<'d, 'q> ExecutionCtx<'d, 'q> {
    pub fn new(
        host: Arc<ServerHost>,
        schema: Arc<SchemaModel>,
        scalars: Arc<ScalarRegistry>,
        resolvers: Arc<ResolverMap>,
        fragments: HashMap<String, &'d FragmentDefinition<'q, String>>,
        variables: Map<String, Value>,
        operation: Arc<OperationContext>,
    ) -> Self {
        Self {
            host,
            schema,
            scalars,
            resolvers,
            fragments,
            variables,
            operation,
            errors: Mutex::new(Vec::new()),
        }
    }

    fn coercer(&self) -> Coercer<'_> {
        Coercer::new(&self.schema, &self.scalars)
    }

    /// Record a field error
    pub fn record(&self, message: impl Into<String>, path: &[PathSegment]) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(FieldError {
                message: message.into(),
                path: path.to_vec(),
            });
        }
    }

    /// Errors recorded so far
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Group the fields of `selections` that apply to `type_name`,
    /// expanding fragments and honoring `@skip` / `@include`
    pub fn collect_fields(
        &self,
        type_name: &str,
        selections: &[&'d Selection<'q, String>],
    ) -> FieldGroups<'d, 'q> {
        let mut groups = IndexMap::new();
        let mut visited = HashSet::new();
        self.collect_into(type_name, selections, &mut visited, &mut groups);
        groups
    }

    fn collect_into(
        &self,
        type_name: &str,
        selections: &[&'d Selection<'q, String>],
        visited: &mut HashSet<&'d str>,
        groups: &mut FieldGroups<'d, 'q>,
    ) {
        for &selection in selections {
            match selection {
                Selection::Field(field) => {
                    if !utils::should_include(&field.directives, &self.variables) {
                        continue;
                    }
                    let key = field.alias.as_ref().unwrap_or(&field.name).clone();
                    groups.entry(key).or_default().push(field);
                }
                Selection::FragmentSpread(spread) => {
                    if !utils::should_include(&spread.directives, &self.variables)
                        || !visited.insert(spread.fragment_name.as_str())
                    {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(&spread.fragment_name).copied() else {
                        continue;
                    };
                    if !applies(&fragment.type_condition, type_name) {
                        continue;
                    }
                    let nested: Vec<_> = fragment.selection_set.items.iter().collect();
                    self.collect_into(type_name, &nested, visited, groups);
                }
                Selection::InlineFragment(inline) => {
                    if !utils::should_include(&inline.directives, &self.variables) {
                        continue;
                    }
                    if inline
                        .type_condition
                        .as_ref()
                        .is_some_and(|condition| !applies(condition, type_name))
                    {
                        continue;
                    }
                    let nested: Vec<_> = inline.selection_set.items.iter().collect();
                    self.collect_into(type_name, &nested, visited, groups);
                }
            }
        }
    }

    /// Coerce the arguments written on `field` against its declaration
    fn coerce_arguments(
        &self,
        def: &FieldDef,
        field: &Field<'q, String>,
    ) -> EngineResult<Map<String, Value>> {
        if let Some((unknown, _)) = field
            .arguments
            .iter()
            .find(|(name, _)| !def.args.contains_key(name.as_str()))
        {
            return Err(EngineError::Query(format!(
                "Unknown argument \"{}\" on field \"{}\"",
                unknown, field.name
            )));
        }

        let coercer = self.coercer();
        let mut args = Map::new();
        for (name, arg) in &def.args {
            let given = field
                .arguments
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                // an unbound variable counts as not provided
                .filter(|v| match v {
                    graphql_parser::query::Value::Variable(var) => self.variables.contains_key(var),
                    _ => true,
                });

            match (given, &arg.default) {
                (Some(value), _) => {
                    args.insert(name.clone(), coercer.literal(&arg.ty, value, &self.variables)?);
                }
                (None, Some(default)) => {
                    args.insert(name.clone(), coercer.input(&arg.ty, default)?);
                }
                (None, None) if arg.ty.is_non_null() => {
                    return Err(EngineError::Query(format!(
                        "Argument \"{}\" of required type {} was not provided",
                        name, arg.ty
                    )));
                }
                (None, None) => {}
            }
        }
        Ok(args)
    }
}

fn applies(condition: &TypeCondition<'_, String>, type_name: &str) -> bool {
    let TypeCondition::On(name) = condition;
    name == type_name
}

/// A failed or null value in a nullable position becomes `null`; in a
/// non-null position it stays `None` and keeps propagating.
fn settle(ty: &TypeRef, completed: Option<Value>) -> Option<Value> {
    match completed {
        None if !ty.is_non_null() => Some(Value::Null),
        other => other,
    }
}

fn child_path(path: &[PathSegment], segment: PathSegment) -> Vec<PathSegment> {
    let mut child = path.to_vec();
    child.push(segment);
    child
}

/// Execute a selection set against `parent`.
///
/// Sibling fields run concurrently unless `serial` is set (mutation root).
/// Returns `None` when a non-null field failed and the object itself must
/// become `null`.
pub fn execute_selection_set<'a, 'd, 'q>(
    ctx: &'a ExecutionCtx<'d, 'q>,
    type_name: &'a str,
    parent: &'a Value,
    selections: &'a [&'d Selection<'q, String>],
    path: &'a [PathSegment],
    serial: bool,
) -> BoxFuture<'a, Option<Map<String, Value>>>
where
    'q: 'd,
    'd: 'a,
{
    async move {
        let groups = ctx.collect_fields(type_name, selections);
        let mut object = Map::new();

        if serial {
            for (key, fields) in &groups {
                let value = execute_field(ctx, type_name, parent, key, fields, path).await?;
                object.insert(key.clone(), value);
            }
        } else {
            let values = join_all(
                groups
                    .iter()
                    .map(|(key, fields)| execute_field(ctx, type_name, parent, key, fields, path)),
            )
            .await;
            for ((key, _), value) in groups.iter().zip(values) {
                object.insert(key.clone(), value?);
            }
        }

        Some(object)
    }
    .boxed()
}

/// Resolve one response key of an object
fn execute_field<'a, 'd, 'q>(
    ctx: &'a ExecutionCtx<'d, 'q>,
    type_name: &'a str,
    parent: &'a Value,
    key: &'a str,
    fields: &'a [&'d Field<'q, String>],
    path: &'a [PathSegment],
) -> BoxFuture<'a, Option<Value>>
where
    'q: 'd,
    'd: 'a,
{
    async move {
        let field = fields.first()?;
        let field_name = field.name.as_str();
        let path = child_path(path, PathSegment::Key(key.to_string()));

        if field_name == "__typename" {
            return Some(Value::String(type_name.to_string()));
        }

        let Some(def) = ctx.schema.field(type_name, field_name) else {
            ctx.record(
                format!("Cannot query field \"{}\" on type \"{}\"", field_name, type_name),
                &path,
            );
            return Some(Value::Null);
        };

        let args = match ctx.coerce_arguments(def, field) {
            Ok(args) => args,
            Err(e) => {
                ctx.record(e.to_string(), &path);
                return settle(&def.ty, None);
            }
        };

        let resolved = match ctx.resolvers.get(type_name, field_name) {
            Some(resolver) => {
                resolver(ResolverContext {
                    host: ctx.host.clone(),
                    parent: parent.clone(),
                    args,
                    operation: ctx.operation.clone(),
                })
                .await
            }
            None => Ok(parent.get(field_name).cloned().unwrap_or(Value::Null)),
        };

        match resolved {
            Ok(value) => {
                let completed = complete_value(ctx, &def.ty, fields, value, &path).await;
                settle(&def.ty, completed)
            }
            Err(e) => {
                tracing::debug!(field = %field_name, error = %e, "field resolver failed");
                ctx.record(e.to_string(), &path);
                settle(&def.ty, None)
            }
        }
    }
    .boxed()
}

/// Shape a resolved value according to its declared type.
///
/// `None` means the value is null in a position that cannot hold null (or a
/// leaf failed); the error has already been recorded.
fn complete_value<'a, 'd, 'q>(
    ctx: &'a ExecutionCtx<'d, 'q>,
    ty: &'a TypeRef,
    fields: &'a [&'d Field<'q, String>],
    value: Value,
    path: &'a [PathSegment],
) -> BoxFuture<'a, Option<Value>>
where
    'q: 'd,
    'd: 'a,
{
    async move {
        if let TypeRef::NonNull(inner) = ty {
            return match complete_value(ctx, inner, fields, value, path).await {
                Some(Value::Null) => {
                    let field_name = fields.first().map(|f| f.name.as_str()).unwrap_or_default();
                    ctx.record(
                        format!("Cannot return null for non-nullable field {}", field_name),
                        path,
                    );
                    None
                }
                other => other,
            };
        }

        if value.is_null() {
            return Some(Value::Null);
        }

        match ty {
            TypeRef::List(inner) => {
                let items = match value {
                    Value::Array(items) => items,
                    other => {
                        ctx.record(format!("Expected a list, got {}", other), path);
                        return None;
                    }
                };
                let inner: &TypeRef = inner;
                let completed = join_all(items.into_iter().enumerate().map(|(i, item)| async move {
                    let item_path = child_path(path, PathSegment::Index(i));
                    settle(inner, complete_value(ctx, inner, fields, item, &item_path).await)
                }))
                .await;
                completed
                    .into_iter()
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array)
            }
            TypeRef::Named(name) => match ctx.schema.kind_of(name) {
                Some(TypeKind::Object) => {
                    let selections: Vec<&'d Selection<'q, String>> = fields
                        .iter()
                        .flat_map(|&f| f.selection_set.items.iter())
                        .collect();
                    execute_selection_set(ctx, name, &value, &selections, path, false)
                        .await
                        .map(Value::Object)
                }
                _ => match ctx.coercer().output(name, &value) {
                    Ok(leaf) => Some(leaf),
                    Err(e) => {
                        ctx.record(e.to_string(), path);
                        None
                    }
                },
            },
            TypeRef::NonNull(_) => None,
        }
    }
    .boxed()
}
