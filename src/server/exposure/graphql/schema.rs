//! Schema model consumed by the executor
//!
//! The SDL is parsed once by `graphql-parser`; this module flattens the AST
//! into lookup tables the executor queries for every field: object fields
//! with their argument and return types, input objects, enums and custom
//! scalars.

use crate::core::error::{EngineError, EngineResult};
use graphql_parser::schema::{Definition, Type, TypeDefinition, parse_schema};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use super::executor::utils::gql_value_to_json;

/// Schema served by the engine
pub const MOVIES_SDL: &str = r#"scalar Date

enum Status {
  WATCHED
  INTERESTED
  NOT_INTERESTED
  UNKNOWN
}

type Actor {
  id: ID!
  name: String!
}

type Movie {
  id: ID!
  title: String
  releaseDate: Date
  rating: Int
  status: Status
  actor: [Actor]
}

input ActorInput {
  id: ID!
}

input MovieInput {
  id: ID
  title: String
  releaseDate: Date
  rating: Int
  status: Status
  actor: [ActorInput]
}

type Query {
  movies: [Movie]
  movie(id: ID): Movie
}

type Mutation {
  addMovie(movie: MovieInput): [Movie]
}
"#;

/// Built-in scalar names
pub const BUILTIN_SCALARS: &[&str] = &["ID", "String", "Int", "Float", "Boolean"];

/// A type reference as written in a field or argument declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Innermost named type (`[Movie!]!` -> `Movie`)
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.named_type(),
        }
    }

    fn from_ast(ty: &Type<'_, String>) -> Self {
        match ty {
            Type::NamedType(name) => TypeRef::Named(name.clone()),
            Type::ListType(inner) => TypeRef::List(Box::new(Self::from_ast(inner))),
            Type::NonNullType(inner) => TypeRef::NonNull(Box::new(Self::from_ast(inner))),
        }
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// Argument or input-object field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDef {
    pub ty: TypeRef,
    pub default: Option<Value>,
}

/// Output field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub ty: TypeRef,
    pub args: IndexMap<String, InputValueDef>,
}

/// What a named type is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Object,
    InputObject,
    Enum,
    Scalar,
}

/// Flattened, query-ready view of a parsed schema
#[derive(Debug, Clone)]
pub struct SchemaModel {
    sdl: String,
    query_type: String,
    mutation_type: Option<String>,
    objects: IndexMap<String, IndexMap<String, FieldDef>>,
    inputs: IndexMap<String, IndexMap<String, InputValueDef>>,
    enums: IndexMap<String, IndexSet<String>>,
    scalars: IndexSet<String>,
}

impl SchemaModel {
    /// The movie schema
    pub fn movies() -> EngineResult<Self> {
        Self::parse(MOVIES_SDL)
    }

    /// Parse an SDL document into a schema model
    pub fn parse(sdl: &str) -> EngineResult<Self> {
        let doc = parse_schema::<String>(sdl)
            .map_err(|e| EngineError::Config(format!("Failed to parse schema: {}", e)))?;

        let mut model = Self {
            sdl: sdl.to_string(),
            query_type: "Query".to_string(),
            mutation_type: None,
            objects: IndexMap::new(),
            inputs: IndexMap::new(),
            enums: IndexMap::new(),
            scalars: IndexSet::new(),
        };
        let mut explicit_mutation = None;

        for definition in &doc.definitions {
            match definition {
                Definition::SchemaDefinition(schema) => {
                    if let Some(query) = &schema.query {
                        model.query_type = query.clone();
                    }
                    explicit_mutation = schema.mutation.clone();
                }
                Definition::TypeDefinition(TypeDefinition::Object(object)) => {
                    let fields = object
                        .fields
                        .iter()
                        .map(|field| {
                            let args = field
                                .arguments
                                .iter()
                                .map(|arg| (arg.name.clone(), input_value_def(arg)))
                                .collect();
                            let def = FieldDef {
                                ty: TypeRef::from_ast(&field.field_type),
                                args,
                            };
                            (field.name.clone(), def)
                        })
                        .collect();
                    model.objects.insert(object.name.clone(), fields);
                }
                Definition::TypeDefinition(TypeDefinition::InputObject(input)) => {
                    let fields = input
                        .fields
                        .iter()
                        .map(|field| (field.name.clone(), input_value_def(field)))
                        .collect();
                    model.inputs.insert(input.name.clone(), fields);
                }
                Definition::TypeDefinition(TypeDefinition::Enum(enum_type)) => {
                    let values = enum_type.values.iter().map(|v| v.name.clone()).collect();
                    model.enums.insert(enum_type.name.clone(), values);
                }
                Definition::TypeDefinition(TypeDefinition::Scalar(scalar)) => {
                    model.scalars.insert(scalar.name.clone());
                }
                Definition::TypeDefinition(other) => {
                    return Err(EngineError::Config(format!(
                        "Unsupported type definition: {:?}",
                        type_definition_name(other)
                    )));
                }
                Definition::TypeExtension(_) | Definition::DirectiveDefinition(_) => {}
            }
        }

        model.mutation_type = match explicit_mutation {
            Some(name) => Some(name),
            None => model
                .objects
                .contains_key("Mutation")
                .then(|| "Mutation".to_string()),
        };

        model.validate()?;
        Ok(model)
    }

    /// Every referenced type must be declared
    fn validate(&self) -> EngineResult<()> {
        if !self.objects.contains_key(&self.query_type) {
            return Err(EngineError::Config(format!(
                "Query type '{}' is not defined",
                self.query_type
            )));
        }

        for (type_name, fields) in &self.objects {
            for (field_name, field) in fields {
                let kind = self.kind_of(field.ty.named_type());
                if !matches!(
                    kind,
                    Some(TypeKind::Object | TypeKind::Enum | TypeKind::Scalar)
                ) {
                    return Err(EngineError::Config(format!(
                        "{}.{} has invalid output type {}",
                        type_name, field_name, field.ty
                    )));
                }
                for (arg_name, arg) in &field.args {
                    self.check_input_type(&arg.ty, &format!("{}.{}({})", type_name, field_name, arg_name))?;
                }
            }
        }

        for (input_name, fields) in &self.inputs {
            for (field_name, field) in fields {
                self.check_input_type(&field.ty, &format!("{}.{}", input_name, field_name))?;
            }
        }

        Ok(())
    }

    fn check_input_type(&self, ty: &TypeRef, location: &str) -> EngineResult<()> {
        match self.kind_of(ty.named_type()) {
            Some(TypeKind::InputObject | TypeKind::Enum | TypeKind::Scalar) => Ok(()),
            _ => Err(EngineError::Config(format!(
                "{} has invalid input type {}",
                location, ty
            ))),
        }
    }

    /// Original SDL text
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    /// Kind of a named type, built-in scalars included
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        if self.objects.contains_key(name) {
            Some(TypeKind::Object)
        } else if self.inputs.contains_key(name) {
            Some(TypeKind::InputObject)
        } else if self.enums.contains_key(name) {
            Some(TypeKind::Enum)
        } else if self.scalars.contains(name) || BUILTIN_SCALARS.contains(&name) {
            Some(TypeKind::Scalar)
        } else {
            None
        }
    }

    /// Declaration of `type_name.field_name`
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.objects.get(type_name)?.get(field_name)
    }

    /// Fields of an input object
    pub fn input_fields(&self, name: &str) -> Option<&IndexMap<String, InputValueDef>> {
        self.inputs.get(name)
    }

    /// Whether `value` is a member of enum `name`
    pub fn enum_has_value(&self, name: &str, value: &str) -> bool {
        self.enums
            .get(name)
            .is_some_and(|values| values.contains(value))
    }

    /// Custom (non built-in) scalars declared by the schema
    pub fn custom_scalars(&self) -> impl Iterator<Item = &str> {
        self.scalars.iter().map(String::as_str)
    }
}

fn input_value_def(value: &graphql_parser::schema::InputValue<'_, String>) -> InputValueDef {
    InputValueDef {
        ty: TypeRef::from_ast(&value.value_type),
        default: value.default_value.as_ref().map(gql_value_to_json),
    }
}

fn type_definition_name<'a>(def: &'a TypeDefinition<'_, String>) -> &'a str {
    match def {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}
