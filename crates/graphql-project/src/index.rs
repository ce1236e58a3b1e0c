use crate::{document::name_span, LineIndex, Location, Range};
use apollo_parser::{
    cst::{self, CstNode},
    Parser,
};
use indexmap::IndexMap;
use std::fmt;

/// Definitions every schema gets for free. They have no file location.
const BUILT_IN_SDL: &str = r#"
"The `Int` scalar type represents non-fractional signed whole numeric values."
scalar Int
"The `Float` scalar type represents signed double-precision fractional values."
scalar Float
"The `String` scalar type represents textual data, represented as UTF-8 character sequences."
scalar String
"The `Boolean` scalar type represents `true` or `false`."
scalar Boolean
"The `ID` scalar type represents a unique identifier."
scalar ID

"Directs the executor to include this field or fragment only when the `if` argument is true."
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
"Directs the executor to skip this field or fragment when the `if` argument is true."
directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
"Marks an element of a GraphQL schema as no longer supported."
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
"Exposes a URL that specifies the behavior of this scalar."
directive @specifiedBy(url: String!) on SCALAR

type __Schema {
  description: String
  types: [__Type!]!
  queryType: __Type!
  mutationType: __Type
  subscriptionType: __Type
  directives: [__Directive!]!
}

type __Type {
  kind: __TypeKind!
  name: String
  description: String
  fields(includeDeprecated: Boolean = false): [__Field!]
  interfaces: [__Type!]
  possibleTypes: [__Type!]
  enumValues(includeDeprecated: Boolean = false): [__EnumValue!]
  inputFields(includeDeprecated: Boolean = false): [__InputValue!]
  ofType: __Type
  specifiedByURL: String
}

type __Field {
  name: String!
  description: String
  args(includeDeprecated: Boolean = false): [__InputValue!]!
  type: __Type!
  isDeprecated: Boolean!
  deprecationReason: String
}

type __InputValue {
  name: String!
  description: String
  type: __Type!
  defaultValue: String
  isDeprecated: Boolean!
  deprecationReason: String
}

type __EnumValue {
  name: String!
  description: String
  isDeprecated: Boolean!
  deprecationReason: String
}

type __Directive {
  name: String!
  description: String
  locations: [__DirectiveLocation!]!
  args(includeDeprecated: Boolean = false): [__InputValue!]!
  isRepeatable: Boolean!
}

enum __TypeKind {
  SCALAR
  OBJECT
  INTERFACE
  UNION
  ENUM
  INPUT_OBJECT
  LIST
  NON_NULL
}

enum __DirectiveLocation {
  QUERY
  MUTATION
  SUBSCRIPTION
  FIELD
  FRAGMENT_DEFINITION
  FRAGMENT_SPREAD
  INLINE_FRAGMENT
  VARIABLE_DEFINITION
  SCHEMA
  SCALAR
  OBJECT
  FIELD_DEFINITION
  ARGUMENT_DEFINITION
  INTERFACE
  UNION
  ENUM
  ENUM_VALUE
  INPUT_OBJECT
  INPUT_FIELD_DEFINITION
}
"#;

/// A type as written in a field, argument or variable: `User`, `[User!]!`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[must_use]
    pub fn non_null(inner: Self) -> Self {
        Self::NonNull(Box::new(inner))
    }

    #[must_use]
    pub fn list(inner: Self) -> Self {
        Self::List(Box::new(inner))
    }

    /// The innermost type name, with list and non-null wrappers removed
    #[must_use]
    pub fn named_type(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::List(inner) | Self::NonNull(inner) => inner.named_type(),
        }
    }

    #[must_use]
    pub const fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub(crate) fn from_cst(ty: &cst::Type) -> Option<Self> {
        match ty {
            cst::Type::NamedType(named) => Some(Self::named(named.name()?.text().to_string())),
            cst::Type::ListType(list) => Some(Self::list(Self::from_cst(&list.ty()?)?)),
            cst::Type::NonNullType(non_null) => {
                let inner = if let Some(named) = non_null.named_type() {
                    Self::named(named.name()?.text().to_string())
                } else {
                    Self::list(Self::from_cst(&non_null.list_type()?.ty()?)?)
                };
                Some(Self::non_null(inner))
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    Scalar,
}

impl TypeKind {
    /// The SDL keyword that declares this kind of type
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Object => "type",
            Self::Interface => "interface",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::InputObject => "input",
            Self::Scalar => "scalar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Read the operation keyword. A missing keyword is the `{ ... }` shorthand for a query.
    pub(crate) fn from_cst(operation_type: Option<&cst::OperationType>) -> Self {
        match operation_type {
            Some(op) if op.mutation_token().is_some() => Self::Mutation,
            Some(op) if op.subscription_token().is_some() => Self::Subscription,
            _ => Self::Query,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecation {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,

    /// Fields of objects and interfaces, or input fields of input objects
    pub fields: Vec<FieldDefinition>,

    /// Interfaces implemented by an object or interface
    pub interfaces: Vec<String>,

    /// Member types of a union
    pub members: Vec<String>,

    pub values: Vec<EnumValueDefinition>,

    /// `None` for built-in types and for types only seen in extensions
    pub location: Option<Location>,
}

impl TypeDefinition {
    fn empty(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: None,
            fields: Vec::new(),
            interfaces: Vec::new(),
            members: Vec::new(),
            values: Vec::new(),
            location: None,
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The declaration line of the type, e.g. `type User implements Node`
    #[must_use]
    pub fn declaration(&self) -> String {
        let mut declaration = format!("{} {}", self.kind.keyword(), self.name);
        if !self.interfaces.is_empty() {
            declaration.push_str(" implements ");
            declaration.push_str(&self.interfaces.join(" & "));
        }
        if !self.members.is_empty() {
            declaration.push_str(" = ");
            declaration.push_str(&self.members.join(" | "));
        }
        declaration
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub arguments: Vec<ArgumentDefinition>,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
    pub location: Option<Location>,
}

impl FieldDefinition {
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|argument| argument.name == name)
    }

    /// Arguments with a non-null type, in declaration order
    pub fn required_arguments(&self) -> impl Iterator<Item = &ArgumentDefinition> {
        self.arguments.iter().filter(|argument| argument.is_required())
    }

    /// `name(arg: Type): ReturnType`
    #[must_use]
    pub fn signature(&self) -> String {
        if self.arguments.is_empty() {
            return format!("{}: {}", self.name, self.ty);
        }

        let arguments = self
            .arguments
            .iter()
            .map(ArgumentDefinition::signature)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({arguments}): {}", self.name, self.ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeRef,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
}

impl ArgumentDefinition {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.ty.is_non_null()
    }

    /// `name: Type`, plus ` = default` when there is one
    #[must_use]
    pub fn signature(&self) -> String {
        match &self.default_value {
            Some(default) => format!("{}: {} = {default}", self.name, self.ty),
            None => format!("{}: {}", self.name, self.ty),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub deprecation: Option<Deprecation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<ArgumentDefinition>,
    pub location: Option<Location>,
}

/// One schema source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFile {
    pub uri: String,
    pub content: String,
}

/// Introspection fields that are valid without being declared
#[derive(Debug, Clone)]
struct MetaFields {
    typename: FieldDefinition,
    schema: FieldDefinition,
    type_: FieldDefinition,
}

impl MetaFields {
    fn new() -> Self {
        let meta = |name: &str, ty: TypeRef, arguments: Vec<ArgumentDefinition>, doc: &str| {
            FieldDefinition {
                name: name.to_string(),
                ty,
                arguments,
                description: Some(doc.to_string()),
                deprecation: None,
                location: None,
            }
        };

        Self {
            typename: meta(
                "__typename",
                TypeRef::non_null(TypeRef::named("String")),
                Vec::new(),
                "The name of the current Object type at runtime.",
            ),
            schema: meta(
                "__schema",
                TypeRef::non_null(TypeRef::named("__Schema")),
                Vec::new(),
                "Access the current type schema of this server.",
            ),
            type_: meta(
                "__type",
                TypeRef::named("__Type"),
                vec![ArgumentDefinition {
                    name: "name".to_string(),
                    ty: TypeRef::non_null(TypeRef::named("String")),
                    default_value: None,
                    description: None,
                    location: None,
                }],
                "Request the type information of a single type.",
            ),
        }
    }
}

/// Everything the editor features need to know about a schema.
#[derive(Debug, Clone)]
pub struct SchemaIndex {
    types: IndexMap<String, TypeDefinition>,
    directives: IndexMap<String, DirectiveDefinition>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    meta: MetaFields,
}

impl Default for SchemaIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaIndex {
    /// An index holding only the built-in scalars, directives and introspection types.
    #[must_use]
    pub fn new() -> Self {
        let mut index = Self {
            types: IndexMap::new(),
            directives: IndexMap::new(),
            query_type: None,
            mutation_type: None,
            subscription_type: None,
            meta: MetaFields::new(),
        };
        index.add_sdl(BUILT_IN_SDL, None);
        index
    }

    /// Build an index from SDL files. Syntax errors are tolerated: whatever the
    /// parser recovers is indexed.
    #[must_use]
    pub fn from_schema_files(files: &[SchemaFile]) -> Self {
        let mut index = Self::new();
        for file in files {
            index.add_sdl(&file.content, Some(&file.uri));
        }
        index.resolve_default_roots();

        tracing::debug!(
            files = files.len(),
            types = index.types.len(),
            "built schema index"
        );
        index
    }

    /// Build an index from a single SDL string located at `uri`.
    #[must_use]
    pub fn from_sdl(uri: &str, sdl: &str) -> Self {
        Self::from_schema_files(&[SchemaFile {
            uri: uri.to_string(),
            content: sdl.to_string(),
        }])
    }

    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// All types in declaration order, built-ins first
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// Declared fields of a type
    #[must_use]
    pub fn fields(&self, type_name: &str) -> Option<&[FieldDefinition]> {
        self.types.get(type_name).map(|ty| ty.fields.as_slice())
    }

    /// Look up a field, including `__typename` on composite types and
    /// `__schema`/`__type` on the query root.
    #[must_use]
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        match field_name {
            "__typename" if self.is_composite(type_name) => Some(&self.meta.typename),
            "__schema" if self.is_query_root(type_name) => Some(&self.meta.schema),
            "__type" if self.is_query_root(type_name) => Some(&self.meta.type_),
            _ => self.types.get(type_name)?.field(field_name),
        }
    }

    /// The `__typename: String!` introspection field
    #[must_use]
    pub const fn typename_field(&self) -> &FieldDefinition {
        &self.meta.typename
    }

    /// The `__schema` and `__type` introspection fields of the query root
    #[must_use]
    pub fn schema_introspection_fields(&self) -> [&FieldDefinition; 2] {
        [&self.meta.schema, &self.meta.type_]
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    #[must_use]
    pub fn query_type(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    #[must_use]
    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    #[must_use]
    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    #[must_use]
    pub fn root_type(&self, operation: OperationKind) -> Option<&str> {
        match operation {
            OperationKind::Query => self.query_type(),
            OperationKind::Mutation => self.mutation_type(),
            OperationKind::Subscription => self.subscription_type(),
        }
    }

    #[must_use]
    pub fn is_query_root(&self, type_name: &str) -> bool {
        self.query_type() == Some(type_name)
    }

    /// Objects, interfaces and unions: types that take a selection set
    #[must_use]
    pub fn is_composite(&self, type_name: &str) -> bool {
        self.types.get(type_name).is_some_and(|ty| {
            matches!(
                ty.kind,
                TypeKind::Object | TypeKind::Interface | TypeKind::Union
            )
        })
    }

    /// Interfaces and unions
    #[must_use]
    pub fn is_abstract(&self, type_name: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|ty| matches!(ty.kind, TypeKind::Interface | TypeKind::Union))
    }

    fn add_sdl(&mut self, sdl: &str, uri: Option<&str>) {
        let tree = Parser::new(sdl).parse();
        if tree.errors().len() > 0 {
            tracing::warn!(
                uri = uri.unwrap_or("<built-in>"),
                errors = tree.errors().len(),
                "schema has syntax errors, indexing what could be recovered"
            );
        }

        let mut builder = SchemaBuilder {
            index: self,
            uri,
            line_index: LineIndex::new(sdl),
        };
        for definition in tree.document().definitions() {
            builder.add_definition(&definition);
        }
    }

    fn resolve_default_roots(&mut self) {
        let default_root = |types: &IndexMap<String, TypeDefinition>, name: &str| {
            types.contains_key(name).then(|| name.to_string())
        };

        if self.query_type.is_none() {
            self.query_type = default_root(&self.types, "Query");
        }
        if self.mutation_type.is_none() {
            self.mutation_type = default_root(&self.types, "Mutation");
        }
        if self.subscription_type.is_none() {
            self.subscription_type = default_root(&self.types, "Subscription");
        }
    }
}

struct SchemaBuilder<'a> {
    index: &'a mut SchemaIndex,
    uri: Option<&'a str>,
    line_index: LineIndex,
}

impl SchemaBuilder<'_> {
    fn add_definition(&mut self, definition: &cst::Definition) {
        match definition {
            cst::Definition::ObjectTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                let fields = self.fields(def.fields_definition());
                let ty = self.declare(&name, TypeKind::Object, description, location);
                ty.interfaces.extend(interfaces(def.implements_interfaces()));
                ty.fields.extend(fields);
            }
            cst::Definition::ObjectTypeExtension(ext) => {
                let Some(name) = ext.name() else { return };
                let fields = self.fields(ext.fields_definition());
                let ty = self.extend(&name, TypeKind::Object);
                ty.interfaces.extend(interfaces(ext.implements_interfaces()));
                ty.fields.extend(fields);
            }
            cst::Definition::InterfaceTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                let fields = self.fields(def.fields_definition());
                let ty = self.declare(&name, TypeKind::Interface, description, location);
                ty.interfaces.extend(interfaces(def.implements_interfaces()));
                ty.fields.extend(fields);
            }
            cst::Definition::InterfaceTypeExtension(ext) => {
                let Some(name) = ext.name() else { return };
                let fields = self.fields(ext.fields_definition());
                let ty = self.extend(&name, TypeKind::Interface);
                ty.interfaces.extend(interfaces(ext.implements_interfaces()));
                ty.fields.extend(fields);
            }
            cst::Definition::UnionTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                let ty = self.declare(&name, TypeKind::Union, description, location);
                ty.members.extend(union_members(def.union_member_types()));
            }
            cst::Definition::UnionTypeExtension(ext) => {
                let Some(name) = ext.name() else { return };
                let ty = self.extend(&name, TypeKind::Union);
                ty.members.extend(union_members(ext.union_member_types()));
            }
            cst::Definition::EnumTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                let ty = self.declare(&name, TypeKind::Enum, description, location);
                ty.values.extend(enum_values(def.enum_values_definition()));
            }
            cst::Definition::EnumTypeExtension(ext) => {
                let Some(name) = ext.name() else { return };
                let ty = self.extend(&name, TypeKind::Enum);
                ty.values.extend(enum_values(ext.enum_values_definition()));
            }
            cst::Definition::InputObjectTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                let fields = self.input_fields(def.input_fields_definition());
                let ty = self.declare(&name, TypeKind::InputObject, description, location);
                ty.fields.extend(fields);
            }
            cst::Definition::InputObjectTypeExtension(ext) => {
                let Some(name) = ext.name() else { return };
                let fields = self.input_fields(ext.input_fields_definition());
                self.extend(&name, TypeKind::InputObject).fields.extend(fields);
            }
            cst::Definition::ScalarTypeDefinition(def) => {
                let Some(name) = def.name() else { return };
                let location = self.location(&name);
                let description = def.description().map(|d| description_text(&d));
                self.declare(&name, TypeKind::Scalar, description, location);
            }
            cst::Definition::ScalarTypeExtension(ext) => {
                if let Some(name) = ext.name() {
                    self.extend(&name, TypeKind::Scalar);
                }
            }
            cst::Definition::DirectiveDefinition(def) => {
                let Some(name) = def.name() else { return };
                let directive = DirectiveDefinition {
                    name: name.text().to_string(),
                    description: def.description().map(|d| description_text(&d)),
                    arguments: self.arguments(def.arguments_definition()),
                    location: self.location(&name),
                };
                self.index
                    .directives
                    .insert(directive.name.clone(), directive);
            }
            cst::Definition::SchemaDefinition(def) => {
                self.root_operations(def.root_operation_type_definitions());
            }
            cst::Definition::SchemaExtension(ext) => {
                self.root_operations(ext.root_operation_type_definitions());
            }
            _ => {}
        }
    }

    /// Record a type declaration, merging with any extension seen earlier.
    fn declare(
        &mut self,
        name: &cst::Name,
        kind: TypeKind,
        description: Option<String>,
        location: Option<Location>,
    ) -> &mut TypeDefinition {
        let ty = self.extend(name, kind);
        ty.kind = kind;
        if description.is_some() {
            ty.description = description;
        }
        if location.is_some() {
            ty.location = location;
        }
        ty
    }

    fn extend(&mut self, name: &cst::Name, kind: TypeKind) -> &mut TypeDefinition {
        let name = name.text().to_string();
        self.index
            .types
            .entry(name)
            .or_insert_with_key(|name| TypeDefinition::empty(name, kind))
    }

    fn root_operations(&mut self, roots: cst::CstChildren<cst::RootOperationTypeDefinition>) {
        for root in roots {
            let Some(type_name) = root
                .named_type()
                .and_then(|named| named.name())
                .map(|name| name.text().to_string())
            else {
                continue;
            };

            match OperationKind::from_cst(root.operation_type().as_ref()) {
                OperationKind::Query => self.index.query_type = Some(type_name),
                OperationKind::Mutation => self.index.mutation_type = Some(type_name),
                OperationKind::Subscription => self.index.subscription_type = Some(type_name),
            }
        }
    }

    fn fields(&self, fields: Option<cst::FieldsDefinition>) -> Vec<FieldDefinition> {
        fields
            .into_iter()
            .flat_map(|fields| fields.field_definitions())
            .filter_map(|field| {
                let name = field.name()?;
                Some(FieldDefinition {
                    name: name.text().to_string(),
                    ty: TypeRef::from_cst(&field.ty()?)?,
                    arguments: self.arguments(field.arguments_definition()),
                    description: field.description().map(|d| description_text(&d)),
                    deprecation: deprecation(field.directives()),
                    location: self.location(&name),
                })
            })
            .collect()
    }

    fn input_fields(&self, fields: Option<cst::InputFieldsDefinition>) -> Vec<FieldDefinition> {
        fields
            .into_iter()
            .flat_map(|fields| fields.input_value_definitions())
            .filter_map(|value| {
                let name = value.name()?;
                Some(FieldDefinition {
                    name: name.text().to_string(),
                    ty: TypeRef::from_cst(&value.ty()?)?,
                    arguments: Vec::new(),
                    description: value.description().map(|d| description_text(&d)),
                    deprecation: deprecation(value.directives()),
                    location: self.location(&name),
                })
            })
            .collect()
    }

    fn arguments(&self, arguments: Option<cst::ArgumentsDefinition>) -> Vec<ArgumentDefinition> {
        arguments
            .into_iter()
            .flat_map(|arguments| arguments.input_value_definitions())
            .filter_map(|value| {
                let name = value.name()?;
                Some(ArgumentDefinition {
                    name: name.text().to_string(),
                    ty: TypeRef::from_cst(&value.ty()?)?,
                    default_value: value
                        .default_value()
                        .and_then(|default| default.value())
                        .map(|value| value.syntax().text().to_string().trim().to_string()),
                    description: value.description().map(|d| description_text(&d)),
                    location: self.location(&name),
                })
            })
            .collect()
    }

    fn location(&self, name: &cst::Name) -> Option<Location> {
        let uri = self.uri?;
        let (start, end) = name_span(name);
        Some(Location::new(
            uri,
            Range::new(
                self.line_index.offset_to_position(start),
                self.line_index.offset_to_position(end),
            ),
        ))
    }
}

fn interfaces(implements: Option<cst::ImplementsInterfaces>) -> Vec<String> {
    implements
        .into_iter()
        .flat_map(|implements| implements.named_types())
        .filter_map(|named| named.name().map(|name| name.text().to_string()))
        .collect()
}

fn union_members(members: Option<cst::UnionMemberTypes>) -> Vec<String> {
    members
        .into_iter()
        .flat_map(|members| members.named_types())
        .filter_map(|named| named.name().map(|name| name.text().to_string()))
        .collect()
}

fn enum_values(values: Option<cst::EnumValuesDefinition>) -> Vec<EnumValueDefinition> {
    values
        .into_iter()
        .flat_map(|values| values.enum_value_definitions())
        .filter_map(|value| {
            Some(EnumValueDefinition {
                name: value.enum_value()?.name()?.text().to_string(),
                description: value.description().map(|d| description_text(&d)),
                deprecation: deprecation(value.directives()),
            })
        })
        .collect()
}

fn deprecation(directives: Option<cst::Directives>) -> Option<Deprecation> {
    let directive = directives?
        .directives()
        .find(|directive| directive.name().is_some_and(|name| name.text().as_str() == "deprecated"))?;

    let reason = directive
        .arguments()
        .into_iter()
        .flat_map(|arguments| arguments.arguments())
        .find(|argument| argument.name().is_some_and(|name| name.text().as_str() == "reason"))
        .and_then(|argument| argument.value())
        .and_then(|value| match value {
            cst::Value::StringValue(string) => {
                Some(string_value(string.syntax().text().to_string().trim()))
            }
            _ => None,
        });

    Some(Deprecation { reason })
}

fn description_text(description: &cst::Description) -> String {
    string_value(description.syntax().text().to_string().trim())
}

/// The value of a GraphQL string literal, quotes included in `raw`.
pub(crate) fn string_value(raw: &str) -> String {
    if let Some(block) = raw
        .strip_prefix("\"\"\"")
        .and_then(|rest| rest.strip_suffix("\"\"\""))
    {
        return block_string_value(&block.replace("\\\"\"\"", "\"\"\""));
    }

    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw);
    unescape(inner)
}

/// Strip the common indentation and surrounding blank lines of a block string.
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut lines: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line
            } else {
                line.get(common_indent..).unwrap_or("")
            }
        })
        .collect();

    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    lines.join("\n")
}

fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('b') => value.push('\u{8}'),
            Some('f') => value.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => value.push(decoded),
                    None => {
                        value.push_str("\\u");
                        value.push_str(&hex);
                    }
                }
            }
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }

    value
}
