use crate::document::name_span;
use crate::{
    ArgumentDefinition, Document, FieldDefinition, FragmentDefinition, FragmentRegistry,
    OperationKind, Position, Range, SchemaIndex,
};
use apollo_parser::{
    cst::{self, CstNode},
    SyntaxTree,
};

/// The syntax node under the cursor. Ranges are in host-file coordinates and
/// cover the name of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextNode {
    /// A field in a selection set or a field definition in SDL
    Field { name: String, range: Range },
    /// An argument of a field, in a selection or in SDL
    Argument { name: String, range: Range },
    /// A reference to or declaration of a named type
    NamedType { name: String, range: Range },
    /// `...Name`
    FragmentSpread { name: String, range: Range },
    /// The name in `fragment Name on Type`
    FragmentDefinition { name: String, range: Range },
}

impl ContextNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. }
            | Self::Argument { name, .. }
            | Self::NamedType { name, .. }
            | Self::FragmentSpread { name, .. }
            | Self::FragmentDefinition { name, .. } => name,
        }
    }

    #[must_use]
    pub const fn range(&self) -> Range {
        match self {
            Self::Field { range, .. }
            | Self::Argument { range, .. }
            | Self::NamedType { range, .. }
            | Self::FragmentSpread { range, .. }
            | Self::FragmentDefinition { range, .. } => *range,
        }
    }
}

/// Schema information active at the cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    /// Type whose fields are selectable at the cursor
    pub parent_type: Option<String>,
    pub field_def: Option<FieldDefinition>,
    pub argument_def: Option<ArgumentDefinition>,
    /// Lookup result for the fragment named at the cursor
    pub fragment: Option<FragmentDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub node: ContextNode,
    pub type_info: TypeInfo,
}

/// What kind of text the cursor is about to complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// A field name inside a selection set
    FieldSelection {
        parent_type: String,
        /// Sibling fields that are already selected
        already_selected: Vec<String>,
    },
    /// After `...` in a selection set
    FragmentSpread,
    /// The type after `on`
    TypeCondition,
    /// The type of a variable definition
    VariableType,
    /// Inside the argument list of a field
    Argument {
        parent_type: String,
        field_name: String,
    },
    /// After `@`
    Directive,
}

/// Find the node under a host-file `position` and the type context around it.
///
/// Returns `None` when the document has no syntax tree, the position is not
/// inside the document, or no name sits under the cursor. Name ranges are
/// inclusive at both ends, so a cursor just after the last character still
/// resolves.
pub fn resolve<R>(
    document: &Document,
    schema: &SchemaIndex,
    registry: &R,
    position: Position,
) -> Option<ResolvedContext>
where
    R: FragmentRegistry + ?Sized,
{
    let tree = document.tree()?;
    let resolver = Resolver::new(document, schema, registry, position)?;

    resolver
        .covering_definitions(tree)
        .into_iter()
        .find_map(|definition| resolver.definition(&definition))
}

/// Find what the cursor at a host-file `position` is about to complete.
///
/// Walks the tree the same way as [`resolve`] but also answers where nothing
/// has been typed yet, such as inside an empty selection set.
pub fn resolve_completion<R>(
    document: &Document,
    schema: &SchemaIndex,
    registry: &R,
    position: Position,
) -> Option<CompletionContext>
where
    R: FragmentRegistry + ?Sized,
{
    let tree = document.tree()?;
    let resolver = Resolver::new(document, schema, registry, position)?;

    let context = resolver
        .covering_definitions(tree)
        .into_iter()
        .find_map(|definition| resolver.complete_definition(&definition));
    tracing::trace!(?context, "completion context");
    context
}

struct Resolver<'a, R: ?Sized> {
    document: &'a Document,
    schema: &'a SchemaIndex,
    registry: &'a R,
    offset: usize,
}

impl<'a, R: FragmentRegistry + ?Sized> Resolver<'a, R> {
    fn new(
        document: &'a Document,
        schema: &'a SchemaIndex,
        registry: &'a R,
        position: Position,
    ) -> Option<Self> {
        Some(Self {
            offset: document.offset_at(position)?,
            document,
            schema,
            registry,
        })
    }

    fn covering_definitions(&self, tree: &SyntaxTree) -> Vec<cst::Definition> {
        tree.document()
            .definitions()
            .filter(|definition| self.covers_node(definition))
            .collect()
    }

    fn definition(&self, definition: &cst::Definition) -> Option<ResolvedContext> {
        match definition {
            cst::Definition::OperationDefinition(op) => self.operation(op),
            cst::Definition::FragmentDefinition(fragment) => self.fragment(fragment),
            cst::Definition::ObjectTypeDefinition(def) => self.type_definition(
                def.name(),
                def.implements_interfaces(),
                def.fields_definition(),
            ),
            cst::Definition::ObjectTypeExtension(ext) => self.type_definition(
                ext.name(),
                ext.implements_interfaces(),
                ext.fields_definition(),
            ),
            cst::Definition::InterfaceTypeDefinition(def) => self.type_definition(
                def.name(),
                def.implements_interfaces(),
                def.fields_definition(),
            ),
            cst::Definition::InterfaceTypeExtension(ext) => self.type_definition(
                ext.name(),
                ext.implements_interfaces(),
                ext.fields_definition(),
            ),
            cst::Definition::UnionTypeDefinition(def) => {
                self.union(def.name(), def.union_member_types())
            }
            cst::Definition::UnionTypeExtension(ext) => {
                self.union(ext.name(), ext.union_member_types())
            }
            cst::Definition::InputObjectTypeDefinition(def) => {
                self.input_object(def.name(), def.input_fields_definition())
            }
            cst::Definition::InputObjectTypeExtension(ext) => {
                self.input_object(ext.name(), ext.input_fields_definition())
            }
            cst::Definition::EnumTypeDefinition(def) => self.type_name(def.name()?),
            cst::Definition::EnumTypeExtension(ext) => self.type_name(ext.name()?),
            cst::Definition::ScalarTypeDefinition(def) => self.type_name(def.name()?),
            cst::Definition::ScalarTypeExtension(ext) => self.type_name(ext.name()?),
            cst::Definition::DirectiveDefinition(def) => def
                .arguments_definition()?
                .input_value_definitions()
                .find_map(|value| self.type_reference(&value.ty()?)),
            cst::Definition::SchemaDefinition(def) => def
                .root_operation_type_definitions()
                .find_map(|root| self.type_name(root.named_type()?.name()?)),
            cst::Definition::SchemaExtension(ext) => ext
                .root_operation_type_definitions()
                .find_map(|root| self.type_name(root.named_type()?.name()?)),
        }
    }

    fn operation(&self, op: &cst::OperationDefinition) -> Option<ResolvedContext> {
        let variable_type = op
            .variable_definitions()
            .into_iter()
            .flat_map(|variables| variables.variable_definitions())
            .find_map(|variable| self.type_reference(&variable.ty()?));
        if variable_type.is_some() {
            return variable_type;
        }

        let root = self
            .schema
            .root_type(OperationKind::from_cst(op.operation_type().as_ref()));
        self.selection_set(&op.selection_set()?, root)
    }

    fn fragment(&self, fragment: &cst::FragmentDefinition) -> Option<ResolvedContext> {
        if let Some(name) = fragment.fragment_name().and_then(|n| n.name()) {
            if self.covers(&name) {
                let name_text = name.text().to_string();
                return Some(ResolvedContext {
                    node: ContextNode::FragmentDefinition {
                        range: self.range(&name),
                        name: name_text.clone(),
                    },
                    type_info: TypeInfo {
                        fragment: self.registry.fragment(&name_text),
                        ..TypeInfo::default()
                    },
                });
            }
        }

        let type_condition = fragment
            .type_condition()
            .and_then(|tc| tc.named_type())
            .and_then(|named| named.name());
        if let Some(name) = &type_condition {
            if self.covers(name) {
                return Some(self.named_type(name));
            }
        }

        let parent = type_condition.map(|name| name.text().to_string());
        self.selection_set(&fragment.selection_set()?, parent.as_deref())
    }

    fn selection_set(
        &self,
        selection_set: &cst::SelectionSet,
        parent: Option<&str>,
    ) -> Option<ResolvedContext> {
        if !self.covers_node(selection_set) {
            return None;
        }

        selection_set
            .selections()
            .filter(|selection| self.covers_node(selection))
            .find_map(|selection| match selection {
                cst::Selection::Field(field) => self.field(&field, parent),
                cst::Selection::FragmentSpread(spread) => self.fragment_spread(&spread, parent),
                cst::Selection::InlineFragment(inline) => self.inline_fragment(&inline, parent),
            })
    }

    fn field(&self, field: &cst::Field, parent: Option<&str>) -> Option<ResolvedContext> {
        let name = field.name()?;
        let name_text = name.text().to_string();
        let field_def = parent.and_then(|parent| self.schema.field(parent, &name_text));

        let type_info = || TypeInfo {
            parent_type: parent.map(str::to_string),
            field_def: field_def.cloned(),
            ..TypeInfo::default()
        };

        let alias = field.alias().and_then(|alias| alias.name());
        if let Some(target) = [Some(&name), alias.as_ref()]
            .into_iter()
            .flatten()
            .find(|candidate| self.covers(candidate))
        {
            return Some(ResolvedContext {
                node: ContextNode::Field {
                    name: name_text,
                    range: self.range(target),
                },
                type_info: type_info(),
            });
        }

        let argument = field
            .arguments()
            .into_iter()
            .flat_map(|arguments| arguments.arguments())
            .filter_map(|argument| argument.name())
            .find(|argument| self.covers(argument));
        if let Some(argument) = argument {
            let argument_name = argument.text().to_string();
            return Some(ResolvedContext {
                node: ContextNode::Argument {
                    range: self.range(&argument),
                    name: argument_name.clone(),
                },
                type_info: TypeInfo {
                    argument_def: field_def
                        .and_then(|def| def.argument(&argument_name))
                        .cloned(),
                    ..type_info()
                },
            });
        }

        let nested_parent = field_def.map(|def| def.ty.named_type());
        self.selection_set(&field.selection_set()?, nested_parent)
    }

    fn fragment_spread(
        &self,
        spread: &cst::FragmentSpread,
        parent: Option<&str>,
    ) -> Option<ResolvedContext> {
        let name = spread.fragment_name()?.name()?;
        if !self.covers(&name) {
            return None;
        }

        let name_text = name.text().to_string();
        Some(ResolvedContext {
            node: ContextNode::FragmentSpread {
                range: self.range(&name),
                name: name_text.clone(),
            },
            type_info: TypeInfo {
                parent_type: parent.map(str::to_string),
                fragment: self.registry.fragment(&name_text),
                ..TypeInfo::default()
            },
        })
    }

    fn inline_fragment(
        &self,
        inline: &cst::InlineFragment,
        parent: Option<&str>,
    ) -> Option<ResolvedContext> {
        let type_condition = inline
            .type_condition()
            .and_then(|tc| tc.named_type())
            .and_then(|named| named.name());

        if let Some(name) = &type_condition {
            if self.covers(name) {
                return Some(self.named_type(name));
            }
        }

        let condition = type_condition.map(|name| name.text().to_string());
        self.selection_set(&inline.selection_set()?, condition.as_deref().or(parent))
    }

    fn type_definition(
        &self,
        name: Option<cst::Name>,
        implements: Option<cst::ImplementsInterfaces>,
        fields: Option<cst::FieldsDefinition>,
    ) -> Option<ResolvedContext> {
        let name = name?;
        if self.covers(&name) {
            return Some(self.named_type(&name));
        }

        let interface = implements
            .into_iter()
            .flat_map(|implements| implements.named_types())
            .find_map(|named| self.type_name(named.name()?));
        if interface.is_some() {
            return interface;
        }

        let parent = name.text().to_string();
        fields?
            .field_definitions()
            .filter(|field| self.covers_node(field))
            .find_map(|field| self.field_definition(&parent, &field))
    }

    fn field_definition(
        &self,
        parent: &str,
        field: &cst::FieldDefinition,
    ) -> Option<ResolvedContext> {
        let name = field.name()?;
        let field_def = self.schema.field(parent, name.text().as_str());

        if self.covers(&name) {
            return Some(ResolvedContext {
                node: ContextNode::Field {
                    name: name.text().to_string(),
                    range: self.range(&name),
                },
                type_info: TypeInfo {
                    parent_type: Some(parent.to_string()),
                    field_def: field_def.cloned(),
                    ..TypeInfo::default()
                },
            });
        }

        let arguments = field.arguments_definition();
        for value in arguments.iter().flat_map(|args| args.input_value_definitions()) {
            let Some(argument) = value.name() else {
                continue;
            };
            if self.covers(&argument) {
                let argument_name = argument.text().to_string();
                return Some(ResolvedContext {
                    node: ContextNode::Argument {
                        range: self.range(&argument),
                        name: argument_name.clone(),
                    },
                    type_info: TypeInfo {
                        parent_type: Some(parent.to_string()),
                        field_def: field_def.cloned(),
                        argument_def: field_def
                            .and_then(|def| def.argument(&argument_name))
                            .cloned(),
                        fragment: None,
                    },
                });
            }
            if let Some(found) = value.ty().and_then(|ty| self.type_reference(&ty)) {
                return Some(found);
            }
        }

        self.type_reference(&field.ty()?)
    }

    fn input_object(
        &self,
        name: Option<cst::Name>,
        fields: Option<cst::InputFieldsDefinition>,
    ) -> Option<ResolvedContext> {
        let name = name?;
        if self.covers(&name) {
            return Some(self.named_type(&name));
        }

        let parent = name.text().to_string();
        for value in fields?.input_value_definitions() {
            let Some(field) = value.name() else { continue };
            if self.covers(&field) {
                return Some(ResolvedContext {
                    node: ContextNode::Field {
                        name: field.text().to_string(),
                        range: self.range(&field),
                    },
                    type_info: TypeInfo {
                        field_def: self.schema.field(&parent, field.text().as_str()).cloned(),
                        parent_type: Some(parent),
                        ..TypeInfo::default()
                    },
                });
            }
            if let Some(found) = value.ty().and_then(|ty| self.type_reference(&ty)) {
                return Some(found);
            }
        }
        None
    }

    fn union(
        &self,
        name: Option<cst::Name>,
        members: Option<cst::UnionMemberTypes>,
    ) -> Option<ResolvedContext> {
        if let Some(found) = name.and_then(|name| self.type_name(name)) {
            return Some(found);
        }
        members?
            .named_types()
            .find_map(|named| self.type_name(named.name()?))
    }

    /// The named type inside a possibly wrapped type reference
    fn type_reference(&self, ty: &cst::Type) -> Option<ResolvedContext> {
        match ty {
            cst::Type::NamedType(named) => self.type_name(named.name()?),
            cst::Type::ListType(list) => self.type_reference(&list.ty()?),
            cst::Type::NonNullType(non_null) => match non_null.named_type() {
                Some(named) => self.type_name(named.name()?),
                None => self.type_reference(&cst::Type::ListType(non_null.list_type()?)),
            },
        }
    }

    fn type_name(&self, name: cst::Name) -> Option<ResolvedContext> {
        self.covers(&name).then(|| self.named_type(&name))
    }

    fn named_type(&self, name: &cst::Name) -> ResolvedContext {
        ResolvedContext {
            node: ContextNode::NamedType {
                name: name.text().to_string(),
                range: self.range(name),
            },
            type_info: TypeInfo::default(),
        }
    }

    fn complete_definition(&self, definition: &cst::Definition) -> Option<CompletionContext> {
        match definition {
            cst::Definition::OperationDefinition(op) => self.complete_operation(op),
            cst::Definition::FragmentDefinition(fragment) => self.complete_fragment(fragment),
            _ => None,
        }
    }

    fn complete_operation(&self, op: &cst::OperationDefinition) -> Option<CompletionContext> {
        if let Some(variables) = op.variable_definitions() {
            if self.covers_node(&variables) {
                let in_type = variables
                    .variable_definitions()
                    .filter_map(|variable| variable.ty())
                    .any(|ty| self.covers_node(&ty));
                return in_type.then_some(CompletionContext::VariableType);
            }
        }

        if op.directives().is_some_and(|directives| self.covers_node(&directives)) {
            return Some(CompletionContext::Directive);
        }

        let root = self
            .schema
            .root_type(OperationKind::from_cst(op.operation_type().as_ref()))?;
        self.complete_selection_set(&op.selection_set()?, root)
    }

    fn complete_fragment(&self, fragment: &cst::FragmentDefinition) -> Option<CompletionContext> {
        if fragment
            .directives()
            .is_some_and(|directives| self.covers_node(&directives))
        {
            return Some(CompletionContext::Directive);
        }

        let type_condition = fragment.type_condition()?;
        if self.in_type_condition(&type_condition, fragment.selection_set()) {
            return Some(CompletionContext::TypeCondition);
        }

        let parent = type_condition.named_type()?.name()?.text().to_string();
        self.complete_selection_set(&fragment.selection_set()?, &parent)
    }

    fn complete_selection_set(
        &self,
        selection_set: &cst::SelectionSet,
        parent: &str,
    ) -> Option<CompletionContext> {
        if !self.covers_node(selection_set) {
            return None;
        }

        let already_selected: Vec<String> = selection_set
            .selections()
            .filter_map(|selection| match selection {
                cst::Selection::Field(field) if !self.covers_node(&field) => {
                    field.name().map(|name| name.text().to_string())
                }
                _ => None,
            })
            .collect();

        if let Some(selection) = selection_set
            .selections()
            .find(|selection| self.covers_node(selection))
        {
            return match selection {
                cst::Selection::Field(field) => {
                    self.complete_field(&field, parent, already_selected)
                }
                cst::Selection::FragmentSpread(spread) => Some(
                    if spread
                        .directives()
                        .is_some_and(|directives| self.covers_node(&directives))
                    {
                        CompletionContext::Directive
                    } else {
                        CompletionContext::FragmentSpread
                    },
                ),
                cst::Selection::InlineFragment(inline) => {
                    self.complete_inline_fragment(&inline, parent)
                }
            };
        }

        if self.document.source()[..self.offset]
            .trim_end()
            .ends_with('.')
        {
            return Some(CompletionContext::FragmentSpread);
        }

        Some(CompletionContext::FieldSelection {
            parent_type: parent.to_string(),
            already_selected,
        })
    }

    fn complete_field(
        &self,
        field: &cst::Field,
        parent: &str,
        already_selected: Vec<String>,
    ) -> Option<CompletionContext> {
        let name = field.name().map(|name| name.text().to_string());

        if let (Some(arguments), Some(name)) = (field.arguments(), &name) {
            if self.covers_node(&arguments) {
                return Some(CompletionContext::Argument {
                    parent_type: parent.to_string(),
                    field_name: name.clone(),
                });
            }
        }

        if field
            .directives()
            .is_some_and(|directives| self.covers_node(&directives))
        {
            return Some(CompletionContext::Directive);
        }

        if let Some(selection_set) = field.selection_set() {
            if self.covers_node(&selection_set) {
                let field_def = self.schema.field(parent, name.as_deref()?)?;
                return self.complete_selection_set(&selection_set, field_def.ty.named_type());
            }
        }

        // an alias is a new name, so nothing needs to be filtered out
        let already_selected = if field.alias().is_some() {
            Vec::new()
        } else {
            already_selected
        };
        Some(CompletionContext::FieldSelection {
            parent_type: parent.to_string(),
            already_selected,
        })
    }

    fn complete_inline_fragment(
        &self,
        inline: &cst::InlineFragment,
        parent: &str,
    ) -> Option<CompletionContext> {
        if inline
            .directives()
            .is_some_and(|directives| self.covers_node(&directives))
        {
            return Some(CompletionContext::Directive);
        }

        let type_condition = inline.type_condition();
        if type_condition
            .as_ref()
            .is_some_and(|tc| self.in_type_condition(tc, inline.selection_set()))
        {
            return Some(CompletionContext::TypeCondition);
        }

        if let Some(selection_set) = inline.selection_set() {
            if self.covers_node(&selection_set) {
                let condition = type_condition
                    .and_then(|tc| tc.named_type())
                    .and_then(|named| named.name())
                    .map(|name| name.text().to_string());
                return self
                    .complete_selection_set(&selection_set, condition.as_deref().unwrap_or(parent));
            }
        }

        Some(CompletionContext::FragmentSpread)
    }

    /// Between `on` and the opening brace of the selection set
    fn in_type_condition(
        &self,
        type_condition: &cst::TypeCondition,
        selection_set: Option<cst::SelectionSet>,
    ) -> bool {
        let start: usize = type_condition.syntax().text_range().start().into();
        let end = selection_set.map_or(usize::MAX, |selection_set| {
            selection_set.syntax().text_range().start().into()
        });
        start < self.offset && self.offset < end
    }

    fn covers(&self, name: &cst::Name) -> bool {
        let (start, end) = name_span(name);
        start <= self.offset && self.offset <= end
    }

    /// Whether the cursor touches `node`, ignoring the whitespace and commas
    /// the parser attaches to the end of it
    fn covers_node(&self, node: &impl CstNode) -> bool {
        let start: usize = node.syntax().text_range().start().into();
        let text = node.syntax().text().to_string();
        let end = start + text.trim_end_matches(|c: char| c.is_whitespace() || c == ',').len();
        start <= self.offset && self.offset <= end
    }

    fn range(&self, name: &cst::Name) -> Range {
        let (start, end) = name_span(name);
        self.document.host_range(start, end)
    }
}
