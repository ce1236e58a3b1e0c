use crate::{ContextNode, Location, ResolvedContext, SchemaIndex};

/// Where the name under the cursor is declared.
///
/// Fragment spreads jump to the fragment, fields to their schema declaration and
/// named types to the type declaration. Built-in types and introspection fields
/// have no source location, so they yield `None`.
#[must_use]
pub fn goto_definition(context: &ResolvedContext, schema: &SchemaIndex) -> Option<Location> {
    match &context.node {
        ContextNode::FragmentSpread { .. } => context.type_info.fragment.as_ref()?.location.clone(),
        ContextNode::Field { .. } => context.type_info.field_def.as_ref()?.location.clone(),
        ContextNode::NamedType { name, .. } => schema.get_type(name)?.location.clone(),
        ContextNode::Argument { .. } | ContextNode::FragmentDefinition { .. } => None,
    }
}
