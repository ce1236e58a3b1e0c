use crate::{ContextNode, Range, ResolvedContext, SchemaIndex};

/// Hover content, as markdown, and the range it describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub contents: String,
    pub range: Range,
}

/// Render hover documentation for a resolved cursor.
///
/// Fragment spreads, fields, named types and arguments are described. Any
/// other node, or a name the schema or fragment index does not know, yields
/// `None`.
#[must_use]
pub fn hover(context: &ResolvedContext, schema: &SchemaIndex) -> Option<HoverInfo> {
    let info = &context.type_info;

    let contents = match &context.node {
        ContextNode::FragmentSpread { .. } => {
            let fragment = info.fragment.as_ref()?;
            code_block(&format!(
                "fragment {} on {}",
                fragment.name, fragment.type_condition
            ))
        }
        ContextNode::Field { .. } => {
            let field = info.field_def.as_ref()?;
            let parent = info.parent_type.as_deref()?;

            let mut contents = code_block(&format!("{parent}.{}", field.signature()));
            contents.push_str("\n\n");
            contents.push_str(field.description.as_deref().unwrap_or_default());
            if let Some(deprecation) = &field.deprecation {
                contents.push_str("\n\n");
                contents.push_str(&deprecation_notice(deprecation.reason.as_deref()));
            }
            contents
        }
        ContextNode::NamedType { name, .. } => {
            let ty = schema.get_type(name)?;

            let mut contents = code_block(&ty.declaration());
            if let Some(description) = &ty.description {
                contents.push_str("\n\n");
                contents.push_str(description);
            }
            contents
        }
        ContextNode::Argument { .. } => {
            let argument = info.argument_def.as_ref()?;

            let mut contents = code_block(&format!("{}: {}", argument.name, argument.ty));
            contents.push_str("\n\n");
            contents.push_str(argument.description.as_deref().unwrap_or_default());
            contents
        }
        ContextNode::FragmentDefinition { .. } => return None,
    };

    Some(HoverInfo {
        contents,
        range: context.node.range(),
    })
}

fn code_block(code: &str) -> String {
    format!("```graphql\n{code}\n```")
}

fn deprecation_notice(reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("_Deprecated: {reason}_"),
        None => "_Deprecated_".to_string(),
    }
}
