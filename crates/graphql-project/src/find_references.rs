use crate::{ContextNode, FragmentRegistry, Location, ResolvedContext};

/// Every spread of the fragment whose definition is under the cursor.
///
/// Only fragment definitions have references. `None` means the cursor is on
/// something else, while an empty list means the fragment is never spread.
/// Spreads without a file location are left out.
pub fn find_references<R>(context: &ResolvedContext, registry: &R) -> Option<Vec<Location>>
where
    R: FragmentRegistry + ?Sized,
{
    let ContextNode::FragmentDefinition { name, .. } = &context.node else {
        return None;
    };

    Some(
        registry
            .fragment_spreads(name)
            .into_iter()
            .filter_map(|spread| spread.location)
            .collect(),
    )
}
