use crate::{
    CompletionContext, CompletionItem, CompletionItemKind, FieldDefinition, FragmentRegistry,
    SchemaIndex, TypeKind,
};

/// Raw completion candidates for a resolved completion context.
///
/// Candidates carry a label, kind and documentation but no insert text, and
/// come in schema declaration order.
pub fn suggest<R>(
    context: &CompletionContext,
    schema: &SchemaIndex,
    registry: &R,
) -> Vec<CompletionItem>
where
    R: FragmentRegistry + ?Sized,
{
    match context {
        CompletionContext::FieldSelection {
            parent_type,
            already_selected,
        } => {
            let mut fields: Vec<&FieldDefinition> =
                schema.fields(parent_type).unwrap_or_default().iter().collect();
            if schema.is_query_root(parent_type) {
                fields.extend(schema.schema_introspection_fields());
            }
            if schema.is_composite(parent_type) {
                fields.push(schema.typename_field());
            }

            fields
                .into_iter()
                .filter(|field| !already_selected.contains(&field.name))
                .map(field_item)
                .collect()
        }
        CompletionContext::FragmentSpread => registry
            .fragments()
            .into_iter()
            .map(|fragment| {
                CompletionItem::new(fragment.name, CompletionItemKind::Fragment)
                    .with_detail(format!("on {}", fragment.type_condition))
            })
            .collect(),
        CompletionContext::TypeCondition => type_items(schema, |kind| {
            matches!(
                kind,
                TypeKind::Object | TypeKind::Interface | TypeKind::Union
            )
        }),
        CompletionContext::VariableType => type_items(schema, |kind| {
            matches!(
                kind,
                TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject
            )
        }),
        CompletionContext::Argument {
            parent_type,
            field_name,
        } => schema
            .field(parent_type, field_name)
            .map(|field| {
                field
                    .arguments
                    .iter()
                    .map(|argument| {
                        CompletionItem::new(argument.name.clone(), CompletionItemKind::Argument)
                            .with_detail(argument.ty.to_string())
                            .with_documentation(argument.description.clone())
                    })
                    .collect()
            })
            .unwrap_or_default(),
        CompletionContext::Directive => schema
            .directives()
            .map(|directive| {
                CompletionItem::new(directive.name.clone(), CompletionItemKind::Directive)
                    .with_documentation(directive.description.clone())
            })
            .collect(),
    }
}

fn field_item(field: &FieldDefinition) -> CompletionItem {
    CompletionItem::new(field.name.clone(), CompletionItemKind::Field)
        .with_detail(field.ty.to_string())
        .with_documentation(field.description.clone())
        .with_deprecated(field.deprecation.is_some())
}

fn type_items(schema: &SchemaIndex, include: impl Fn(TypeKind) -> bool) -> Vec<CompletionItem> {
    schema
        .types()
        .filter(|ty| include(ty.kind) && !ty.name.starts_with("__"))
        .map(|ty| {
            CompletionItem::new(ty.name.clone(), CompletionItemKind::Type)
                .with_detail(ty.kind.keyword())
                .with_documentation(ty.description.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use crate::registry::fake::FakeRegistry;

    fn suggest_at(text: &str) -> Option<(CompletionContext, Vec<CompletionItem>)> {
        let (source, position) = fixture::cursor(text);
        let document = fixture::document(&source);
        let schema = fixture::schema();
        let registry = FakeRegistry::default()
            .with_fragment("UserFields", "User")
            .with_fragment("PostFields", "Post");

        let context = crate::resolve_completion(&document, &schema, &registry, position)?;
        let items = suggest(&context, &schema, &registry);
        Some((context, items))
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_root_fields() {
        let (context, items) = suggest_at("{ us* }").unwrap();

        assert_eq!(
            context,
            CompletionContext::FieldSelection {
                parent_type: "Query".to_string(),
                already_selected: Vec::new(),
            }
        );
        assert_eq!(
            labels(&items),
            vec!["user", "users", "search", "node", "version", "__schema", "__type", "__typename"]
        );
        assert_eq!(items[0].detail.as_deref(), Some("User"));
        assert_eq!(items[0].documentation.as_deref(), Some("Fetch a user by ID"));
        assert!(items.iter().all(|item| item.insert_text.is_none()));
    }

    #[test]
    fn test_nested_fields_skip_selected_siblings() {
        let (_, items) = suggest_at("{ user(id: 1) { id * } }").unwrap();

        assert_eq!(labels(&items), vec!["name", "posts", "login", "__typename"]);
        assert!(items[2].deprecated);
    }

    #[test]
    fn test_union_offers_typename() {
        let (_, items) = suggest_at("{ search(term: \"\", limit: 1) { * } }").unwrap();
        assert_eq!(labels(&items), vec!["__typename"]);
    }

    #[test]
    fn test_arguments() {
        let (context, items) = suggest_at("{ search(*) { __typename } }").unwrap();

        assert!(matches!(context, CompletionContext::Argument { .. }));
        assert_eq!(labels(&items), vec!["term", "limit"]);
        assert_eq!(items[0].detail.as_deref(), Some("String!"));
    }

    #[test]
    fn test_fragment_spread() {
        let (context, items) = suggest_at("{ user(id: 1) { ...* } }").unwrap();

        assert_eq!(context, CompletionContext::FragmentSpread);
        assert_eq!(labels(&items), vec!["UserFields", "PostFields"]);
        assert_eq!(items[0].detail.as_deref(), Some("on User"));
    }

    #[test]
    fn test_type_condition() {
        let (context, items) = suggest_at("fragment F on * { id }").unwrap();

        assert_eq!(context, CompletionContext::TypeCondition);
        let labels = labels(&items);
        assert!(labels.contains(&"User"));
        assert!(labels.contains(&"SearchResult"));
        assert!(!labels.contains(&"String"));
        assert!(!labels.contains(&"__Schema"));
    }

    #[test]
    fn test_variable_type() {
        let (context, items) = suggest_at("query Q($id: I*) { version }").unwrap();

        assert_eq!(context, CompletionContext::VariableType);
        assert!(labels(&items).contains(&"ID"));
        assert!(!labels(&items).contains(&"User"));
    }

    #[test]
    fn test_directives() {
        let (context, items) = suggest_at("{ version @* }").unwrap();

        assert_eq!(context, CompletionContext::Directive);
        assert!(labels(&items).contains(&"include"));
    }

    #[test]
    fn test_unknown_parent_field() {
        assert!(suggest_at("{ nope { * } }").is_none());
    }
}
