use crate::{FieldDefinition, SchemaIndex};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionItemKind {
    Field,
    Type,
    Fragment,
    Directive,
    Argument,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertTextFormat {
    #[default]
    PlainText,
    /// `$1`, `$2`, ... are tab stops and `$0` is the final cursor position
    Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionItemKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub deprecated: bool,
    pub insert_text: Option<String>,
    pub insert_text_format: InsertTextFormat,
}

impl CompletionItem {
    #[must_use]
    pub fn new(label: impl Into<String>, kind: CompletionItemKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            deprecated: false,
            insert_text: None,
            insert_text_format: InsertTextFormat::PlainText,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: Option<String>) -> Self {
        self.documentation = documentation;
        self
    }

    #[must_use]
    pub const fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

/// Add snippets to field candidates selected on `parent_type`.
///
/// A candidate naming a field gets its required arguments as numbered tab
/// stops, and a `{ }` block when the field returns a composite type. Candidates
/// that name no field are returned untouched. Order and count never change.
#[must_use]
pub fn enrich(
    candidates: Vec<CompletionItem>,
    schema: &SchemaIndex,
    parent_type: &str,
    is_abstract: bool,
    is_query_root: bool,
) -> Vec<CompletionItem> {
    let mut fields: IndexMap<&str, &FieldDefinition> = schema
        .fields(parent_type)
        .unwrap_or_default()
        .iter()
        .map(|field| (field.name.as_str(), field))
        .collect();

    if is_abstract {
        let typename = schema.typename_field();
        fields.insert(typename.name.as_str(), typename);
    }
    if is_query_root {
        for field in schema.schema_introspection_fields() {
            fields.insert(field.name.as_str(), field);
        }
    }

    candidates
        .into_iter()
        .map(|candidate| match fields.get(candidate.label.as_str()) {
            Some(field) => with_snippet(candidate, field, schema),
            None => candidate,
        })
        .collect()
}

/// [`enrich`] with the parent's kind looked up in the schema
#[must_use]
pub fn enrich_for_parent(
    candidates: Vec<CompletionItem>,
    schema: &SchemaIndex,
    parent_type: &str,
) -> Vec<CompletionItem> {
    enrich(
        candidates,
        schema,
        parent_type,
        schema.is_abstract(parent_type),
        schema.is_query_root(parent_type),
    )
}

fn with_snippet(
    mut item: CompletionItem,
    field: &FieldDefinition,
    schema: &SchemaIndex,
) -> CompletionItem {
    let mut text = field.name.clone();
    let mut placeholders = false;

    let required: Vec<String> = field
        .required_arguments()
        .enumerate()
        .map(|(index, argument)| format!("{}: ${}", argument.name, index + 1))
        .collect();
    if !required.is_empty() {
        text.push('(');
        text.push_str(&required.join(", "));
        text.push(')');
        placeholders = true;
    }

    if schema.is_composite(field.ty.named_type()) {
        text.push_str(" {\n\t$0\n}");
        placeholders = true;
    }

    if placeholders {
        item.insert_text = Some(text);
        item.insert_text_format = InsertTextFormat::Snippet;
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    fn candidates(labels: &[&str]) -> Vec<CompletionItem> {
        labels
            .iter()
            .map(|label| CompletionItem::new(*label, CompletionItemKind::Field))
            .collect()
    }

    fn insert_texts(items: &[CompletionItem]) -> Vec<Option<&str>> {
        items.iter().map(|item| item.insert_text.as_deref()).collect()
    }

    #[test]
    fn test_required_arguments_and_selection_set() {
        let items = enrich_for_parent(candidates(&["user"]), &fixture::schema(), "Query");

        assert_eq!(items[0].insert_text.as_deref(), Some("user(id: $1) {\n\t$0\n}"));
        assert_eq!(items[0].insert_text_format, InsertTextFormat::Snippet);
    }

    #[test]
    fn test_placeholders_follow_declaration_order() {
        let items = enrich_for_parent(candidates(&["search"]), &fixture::schema(), "Query");

        assert_eq!(
            items[0].insert_text.as_deref(),
            Some("search(term: $1, limit: $2) {\n\t$0\n}")
        );
    }

    #[test]
    fn test_optional_arguments_are_skipped() {
        let items = enrich_for_parent(candidates(&["users"]), &fixture::schema(), "Query");

        assert_eq!(items[0].insert_text.as_deref(), Some("users {\n\t$0\n}"));
    }

    #[test]
    fn test_leaf_fields_stay_plain() {
        let items = enrich_for_parent(
            candidates(&["version", "id", "name"]),
            &fixture::schema(),
            "User",
        );

        assert_eq!(insert_texts(&items), vec![None, None, None]);
        assert!(items
            .iter()
            .all(|item| item.insert_text_format == InsertTextFormat::PlainText));
    }

    #[test]
    fn test_unknown_labels_pass_through_in_order() {
        let input = candidates(&["nope", "posts", "fragment"]);
        let items = enrich_for_parent(input.clone(), &fixture::schema(), "User");

        assert_eq!(items.len(), 3);
        assert_eq!(items[0], input[0]);
        assert_eq!(items[1].insert_text.as_deref(), Some("posts {\n\t$0\n}"));
        assert_eq!(items[2], input[2]);
    }

    #[test]
    fn test_synthetic_fields() {
        let schema = fixture::schema();

        let items = enrich(candidates(&["__schema", "__type"]), &schema, "Query", false, true);
        assert_eq!(
            insert_texts(&items),
            vec![Some("__schema {\n\t$0\n}"), Some("__type(name: $1) {\n\t$0\n}")]
        );

        let items = enrich(candidates(&["__schema"]), &schema, "Query", false, false);
        assert_eq!(items[0].insert_text, None);

        let items = enrich(candidates(&["__typename"]), &schema, "SearchResult", true, false);
        assert_eq!(items[0].insert_text, None);
    }

    #[test]
    fn test_non_null_composite_result() {
        let items = enrich_for_parent(candidates(&["createUser"]), &fixture::schema(), "Mutation");

        assert_eq!(
            items[0].insert_text.as_deref(),
            Some("createUser(name: $1) {\n\t$0\n}")
        );
    }
}
