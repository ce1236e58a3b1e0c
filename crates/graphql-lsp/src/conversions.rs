//! Conversions between LSP protocol types and `graphql-project` types.
//!
//! Everything here is stateless so any handler can use it.

use lsp_types::{
    CodeLens, Command, CompletionItemTag, Documentation, Hover, HoverContents, Location,
    MarkupContent, MarkupKind, Position, Range, Uri,
};

/// Convert an LSP position to a project position
pub const fn convert_lsp_position(pos: Position) -> graphql_project::Position {
    graphql_project::Position::new(pos.line, pos.character)
}

/// Convert a project position to an LSP position
pub const fn convert_project_position(pos: graphql_project::Position) -> Position {
    Position {
        line: pos.line,
        character: pos.character,
    }
}

/// Convert a project range to an LSP range
pub const fn convert_project_range(range: graphql_project::Range) -> Range {
    Range {
        start: convert_project_position(range.start),
        end: convert_project_position(range.end),
    }
}

/// Convert a project location to an LSP location. Locations whose URI the
/// protocol cannot represent are dropped.
pub fn convert_project_location(loc: &graphql_project::Location) -> Option<Location> {
    let uri: Uri = match loc.uri.parse() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(uri = %loc.uri, error = %e, "dropping location with invalid URI");
            return None;
        }
    };

    Some(Location {
        uri,
        range: convert_project_range(loc.range),
    })
}

pub fn convert_completion_item(item: graphql_project::CompletionItem) -> lsp_types::CompletionItem {
    use graphql_project::{CompletionItemKind, InsertTextFormat};

    lsp_types::CompletionItem {
        label: item.label,
        kind: Some(match item.kind {
            CompletionItemKind::Field => lsp_types::CompletionItemKind::FIELD,
            CompletionItemKind::Type => lsp_types::CompletionItemKind::CLASS,
            CompletionItemKind::Fragment => lsp_types::CompletionItemKind::SNIPPET,
            CompletionItemKind::Directive => lsp_types::CompletionItemKind::KEYWORD,
            CompletionItemKind::Argument => lsp_types::CompletionItemKind::PROPERTY,
        }),
        detail: item.detail,
        documentation: item.documentation.map(|doc| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: doc,
            })
        }),
        tags: item
            .deprecated
            .then(|| vec![CompletionItemTag::DEPRECATED]),
        insert_text: item.insert_text,
        insert_text_format: Some(match item.insert_text_format {
            InsertTextFormat::PlainText => lsp_types::InsertTextFormat::PLAIN_TEXT,
            InsertTextFormat::Snippet => lsp_types::InsertTextFormat::SNIPPET,
        }),
        ..Default::default()
    }
}

pub fn convert_hover(hover: graphql_project::HoverInfo) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: hover.contents,
        }),
        range: Some(convert_project_range(hover.range)),
    }
}

pub fn convert_code_lens(lens: graphql_project::CodeLens) -> CodeLens {
    CodeLens {
        range: convert_project_range(lens.range),
        command: Some(Command {
            title: lens.title,
            command: String::new(),
            arguments: None,
        }),
        data: None,
    }
}
