use crate::{
    file_uri, FragmentDefinition, FragmentSpread, LineIndex, Location, Position, ProjectError,
    Range, Result,
};
use apollo_parser::{
    cst::{self, CstNode},
    Parser, SyntaxTree,
};
use graphql_config::expand_braces;
use graphql_extract::{
    extract_from_file, extract_from_source, ExtractConfig, ExtractedGraphQL, Language,
};
use std::path::{Path, PathBuf};

/// Where a GraphQL document sits inside the file that contains it.
///
/// Plain `.graphql` files span the whole file. Blocks extracted from
/// JavaScript or TypeScript start somewhere inside the host file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Byte offset of the first character in the host file
    pub offset: usize,
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    /// A span covering all of `text`
    #[must_use]
    pub fn whole(text: &str) -> Self {
        let line_index = LineIndex::new(text);
        Self {
            offset: 0,
            start: Position::default(),
            end: line_index.offset_to_position(text.len()),
        }
    }

    #[must_use]
    pub const fn from_extracted(location: &graphql_extract::SourceLocation) -> Self {
        Self {
            offset: location.offset,
            start: Position::new(location.range.start.line, location.range.start.column),
            end: Position::new(location.range.end.line, location.range.end.column),
        }
    }
}

/// One parsed GraphQL document.
///
/// Documents are immutable once built. An edit produces a new `Document`.
#[derive(Debug)]
pub struct Document {
    uri: String,
    source: String,
    line_index: LineIndex,
    span: SourceSpan,
    tree: Option<SyntaxTree>,
    fragments: Vec<FragmentDefinition>,
    spreads: Vec<FragmentSpread>,
}

impl Document {
    /// Parse `source`, located at `span` inside the file `uri`.
    ///
    /// Parsing is error tolerant. The tree is only dropped when the parser
    /// reports errors and recovers no definition at all.
    #[must_use]
    pub fn parse(uri: impl Into<String>, source: impl Into<String>, span: SourceSpan) -> Self {
        let uri = uri.into();
        let source = source.into();
        let line_index = LineIndex::new(&source);

        let tree = Parser::new(&source).parse();
        let usable = tree.errors().len() == 0 || tree.document().definitions().next().is_some();
        if !usable {
            tracing::debug!(uri = %uri, errors = tree.errors().len(), "document did not parse");
        }

        let mut document = Self {
            uri,
            source,
            line_index,
            span,
            tree: None,
            fragments: Vec::new(),
            spreads: Vec::new(),
        };

        if usable {
            document.index_fragments(&tree);
            document.tree = Some(tree);
        }
        document
    }

    #[must_use]
    pub fn from_extracted(uri: impl Into<String>, extracted: &ExtractedGraphQL) -> Self {
        let uri = uri.into();
        tracing::trace!(
            uri = %uri,
            tag = extracted.tag_name.as_deref().unwrap_or("none"),
            offset = extracted.location.offset,
            "parsing extracted block"
        );
        Self::parse(
            uri,
            extracted.source.clone(),
            SourceSpan::from_extracted(&extracted.location),
        )
    }

    /// Split host text into documents, one per GraphQL block.
    pub fn from_host_text(
        uri: &str,
        text: &str,
        language: Language,
        config: &ExtractConfig,
    ) -> Result<Vec<Self>> {
        Ok(extract_from_source(text, language, config)?
            .iter()
            .map(|extracted| Self::from_extracted(uri, extracted))
            .collect())
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn span(&self) -> SourceSpan {
        self.span
    }

    #[must_use]
    pub const fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// The syntax tree, absent when the text could not be parsed
    #[must_use]
    pub const fn tree(&self) -> Option<&SyntaxTree> {
        self.tree.as_ref()
    }

    /// Top-level definitions. Empty when there is no tree.
    pub fn definitions(&self) -> impl Iterator<Item = cst::Definition> + '_ {
        self.tree
            .as_ref()
            .into_iter()
            .flat_map(|tree| tree.document().definitions())
    }

    #[must_use]
    pub fn fragments(&self) -> &[FragmentDefinition] {
        &self.fragments
    }

    #[must_use]
    pub fn spreads(&self) -> &[FragmentSpread] {
        &self.spreads
    }

    /// Whether a host-file position falls inside this document
    #[must_use]
    pub fn contains(&self, host: Position) -> bool {
        Range::new(self.span.start, self.span.end).contains(host)
    }

    /// Translate a host-file position into a position relative to this document.
    #[must_use]
    pub fn to_document(&self, host: Position) -> Option<Position> {
        if host < self.span.start {
            return None;
        }

        let line = host.line - self.span.start.line;
        let character = if line == 0 {
            host.character - self.span.start.character
        } else {
            host.character
        };
        Some(Position::new(line, character))
    }

    /// Translate a document-relative position back into the host file.
    #[must_use]
    pub const fn to_host(&self, position: Position) -> Position {
        if position.line == 0 {
            Position::new(
                self.span.start.line,
                self.span.start.character + position.character,
            )
        } else {
            Position::new(self.span.start.line + position.line, position.character)
        }
    }

    /// Byte offset into this document's source for a host-file position
    #[must_use]
    pub fn offset_at(&self, host: Position) -> Option<usize> {
        self.line_index.position_to_offset(self.to_document(host)?)
    }

    /// Host-file range of a byte range of this document's source
    #[must_use]
    pub fn host_range(&self, start: usize, end: usize) -> Range {
        Range::new(
            self.to_host(self.line_index.offset_to_position(start)),
            self.to_host(self.line_index.offset_to_position(end)),
        )
    }

    /// Host-file location of a name
    #[must_use]
    pub fn name_location(&self, name: &cst::Name) -> Location {
        let (start, end) = name_span(name);
        Location::new(self.uri.clone(), self.host_range(start, end))
    }

    fn index_fragments(&mut self, tree: &SyntaxTree) {
        let document = tree.document();

        for definition in document.definitions() {
            let cst::Definition::FragmentDefinition(fragment) = definition else {
                continue;
            };
            let Some(name) = fragment.fragment_name().and_then(|n| n.name()) else {
                continue;
            };
            let type_condition = fragment
                .type_condition()
                .and_then(|tc| tc.named_type())
                .and_then(|named| named.name())
                .map(|name| name.text().to_string())
                .unwrap_or_default();

            self.fragments.push(FragmentDefinition {
                name: name.text().to_string(),
                type_condition,
                location: Some(self.name_location(&name)),
            });
        }

        for spread in document
            .syntax()
            .descendants()
            .filter_map(cst::FragmentSpread::cast)
        {
            let Some(name) = spread.fragment_name().and_then(|n| n.name()) else {
                continue;
            };
            self.spreads.push(FragmentSpread {
                name: name.text().to_string(),
                location: Some(self.name_location(&name)),
            });
        }
    }
}

/// Byte span of a name's identifier.
///
/// The CST attaches trailing whitespace and commas to the preceding node, so
/// the node's own range can run past the identifier.
pub(crate) fn name_span(name: &cst::Name) -> (usize, usize) {
    let start: usize = name.syntax().text_range().start().into();
    (start, start + name.text().len())
}

/// Loads the documents matched by a project's `documents` patterns
pub struct DocumentLoader {
    patterns: Vec<String>,
    base_path: Option<PathBuf>,
    extract_config: ExtractConfig,
}

impl DocumentLoader {
    #[must_use]
    pub fn new(patterns: &[&str]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
            base_path: None,
            extract_config: ExtractConfig::default(),
        }
    }

    #[must_use]
    pub fn with_base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_extract_config(mut self, config: ExtractConfig) -> Self {
        self.extract_config = config;
        self
    }

    /// Load every matching file as `(uri, documents)`, in pattern order.
    ///
    /// Files that cannot be read are logged and skipped.
    pub async fn load(&self) -> Result<Vec<(String, Vec<Document>)>> {
        let mut loaded = Vec::new();

        for path in self.find_files()? {
            match self.load_file(&path).await {
                Ok(documents) => loaded.push((file_uri(&path), documents)),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping document"),
            }
        }

        tracing::debug!(files = loaded.len(), "loaded documents");
        Ok(loaded)
    }

    fn find_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for pattern in &self.patterns {
            for expanded in expand_braces(pattern) {
                let expanded = expanded.trim_start_matches("./");
                let full = self.base_path.as_ref().map_or_else(
                    || expanded.to_string(),
                    |base| base.join(expanded).display().to_string(),
                );

                for entry in glob::glob(&full)? {
                    match entry {
                        Ok(path) if path.is_file() && !files.contains(&path) => files.push(path),
                        Ok(_) => {}
                        Err(e) => {
                            return Err(ProjectError::DocumentLoad(format!("Glob error: {e}")));
                        }
                    }
                }
            }
        }

        Ok(files)
    }

    /// Extraction parses JavaScript and TypeScript, so it runs off the async
    /// worker threads.
    async fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let uri = file_uri(path);
        let path = path.to_path_buf();
        let config = self.extract_config.clone();

        let extracted = tokio::task::spawn_blocking(move || extract_from_file(&path, &config))
            .await
            .map_err(|e| ProjectError::DocumentLoad(format!("extraction task failed: {e}")))??;

        Ok(extracted
            .iter()
            .map(|block| Document::from_extracted(uri.as_str(), block))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_indexes_fragments_and_spreads() {
        let source = "query Q {\n  user {\n    ...UserFields\n  }\n}\n\nfragment UserFields on User {\n  id\n  ...Nested\n}\n";
        let document = Document::parse("file:///q.graphql", source, SourceSpan::whole(source));

        assert!(document.tree().is_some());
        assert_eq!(document.fragments().len(), 1);
        assert_eq!(document.fragments()[0].type_condition, "User");
        assert_eq!(
            document.fragments()[0].location.as_ref().unwrap().range,
            Range::new(Position::new(6, 9), Position::new(6, 19))
        );

        let names: Vec<_> = document.spreads().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["UserFields", "Nested"]);
        assert_eq!(
            document.spreads()[0].location.as_ref().unwrap().range.start,
            Position::new(2, 7)
        );
    }

    #[test]
    fn test_unparseable_document_has_no_tree() {
        let document = Document::parse("file:///bad.graphql", "}}}", SourceSpan::whole("}}}"));

        assert!(document.tree().is_none());
        assert_eq!(document.definitions().count(), 0);
    }

    #[test]
    fn test_partial_document_keeps_tree() {
        let source = "query { user { id } \n";
        let document = Document::parse("file:///q.graphql", source, SourceSpan::whole(source));

        assert!(document.tree().is_some());
    }

    #[test]
    fn test_embedded_position_translation() {
        let host = "import { gql } from 'graphql-tag';\n\nconst Q = gql`\n  query {\n    user { id }\n  }\n`;\n";
        let documents = Document::from_host_text(
            "file:///app.ts",
            host,
            Language::TypeScript,
            &ExtractConfig::default(),
        )
        .unwrap();
        assert_eq!(documents.len(), 1);
        let document = &documents[0];

        assert_eq!(document.span().start, Position::new(2, 14));
        assert_eq!(
            document.to_document(Position::new(4, 4)),
            Some(Position::new(2, 4))
        );
        assert_eq!(document.to_host(Position::new(0, 0)), Position::new(2, 14));
        assert!(document.contains(Position::new(3, 2)));
        assert!(!document.contains(Position::new(0, 0)));
        assert_eq!(document.to_document(Position::new(1, 0)), None);

        let offset = document.offset_at(Position::new(4, 4)).unwrap();
        assert!(document.source()[offset..].starts_with("user"));
    }

    #[tokio::test]
    async fn test_loader_reads_graphql_and_host_files() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("src")).unwrap();
        fs::write(
            temp_dir.path().join("src/query.graphql"),
            "query A { user { id } }",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("src/component.tsx"),
            "const B = gql`query B { user { id } }`;\nconst C = gql`fragment C on User { id }`;\n",
        )
        .unwrap();

        let loaded = DocumentLoader::new(&["src/**/*.{graphql,tsx}"])
            .with_base_path(temp_dir.path())
            .load()
            .await
            .unwrap();

        assert_eq!(loaded.len(), 2);
        let (uri, documents) = &loaded[1];
        assert!(uri.ends_with("/src/component.tsx"));
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].fragments()[0].name, "C");
    }
}
