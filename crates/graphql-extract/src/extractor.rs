use crate::{ExtractError, Language, Position, Range, Result, SourceLocation};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Spanned};
use swc_core::ecma::ast::{CallExpr, Callee, Expr, TaggedTpl, Tpl};
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_core::ecma::visit::{Visit, VisitWith};

/// Controls which template literals count as GraphQL
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Comment marking an untagged template, as in /* GraphQL */ `query { ... }`
    pub magic_comment: String,

    /// Template tags, as in gql`query { ... }` or graphql(`query { ... }`)
    pub tag_identifiers: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            magic_comment: "GraphQL".to_string(),
            tag_identifiers: vec!["gql".to_string(), "graphql".to_string()],
        }
    }
}

/// A block of GraphQL text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedGraphQL {
    /// GraphQL text. Template placeholders are blanked out so that
    /// line/column positions inside the block still line up with the host file.
    pub source: String,

    pub location: SourceLocation,

    /// The tag that introduced the template, if any
    pub tag_name: Option<String>,
}

/// Read `path` and extract every GraphQL block from it.
pub fn extract_from_file(path: &Path, config: &ExtractConfig) -> Result<Vec<ExtractedGraphQL>> {
    let language = Language::from_path(path)
        .ok_or_else(|| ExtractError::UnsupportedFileType(path.to_path_buf()))?;

    let source = fs::read_to_string(path)?;
    extract_from_source(&source, language, config)
}

/// Extract every GraphQL block from in-memory host text.
///
/// JavaScript and TypeScript are parsed, so backticks inside strings and
/// comments never open a template. Host text that does not parse is an error.
pub fn extract_from_source(
    source: &str,
    language: Language,
    config: &ExtractConfig,
) -> Result<Vec<ExtractedGraphQL>> {
    let syntax = match language {
        Language::GraphQL => {
            return Ok(vec![ExtractedGraphQL {
                source: source.to_string(),
                location: SourceLocation::new(
                    0,
                    source.len(),
                    Range::new(Position::default(), position_from_offset(source, source.len())),
                ),
                tag_name: None,
            }]);
        }
        Language::TypeScript => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        Language::JavaScript => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    };

    let source_map: Lrc<SourceMap> = Lrc::default();
    let file = source_map.new_source_file(FileName::Anon.into(), source.to_string());

    let mut parser = Parser::new(syntax, StringInput::from(&*file), None);
    let module = parser
        .parse_module()
        .map_err(|e| ExtractError::Parse(format!("{:?}", e.kind())))?;

    let mut collector = TemplateCollector {
        source,
        start_pos: file.start_pos,
        config,
        seen: HashSet::new(),
        blocks: Vec::new(),
    };
    module.visit_with(&mut collector);

    let mut blocks = collector.blocks;
    blocks.sort_by_key(|block| block.location.offset);
    tracing::trace!(count = blocks.len(), "extracted embedded GraphQL blocks");
    Ok(blocks)
}

/// Collects the GraphQL templates of a parsed module
struct TemplateCollector<'a> {
    source: &'a str,
    start_pos: BytePos,
    config: &'a ExtractConfig,
    /// Templates already taken, by start offset
    seen: HashSet<usize>,
    blocks: Vec<ExtractedGraphQL>,
}

impl TemplateCollector<'_> {
    fn offset(&self, pos: BytePos) -> usize {
        (pos.0 - self.start_pos.0) as usize
    }

    fn tag_of(&self, expr: &Expr) -> Option<String> {
        let Expr::Ident(ident) = expr else {
            return None;
        };
        let name: &str = &ident.sym;
        self.config
            .tag_identifiers
            .iter()
            .any(|tag| tag == name)
            .then(|| name.to_string())
    }

    /// Whether `/* <magic comment> */` sits right before `offset`
    fn has_magic_comment(&self, offset: usize) -> bool {
        let Some(before_close) = self.source[..offset].trim_end().strip_suffix("*/") else {
            return false;
        };
        before_close
            .rfind("/*")
            .is_some_and(|open| before_close[open + 2..].trim() == self.config.magic_comment)
    }

    fn record(&mut self, tpl: &Tpl, tag_name: Option<String>) {
        let tick = self.offset(tpl.span.lo);
        if !self.seen.insert(tick) {
            return;
        }

        let body_start = tick + 1;
        let body_end = self.offset(tpl.span.hi).saturating_sub(1).max(body_start);
        let placeholders = self.placeholders(tpl);

        let mut body = String::with_capacity(body_end - body_start);
        for (index, ch) in self.source[body_start..body_end].char_indices() {
            let at = body_start + index;
            if placeholders.iter().any(|&(open, close)| open <= at && at < close) {
                blank(&mut body, ch);
            } else {
                body.push(ch);
            }
        }

        let range = Range::new(
            position_from_offset(self.source, body_start),
            position_from_offset(self.source, body_end),
        );
        self.blocks.push(ExtractedGraphQL {
            source: body,
            location: SourceLocation::new(body_start, body_end - body_start, range),
            tag_name,
        });
    }

    /// Byte ranges of the `${...}` placeholders of a template
    fn placeholders(&self, tpl: &Tpl) -> Vec<(usize, usize)> {
        tpl.exprs
            .iter()
            .filter_map(|expr| {
                let span = expr.span();
                let (start, end) = (self.offset(span.lo), self.offset(span.hi));
                let open = self.source[..start].rfind("${")?;
                let close = end + self.source[end..].find('}')? + 1;
                Some((open, close))
            })
            .collect()
    }
}

impl Visit for TemplateCollector<'_> {
    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        if let Some(tag) = self.tag_of(&node.tag) {
            self.record(&node.tpl, Some(tag));
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee {
            if let Some(tag) = self.tag_of(callee) {
                if let Some(Expr::Tpl(tpl)) = node
                    .args
                    .first()
                    .filter(|arg| arg.spread.is_none())
                    .map(|arg| &*arg.expr)
                {
                    self.record(tpl, Some(tag));
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        if self.has_magic_comment(self.offset(node.span.lo)) {
            self.record(node, None);
        }
        node.visit_children_with(self);
    }
}

fn blank(body: &mut String, ch: char) {
    if ch == '\n' {
        body.push('\n');
    } else {
        body.push_str(&" ".repeat(ch.len_utf16()));
    }
}

/// Line and UTF-16 column of a byte offset
#[allow(clippy::cast_possible_truncation)]
fn position_from_offset(source: &str, offset: usize) -> Position {
    let mut line = 0;
    let mut column = 0;

    for (index, ch) in source.char_indices() {
        if index >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += ch.len_utf16() as u32;
        }
    }

    Position::new(line, column)
}
