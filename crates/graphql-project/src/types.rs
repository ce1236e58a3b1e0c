use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// A zero-based line and UTF-16 character offset, as editors count them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `position` lies inside the range. Both ends are inclusive.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }
}

/// A range inside a specific file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

impl Location {
    #[must_use]
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

/// Build a `file://` URI for a path. Relative paths resolve against the
/// current directory.
#[must_use]
pub fn file_uri(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Url::from_file_path(&absolute).map_or_else(
        |()| format!("file://{}", absolute.display()),
        String::from,
    )
}

/// Turn a `file://` URI back into a path. Other schemes yield `None`.
#[must_use]
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    Url::parse(uri).ok()?.to_file_path().ok()
}

/// The canonical spelling of a document URI.
///
/// Clients may percent-encode characters such as `@` or `:` that the loader
/// leaves alone. File URIs are rebuilt from their path so both spellings map
/// to one key. Anything else is returned as given.
#[must_use]
pub fn normalize_uri(uri: &str) -> String {
    uri_to_path(uri).map_or_else(|| uri.to_string(), |path| file_uri(&path))
}
