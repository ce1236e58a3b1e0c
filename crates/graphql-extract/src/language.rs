use std::path::Path;

/// Host languages GraphQL can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    /// Plain GraphQL files (.graphql, .gql, .graphqls)
    GraphQL,
    /// TypeScript (.ts, .tsx, .mts, .cts)
    TypeScript,
    /// JavaScript (.js, .jsx, .mjs, .cjs)
    JavaScript,
}

impl Language {
    /// Detect the language from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "graphql" | "gql" | "graphqls" => Some(Self::GraphQL),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            _ => None,
        }
    }

    /// Whether GraphQL has to be located inside template literals.
    #[must_use]
    pub const fn is_embedded(self) -> bool {
        matches!(self, Self::TypeScript | Self::JavaScript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("schema.graphqls")),
            Some(Language::GraphQL)
        );
        assert_eq!(
            Language::from_path(Path::new("queries.gql")),
            Some(Language::GraphQL)
        );
        assert_eq!(
            Language::from_path(Path::new("Component.tsx")),
            Some(Language::TypeScript)
        );
        assert_eq!(
            Language::from_path(Path::new("client.mjs")),
            Some(Language::JavaScript)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_is_embedded() {
        assert!(!Language::GraphQL.is_embedded());
        assert!(Language::TypeScript.is_embedded());
        assert!(Language::JavaScript.is_embedded());
    }
}
