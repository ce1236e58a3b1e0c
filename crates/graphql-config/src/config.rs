use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Contents of a GraphQL config file.
///
/// A file either describes one project at the top level or a `projects` map of
/// named projects. Both shapes are accepted by the same deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphQLConfig {
    Multi {
        projects: BTreeMap<String, ProjectConfig>,
    },
    Single(ProjectConfig),
}

/// Name given to the project of a single-project config file.
pub const DEFAULT_PROJECT: &str = "default";

impl GraphQLConfig {
    /// Iterate over `(name, project)` pairs in a stable order.
    pub fn projects(&self) -> Box<dyn Iterator<Item = (&str, &ProjectConfig)> + '_> {
        match self {
            Self::Single(config) => Box::new(std::iter::once((DEFAULT_PROJECT, config))),
            Self::Multi { projects } => {
                Box::new(projects.iter().map(|(name, config)| (name.as_str(), config)))
            }
        }
    }

    #[must_use]
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        match self {
            Self::Single(config) => (name == DEFAULT_PROJECT).then_some(config),
            Self::Multi { projects } => projects.get(name),
        }
    }

    #[must_use]
    pub fn project_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi { projects } => projects.len(),
        }
    }
}

/// One GraphQL project: a schema plus the documents written against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub schema: Patterns,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Patterns>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Patterns>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Patterns>,

    /// Tool-specific settings, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<BTreeMap<String, serde_json::Value>>,
}

impl ProjectConfig {
    /// Create a project with a single schema pattern and no documents.
    #[must_use]
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: Patterns::One(schema.into()),
            documents: None,
            include: None,
            exclude: None,
            extensions: None,
        }
    }

    #[must_use]
    pub fn documents(mut self, pattern: impl Into<String>) -> Self {
        self.documents = Some(Patterns::One(pattern.into()));
        self
    }

    /// Document patterns, or an empty list when none are configured.
    #[must_use]
    pub fn document_patterns(&self) -> Vec<&str> {
        self.documents.as_ref().map(Patterns::as_strs).unwrap_or_default()
    }

    /// Local schema patterns. URLs are skipped.
    #[must_use]
    pub fn local_schema_patterns(&self) -> Vec<&str> {
        self.schema
            .as_strs()
            .into_iter()
            .filter(|pattern| !is_url(pattern))
            .collect()
    }

    /// Whether `path` belongs to this project.
    ///
    /// A file belongs to a project when it matches one of its schema, documents
    /// or include patterns and none of its exclude patterns. Relative patterns are
    /// resolved against `base_dir`.
    #[must_use]
    pub fn matches_file(&self, base_dir: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(base_dir).unwrap_or(path);

        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|exclude| any_pattern_matches(&exclude.as_strs(), base_dir, relative));
        if excluded {
            return false;
        }

        let mut candidates = self.local_schema_patterns();
        candidates.extend(self.document_patterns());
        if let Some(include) = &self.include {
            candidates.extend(include.as_strs());
        }

        any_pattern_matches(&candidates, base_dir, relative)
    }
}

/// A single pattern or a list of them, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    #[must_use]
    pub fn as_strs(&self) -> Vec<&str> {
        match self {
            Self::One(pattern) => vec![pattern.as_str()],
            Self::Many(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

#[must_use]
pub fn is_url(pattern: &str) -> bool {
    pattern.starts_with("http://") || pattern.starts_with("https://")
}

/// Expand a single `{a,b}` group, since `glob` has no brace support.
#[must_use]
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (pattern.find('{'), pattern.find('}')) else {
        return vec![pattern.to_string()];
    };
    if close < open {
        return vec![pattern.to_string()];
    }

    let (before, after) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .map(|option| format!("{before}{option}{after}"))
        .collect()
}

fn any_pattern_matches(patterns: &[&str], base_dir: &Path, relative: &Path) -> bool {
    patterns.iter().any(|pattern| {
        expand_braces(pattern).iter().any(|expanded| {
            let expanded = expanded.trim_start_matches("./");
            let Ok(glob) = glob::Pattern::new(expanded) else {
                return false;
            };
            glob.matches_path(relative) || glob.matches_path(&base_dir.join(relative))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_single_project_lookup() {
        let config = GraphQLConfig::Single(
            ProjectConfig::with_schema("schema.graphql").documents("**/*.graphql"),
        );

        assert_eq!(config.project_count(), 1);
        assert!(config.project(DEFAULT_PROJECT).is_some());
        assert!(config.project("web").is_none());
    }

    #[test]
    fn test_multi_project_order_is_stable() {
        let mut projects = BTreeMap::new();
        projects.insert("web".to_string(), ProjectConfig::with_schema("web.graphql"));
        projects.insert("api".to_string(), ProjectConfig::with_schema("api.graphql"));
        let config = GraphQLConfig::Multi { projects };

        let names: Vec<_> = config.projects().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["api", "web"]);
    }

    #[test]
    fn test_remote_schema_is_not_a_local_pattern() {
        let config = ProjectConfig {
            schema: Patterns::Many(vec![
                "schema.graphql".to_string(),
                "https://api.example.com/graphql".to_string(),
            ]),
            documents: None,
            include: None,
            exclude: None,
            extensions: None,
        };

        assert_eq!(config.local_schema_patterns(), vec!["schema.graphql"]);
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(
            expand_braces("src/**/*.{ts,tsx}"),
            vec!["src/**/*.ts".to_string(), "src/**/*.tsx".to_string()]
        );
        assert_eq!(expand_braces("*.graphql"), vec!["*.graphql".to_string()]);
    }

    #[test]
    fn test_matches_file() {
        let base = PathBuf::from("/work");
        let mut config =
            ProjectConfig::with_schema("schema.graphql").documents("src/**/*.{graphql,ts}");
        config.exclude = Some(Patterns::One("src/generated/**".to_string()));

        assert!(config.matches_file(&base, Path::new("/work/schema.graphql")));
        assert!(config.matches_file(&base, Path::new("/work/src/user/query.graphql")));
        assert!(config.matches_file(&base, Path::new("/work/src/app.ts")));
        assert!(!config.matches_file(&base, Path::new("/work/src/generated/types.ts")));
        assert!(!config.matches_file(&base, Path::new("/work/README.md")));
    }
}
