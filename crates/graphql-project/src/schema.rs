use crate::{file_uri, ProjectError, Result, SchemaFile};
use graphql_config::{expand_braces, is_url, Patterns};
use std::path::{Path, PathBuf};

/// Loads schema files from the patterns of a project config
pub struct SchemaLoader {
    patterns: Vec<String>,
    base_path: Option<PathBuf>,
}

impl SchemaLoader {
    #[must_use]
    pub fn new(patterns: &Patterns) -> Self {
        Self {
            patterns: patterns.as_strs().into_iter().map(str::to_string).collect(),
            base_path: None,
        }
    }

    #[must_use]
    pub fn with_base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load every schema file, in pattern order.
    pub async fn load(&self) -> Result<Vec<SchemaFile>> {
        let mut files = Vec::new();

        for pattern in &self.patterns {
            if is_url(pattern) {
                return Err(ProjectError::SchemaLoad(format!(
                    "Remote schemas are not supported: {pattern}"
                )));
            }

            for path in self.resolve(pattern)? {
                let content = tokio::fs::read_to_string(&path).await?;
                tracing::debug!(path = %path.display(), "loaded schema file");
                files.push(SchemaFile {
                    uri: file_uri(&path),
                    content,
                });
            }
        }

        if files.is_empty() {
            return Err(ProjectError::SchemaLoad(
                "No schema files found".to_string(),
            ));
        }

        Ok(files)
    }

    /// Expand a local pattern, which may contain globs and one `{a,b}` group.
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for expanded in expand_braces(pattern) {
            let expanded = expanded.trim_start_matches("./");
            let full = self.base_path.as_ref().map_or_else(
                || expanded.to_string(),
                |base| base.join(expanded).display().to_string(),
            );

            for entry in glob::glob(&full)? {
                match entry {
                    Ok(path) if path.is_file() && !paths.contains(&path) => paths.push(path),
                    Ok(_) => {}
                    Err(e) => {
                        return Err(ProjectError::SchemaLoad(format!("Glob error: {e}")));
                    }
                }
            }
        }

        if paths.is_empty() {
            return Err(ProjectError::SchemaLoad(format!(
                "No files matched pattern: {pattern}"
            )));
        }

        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_single_local_file() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("schema.graphql"),
            "type Query { hello: String }",
        )
        .unwrap();

        let loader = SchemaLoader::new(&Patterns::One("schema.graphql".to_string()))
            .with_base_path(temp_dir.path());
        let files = loader.load().await.unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].content.contains("type Query"));
        assert!(files[0].uri.starts_with("file:///"));
        assert!(files[0].uri.ends_with("/schema.graphql"));
    }

    #[tokio::test]
    async fn test_load_multiple_files_with_glob_and_braces() {
        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("schema")).unwrap();
        fs::write(
            temp_dir.path().join("schema/query.graphql"),
            "type Query { hello: String }",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("schema/mutation.graphqls"),
            "type Mutation { hello: String }",
        )
        .unwrap();

        let loader = SchemaLoader::new(&Patterns::One(
            "./schema/*.{graphql,graphqls}".to_string(),
        ))
        .with_base_path(temp_dir.path());
        let files = loader.load().await.unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|file| file.content.contains("type Mutation")));
    }

    #[tokio::test]
    async fn test_remote_schema_is_rejected() {
        let loader = SchemaLoader::new(&Patterns::One(
            "https://example.com/graphql".to_string(),
        ));

        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, ProjectError::SchemaLoad(_)));
    }

    #[tokio::test]
    async fn test_missing_files() {
        let temp_dir = tempdir().unwrap();
        let loader = SchemaLoader::new(&Patterns::One("*.graphql".to_string()))
            .with_base_path(temp_dir.path());

        let err = loader.load().await.unwrap_err();
        assert!(err.to_string().contains("No files matched"));
    }
}
