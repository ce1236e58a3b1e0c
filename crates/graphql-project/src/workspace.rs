use crate::{uri_to_path, GraphQLProject, Result};
use dashmap::DashMap;
use graphql_config::{find_config, load_config};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Finds the project that owns a file.
pub trait Workspace: Send + Sync {
    fn project_for_file(
        &self,
        uri: &str,
    ) -> impl Future<Output = Option<Arc<GraphQLProject>>> + Send;
}

/// Projects grouped by the workspace folder their config was found in
#[derive(Default)]
pub struct ProjectWorkspace {
    roots: DashMap<PathBuf, Vec<Arc<GraphQLProject>>>,
}

impl ProjectWorkspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find and read the config for a workspace folder and register its projects.
    ///
    /// Projects are returned unloaded. A folder without a config yields no
    /// projects.
    pub fn discover(&self, root: &Path) -> Result<Vec<Arc<GraphQLProject>>> {
        let Some(config_path) = find_config(root)? else {
            tracing::info!(root = %root.display(), "no GraphQL config found");
            return Ok(Vec::new());
        };

        let config = load_config(&config_path)?;
        let base_dir = config_path.parent().unwrap_or(root);
        tracing::info!(
            config = %config_path.display(),
            projects = config.project_count(),
            "found GraphQL config"
        );

        let projects = GraphQLProject::from_config(&config, base_dir);
        Ok(self.add_root(root.to_path_buf(), projects))
    }

    pub fn add_root(
        &self,
        root: PathBuf,
        projects: Vec<GraphQLProject>,
    ) -> Vec<Arc<GraphQLProject>> {
        let projects: Vec<_> = projects.into_iter().map(Arc::new).collect();
        self.roots.insert(root, projects.clone());
        projects
    }

    pub fn remove_root(&self, root: &Path) {
        self.roots.remove(root);
    }

    /// Every registered project
    #[must_use]
    pub fn projects(&self) -> Vec<Arc<GraphQLProject>> {
        self.roots
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect()
    }

    fn lookup(&self, uri: &str) -> Option<Arc<GraphQLProject>> {
        let path = uri_to_path(uri)?;

        self.roots
            .iter()
            .filter(|entry| path.starts_with(entry.key()))
            .find_map(|entry| {
                entry
                    .value()
                    .iter()
                    .find(|project| {
                        project.matches_file(&path)
                            || project.is_schema_file(uri)
                            || project.documents_at(uri).is_some()
                    })
                    .cloned()
            })
    }
}

impl Workspace for ProjectWorkspace {
    async fn project_for_file(&self, uri: &str) -> Option<Arc<GraphQLProject>> {
        let project = self.lookup(uri);
        if project.is_none() {
            tracing::debug!(uri, "no project owns this file");
        }
        project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_uri;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_discover_and_lookup() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(".graphqlrc.yml"),
            r"
projects:
  api:
    schema: api/schema.graphql
    documents: api/**/*.graphql
  web:
    schema: web/schema.graphql
    documents: web/**/*.{ts,tsx}
",
        )
        .unwrap();

        let workspace = ProjectWorkspace::new();
        let projects = workspace.discover(temp_dir.path()).unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(workspace.projects().len(), 2);

        let api = file_uri(&temp_dir.path().join("api/queries/user.graphql"));
        let web = file_uri(&temp_dir.path().join("web/src/App.tsx"));
        let other = file_uri(&temp_dir.path().join("README.md"));

        assert_eq!(workspace.project_for_file(&api).await.unwrap().name(), "api");
        assert_eq!(workspace.project_for_file(&web).await.unwrap().name(), "web");
        assert!(workspace.project_for_file(&other).await.is_none());
        assert!(workspace.project_for_file("untitled:Untitled-1").await.is_none());
    }

    #[tokio::test]
    async fn test_folder_without_config() {
        let temp_dir = tempdir().unwrap();
        let workspace = ProjectWorkspace::new();

        assert!(workspace.discover(temp_dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_root() {
        let workspace = ProjectWorkspace::new();
        workspace.add_root(
            PathBuf::from("/work"),
            vec![GraphQLProject::new(
                "default",
                graphql_config::ProjectConfig::with_schema("schema.graphql"),
                "/work",
            )],
        );
        assert!(workspace
            .project_for_file("file:///work/schema.graphql")
            .await
            .is_some());

        workspace.remove_root(Path::new("/work"));
        assert!(workspace
            .project_for_file("file:///work/schema.graphql")
            .await
            .is_none());
    }
}
