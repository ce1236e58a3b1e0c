use crate::{
    normalize_uri, uri_to_path, Document, DocumentLoader, FragmentDefinition, FragmentRegistry,
    FragmentSpread, Position, Result, SchemaIndex, SchemaLoader, SourceSpan,
};
use graphql_config::{GraphQLConfig, ProjectConfig};
use graphql_extract::{ExtractConfig, Language};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// A schema plus the documents written against it.
///
/// All state sits behind locks so a project can be shared between concurrent
/// requests. Documents are stored as immutable snapshots keyed by normalized
/// file URI, in the order they were first indexed.
pub struct GraphQLProject {
    name: String,
    config: ProjectConfig,
    base_dir: PathBuf,
    extract_config: ExtractConfig,
    schema: RwLock<Option<Arc<SchemaIndex>>>,
    schema_files: RwLock<Vec<String>>,
    documents: RwLock<IndexMap<String, Vec<Arc<Document>>>>,
    ready: watch::Sender<bool>,
}

impl GraphQLProject {
    #[must_use]
    pub fn new(name: impl Into<String>, config: ProjectConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            config,
            base_dir: base_dir.into(),
            extract_config: ExtractConfig::default(),
            schema: RwLock::new(None),
            schema_files: RwLock::new(Vec::new()),
            documents: RwLock::new(IndexMap::new()),
            ready: watch::Sender::new(false),
        }
    }

    /// Create one project per entry of a config file. Relative patterns resolve
    /// against `base_dir`, normally the directory holding the config.
    #[must_use]
    pub fn from_config(config: &GraphQLConfig, base_dir: &Path) -> Vec<Self> {
        config
            .projects()
            .map(|(name, project)| Self::new(name, project.clone(), base_dir))
            .collect()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The schema, absent until one has been loaded
    #[must_use]
    pub fn schema(&self) -> Option<Arc<SchemaIndex>> {
        self.schema.read().clone()
    }

    pub fn set_schema(&self, schema: SchemaIndex) {
        *self.schema.write() = Some(Arc::new(schema));
    }

    /// Load the schema and the documents, then signal readiness.
    ///
    /// Readiness is signalled even when loading fails, so that waiting requests
    /// resume and answer with whatever is available.
    pub async fn load(&self) -> Result<()> {
        let schema = self.load_schema().await;
        let documents = self.load_documents().await;
        self.mark_ready();

        tracing::info!(
            project = %self.name,
            files = self.documents.read().len(),
            schema = self.schema.read().is_some(),
            "project loaded"
        );

        schema.and(documents)
    }

    /// Load the schema files and index them. Schema files are also kept as
    /// documents so that editor features work inside them.
    pub async fn load_schema(&self) -> Result<()> {
        let files = SchemaLoader::new(&self.config.schema)
            .with_base_path(&self.base_dir)
            .load()
            .await?;

        let index = SchemaIndex::from_schema_files(&files);
        let uris: Vec<String> = files.iter().map(|file| file.uri.clone()).collect();

        {
            let mut documents = self.documents.write();
            for file in &files {
                let span = SourceSpan::whole(&file.content);
                let document = Document::parse(file.uri.clone(), file.content.clone(), span);
                documents.insert(file.uri.clone(), vec![Arc::new(document)]);
            }
        }

        *self.schema_files.write() = uris;
        self.set_schema(index);
        Ok(())
    }

    pub async fn reload_schema(&self) -> Result<()> {
        tracing::info!(project = %self.name, "reloading schema");
        self.load_schema().await
    }

    pub async fn load_documents(&self) -> Result<()> {
        let patterns = self.config.document_patterns();
        if patterns.is_empty() {
            return Ok(());
        }

        let loaded = DocumentLoader::new(&patterns)
            .with_base_path(&self.base_dir)
            .with_extract_config(self.extract_config.clone())
            .load()
            .await?;

        let mut documents = self.documents.write();
        for (uri, blocks) in loaded {
            documents.insert(uri, blocks.into_iter().map(Arc::new).collect());
        }
        Ok(())
    }

    pub fn mark_ready(&self) {
        self.ready.send_replace(true);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolve once the initial load has finished.
    pub async fn wait_until_ready(&self) {
        let mut ready = self.ready.subscribe();
        // the sender lives as long as `self`, so this cannot fail
        let _ = ready.wait_for(|ready| *ready).await;
    }

    /// Index in-memory editor text for `uri`, replacing what was there.
    ///
    /// Host text that does not parse keeps the previously indexed blocks.
    pub fn open_document(&self, uri: &str, text: &str) {
        let uri = normalize_uri(uri);
        let language = uri_to_path(&uri)
            .and_then(|path| Language::from_path(&path))
            .unwrap_or(Language::GraphQL);

        let blocks = match Document::from_host_text(&uri, text, language, &self.extract_config) {
            Ok(blocks) => blocks.into_iter().map(Arc::new).collect::<Vec<_>>(),
            Err(e) => {
                tracing::debug!(uri = %uri, error = %e, "keeping previous blocks");
                return;
            }
        };

        tracing::debug!(uri = %uri, blocks = blocks.len(), "indexed document");
        self.documents.write().insert(uri, blocks);
    }

    /// Drop editor state for `uri`. Files that belong to the project on disk
    /// are re-read so the index keeps reflecting the saved content.
    pub async fn close_document(&self, uri: &str) {
        let uri = normalize_uri(uri);
        let on_disk = match uri_to_path(&uri) {
            Some(path) if self.matches_file(&path) => tokio::fs::read_to_string(&path).await.ok(),
            _ => None,
        };

        match on_disk {
            Some(text) => self.open_document(&uri, &text),
            None => {
                self.documents.write().shift_remove(&uri);
            }
        }
    }

    /// Every GraphQL block of the file at `uri`
    #[must_use]
    pub fn documents_at(&self, uri: &str) -> Option<Vec<Arc<Document>>> {
        self.documents.read().get(&normalize_uri(uri)).cloned()
    }

    /// The block of the file at `uri` that contains `position`
    #[must_use]
    pub fn document_at(&self, uri: &str, position: Position) -> Option<Arc<Document>> {
        self.documents
            .read()
            .get(&normalize_uri(uri))?
            .iter()
            .find(|document| document.contains(position))
            .cloned()
    }

    /// All documents, in index order
    #[must_use]
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.documents.read().values().flatten().cloned().collect()
    }

    #[must_use]
    pub fn is_schema_file(&self, uri: &str) -> bool {
        let uri = normalize_uri(uri);
        self.schema_files.read().iter().any(|schema| *schema == uri)
    }

    /// Whether a file on disk belongs to this project
    #[must_use]
    pub fn matches_file(&self, path: &Path) -> bool {
        self.config.matches_file(&self.base_dir, path)
    }
}

impl FragmentRegistry for GraphQLProject {
    fn fragment(&self, name: &str) -> Option<FragmentDefinition> {
        self.documents
            .read()
            .values()
            .flatten()
            .flat_map(|document| document.fragments())
            .find(|fragment| fragment.name == name)
            .cloned()
    }

    fn fragment_spreads(&self, name: &str) -> Vec<FragmentSpread> {
        self.documents
            .read()
            .values()
            .flatten()
            .flat_map(|document| document.spreads())
            .filter(|spread| spread.name == name)
            .cloned()
            .collect()
    }

    fn fragments(&self) -> Vec<FragmentDefinition> {
        let mut seen = HashSet::new();
        self.documents
            .read()
            .values()
            .flatten()
            .flat_map(|document| document.fragments())
            .filter(|fragment| seen.insert(fragment.name.clone()))
            .cloned()
            .collect()
    }
}
