use crate::conversions::{
    convert_code_lens, convert_completion_item, convert_hover, convert_lsp_position,
    convert_project_location,
};
use dashmap::DashMap;
use graphql_project::{LanguageService, ProjectWorkspace, Workspace};
use lsp_types::{
    CodeLens, CodeLensOptions, CodeLensParams, CompletionOptions, CompletionParams,
    CompletionResponse, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, Location, MessageType, OneOf, ReferenceParams,
    ServerCapabilities, ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::jsonrpc::Result;
use tower_lsp_server::{Client, LanguageServer, UriExt};

pub struct GraphQLLanguageServer {
    client: Client,
    /// Workspace folders from initialization, loaded once the client is ready
    init_workspace_folders: DashMap<String, PathBuf>,
    workspace: Arc<ProjectWorkspace>,
    service: LanguageService<ProjectWorkspace>,
    /// One token per open document, cancelled whenever its text changes so
    /// that requests computed against stale text are abandoned
    revisions: DashMap<String, CancellationToken>,
}

impl GraphQLLanguageServer {
    pub fn new(client: Client) -> Self {
        let workspace = Arc::new(ProjectWorkspace::new());
        Self {
            client,
            init_workspace_folders: DashMap::new(),
            service: LanguageService::new(Arc::clone(&workspace)),
            workspace,
            revisions: DashMap::new(),
        }
    }

    /// Discover the config of a workspace folder and load every project in it
    async fn load_workspace(&self, root: &Path) {
        tracing::info!(root = %root.display(), "loading GraphQL config");

        let projects = match self.workspace.discover(root) {
            Ok(projects) if projects.is_empty() => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!(
                            "No GraphQL config found in {}. Add a .graphqlrc.yml to enable GraphQL features.",
                            root.display()
                        ),
                    )
                    .await;
                return;
            }
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!(root = %root.display(), "failed to load GraphQL config: {e}");
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to load GraphQL config: {e}"),
                    )
                    .await;
                return;
            }
        };

        for project in projects {
            // readiness is signalled even when loading fails
            if let Err(e) = project.load().await {
                tracing::error!(project = project.name(), "failed to load project: {e}");
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to load GraphQL project '{}': {e}", project.name()),
                    )
                    .await;
            }
        }

        self.client
            .log_message(MessageType::INFO, "GraphQL config loaded")
            .await;
    }

    /// A token for a request against the current text of `uri`
    fn request_token(&self, uri: &str) -> CancellationToken {
        self.revisions
            .entry(uri.to_string())
            .or_default()
            .child_token()
    }

    fn bump_revision(&self, uri: &str) {
        if let Some(stale) = self
            .revisions
            .insert(uri.to_string(), CancellationToken::new())
        {
            stale.cancel();
        }
    }

    async fn update_document(&self, uri: &str, text: &str) {
        self.bump_revision(uri);
        match self.workspace.project_for_file(uri).await {
            Some(project) => project.open_document(uri, text),
            None => tracing::debug!(uri, "ignoring document outside every project"),
        }
    }
}

impl LanguageServer for GraphQLLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing GraphQL Language Server");

        if let Some(ref folders) = params.workspace_folders {
            tracing::info!(folders = folders.len(), "workspace folders");
            for folder in folders {
                if let Some(path) = folder.uri.to_file_path() {
                    self.init_workspace_folders
                        .insert(folder.uri.as_str().to_string(), path.into_owned());
                }
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        ["{", "(", ".", "@", " "]
                            .into_iter()
                            .map(String::from)
                            .collect(),
                    ),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                references_provider: Some(OneOf::Left(true)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "GraphQL Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        tracing::info!("GraphQL Language Server initialized");

        let folders: Vec<PathBuf> = self
            .init_workspace_folders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        for root in folders {
            self.load_workspace(&root).await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down GraphQL Language Server");
        for entry in self.revisions.iter() {
            entry.value().cancel();
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!(uri = uri.as_str(), "document opened");

        self.update_document(uri.as_str(), &params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!(uri = uri.as_str(), "document changed");

        // full sync: the last change carries the whole text
        if let Some(change) = params.content_changes.last() {
            self.update_document(uri.as_str(), &change.text).await;
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(project) = self.workspace.project_for_file(uri.as_str()).await else {
            return;
        };
        if !project.is_schema_file(uri.as_str()) {
            return;
        }

        if let Err(e) = project.reload_schema().await {
            tracing::error!(project = project.name(), "failed to reload schema: {e}");
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to reload schema for '{}': {e}", project.name()),
                )
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        tracing::debug!(uri = uri.as_str(), "document closed");

        if let Some((_, token)) = self.revisions.remove(uri.as_str()) {
            token.cancel();
        }
        if let Some(project) = self.workspace.project_for_file(uri.as_str()).await {
            project.close_document(uri.as_str()).await;
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let uri = position.text_document.uri.as_str();
        let token = self.request_token(uri);

        let items = self
            .service
            .completion(uri, convert_lsp_position(position.position), &token)
            .await;

        Ok(items.map(|items| {
            CompletionResponse::Array(items.into_iter().map(convert_completion_item).collect())
        }))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params;
        let uri = position.text_document.uri.as_str();
        let token = self.request_token(uri);

        let hover = self
            .service
            .hover(uri, convert_lsp_position(position.position), &token)
            .await;

        Ok(hover.map(convert_hover))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        let uri = position.text_document.uri.as_str();
        let token = self.request_token(uri);

        let location = self
            .service
            .definition(uri, convert_lsp_position(position.position), &token)
            .await;

        Ok(location
            .as_ref()
            .and_then(convert_project_location)
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let position = params.text_document_position;
        let uri = position.text_document.uri.as_str();
        let token = self.request_token(uri);

        let locations = self
            .service
            .references(
                uri,
                convert_lsp_position(position.position),
                params.context.include_declaration,
                &token,
            )
            .await;

        Ok(locations.map(|locations| {
            locations
                .iter()
                .filter_map(convert_project_location)
                .collect()
        }))
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let lenses = self
            .service
            .code_lenses(params.text_document.uri.as_str())
            .await;

        Ok(Some(lenses.into_iter().map(convert_code_lens).collect()))
    }
}
