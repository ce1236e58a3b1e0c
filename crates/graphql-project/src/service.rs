use crate::{
    code_lens, completion, find_references, goto_definition, hover, resolve, resolve_completion,
    suggest, CodeLens, CompletionContext, CompletionItem, Document, GraphQLProject, HoverInfo,
    Location, Position, ResolvedContext, SchemaIndex, Workspace,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Editor features for every project of a workspace.
///
/// Each request finds the owning project and document, checks that a schema
/// and a syntax tree are available, resolves the cursor and then answers from
/// the resolved context. A missing piece anywhere along the way answers
/// `None` rather than an error. Cancellation is checked once the project has
/// been found and is only a hint.
pub struct LanguageService<W> {
    workspace: Arc<W>,
}

/// What every position-based request needs before it can resolve the cursor
struct Snapshot {
    project: Arc<GraphQLProject>,
    document: Arc<Document>,
    schema: Arc<SchemaIndex>,
}

impl<W: Workspace> LanguageService<W> {
    #[must_use]
    pub const fn new(workspace: Arc<W>) -> Self {
        Self { workspace }
    }

    #[must_use]
    pub const fn workspace(&self) -> &Arc<W> {
        &self.workspace
    }

    pub async fn completion(
        &self,
        uri: &str,
        position: Position,
        token: &CancellationToken,
    ) -> Option<Vec<CompletionItem>> {
        tracing::debug!(uri, %position, "completion");
        let snapshot = self.snapshot(uri, position, token).await?;
        if snapshot.document.tree().is_none() {
            tracing::debug!(uri, "document has no syntax tree");
            return None;
        }

        let context = resolve_completion(
            &snapshot.document,
            &snapshot.schema,
            snapshot.project.as_ref(),
            position,
        )?;
        let items = suggest(&context, &snapshot.schema, snapshot.project.as_ref());

        Some(match &context {
            CompletionContext::FieldSelection { parent_type, .. } => {
                completion::enrich_for_parent(items, &snapshot.schema, parent_type)
            }
            _ => items,
        })
    }

    pub async fn hover(
        &self,
        uri: &str,
        position: Position,
        token: &CancellationToken,
    ) -> Option<HoverInfo> {
        tracing::debug!(uri, %position, "hover");
        let snapshot = self.snapshot(uri, position, token).await?;
        let context = Self::resolve(&snapshot, position)?;

        hover::hover(&context, &snapshot.schema)
    }

    pub async fn definition(
        &self,
        uri: &str,
        position: Position,
        token: &CancellationToken,
    ) -> Option<Location> {
        tracing::debug!(uri, %position, "definition");
        let snapshot = self.snapshot(uri, position, token).await?;
        let context = Self::resolve(&snapshot, position)?;

        goto_definition::goto_definition(&context, &snapshot.schema)
    }

    /// `include_declaration` is accepted for protocol compatibility. Only
    /// spreads are ever returned.
    pub async fn references(
        &self,
        uri: &str,
        position: Position,
        include_declaration: bool,
        token: &CancellationToken,
    ) -> Option<Vec<Location>> {
        tracing::debug!(uri, %position, include_declaration, "references");
        let snapshot = self.snapshot(uri, position, token).await?;
        let context = Self::resolve(&snapshot, position)?;

        find_references::find_references(&context, snapshot.project.as_ref())
    }

    pub async fn code_lenses(&self, uri: &str) -> Vec<CodeLens> {
        tracing::debug!(uri, "code lenses");
        let Some(project) = self.workspace.project_for_file(uri).await else {
            return Vec::new();
        };

        code_lens::code_lenses(&project, uri).await
    }

    async fn snapshot(
        &self,
        uri: &str,
        position: Position,
        token: &CancellationToken,
    ) -> Option<Snapshot> {
        let project = self.workspace.project_for_file(uri).await?;
        if token.is_cancelled() {
            tracing::debug!(uri, "request cancelled");
            return None;
        }

        let Some(document) = project.document_at(uri, position) else {
            tracing::debug!(uri, %position, "no document at position");
            return None;
        };
        let Some(schema) = project.schema() else {
            tracing::debug!(project = project.name(), "schema not loaded");
            return None;
        };

        Some(Snapshot {
            project,
            document,
            schema,
        })
    }

    fn resolve(snapshot: &Snapshot, position: Position) -> Option<ResolvedContext> {
        if snapshot.document.tree().is_none() {
            tracing::debug!(uri = snapshot.document.uri(), "document has no syntax tree");
            return None;
        }

        let context = resolve(
            &snapshot.document,
            &snapshot.schema,
            snapshot.project.as_ref(),
            position,
        );
        if context.is_none() {
            tracing::debug!(%position, "nothing to resolve at position");
        }
        context
    }
}
