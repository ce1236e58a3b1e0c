use crate::{Document, GraphQLProject, Range};
use apollo_parser::cst;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLens {
    pub range: Range,
    pub title: String,
}

/// Code lenses for the file at `uri`.
///
/// Waits for the project's initial load, then visits every top-level
/// definition of every GraphQL block in the file. No definition currently
/// produces a lens.
pub async fn code_lenses(project: &GraphQLProject, uri: &str) -> Vec<CodeLens> {
    project.wait_until_ready().await;

    let Some(documents) = project.documents_at(uri) else {
        return Vec::new();
    };

    let mut lenses = Vec::new();
    let mut definitions = 0;
    for document in &documents {
        for definition in document.definitions() {
            definitions += 1;
            lenses.extend(lens_for(document, &definition));
        }
    }

    tracing::debug!(
        uri,
        blocks = documents.len(),
        definitions,
        "visited definitions for code lenses"
    );
    lenses
}

const fn lens_for(_document: &Document, _definition: &cst::Definition) -> Option<CodeLens> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_config::ProjectConfig;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_waits_for_ready_and_emits_nothing() {
        let project = Arc::new(GraphQLProject::new(
            "default",
            ProjectConfig::with_schema("schema.graphql"),
            "/project",
        ));
        let uri = "file:///project/app.ts";
        project.open_document(
            uri,
            "const a = gql`query A { version }`;\nconst b = gql`fragment B on Query { version }`;\n",
        );

        let lenses = tokio::spawn({
            let project = Arc::clone(&project);
            async move { code_lenses(&project, uri).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!lenses.is_finished());

        project.mark_ready();
        let lenses = tokio::time::timeout(Duration::from_secs(1), lenses)
            .await
            .unwrap()
            .unwrap();
        assert!(lenses.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_file() {
        let project = GraphQLProject::new(
            "default",
            ProjectConfig::with_schema("schema.graphql"),
            "/project",
        );
        project.mark_ready();

        assert!(code_lenses(&project, "file:///project/missing.graphql")
            .await
            .is_empty());
    }
}
