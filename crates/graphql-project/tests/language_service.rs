#![cfg(not(target_os = "windows"))]

use graphql_project::{
    file_uri, CancellationToken, GraphQLProject, InsertTextFormat, LanguageService, LineIndex,
    Location, Position, ProjectWorkspace, Range,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const CONFIG: &str = "schema: schema.graphql\ndocuments: \"src/**/*.{graphql,ts}\"\n";

const FRAGMENTS: &str = "fragment PostFields on Post {\n  id\n  title\n}\n";

const USER_QUERY: &str = r#"query UserPosts {
  user(id: "1") {
    posts {
      ...PostFields
    }
  }
}
"#;

const FEED: &str = r"import { gql } from 'graphql-tag';

export const FEED = gql`
  query Feed {
    posts {
      ...PostFields
    }
  }
`;
";

struct TestWorkspace {
    _dir: TempDir,
    root: PathBuf,
    project: Arc<GraphQLProject>,
    service: LanguageService<ProjectWorkspace>,
}

impl TestWorkspace {
    fn uri(&self, path: &str) -> String {
        file_uri(&self.root.join(path))
    }

    /// Open editor text containing a `*` cursor marker
    fn open(&self, path: &str, text: &str) -> (String, Position) {
        let (source, position) = cursor(text);
        let uri = self.uri(path);
        self.project.open_document(&uri, &source);
        (uri, position)
    }
}

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn cursor(text: &str) -> (String, Position) {
    let offset = text.find('*').expect("no `*` cursor marker");
    let source = format!("{}{}", &text[..offset], &text[offset + 1..]);
    let position = LineIndex::new(&source).offset_to_position(offset);
    (source, position)
}

async fn workspace() -> TestWorkspace {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path().to_path_buf();

    let schema = fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("schema.graphql"),
    )
    .expect("Failed to read schema");

    write(&root, ".graphqlrc.yml", CONFIG);
    write(&root, "schema.graphql", &schema);
    write(&root, "src/fragments.graphql", FRAGMENTS);
    write(&root, "src/user.graphql", USER_QUERY);
    write(&root, "src/feed.ts", FEED);

    let workspace = ProjectWorkspace::new();
    let projects = workspace.discover(&root).expect("Failed to discover config");
    assert_eq!(projects.len(), 1);

    let project = Arc::clone(&projects[0]);
    project.load().await.expect("Failed to load project");

    TestWorkspace {
        _dir: dir,
        root,
        project,
        service: LanguageService::new(Arc::new(workspace)),
    }
}

fn range(line: u32, start: u32, end: u32) -> Range {
    Range::new(Position::new(line, start), Position::new(line, end))
}

#[tokio::test]
async fn test_field_completion_inserts_snippet() {
    let ws = workspace().await;
    let (uri, position) = ws.open("src/new.graphql", "{ us* }");

    let items = ws
        .service
        .completion(&uri, position, &CancellationToken::new())
        .await
        .expect("completion");

    let labels: Vec<_> = items.iter().map(|item| item.label.as_str()).collect();
    assert_eq!(labels, vec!["user", "posts", "__schema", "__type", "__typename"]);

    let user = &items[0];
    assert_eq!(user.insert_text.as_deref(), Some("user(id: $1) {\n\t$0\n}"));
    assert_eq!(user.insert_text_format, InsertTextFormat::Snippet);

    let posts = &items[1];
    assert_eq!(posts.insert_text.as_deref(), Some("posts {\n\t$0\n}"));
}

#[tokio::test]
async fn test_hover_field_description() {
    let ws = workspace().await;
    let uri = ws.uri("src/fragments.graphql");

    let info = ws
        .service
        .hover(&uri, Position::new(2, 4), &CancellationToken::new())
        .await
        .expect("hover");

    assert_eq!(
        info.contents,
        "```graphql\nPost.title: String\n```\n\nPost title"
    );
    assert_eq!(info.range, range(2, 2, 7));
}

#[tokio::test]
async fn test_hover_inside_schema_file() {
    let ws = workspace().await;
    let uri = ws.uri("schema.graphql");

    // `User` in `user(id: ID!): User`
    let info = ws
        .service
        .hover(&uri, Position::new(2, 18), &CancellationToken::new())
        .await
        .expect("hover");

    assert_eq!(info.contents, "```graphql\ntype User\n```\n\nA registered user");
}

#[tokio::test]
async fn test_fragment_references_across_files() {
    let ws = workspace().await;
    let token = CancellationToken::new();
    let fragments = ws.uri("src/fragments.graphql");

    // index order: `.graphql` matches before `.ts` matches
    let references = ws
        .service
        .references(&fragments, Position::new(0, 12), true, &token)
        .await
        .expect("references");
    assert_eq!(
        references,
        vec![
            Location::new(ws.uri("src/user.graphql"), range(3, 9, 19)),
            Location::new(ws.uri("src/feed.ts"), range(5, 9, 19)),
        ]
    );

    // new files go last, edited files keep their place
    ws.open("src/extra.graphql", "{ posts { ...PostFields* } }");
    ws.open("src/user.graphql", &USER_QUERY.replace("...PostFields", "...PostFields*"));

    let references = ws
        .service
        .references(&fragments, Position::new(0, 12), true, &token)
        .await
        .expect("references");
    assert_eq!(
        references,
        vec![
            Location::new(ws.uri("src/user.graphql"), range(3, 9, 19)),
            Location::new(ws.uri("src/feed.ts"), range(5, 9, 19)),
            Location::new(ws.uri("src/extra.graphql"), range(0, 13, 23)),
        ]
    );
}

#[tokio::test]
async fn test_unused_fragment_has_empty_references() {
    let ws = workspace().await;
    let (uri, position) = ws.open("src/unused.graphql", "fragment Un*used on User { id }");

    let references = ws
        .service
        .references(&uri, position, false, &CancellationToken::new())
        .await;
    assert_eq!(references, Some(Vec::new()));
}

#[tokio::test]
async fn test_definition_of_spread_and_type() {
    let ws = workspace().await;
    let token = CancellationToken::new();

    let spread = ws
        .service
        .definition(&ws.uri("src/user.graphql"), Position::new(3, 12), &token)
        .await
        .expect("spread definition");
    assert_eq!(
        spread,
        Location::new(ws.uri("src/fragments.graphql"), range(0, 9, 19))
    );

    let embedded = ws
        .service
        .definition(&ws.uri("src/feed.ts"), Position::new(5, 12), &token)
        .await
        .expect("embedded spread definition");
    assert_eq!(embedded, spread);

    let ty = ws
        .service
        .definition(&ws.uri("src/fragments.graphql"), Position::new(0, 24), &token)
        .await
        .expect("type definition");
    assert_eq!(ty, Location::new(ws.uri("schema.graphql"), range(14, 5, 9)));
}

#[tokio::test]
async fn test_unknown_names_resolve_to_nothing() {
    let ws = workspace().await;
    let token = CancellationToken::new();

    let (uri, position) = ws.open("src/bad.graphql", "fragment F on Miss*ing { id }");
    assert!(ws.service.hover(&uri, position, &token).await.is_none());

    let (uri, position) = ws.open("src/bad.graphql", "{ user(id: 1) { ...No*pe } }");
    assert!(ws.service.definition(&uri, position, &token).await.is_none());
    assert!(ws.service.hover(&uri, position, &token).await.is_none());
}

#[tokio::test]
async fn test_closing_unsaved_file_forgets_it() {
    let ws = workspace().await;
    let token = CancellationToken::new();
    let (uri, position) = ws.open("src/draft.graphql", "{ po*sts { id } }");

    assert!(ws.service.hover(&uri, position, &token).await.is_some());

    ws.project.close_document(&uri).await;
    assert!(ws.service.hover(&uri, position, &token).await.is_none());
}

#[tokio::test]
async fn test_closing_saved_file_restores_disk_content() {
    let ws = workspace().await;
    let token = CancellationToken::new();
    let uri = ws.uri("src/user.graphql");

    ws.project.open_document(&uri, "{ posts { id } }");
    assert!(ws
        .service
        .definition(&uri, Position::new(3, 12), &token)
        .await
        .is_none());

    ws.project.close_document(&uri).await;
    assert!(ws
        .service
        .definition(&uri, Position::new(3, 12), &token)
        .await
        .is_some());
}

#[tokio::test]
async fn test_reload_schema_picks_up_changes() {
    let ws = workspace().await;
    let token = CancellationToken::new();
    let (uri, position) = ws.open("src/draft.graphql", "{ ver*sion }");

    assert!(ws.service.hover(&uri, position, &token).await.is_none());

    let mut schema = fs::read_to_string(ws.root.join("schema.graphql")).unwrap();
    schema.push_str("\nextend type Query {\n  version: String\n}\n");
    write(&ws.root, "schema.graphql", &schema);
    ws.project.reload_schema().await.expect("reload schema");

    let info = ws.service.hover(&uri, position, &token).await.expect("hover");
    assert!(info.contents.starts_with("```graphql\nQuery.version: String\n```"));
}

#[tokio::test]
async fn test_files_outside_projects_are_ignored() {
    let ws = workspace().await;
    let token = CancellationToken::new();

    assert!(ws
        .service
        .hover("file:///somewhere/else.graphql", Position::new(0, 0), &token)
        .await
        .is_none());
    assert!(ws
        .service
        .code_lenses(&ws.uri("src/user.graphql"))
        .await
        .is_empty());
}
