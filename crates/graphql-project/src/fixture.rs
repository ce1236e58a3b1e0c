//! Shared fixtures for unit tests.

use crate::{Document, LineIndex, Position, SchemaIndex, SourceSpan};

pub const SCHEMA_URI: &str = "file:///project/schema.graphql";
pub const DOCUMENT_URI: &str = "file:///project/query.graphql";

pub const SCHEMA: &str = r#"type Query {
  "Fetch a user by ID"
  user(id: ID!): User
  users(first: Int, after: String): [User!]!
  search(term: String!, limit: Int!): [SearchResult!]!
  node(id: ID!): Node
  version: String
}

"Something with an ID"
interface Node {
  id: ID!
}

"A registered user"
type User implements Node {
  id: ID!
  name: String
  posts: [Post!]!
  "Old name"
  login: String @deprecated(reason: "Use `name`")
}

type Post implements Node {
  id: ID!
  "Post title"
  title: String
  author: User!
}

union SearchResult = User | Post

type Mutation {
  createUser(
    "Display name"
    name: String!
  ): User!
}
"#;

pub fn schema() -> SchemaIndex {
    SchemaIndex::from_sdl(SCHEMA_URI, SCHEMA)
}

/// Remove the `*` cursor marker from `text`, returning the clean text and the
/// position of the marker.
pub fn cursor(text: &str) -> (String, Position) {
    let offset = text.find('*').expect("fixture has no `*` cursor marker");
    let source = format!("{}{}", &text[..offset], &text[offset + 1..]);
    let position = LineIndex::new(&source).offset_to_position(offset);
    (source, position)
}

/// A plain `.graphql` document at [`DOCUMENT_URI`]
pub fn document(source: &str) -> Document {
    Document::parse(DOCUMENT_URI, source, SourceSpan::whole(source))
}
