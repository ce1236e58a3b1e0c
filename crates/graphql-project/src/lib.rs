mod code_lens;
mod completion;
mod context;
mod document;
mod error;
mod find_references;
mod goto_definition;
mod hover;
mod index;
mod line_index;
mod project;
mod registry;
mod schema;
mod service;
mod suggestions;
mod types;
mod workspace;

#[cfg(test)]
mod fixture;

pub use code_lens::{code_lenses, CodeLens};
pub use completion::{
    enrich, enrich_for_parent, CompletionItem, CompletionItemKind, InsertTextFormat,
};
pub use context::{
    resolve, resolve_completion, CompletionContext, ContextNode, ResolvedContext, TypeInfo,
};
pub use document::{Document, DocumentLoader, SourceSpan};
pub use error::{ProjectError, Result};
pub use find_references::find_references;
pub use goto_definition::goto_definition;
pub use hover::{hover, HoverInfo};
pub use index::{
    ArgumentDefinition, Deprecation, DirectiveDefinition, EnumValueDefinition, FieldDefinition,
    OperationKind, SchemaFile, SchemaIndex, TypeDefinition, TypeKind, TypeRef,
};
pub use line_index::LineIndex;
pub use project::GraphQLProject;
pub use registry::{FragmentDefinition, FragmentRegistry, FragmentSpread};
pub use schema::SchemaLoader;
pub use service::LanguageService;
pub use suggestions::suggest;
pub use types::{file_uri, normalize_uri, uri_to_path, Location, Position, Range};
pub use workspace::{ProjectWorkspace, Workspace};

// Re-export common types from dependencies
pub use graphql_config::{GraphQLConfig, ProjectConfig};
pub use tokio_util::sync::CancellationToken;
