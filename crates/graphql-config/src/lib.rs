mod config;
mod error;
mod loader;

pub use config::{
    expand_braces, is_url, GraphQLConfig, Patterns, ProjectConfig, DEFAULT_PROJECT,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str};
