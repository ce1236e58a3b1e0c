use crate::{ConfigError, GraphQLConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names, most preferred first.
const CONFIG_FILES: &[&str] = &[
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    ".graphqlrc.json",
    ".graphqlrc",
    "graphql.config.yml",
    "graphql.config.yaml",
    "graphql.config.json",
];

/// Search `start_dir` and its ancestors for a config file.
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    for dir in start_dir.ancestors() {
        if let Some(found) = CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Read and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<GraphQLConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents, path)
}

/// Parse config text. `path` picks the format and is used in error messages.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

    let config: GraphQLConfig = match extension {
        "yml" | "yaml" => serde_yaml::from_str(contents)?,
        "json" => serde_json::from_str(contents)?,
        // an extensionless .graphqlrc may hold either format; JSON is valid YAML
        "" if file_name == ".graphqlrc" => serde_yaml::from_str(contents)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    check_patterns(&config, path)?;
    Ok(config)
}

fn check_patterns(config: &GraphQLConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    for (name, project) in config.projects() {
        let schema = project.schema.as_strs();
        if schema.is_empty() || schema.iter().any(|pattern| pattern.trim().is_empty()) {
            return Err(invalid(format!("project '{name}' has an empty schema pattern")));
        }

        if let Some(documents) = &project.documents {
            let documents = documents.as_strs();
            if documents.is_empty() || documents.iter().any(|pattern| pattern.trim().is_empty())
            {
                return Err(invalid(format!(
                    "project '{name}' has an empty documents pattern"
                )));
            }
        }
    }

    Ok(())
}
