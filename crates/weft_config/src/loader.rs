//! Loading and validation.

use crate::error::ConfigError;
use crate::types::{ComponentDecl, FieldDecl, ProjectConfig, ShapeDecl};
use std::collections::HashSet;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE: &str = "weft.toml";

/// Loads and validates `<project_dir>/weft.toml`, or `project_dir` itself when
/// it names a file.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = if project_dir.is_file() {
        project_dir.to_path_buf()
    } else {
        project_dir.join(CONFIG_FILE)
    };
    let content = std::fs::read_to_string(&path)?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.top.is_empty() {
        return Err(ConfigError::MissingField("project.top".to_string()));
    }
    if !config.components.contains_key(&config.project.top) {
        return Err(ConfigError::UnknownClass(config.project.top.clone()));
    }
    for (class, decl) in &config.components {
        validate_component(config, class, decl)?;
    }
    Ok(())
}

fn validate_component(
    config: &ProjectConfig,
    class: &str,
    decl: &ComponentDecl,
) -> Result<(), ConfigError> {
    // Signals and children share the component's field namespace.
    let mut fields = HashSet::new();
    let names = decl
        .signals
        .iter()
        .map(|s| &s.name)
        .chain(decl.children.iter().map(|c| &c.name));
    for name in names {
        if name == "s" || !is_identifier(name) {
            return Err(ConfigError::ValidationError(format!(
                "{class}: '{name}' is not a valid field name"
            )));
        }
        if !fields.insert(name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "{class}: field '{name}' declared more than once"
            )));
        }
    }
    for signal in &decl.signals {
        validate_shape(class, &signal.name, &signal.shape)?;
    }
    for child in &decl.children {
        if !config.components.contains_key(&child.class) {
            return Err(ConfigError::UnknownClass(child.class.clone()));
        }
    }
    for name in decl.blocks.iter().map(|b| &b.name).chain(decl.funcs.iter().map(|f| &f.name)) {
        if !is_identifier(name) {
            return Err(ConfigError::ValidationError(format!(
                "{class}: '{name}' is not a valid block or function name"
            )));
        }
    }
    Ok(())
}

fn validate_shape(class: &str, name: &str, shape: &ShapeDecl) -> Result<(), ConfigError> {
    if shape.len == Some(0) {
        return Err(ConfigError::ValidationError(format!(
            "{class}.{name}: vector length must be positive"
        )));
    }
    if shape.len.is_some() && !shape.fields.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{class}.{name}: a signal is either a vector or a struct, not both"
        )));
    }
    let mut seen = HashSet::new();
    for FieldDecl { name: field, shape, .. } in &shape.fields {
        if !seen.insert(field.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "{class}.{name}: struct field '{field}' declared more than once"
            )));
        }
        validate_shape(class, &format!("{name}.{field}"), shape)?;
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
