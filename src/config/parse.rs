//! Declaration file parsing and discovery

use crate::config::schema::validate_declaration;
use crate::config::types::CommandDecl;
use crate::error::{ArgtreeError, ConfigError, ConfigResult};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default declaration file names to search for
const DECLARATION_FILE_NAMES: &[&str] = &["argtree.yml", "argtree.yaml"];

/// Find the declaration file by searching current and parent directories
pub fn find_declaration_file() -> ConfigResult<PathBuf> {
    find_declaration_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the declaration file starting from a specific directory
pub fn find_declaration_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in DECLARATION_FILE_NAMES {
            let path = current_dir.join(file_name);
            searched_paths.push(path.display().to_string());

            if path.is_file() {
                debug!(path = %path.display(), "found declaration file");
                return Ok(path);
            }
        }

        // Try parent directory
        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse and validate a declaration file
pub fn parse_declaration_file(path: &Path) -> Result<CommandDecl, ArgtreeError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_declaration(&contents)
}

/// Parse and validate a declaration from a string
pub fn parse_declaration(yaml: &str) -> Result<CommandDecl, ArgtreeError> {
    let decl: CommandDecl = serde_yaml::from_str(yaml)?;
    validate_declaration(&decl)?;
    Ok(decl)
}

/// Use `path` when given, otherwise discover the file
pub fn load_declaration(path: Option<&Path>) -> Result<(CommandDecl, PathBuf), ArgtreeError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => find_declaration_file()?,
    };
    let decl = parse_declaration_file(&path)?;
    Ok((decl, path))
}
