use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: ProjectConfig,
    pub compiler: CompilerOptions,
    pub output: OutputConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    /// Root module whose exports are documented
    pub root: Option<PathBuf>,
}

/// Options handed to the program loader unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Directory non-relative module specifiers are resolved against
    pub base_url: Option<PathBuf>,
    /// Source extensions probed during module resolution, in order
    pub extensions: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the entries here instead of stdout
    pub path: Option<PathBuf>,
    pub pretty: bool,
    /// Fill `sourceUrl` with `file#Lstart-Lend` locators
    pub source_locators: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            root: None,
        }
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            extensions: vec!["ts".to_string(), "tsx".to_string(), "d.ts".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: true,
            source_locators: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file or return defaults
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        root: Option<PathBuf>,
        output: Option<PathBuf>,
        base_url: Option<PathBuf>,
        compact: bool,
        source_locators: bool,
    ) {
        if let Some(root) = root {
            self.project.root = Some(root);
        }

        if let Some(out) = output {
            self.output.path = Some(out);
        }

        if let Some(base) = base_url {
            self.compiler.base_url = Some(base);
        }

        if compact {
            self.output.pretty = false;
        }

        if source_locators {
            self.output.source_locators = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(Error::config_validation("project name must not be empty"));
        }

        if self.compiler.extensions.is_empty() {
            return Err(Error::config_validation("at least one source extension required"));
        }

        if let Some(ext) = self
            .compiler
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(Error::config_validation(format!(
                "extension {:?} must be non-empty and written without a leading dot",
                ext
            )));
        }

        Ok(())
    }
}
