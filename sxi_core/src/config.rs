use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::SxiError;
use crate::SxiResult;

/// Suffix appended to a document's path to form its scratch file.
pub const DEFAULT_SCRATCH_SUFFIX: &str = ".tmp";

/// Default nesting limit for includes. Reaching it almost always means a
/// file includes itself.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["sxi.toml", ".sxi.toml", ".config/sxi.toml"];

/// Configuration loaded from an `sxi.toml` file.
///
/// ```toml
/// scratch_suffix = ".tmp"
/// recursive = false
/// max_include_depth = 64
///
/// [exclude]
/// patterns = ["_includes/", "*.sxi"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SxiConfig {
	/// Suffix appended to each document path to form its scratch file.
	#[serde(default = "default_scratch_suffix")]
	pub scratch_suffix: String,
	/// Descend into subdirectories when expanding input patterns.
	#[serde(default)]
	pub recursive: bool,
	/// How deeply includes may nest before a document is abandoned.
	#[serde(default = "default_max_include_depth")]
	pub max_include_depth: usize,
	/// Documents that are never processed at the top level.
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

impl Default for SxiConfig {
	fn default() -> Self {
		Self {
			scratch_suffix: default_scratch_suffix(),
			recursive: false,
			max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
			exclude: ExcludeConfig::default(),
		}
	}
}

/// Exclusion configuration using gitignore-style patterns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
	#[serde(default)]
	pub patterns: Vec<String>,
}

fn default_scratch_suffix() -> String {
	DEFAULT_SCRATCH_SUFFIX.to_string()
}

fn default_max_include_depth() -> usize {
	DEFAULT_MAX_INCLUDE_DEPTH
}

impl SxiConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> SxiResult<Option<SxiConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> SxiResult<SxiConfig> {
		let config: SxiConfig =
			toml::from_str(content).map_err(|e| SxiError::ConfigParse(e.to_string()))?;

		if config.scratch_suffix.is_empty() {
			return Err(SxiError::ConfigParse(
				"`scratch_suffix` must not be empty".to_string(),
			));
		}

		Ok(config)
	}
}
