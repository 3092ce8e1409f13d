use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::build_log::BuildCommand;
use crate::error::{PathContext, ToolError};
use crate::path_style::PathStyle;

pub const DEFAULT_TOOL: &str = "iarbuild";
pub const DEFAULT_PROJECT: &str = "uPy_iar.ewp";
pub const DEFAULT_CONFIGURATION: &str = "Debug";
pub const DEFAULT_LOG_FILE: &str = "output.txt";

pub const DEFAULT_TEMPLATE: &str = "uPy_iar.ewp_template";
pub const DEFAULT_BASE_PATH: &str = "../../..";
pub const DEFAULT_SOURCE_EXTENSION: &str = ".c";

const DEFAULT_INCLUDE_DIRS: [&str; 6] =
    ["", "extmod", "ports/trio", "ports/trio/portal", "ports/trio/msvc", "ports/trio/build-standard"];
const DEFAULT_SOURCE_SEARCH_DIRS: [&str; 4] = ["py", "ports/trio", "ports/trio/portal", "ports/trio/msvc"];
const DEFAULT_ADDITIONAL_SOURCES: [&str; 1] = ["extmod/modtime.c"];

/// Everything both tools need. Either section may be omitted from a config
/// file, as may any field within a section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub build: BuildConfig,
    pub project: ProjectConfig,
}

/// How `iarbuild` is invoked and where its output lands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub tool: String,
    pub project: PathBuf,
    /// build configuration name inside the project, i.e. "Debug" or "Release"
    pub configuration: String,
    pub extra_args: Vec<String>,
    pub log_file: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            tool: DEFAULT_TOOL.to_owned(),
            project: PathBuf::from(DEFAULT_PROJECT),
            configuration: DEFAULT_CONFIGURATION.to_owned(),
            extra_args: Vec::new(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl BuildConfig {
    pub fn command(&self) -> BuildCommand {
        let mut args = vec![self.project.to_string_lossy().into_owned(), self.configuration.clone()];
        args.extend(self.extra_args.iter().cloned());
        BuildCommand::new(&self.tool, args)
    }
}

/// Inputs to the `.ewp` generator. All directory entries are `/`-separated
/// and relative to `base_path`, which is itself relative to the directory
/// holding the generated project.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub template: PathBuf,
    pub output: PathBuf,
    pub base_path: String,
    pub include_dirs: Vec<String>,
    /// directories whose immediate source files are added to the project
    pub source_search_dirs: Vec<String>,
    /// individual sources outside the search directories
    pub additional_sources: Vec<String>,
    pub source_extension: String,
    pub path_style: PathStyle,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output: PathBuf::from(DEFAULT_PROJECT),
            base_path: DEFAULT_BASE_PATH.to_owned(),
            include_dirs: DEFAULT_INCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            source_search_dirs: DEFAULT_SOURCE_SEARCH_DIRS.iter().map(|s| s.to_string()).collect(),
            additional_sources: DEFAULT_ADDITIONAL_SOURCES.iter().map(|s| s.to_string()).collect(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_owned(),
            path_style: PathStyle::default(),
        }
    }
}

impl Config {
    pub fn from_json(path: &Path, contents: &str) -> Result<Config, ToolError> {
        serde_json::from_str(contents).map_err(|e| ToolError::ConfigError(path.to_path_buf(), e))
    }

    pub fn load(path: &Path) -> Result<Config, ToolError> {
        let contents = fs::read_to_string(path).with_path(path)?;
        let config = Config::from_json(path, &contents)?;
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Load `path` if one was given, otherwise fall back to the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Config, ToolError> {
        match path {
            Some(p) => Config::load(p),
            None => Ok(Config::default()),
        }
    }
}
