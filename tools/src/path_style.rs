use std::convert::TryFrom;
use std::path::MAIN_SEPARATOR;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ToolError;

/// Separator convention used when writing paths into a generated project.
///
/// Paths are always assembled with `/` and then rendered in the consuming
/// tool's convention, independent of the host running the generator.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum PathStyle {
    Windows,
    Posix,
}

impl PathStyle {
    /// The style matching this host's native separator.
    pub fn host() -> PathStyle { if MAIN_SEPARATOR == '\\' { PathStyle::Windows } else { PathStyle::Posix } }

    pub fn separator(&self) -> char {
        match self {
            PathStyle::Windows => '\\',
            PathStyle::Posix => '/',
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PathStyle::Windows => "windows",
            PathStyle::Posix => "posix",
        }
    }

    /// Render a `/`-separated path in this style.
    pub fn render(&self, path: &str) -> String {
        match self {
            PathStyle::Windows => path.replace('/', &self.separator().to_string()),
            PathStyle::Posix => path.to_owned(),
        }
    }

    /// Join `path` onto `base` and render the result. An empty `path` keeps
    /// the trailing separator, so `("../..", "")` becomes `../../`.
    pub fn relative(&self, base: &str, path: &str) -> String { self.render(&format!("{}/{}", base, path)) }
}

impl Default for PathStyle {
    fn default() -> PathStyle { PathStyle::Windows }
}

impl FromStr for PathStyle {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<PathStyle, ToolError> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" | "backslash" => Ok(PathStyle::Windows),
            "posix" | "unix" | "slash" => Ok(PathStyle::Posix),
            "host" | "native" => Ok(PathStyle::host()),
            _ => Err(ToolError::InvalidPathStyle(s.to_owned())),
        }
    }
}

impl TryFrom<String> for PathStyle {
    type Error = ToolError;

    fn try_from(s: String) -> Result<PathStyle, ToolError> { s.parse() }
}

impl std::fmt::Display for PathStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.as_str()) }
}
