extern crate log;
pub mod build_log;
pub mod config;
pub mod error;
pub mod ewp;
pub mod path_style;

pub use config::{BuildConfig, Config, ProjectConfig};
pub use error::ToolError;
pub use path_style::PathStyle;
