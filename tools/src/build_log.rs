//! Runs `iarbuild` with its output captured to a log, then pulls the
//! diagnostics back out of that log.
//!
//! IAR tools tag every diagnostic with its severity and a code, i.e.
//! `main.c(12) : Error[Pe020]: identifier "foo" is undefined`. Only the
//! severity tag is looked at here; the code, location and message are passed
//! through untouched.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::config::BuildConfig;
use crate::error::{PathContext, ToolError};

pub const ERROR_MARKER: &str = "Error[";
pub const WARNING_MARKER: &str = "Warning[";

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub dir: Option<PathBuf>,
}

impl BuildCommand {
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> BuildCommand {
        BuildCommand { program: program.into(), args, dir: None }
    }

    /// Run the command from `dir` instead of the current directory.
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> BuildCommand {
        self.dir = Some(dir.into());
        self
    }

    /// The equivalent shell invocation, for echoing before a build.
    pub fn describe(&self, log_file: &Path) -> String { format!("{} > {}", self, log_file.display()) }
}

impl std::fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BuildStatus {
    Success,
    /// exited with a non-zero code
    Failed(i32),
    /// killed before it could exit, i.e. by a signal
    Terminated,
}

impl BuildStatus {
    pub fn success(&self) -> bool { *self == BuildStatus::Success }
}

impl From<ExitStatus> for BuildStatus {
    fn from(status: ExitStatus) -> BuildStatus {
        match status.code() {
            Some(0) => BuildStatus::Success,
            Some(code) => BuildStatus::Failed(code),
            None => BuildStatus::Terminated,
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Failed(code) => write!(f, "exit code {}", code),
            BuildStatus::Terminated => write!(f, "terminated without an exit code"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub log_file: PathBuf,
    pub status: BuildStatus,
}

/// Run `command` to completion with stdout and stderr both written to
/// `log_file`, which is truncated first. There is no timeout.
pub fn run_build(command: &BuildCommand, log_file: &Path) -> Result<BuildOutcome, ToolError> {
    let log = File::create(log_file).with_path(log_file)?;
    let log_err = log.try_clone().with_path(log_file)?;

    log::debug!("spawning {:?} in {:?}", command.describe(log_file), command.dir);

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args).stdin(Stdio::null()).stdout(Stdio::from(log)).stderr(Stdio::from(log_err));
    if let Some(dir) = &command.dir {
        cmd.current_dir(dir);
    }
    let status: BuildStatus =
        cmd.status().map_err(|e| ToolError::SpawnError(command.program.clone(), e))?.into();

    if status.success() {
        log::info!("{} finished", command.program);
    } else {
        log::warn!("{} failed: {}", command.program, status);
    }
    Ok(BuildOutcome { log_file: log_file.to_path_buf(), status })
}

/// Diagnostic lines found in a build log, each list in log order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DiagnosticSummary {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl DiagnosticSummary {
    pub fn error_count(&self) -> usize { self.errors.len() }

    pub fn warning_count(&self) -> usize { self.warnings.len() }

    /// Error lines (and warning lines, if asked for) followed by both counts.
    pub fn report(&self, show_warnings: bool) -> String {
        let mut out = self.errors.join("\n");
        out.push('\n');
        if show_warnings && !self.warnings.is_empty() {
            out.push_str(&self.warnings.join("\n"));
            out.push('\n');
        }
        out.push_str(&format!("{} errors\n{} warnings\n", self.error_count(), self.warning_count()));
        out
    }
}

impl std::fmt::Display for DiagnosticSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.report(false)) }
}

/// A line carrying both markers lands in both lists. Lines end at `\n` or
/// at a bare `\r`, so progress output that rewrites a line still separates.
pub fn scan(contents: &str) -> DiagnosticSummary {
    let mut summary = DiagnosticSummary::default();
    for line in contents.split(&['\n', '\r'][..]).filter(|l| !l.is_empty()) {
        if line.contains(ERROR_MARKER) {
            summary.errors.push(line.to_owned());
        }
        if line.contains(WARNING_MARKER) {
            summary.warnings.push(line.to_owned());
        }
    }
    summary
}

/// Logs are decoded lossily; IAR on a Windows host writes the console code
/// page, not UTF-8.
pub fn scan_file(path: &Path) -> Result<DiagnosticSummary, ToolError> {
    let bytes = fs::read(path).with_path(path)?;
    let summary = scan(&String::from_utf8_lossy(&bytes));
    log::debug!(
        "{}: {} bytes, {} errors, {} warnings",
        path.display(),
        bytes.len(),
        summary.error_count(),
        summary.warning_count()
    );
    Ok(summary)
}

/// Process exit status for `filter-out`. Zero once a scan completed, unless
/// `strict` is set and the tool failed or reported at least one error.
pub fn exit_code(outcome: &BuildOutcome, summary: &DiagnosticSummary, strict: bool) -> i32 {
    if strict && (!outcome.status.success() || summary.error_count() > 0) {
        1
    } else {
        0
    }
}

/// Build the configured project from `root` and scan the resulting log.
pub fn filter(root: &Path, config: &BuildConfig) -> Result<(BuildOutcome, DiagnosticSummary), ToolError> {
    let command = config.command().current_dir(root);
    let log_file = root.join(&config.log_file);
    let outcome = run_build(&command, &log_file)?;
    let summary = scan_file(&log_file)?;
    Ok((outcome, summary))
}
