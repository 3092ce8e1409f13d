//! Generates an IAR Embedded Workbench project (`.ewp`) from a template.
//!
//! The template is an ordinary `.ewp` with two placeholders: `$$INCLUDES$$`
//! inside the compiler's include-path option, and `$$CFILES$$` where the
//! project's file list goes. Paths are written relative to `$PROJ_DIR$`, the
//! directory holding the generated project.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::error::{PathContext, ToolError};

pub const INCLUDES_PLACEHOLDER: &str = "$$INCLUDES$$";
pub const CFILES_PLACEHOLDER: &str = "$$CFILES$$";

pub fn include_entry(rel_path: &str) -> String {
    format!("                    <state>$PROJ_DIR$\\{}</state>", rel_path)
}

pub fn file_entry(rel_path: &str) -> String {
    format!("    <file>\n        <name>$PROJ_DIR$\\{}</name>\n    </file>", rel_path)
}

pub fn includes_block(config: &ProjectConfig) -> String {
    config
        .include_dirs
        .iter()
        .map(|dir| include_entry(&config.path_style.relative(&config.base_path, dir)))
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn files_block(sources: &[String]) -> String {
    sources.iter().map(|s| file_entry(s)).collect::<Vec<String>>().join("\n")
}

/// Source file names directly inside `dir`, sorted. Subdirectories and
/// anything not ending in `extension` are skipped.
fn list_sources(dir: &Path, extension: &str) -> Result<Vec<String>, ToolError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_owned(),
            None => {
                log::warn!("skipping non UTF-8 file name {}", path.display());
                continue;
            }
        };
        if name.ends_with(extension) && path.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Every source the project should build, rendered relative to the project
/// directory: first the contents of each search directory in order, then the
/// additional sources.
///
/// Search directories are resolved on disk as `root/base_path/dir`.
pub fn discover_sources(root: &Path, config: &ProjectConfig) -> Result<Vec<String>, ToolError> {
    let base = root.join(&config.base_path);
    let style = config.path_style;
    let mut sources = Vec::new();
    for dir in &config.source_search_dirs {
        let names = list_sources(&base.join(dir), &config.source_extension)?;
        log::debug!("{}: {} sources", dir, names.len());
        for name in names {
            sources.push(style.relative(&config.base_path, &join(dir, &name)));
        }
    }
    for extra in &config.additional_sources {
        if !base.join(extra).is_file() {
            log::warn!("additional source {} does not exist", extra);
        }
        sources.push(style.relative(&config.base_path, extra));
    }
    Ok(sources)
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), name)
    }
}

/// Substitute both blocks into `template`. Every occurrence of a placeholder
/// is replaced; a missing placeholder is left for the caller to notice.
pub fn render(template: &str, includes: &str, files: &str) -> String {
    template.replace(INCLUDES_PLACEHOLDER, includes).replace(CFILES_PLACEHOLDER, files)
}

#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub include_count: usize,
    pub source_count: usize,
}

/// Read the template, fill it in and write the project, all relative to `root`.
/// The output is only touched once everything else has succeeded.
pub fn generate(root: &Path, config: &ProjectConfig) -> Result<GenerateReport, ToolError> {
    let template_path = root.join(&config.template);
    let template = fs::read_to_string(&template_path).with_path(&template_path)?;
    for placeholder in [INCLUDES_PLACEHOLDER, CFILES_PLACEHOLDER].iter() {
        if !template.contains(placeholder) {
            log::warn!("{} has no {} placeholder", template_path.display(), placeholder);
        }
    }

    let sources = discover_sources(root, config)?;
    if sources.is_empty() {
        log::warn!("no {} sources found", config.source_extension);
    }
    let project = render(&template, &includes_block(config), &files_block(&sources));

    let output = root.join(&config.output);
    fs::write(&output, project).with_path(&output)?;
    log::info!("wrote {} ({} style paths)", output.display(), config.path_style);

    Ok(GenerateReport { output, include_count: config.include_dirs.len(), source_count: sources.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_style::PathStyle;

    fn empty_config() -> ProjectConfig {
        ProjectConfig {
            include_dirs: Vec::new(),
            source_search_dirs: Vec::new(),
            additional_sources: Vec::new(),
            ..ProjectConfig::default()
        }
    }

    /// Lay out `base/<dir>/<file>` under a fresh temp dir, with the project
    /// directory three levels down, the way `ports/trio/iar` sits in the tree.
    fn fixture(files: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let tree = tempfile::tempdir().unwrap();
        let root = tree.path().join("ports/trio/iar");
        fs::create_dir_all(&root).unwrap();
        for file in files {
            let path = tree.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        (tree, root)
    }

    #[test]
    fn test_entries() {
        assert_eq!(include_entry("..\\x"), "                    <state>$PROJ_DIR$\\..\\x</state>");
        assert_eq!(file_entry("..\\y.c"), "    <file>\n        <name>$PROJ_DIR$\\..\\y.c</name>\n    </file>");
    }

    #[test]
    fn test_empty_lists_render_empty_blocks() {
        let template = "<project>\n$$INCLUDES$$\n<group>$$CFILES$$</group>\n</project>\n";
        let config = empty_config();
        let out = render(template, &includes_block(&config), &files_block(&[]));
        assert_eq!(out, "<project>\n\n<group></group>\n</project>\n");
    }

    #[test]
    fn test_scenario_substitution() {
        let config = ProjectConfig { include_dirs: vec!["x".into()], base_path: "..".into(), ..empty_config() };
        let files = vec![PathStyle::Windows.relative("..", "y.c")];
        let out = render("A:$$INCLUDES$$ B:$$CFILES$$", &includes_block(&config), &files_block(&files));
        assert_eq!(
            out,
            "A:                    <state>$PROJ_DIR$\\..\\x</state> B:    <file>\n        \
             <name>$PROJ_DIR$\\..\\y.c</name>\n    </file>"
        );
        assert_eq!(out.matches("<state>").count(), 1);
        assert_eq!(out.matches("<file>").count(), 1);
    }

    #[test]
    fn test_default_includes() {
        let block = includes_block(&ProjectConfig::default());
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "                    <state>$PROJ_DIR$\\..\\..\\..\\</state>");
        assert_eq!(lines[5], "                    <state>$PROJ_DIR$\\..\\..\\..\\ports\\trio\\build-standard</state>");
    }

    #[test]
    fn test_discover_sources_in_order() {
        let (_tree, root) = fixture(&[
            "py/runtime.c",
            "py/obj.c",
            "py/obj.h",
            "py/notes.c.txt",
            "py/nested/skip.c",
            "ports/trio/trio_mphal.c",
            "ports/trio/win_hal.c",
            "extmod/modtime.c",
        ]);
        let config = ProjectConfig {
            source_search_dirs: vec!["py".into(), "ports/trio".into()],
            additional_sources: vec!["extmod/modtime.c".into()],
            path_style: PathStyle::Posix,
            ..ProjectConfig::default()
        };
        let sources = discover_sources(&root, &config).unwrap();
        assert_eq!(
            sources,
            vec![
                "../../../py/obj.c",
                "../../../py/runtime.c",
                "../../../ports/trio/trio_mphal.c",
                "../../../ports/trio/win_hal.c",
                "../../../extmod/modtime.c",
            ]
        );

        let block = files_block(&sources);
        assert_eq!(block.matches("<file>").count(), sources.len());
        for source in &sources {
            assert_eq!(block.matches(&format!("$PROJ_DIR$\\{}<", source)).count(), 1);
        }
    }

    #[test]
    fn test_discover_sources_windows_style() {
        let (_tree, root) = fixture(&["py/gc.c"]);
        let config = ProjectConfig { source_search_dirs: vec!["py".into()], ..empty_config() };
        assert_eq!(discover_sources(&root, &config).unwrap(), vec!["..\\..\\..\\py\\gc.c"]);
    }

    #[test]
    fn test_missing_search_dir() {
        let (_tree, root) = fixture(&["py/gc.c"]);
        let config = ProjectConfig { source_search_dirs: vec!["py".into(), "ports/nope".into()], ..empty_config() };
        match discover_sources(&root, &config) {
            Err(ToolError::FileError(path, _)) => assert!(path.ends_with("ports/nope")),
            other => panic!("expected a missing directory error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate() {
        let (_tree, root) = fixture(&["py/gc.c", "py/obj.c"]);
        fs::write(root.join("uPy_iar.ewp_template"), "<inc>\n$$INCLUDES$$\n</inc>\n<src>\n$$CFILES$$\n</src>\n")
            .unwrap();
        fs::write(root.join("uPy_iar.ewp"), "stale contents that are much longer than the new project").unwrap();
        let config = ProjectConfig {
            include_dirs: vec!["".into(), "py".into()],
            source_search_dirs: vec!["py".into()],
            ..empty_config()
        };

        let report = generate(&root, &config).unwrap();
        assert_eq!(report.include_count, 2);
        assert_eq!(report.source_count, 2);
        assert_eq!(report.output, root.join("uPy_iar.ewp"));

        let project = fs::read_to_string(&report.output).unwrap();
        assert_eq!(
            project,
            "<inc>\n                    <state>$PROJ_DIR$\\..\\..\\..\\</state>\n                    \
             <state>$PROJ_DIR$\\..\\..\\..\\py</state>\n</inc>\n<src>\n    <file>\n        \
             <name>$PROJ_DIR$\\..\\..\\..\\py\\gc.c</name>\n    </file>\n    <file>\n        \
             <name>$PROJ_DIR$\\..\\..\\..\\py\\obj.c</name>\n    </file>\n</src>\n"
        );
    }

    #[test]
    fn test_generate_missing_template_leaves_no_output() {
        let (_tree, root) = fixture(&["py/gc.c"]);
        let err = generate(&root, &ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, ToolError::FileError(ref path, _) if path.ends_with("uPy_iar.ewp_template")));
        assert!(!root.join("uPy_iar.ewp").exists());
    }
}
