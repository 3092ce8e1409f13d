use std::{
    env,
    path::{Path, PathBuf},
};

use iar_tools::{build_log, ewp, Config};

type DynError = Box<dyn std::error::Error>;

/// Where the `.ewp` template and generated project live, relative to the project root.
const IAR_DIR: &str = "ports/trio/iar";

fn main() {
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

fn try_main() -> Result<(), DynError> {
    let mut args = env::args();
    let task = args.nth(1);
    let config_file = args.next().map(PathBuf::from);
    let config = Config::load_or_default(config_file.as_deref())?;
    let dir = iar_dir();

    match task.as_deref() {
        Some("gen-ewp") => gen_ewp(&dir, &config)?,
        Some("iar-build") => iar_build(&dir, &config)?,
        Some("iar") => {
            gen_ewp(&dir, &config)?;
            iar_build(&dir, &config)?;
        }
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        "Tasks:
gen-ewp [config.json]   regenerate uPy_iar.ewp from its template
iar-build [config.json] build with iarbuild and summarize the log
iar [config.json]       gen-ewp followed by iar-build

Tasks run in {} unless TRIO_IAR_DIR is set
",
        IAR_DIR
    )
}

fn gen_ewp(dir: &Path, config: &Config) -> Result<(), DynError> {
    let report = ewp::generate(dir, &config.project)?;
    println!(
        "Wrote {}: {} include dirs, {} source files",
        report.output.display(),
        report.include_count,
        report.source_count
    );
    Ok(())
}

fn iar_build(dir: &Path, config: &Config) -> Result<(), DynError> {
    println!("{}", config.build.command().describe(&config.build.log_file));
    let (outcome, summary) = build_log::filter(dir, &config.build)?;
    print!("{}", summary);
    if !outcome.status.success() {
        return Err(format!("{} failed: {}", config.build.tool, outcome.status).into());
    }
    Ok(())
}

fn iar_dir() -> PathBuf {
    match env::var_os("TRIO_IAR_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => project_root().join(IAR_DIR),
    }
}

fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR")).ancestors().nth(1).unwrap().to_path_buf()
}
