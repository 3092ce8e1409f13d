use std::path::{Path, PathBuf};
use std::process;

use clap::{App, Arg, crate_version};
use iar_tools::build_log;
use iar_tools::Config;

fn main() {
    env_logger::init();
    let matches = App::new("filter-out")
        .version(crate_version!())
        .about("Run iarbuild and summarize the errors and warnings in its log")
        .arg(
            Arg::with_name("dir")
                .short("d")
                .long("dir")
                .help("directory holding the project; the build runs from here")
                .value_name("DIR")
                .takes_value(true)
                .default_value("."),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .help("JSON configuration file")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(Arg::with_name("tool").long("tool").help("build tool to run").value_name("PROGRAM").takes_value(true))
        .arg(Arg::with_name("project").long("project").help("project file").value_name("EWP").takes_value(true))
        .arg(
            Arg::with_name("configuration")
                .long("configuration")
                .help("build configuration in the project")
                .value_name("NAME")
                .takes_value(true),
        )
        .arg(Arg::with_name("log").long("log").help("log file to write").value_name("FILE").takes_value(true))
        .arg(Arg::with_name("show-warnings").long("show-warnings").help("also print the warning lines"))
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("exit with an error if the build tool fails or any error is reported"),
        )
        .get_matches();

    let dir = Path::new(matches.value_of("dir").unwrap_or("."));
    let mut config = Config::load_or_default(matches.value_of("config").map(Path::new)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let build = &mut config.build;
    if let Some(tool) = matches.value_of("tool") {
        build.tool = tool.to_owned();
    }
    if let Some(project) = matches.value_of("project") {
        build.project = PathBuf::from(project);
    }
    if let Some(configuration) = matches.value_of("configuration") {
        build.configuration = configuration.to_owned();
    }
    if let Some(log) = matches.value_of("log") {
        build.log_file = PathBuf::from(log);
    }

    println!("{}", build.command().describe(&build.log_file));
    let (outcome, summary) = build_log::filter(dir, build).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    print!("{}", summary.report(matches.is_present("show-warnings")));
    if !outcome.status.success() {
        eprintln!("build tool failed: {}", outcome.status);
    }

    let code = build_log::exit_code(&outcome, &summary, matches.is_present("strict"));
    if code != 0 {
        process::exit(code);
    }
}
