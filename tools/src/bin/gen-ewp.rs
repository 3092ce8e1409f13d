use std::path::{Path, PathBuf};
use std::process;

use clap::{App, Arg, crate_version};
use iar_tools::{ewp, Config, PathStyle};

fn main() {
    env_logger::init();
    let matches = App::new("gen-ewp")
        .version(crate_version!())
        .about("Generate the IAR Embedded Workbench project from its template")
        .arg(
            Arg::with_name("dir")
                .short("d")
                .long("dir")
                .help("directory holding the template; paths are relative to it")
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
        .arg(Arg::with_name("template").long("template").help("template file").value_name("FILE").takes_value(true))
        .arg(Arg::with_name("output").long("output").help("project file to write").value_name("FILE").takes_value(true))
        .arg(
            Arg::with_name("path-style")
                .long("path-style")
                .help("separator used in generated paths")
                .value_name("STYLE")
                .possible_values(&["windows", "posix", "host"])
                .takes_value(true),
        )
        .get_matches();

    let dir = Path::new(matches.value_of("dir").unwrap_or("."));
    let mut config = Config::load_or_default(matches.value_of("config").map(Path::new)).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    let project = &mut config.project;
    if let Some(template) = matches.value_of("template") {
        project.template = PathBuf::from(template);
    }
    if let Some(output) = matches.value_of("output") {
        project.output = PathBuf::from(output);
    }
    if let Some(style) = matches.value_of("path-style") {
        project.path_style = style.parse::<PathStyle>().unwrap_or_else(|e| {
            eprintln!("{}", e);
            process::exit(1);
        });
    }

    let report = ewp::generate(dir, project).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });
    println!(
        "Wrote {}: {} include dirs, {} source files",
        report.output.display(),
        report.include_count,
        report.source_count
    );
}
