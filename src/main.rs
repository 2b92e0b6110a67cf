use anyhow::{Context, Result};
use clap::{App, Arg};
use log::LevelFilter;
use satz::build::build_site;
use satz::config::Config;
use std::path::Path;

fn main() -> Result<()> {
    let matches = App::new("satz")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static site from posts, pages, and templates")
        .arg(
            Arg::with_name("PROJECT")
                .help("The project directory (default: the current directory)")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .takes_value(true)
                .help("The output directory (default: PROJECT/output)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Logs more; repeat for debug output"),
        )
        .get_matches();

    env_logger::Builder::new()
        .filter_level(match matches.occurrences_of("verbose") {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    let project = Path::new(matches.value_of("PROJECT").unwrap_or("."));
    let output = matches.value_of("output").map(Path::new);

    let config = Config::from_directory(project, output).with_context(|| {
        format!("loading project `{}`", project.display())
    })?;
    build_site(&config).context("building site")?;
    Ok(())
}
