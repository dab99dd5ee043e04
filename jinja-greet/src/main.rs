use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Error};
use clap::ArgMatches;
use minijinja::Error as MError;
use tracing::level_filters::LevelFilter;

use jinja_greet::{Config, Renderer};

mod cli;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<Config, Error> {
    #[cfg(feature = "toml")]
    let mut config = match matches.get_one::<std::path::PathBuf>("config-file") {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config file");
            Config::load_from_toml(path)?
        }
        None => Config::default(),
    };
    #[cfg(not(feature = "toml"))]
    let mut config = Config::default();

    config.update_from_matches(matches)?;
    Ok(config)
}

fn execute() -> Result<i32, Error> {
    let matches = cli::make_command().get_matches();
    init_logging(matches.get_count("verbose"));

    let config = load_config(&matches)?;

    #[cfg(feature = "toml")]
    {
        if matches.get_flag("print-config") {
            print!("{}", config.to_toml()?);
            return Ok(0);
        }
    }

    let renderer = Renderer::new(&config, config.locator());
    let name = config.template();
    let result = renderer
        .render(name, config.context())
        .with_context(|| format!("unable to render {:?} from {}", name, renderer.source()))?;

    let mut stdout = io::stdout().lock();
    if config.newline() {
        writeln!(stdout, "{result}")?;
    } else {
        write!(stdout, "{result}")?;
    }
    stdout.flush()?;
    Ok(0)
}

pub fn print_error(err: &Error) {
    for (idx, cause) in err.chain().enumerate() {
        if idx == 0 {
            eprintln!("error: {cause}");
        } else {
            eprintln!();
            eprintln!("caused by: {cause}");
        }
        if let Some(cause) = cause.downcast_ref::<MError>() {
            if cause.name().is_some() {
                eprintln!("{}", cause.display_debug_info());
            }
        }
    }
}

fn main() {
    match execute() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}
