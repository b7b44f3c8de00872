use rl_cli::{config::Config, version, Cli, CommandFactory, Parser};
use std::io;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // The server address is required before anything else happens.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.version {
        print!("{}", version::banner());
        return ExitCode::SUCCESS;
    }

    let Some(command) = cli.command else {
        eprintln!("{}", Cli::command().render_help());
        return ExitCode::from(2);
    };

    debug!(server = %config.server, port = config.port, "using gerrit server");
    let client = config.query_client(cli.debug);
    let mut out = io::stdout().lock();
    match command.run(&client, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
