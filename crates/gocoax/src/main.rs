mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gocoax_core::AdapterClient;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "gocoax", &mut std::io::stdout());
            Ok(())
        }

        Command::Config(ref args) => {
            let cfg = gocoax_config::load_config()?;
            commands::config_cmd::handle(args, &cli.global, &cfg)
        }

        cmd => {
            let cfg = gocoax_config::load_config()?;
            let adapter = config::build_adapter_config(&cli.global, &cfg)?;
            let client = AdapterClient::connect(&adapter)?;

            tracing::debug!(command = ?cmd, host = client.host(), "dispatching command");
            commands::dispatch(cmd, &client, &cli.global, cfg.defaults.interval).await
        }
    }
}
