//! authsock-mux - SSH agent proxy that filters and multiplexes agents

use clap::Parser;

use authsock_mux::cli::commands::{completion, config, filter, mux, run, version};
use authsock_mux::cli::{Cli, Commands, ExitCode};
use authsock_mux::logging::{self, LogConfig};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(LogConfig::from_flags(cli.verbose, cli.quiet)) {
        eprintln!("Warning: {}", e);
    }

    let result = match cli.command {
        Commands::Run(args) => run::execute(args, cli.config).await,
        Commands::Filter(args) => filter::execute(args).await,
        Commands::Mux(args) => mux::execute(args).await,
        Commands::Config(args) => config::execute(args, cli.config).await,
        Commands::Version => version::execute(cli.verbose).await,
        Commands::Completion(args) => completion::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from_error(&e).into()
        }
    }
}
