use aquamark_cli::{Args, Subcommands};
use clap::Parser;

fn main() -> std::process::ExitCode {
    let Args {
        subcommand,
        globals,
    } = Args::parse();

    if !globals.quiet {
        let filter = match globals.verbose {
            0 => tracing::level_filters::LevelFilter::INFO,
            1 => tracing::level_filters::LevelFilter::DEBUG,
            2.. => tracing::level_filters::LevelFilter::TRACE,
        };
        let env_filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(filter.into())
            .from_env_lossy();
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let result = match subcommand {
        Subcommands::Embed(args) => aquamark_cli::embed::handle_embed(args),
        Subcommands::Extract(args) => aquamark_cli::extract::handle_extract(args),
        Subcommands::Recover(args) => aquamark_cli::recover::handle_recover(args),
        Subcommands::Attack(args) => aquamark_cli::attack::handle_attack(args),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::ExitCode::FAILURE
    } else {
        std::process::ExitCode::SUCCESS
    }
}
