use clap::Parser;
use miette::Result;
use mlca::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Analyze(args) => mlca::cli::commands::analyze::run(args, global),
        Commands::Rank(args) => mlca::cli::commands::rank::run(args, global),
        Commands::Heatmap(args) => mlca::cli::commands::heatmap::run(args, global),
        Commands::Profile(args) => mlca::cli::commands::profile::run(args, global),
        Commands::Banks(args) => mlca::cli::commands::banks::run(args, global),
        Commands::Completions(args) => mlca::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG takes precedence over -v
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "mlca=error",
        1 => "mlca=warn",
        2 => "mlca=debug",
        _ => "mlca=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
