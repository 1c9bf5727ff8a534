use anyhow::Context;
use clap::Parser;
use tailwind_config_reader::{handle_normalize_command, harness_script, read, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Commands::Read(args) if args.verbose);
    init_logging(verbose);

    match cli.command {
        Commands::Read(args) => {
            let compact = args.compact;
            let report = match read(args).await {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            if let Some(report) = report {
                let json = if compact {
                    report.to_compact_json()
                } else {
                    report.to_pretty_json()
                }
                .context("Failed to serialize configuration report")?;
                println!("{}", json);
            }
            Ok(())
        }
        Commands::Harness(args) => {
            let script = harness_script(&args).context("Failed to render harness script")?;
            println!("{}", script);
            Ok(())
        }
        Commands::Normalize => {
            handle_normalize_command()
                .await
                .context("Failed to normalize class fragments")?;
            Ok(())
        }
    }
}
