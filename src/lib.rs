pub mod args;
pub mod assembler;
pub mod config;
pub mod errors;
pub mod harness;
pub mod locator;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod theme;
pub mod transport;

pub use args::{Cli, Commands, HarnessArgs, ReadArgs};
pub use assembler::{assemble, TailwindConfiguration};
pub use config::ReaderSettings;
pub use errors::{ConfigError, Result};
pub use harness::HarnessScript;
pub use locator::{ConfigLocator, DirectoryLocator};
pub use normalizer::normalize_classes;
pub use parser::{ConfigFileParser, ConfigurationStore};
pub use report::{ConfigurationReport, ReportMetadata};
pub use theme::{flatten, ThemeMap, ThemeValue};
pub use transport::{CancelToken, NodeInterpreter, ScriptInterpreter};

use tracing::{debug, info};

/// Resolve reader settings from the optional settings file and CLI overrides
pub fn resolve_settings(args: &ReadArgs) -> Result<ReaderSettings> {
    let mut settings = match &args.settings {
        Some(path) => ReaderSettings::from_file(path)?,
        None => ReaderSettings::default(),
    };

    if let Some(node) = &args.node {
        settings.interpreter = node.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.timeout_ms = Some(timeout_ms);
    }

    Ok(settings)
}

/// Read command entry point.
///
/// Returns `Ok(None)` when there is no configuration file or it has no theme.
pub async fn read(args: ReadArgs) -> Result<Option<ConfigurationReport>> {
    args.validate().map_err(ConfigError::InvalidInput)?;

    let settings = resolve_settings(&args)?;
    debug!("Reader settings: {:?}", settings);

    let parser = ConfigFileParser::new(NodeInterpreter::from_settings(&settings));

    // Ctrl-C kills the interpreter instead of leaving it running
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = if args.path.is_dir() {
        let locator = DirectoryLocator::with_settings(&args.path, &settings);
        parser.configuration_in(&locator, Some(&cancel)).await
    } else {
        parser.configuration_in(&args.path, Some(&cancel)).await
    };
    interrupt.abort();

    let report = result?.map(|(path, configuration)| ConfigurationReport::new(&path, configuration));

    match &report {
        Some(report) => info!("Read Tailwind configuration from {}", report.metadata.config_path),
        None => info!("No usable Tailwind configuration at {}", args.path.display()),
    }

    Ok(report)
}

/// Harness command entry point
pub fn harness_script(args: &HarnessArgs) -> Result<String> {
    Ok(HarnessScript::for_config_path(&args.path)?.render())
}

/// Normalize command - read class fragments from stdin, write class names to stdout
pub async fn handle_normalize_command() -> Result<()> {
    use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

    let mut fragments = Vec::new();
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| ConfigError::InvalidInput(format!("Failed to read from stdin: {}", e)))?
    {
        fragments.push(line);
    }

    let mut stdout = io::stdout();
    for class in normalize_classes(&fragments) {
        stdout.write_all(class.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    Ok(())
}
