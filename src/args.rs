use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tailwind configuration reader - evaluates tailwind.config files into a completion model
#[derive(Parser, Debug)]
#[command(name = "tailwind-config-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a configuration file and print the theme model as JSON
    Read(ReadArgs),
    /// Print the harness script generated for a configuration file
    Harness(HarnessArgs),
    /// Normalize raw plugin class fragments read from stdin, one per line
    Normalize,
}

/// Arguments for the read command
#[derive(Parser, Debug, Clone)]
pub struct ReadArgs {
    /// Configuration file, or a project directory to search
    #[arg(
        value_name = "PATH",
        help = "Configuration file or project directory containing one"
    )]
    pub path: PathBuf,

    /// Reader settings file (YAML or JSON)
    #[arg(
        short = 's',
        long = "settings",
        value_name = "PATH",
        help = "Path to a reader settings file (YAML or JSON)"
    )]
    pub settings: Option<PathBuf>,

    /// Interpreter program
    #[arg(
        long = "node",
        value_name = "PROGRAM",
        env = "TAILWIND_CONFIG_NODE",
        help = "Interpreter used to evaluate the configuration (defaults to node)"
    )]
    pub node: Option<String>,

    /// Interpreter timeout
    #[arg(
        short = 't',
        long = "timeout-ms",
        value_name = "MS",
        help = "Kill the interpreter after this many milliseconds"
    )]
    pub timeout_ms: Option<u64>,

    /// Compact output
    #[arg(
        long = "compact",
        default_value_t = false,
        help = "Print the report as a single JSON line"
    )]
    pub compact: bool,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable debug logging on stderr"
    )]
    pub verbose: bool,
}

/// Arguments for the harness command
#[derive(Parser, Debug, Clone)]
pub struct HarnessArgs {
    /// Configuration file the harness should load
    #[arg(value_name = "PATH", help = "Configuration file the harness should load")]
    pub path: PathBuf,
}

impl ReadArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if let Some(timeout) = self.timeout_ms {
            if timeout == 0 {
                return Err("Timeout must be at least 1 millisecond".to_string());
            }
        }

        if let Some(node) = &self.node {
            if node.trim().is_empty() {
                return Err("Interpreter program must not be empty".to_string());
            }
        }

        if let Some(settings) = &self.settings {
            if settings == &self.path {
                return Err("Settings file and configuration path must be different".to_string());
            }
        }

        Ok(())
    }
}
