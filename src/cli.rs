use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "portprobe")]
#[command(version)]
#[command(about = "Resolve a target and report which TCP ports in a range are open", long_about = None)]
pub struct Cli {
    #[arg(help = "Hostname, URL (http:// or https://) or IP address")]
    pub target: String,

    #[arg(
        short,
        long,
        required = true,
        num_args = 2,
        value_names = ["LOW", "HIGH"],
        allow_negative_numbers = true,
        help = "Port range bounds, in either order"
    )]
    pub ports: Vec<i64>,

    #[arg(short, long, help = "Print a report with service names instead of a bare port list")]
    pub verbose: bool,

    #[arg(long, help = "Timeout in milliseconds for each port")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Maximum number of ports probed at once")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Overall scan deadline in milliseconds")]
    pub deadline: Option<u64>,

    #[arg(short = 'o', long, value_enum, default_value = "human", help = "Output format")]
    pub output_format: OutputFormat,

    #[arg(short = 'f', long, help = "Output file path")]
    pub output_file: Option<PathBuf>,

    #[arg(long, help = "Read configuration from this file instead of the default location")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(long, help = "Show a progress bar while scanning")]
    pub progress: bool,

    #[arg(long, help = "Enable debug logging")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.scanning.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.scanning.concurrency = concurrency;
        }
        if self.deadline.is_some() {
            config.scanning.deadline_ms = self.deadline;
        }
        if self.progress {
            config.scanning.show_progress = true;
        }
        if self.no_color {
            config.output.color_enabled = false;
        }
    }

    /// Port bounds as the loosely-typed range accepted by `get_open_ports`.
    pub fn port_range(&self) -> serde_json::Value {
        serde_json::Value::from(self.ports.clone())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    #[value(name = "human", help = "Human-readable output")]
    Human,
    #[value(name = "json", help = "JSON output")]
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_and_override() {
        let cli = Cli::parse_from([
            "portprobe",
            "scanme.example",
            "--ports",
            "80",
            "22",
            "--concurrency",
            "4",
            "--no-color",
            "-v",
        ]);

        assert_eq!(cli.target, "scanme.example");
        assert_eq!(cli.port_range(), serde_json::json!([80, 22]));
        assert!(cli.verbose);

        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.scanning.concurrency, 4);
        assert_eq!(config.scanning.timeout_ms, 500);
        assert!(!config.output.color_enabled);
    }

    #[test]
    fn test_ports_flag_requires_two_values() {
        assert!(Cli::try_parse_from(["portprobe", "10.0.0.1", "--ports", "80"]).is_err());
        assert!(Cli::try_parse_from(["portprobe", "10.0.0.1"]).is_err());
        assert!(Cli::try_parse_from(["portprobe", "10.0.0.1", "-p", "-1", "80"]).is_ok());
    }
}
