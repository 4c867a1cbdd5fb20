use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cloudscope — GCP credential check and idle-resource cost report
#[derive(Parser)]
#[command(name = "cloudscope", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (overrides CLOUDSCOPE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate a service-account key file and test-authenticate it
    Validate {
        /// Path to the JSON key file
        path: PathBuf,
    },

    /// Print the unused-resource report for a project
    Report {
        #[arg(long)]
        project_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["cloudscope"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_port() {
        let cli = Cli::try_parse_from(["cloudscope", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(8080) })));
    }

    #[test]
    fn test_report_requires_project_id() {
        assert!(Cli::try_parse_from(["cloudscope", "report"]).is_err());
        let cli = Cli::try_parse_from(["cloudscope", "report", "--project-id", "test-123"]).unwrap();
        match cli.command {
            Some(Commands::Report { project_id }) => assert_eq!(project_id, "test-123"),
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_validate_takes_path() {
        let cli = Cli::try_parse_from(["cloudscope", "validate", "key.json"]).unwrap();
        match cli.command {
            Some(Commands::Validate { path }) => assert_eq!(path, PathBuf::from("key.json")),
            _ => panic!("expected validate command"),
        }
    }
}
