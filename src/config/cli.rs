use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "contract-wizard")]
#[command(about = "Drafts, signs and exports a Brazilian service contract from a scripted session")]
pub struct CliArgs {
    /// Path to the service configuration (TOML)
    #[arg(short, long, default_value = "wizard.toml")]
    pub config: String,

    /// Path to the session script (TOML)
    #[arg(short, long)]
    pub session: String,

    /// Override export.output_dir from the configuration
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the printable HTML page instead of running the PDF program
    #[arg(long)]
    pub html_only: bool,

    /// Fill the details and print the generation prompt without calling any service
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = CliArgs::parse_from([
            "contract-wizard",
            "--session",
            "session.toml",
            "--html-only",
            "-o",
            "./out",
        ]);
        assert_eq!(args.config, "wizard.toml");
        assert_eq!(args.session, "session.toml");
        assert_eq!(args.output.as_deref(), Some("./out"));
        assert!(args.html_only);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_session_is_required() {
        assert!(CliArgs::try_parse_from(["contract-wizard"]).is_err());
    }
}
