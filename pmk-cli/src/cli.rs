use clap::{Args, Parser, Subcommand};
use pmk_core::SprintLength;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pmk", version)]
#[command(about = "Product-management agents: ideas to PRDs, sprints and boards")]
#[command(long_about = None)]
pub struct Cli {
    /// TOML config file (defaults to ./pmk.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (overrides [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the whole workflow for one idea and write the run as JSON
    Run(RunArgs),

    /// Route feedback on a saved run, or settle feedback awaiting approval
    Feedback(FeedbackArgs),

    /// Linear diagnostics
    #[command(subcommand)]
    Linear(LinearCommand),

    /// Pinecone diagnostics
    #[command(subcommand)]
    Pinecone(PineconeCommand),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The raw product idea
    pub idea: String,

    /// Extra context passed to the idea step
    #[arg(long)]
    pub context: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub team_size: u32,

    /// "1 week" to "4 weeks", or 1w..4w
    #[arg(long, default_value = "2 weeks")]
    pub sprint_length: SprintLength,

    #[arg(long, default_value_t = 3)]
    pub total_sprints: u32,

    /// Skip sprint planning
    #[arg(long)]
    pub no_sprints: bool,

    /// Skip visual design
    #[arg(long)]
    pub no_visual: bool,

    /// Create a Linear project from the sprint plan
    #[arg(long)]
    pub linear: bool,

    /// Create a Miro board from the design plan
    #[arg(long)]
    pub miro: bool,

    /// Publish the PRD to Notion
    #[arg(long)]
    pub notion: bool,

    #[arg(long)]
    pub session_id: Option<String>,

    /// Write the run here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    /// Run file written by `pmk run --output`; updated in place
    #[arg(long)]
    pub run: PathBuf,

    /// Feedback text to route
    #[arg(required_unless_present_any = ["approve", "reject"])]
    pub text: Option<String>,

    /// Apply the decision awaiting approval
    #[arg(long, conflicts_with_all = ["reject", "text"])]
    pub approve: bool,

    /// Discard the decision awaiting approval
    #[arg(long, conflicts_with = "text")]
    pub reject: bool,
}

#[derive(Subcommand, Debug)]
pub enum LinearCommand {
    /// List the teams the API key can see
    Teams,
}

#[derive(Subcommand, Debug)]
pub enum PineconeCommand {
    /// List indexes in the project
    Indexes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["pmk", "run", "A habit tracker"]).unwrap();
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.idea, "A habit tracker");
        assert_eq!(args.team_size, 5);
        assert_eq!(args.sprint_length, SprintLength::TwoWeeks);
        assert_eq!(args.total_sprints, 3);
        assert!(!args.no_sprints && !args.linear);
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "pmk",
            "--config",
            "custom.toml",
            "run",
            "idea",
            "--sprint-length",
            "1w",
            "--no-visual",
            "--linear",
            "-o",
            "run.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Commands::Run(args) = cli.command else { panic!("expected run") };
        assert_eq!(args.sprint_length, SprintLength::OneWeek);
        assert!(args.no_visual);
        assert!(args.linear);
        assert_eq!(args.output, Some(PathBuf::from("run.json")));
    }

    #[test]
    fn test_bad_sprint_length_rejected() {
        assert!(Cli::try_parse_from(["pmk", "run", "idea", "--sprint-length", "5w"]).is_err());
    }

    #[test]
    fn test_feedback_needs_text_or_decision() {
        assert!(Cli::try_parse_from(["pmk", "feedback", "--run", "r.json"]).is_err());
        assert!(Cli::try_parse_from(["pmk", "feedback", "--run", "r.json", "--approve"]).is_ok());
        assert!(
            Cli::try_parse_from(["pmk", "feedback", "--run", "r.json", "--approve", "--reject"])
                .is_err()
        );
        let cli = Cli::try_parse_from(["pmk", "feedback", "--run", "r.json", "too vague"]).unwrap();
        let Commands::Feedback(args) = cli.command else { panic!("expected feedback") };
        assert_eq!(args.text.as_deref(), Some("too vague"));
    }

    #[test]
    fn test_diagnostic_subcommands() {
        let cli = Cli::try_parse_from(["pmk", "linear", "teams"]).unwrap();
        assert!(matches!(cli.command, Commands::Linear(LinearCommand::Teams)));
        let cli = Cli::try_parse_from(["pmk", "pinecone", "indexes", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Pinecone(PineconeCommand::Indexes)));
    }
}
