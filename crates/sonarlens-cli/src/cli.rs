use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "sonarlens",
    about = "Coverage and duplication reports scraped from a SonarQube-style server",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Per-file coverage report, lowest coverage first.
    Coverage(AnalyzeArgs),
    /// Per-file duplication report, densest first.
    Duplication(AnalyzeArgs),
    /// Coverage and duplication merged into one record per file.
    Combined(AnalyzeArgs),
    /// Infer server base URL and project key from a pasted dashboard URL.
    Detect(DetectArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Project key as known to the server.
    pub project_key: String,
    /// Server base URL, e.g. https://sonar.example.com.
    #[arg(long)]
    pub base_url: String,
    /// Session cookie string; defaults to SONARLENS_COOKIE.
    #[arg(long)]
    pub cookie: Option<String>,
    /// Emit the clipboard transcript instead of JSON.
    #[arg(long, default_value_t = false)]
    pub copy_text: bool,
    /// Restrict output to one component key (single-file transcript).
    #[arg(long, value_name = "COMPONENT_KEY")]
    pub file: Option<String>,
    /// Print progress messages to stderr while the run is in flight.
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// A server page URL, e.g. https://sonar.example.com/dashboard?id=demo.
    pub url: String,
}
