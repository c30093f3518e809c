use clap::{ArgAction, Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "checkperms",
    version,
    about = "Audits file permissions against a fixed security policy",
    long_about = "checkperms reads pathnames from standard input, one per line, checks \
                  their permission bits against a fixed security policy, and optionally \
                  rewrites offending modes."
)]
pub struct Cli {
    /// Inspect file content before judging executable bits
    #[arg(short = 'c', long = "content")]
    pub content: bool,

    /// Exit with failure when warnings occurred, not only errors
    #[arg(short = 'e', long = "error-on-warning")]
    pub error_on_warning: bool,

    /// Fix errors via chmod; give twice to also fix warnings
    #[arg(short = 'f', long = "fix", action = ArgAction::Count)]
    pub fix: u8,

    /// Report what would be fixed without changing anything; give twice to include warnings
    #[arg(short = 'n', long = "dry-run", action = ArgAction::Count)]
    pub dry_run: u8,

    /// Suppress the final summary line
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,
}
