use checkperms::{
    AuditSession, Cli, JsonReporter, OutputFormat, Reporter, SessionOptions, TerminalReporter,
};
use clap::Parser;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut session = AuditSession::new(SessionOptions {
        content_check: cli.content,
        fix: cli.fix,
        dry_run: cli.dry_run,
    });

    let result = session.run(io::stdin().lock());
    let report = session.into_report();

    match result {
        Ok(()) => {
            let output = match cli.format {
                OutputFormat::Terminal => TerminalReporter::new(cli.quiet).report(&report),
                OutputFormat::Json => JsonReporter::new().report(&report),
            };
            print!("{output}");

            if report.summary.passed(cli.error_on_warning) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            // Findings from before the abort are still reported; the run
            // never reaches the summary.
            let output = match cli.format {
                OutputFormat::Terminal => TerminalReporter::new(true).report(&report),
                OutputFormat::Json => JsonReporter::new().report(&report),
            };
            print!("{output}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
