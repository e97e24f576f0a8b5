//! CODEOWNERS Coverage CLI
//!
//! A command-line tool that checks every file of a repository has a
//! mandatory code owner.

use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode as StdExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Args;
use cli::config::{ExitCode, ValidatedConfig, create_octocrab};
use cli::github::OctocrabClient;
use cli::output::{CheckOutcome, HumanOutput, write_json};
use codeowners_coverage_core::{Analyzer, Platform};

#[tokio::main]
async fn main() -> StdExitCode {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.verbose, args.json);

    // Set up signal handling for graceful shutdown
    let terminated = Arc::new(AtomicBool::new(false));
    let terminated_clone = terminated.clone();

    tokio::spawn(async move {
        let ctrl_c = signal::ctrl_c();
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received SIGINT, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }

        terminated_clone.store(true, Ordering::SeqCst);
    });

    let exit_code = run(args, &terminated).await;

    // Check if we were terminated by signal
    if terminated.load(Ordering::SeqCst) {
        return StdExitCode::from(ExitCode::Terminated as u8);
    }

    StdExitCode::from(i32::from(exit_code) as u8)
}

/// Initialize tracing based on verbosity level.
///
/// `log` records from the core reach the subscriber through the
/// tracing-log bridge installed by `init`.
fn init_tracing(verbosity: u8, json_output: bool) {
    // Logs would interleave with the JSON document
    if json_output {
        return;
    }

    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["octocrab=warn", "hyper=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

/// Writes a startup error, logging if stderr itself fails.
fn report_error<W: Write>(errors: &mut HumanOutput<W>, message: &str) {
    if let Err(e) = errors.write_error(message) {
        error!("Failed to write output: {}", e);
    }
}

/// Run the analysis with the given arguments.
async fn run(args: Args, terminated: &AtomicBool) -> ExitCode {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut errors = HumanOutput::new(stderr.lock(), !args.json && stderr.is_terminal());

    // Validate configuration
    let config = match ValidatedConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            report_error(&mut errors, &e.to_string());
            return ExitCode::StartupFailure;
        }
    };

    debug!("Validated configuration: {:?}", config);
    if let Some(base_dir) = config.base_dir() {
        info!("Base directory: {}", base_dir.display());
    }

    // Build the platform client if credentials were given
    let platform = match &config.platform {
        Some(platform_config) => {
            info!(
                "Cross-checking against {}/{} ({})",
                platform_config.owner, platform_config.repo, platform_config.credential
            );
            match create_octocrab(platform_config).await {
                Ok(octocrab) => Platform::present(
                    Arc::new(OctocrabClient::new(
                        octocrab,
                        &platform_config.owner,
                        &platform_config.repo,
                        &platform_config.branch,
                    )),
                    config.require_platform_check,
                ),
                Err(e) => {
                    report_error(&mut errors, &e.to_string());
                    return ExitCode::StartupFailure;
                }
            }
        }
        None => Platform::Absent,
    };

    if terminated.load(Ordering::SeqCst) {
        return ExitCode::Terminated;
    }

    let analyzer = Analyzer::new(config.analyzer.clone());
    let analysis = match analyzer
        .analyze_with_platform(&platform, &config.cross_check)
        .await
    {
        Ok(analysis) => analysis,
        Err(e) => {
            report_error(&mut errors, &e.to_string());
            return ExitCode::StartupFailure;
        }
    };

    if terminated.load(Ordering::SeqCst) {
        return ExitCode::Terminated;
    }

    let report = &analysis.report;
    info!(
        "Analyzed {} paths using {}",
        report.len(),
        report.rules_file().display()
    );

    let use_colors = !config.json_output && stdout.is_terminal();
    let mut output = HumanOutput::new(stdout.lock(), use_colors);

    if !config.json_output {
        if let Err(e) = errors.write_diagnostics(report) {
            error!("Failed to write output: {}", e);
        }
    }
    if let Err(e) = errors.write_cross_check(&analysis.cross_check) {
        error!("Failed to write output: {}", e);
        return ExitCode::StartupFailure;
    }

    let outcome = CheckOutcome::evaluate(report, config.check_existing, config.check_newly_created);
    if outcome.failed() {
        if let Err(e) = output.write_failures(outcome, report) {
            error!("Failed to write output: {}", e);
            return ExitCode::StartupFailure;
        }
        return ExitCode::ValidationFailed;
    }

    if config.show_approvers {
        let written = if config.json_output {
            write_json(&mut stdout.lock(), report)
        } else {
            output.write_approvers(report)
        };
        if let Err(e) = written {
            error!("Failed to write output: {}", e);
            return ExitCode::StartupFailure;
        }
    }

    match analysis.cross_check.problems() {
        Some(problems) if problems.exceeds(config.platform_fail_level) => {
            info!(
                "Platform problems reach the fail level {:?}",
                config.platform_fail_level
            );
            ExitCode::ValidationFailed
        }
        _ => ExitCode::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_error_survives_failed_write() {
        let mut errors = HumanOutput::new(ClosedPipe, false);
        report_error(&mut errors, "config is broken");

        let mut buf = Vec::new();
        report_error(&mut HumanOutput::new(&mut buf, false), "config is broken");
        assert_eq!(String::from_utf8(buf).unwrap(), "Error: config is broken\n");
    }
}
