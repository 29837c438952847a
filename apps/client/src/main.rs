mod api_client;
mod cli;
mod config;
mod console;
mod errors;
mod models;
mod review;
mod submission;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api_client::{GrantApiClient, GrantService};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::errors::GENERIC_SAVE_ERROR;
use crate::models::GenerationRequest;
use crate::review::poller::{PollOutcome, PollSettings};
use crate::review::ReviewController;
use crate::submission::{SubmissionController, SubmitOutcome};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config);

    // Logs go to stderr so they never interleave with prompts on stdout.
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting grantdesk v{}", env!("CARGO_PKG_VERSION"));
    info!("Grant service: {}", config.api_url);

    let service: Arc<dyn GrantService> =
        Arc::new(GrantApiClient::new(config.api_url.clone(), config.http_timeout)?);

    match &cli.command {
        Commands::Submit {
            no_review,
            export_only,
            ..
        } => {
            let prefill = cli.command.request_fields().unwrap_or_default();
            if !run_submit(service.clone(), prefill).await? {
                return Ok(ExitCode::SUCCESS);
            }
            if *no_review {
                println!("Generation started. Run `grantdesk review` to follow its progress.");
                return Ok(ExitCode::SUCCESS);
            }
            exit_code(run_review(service, &config, *export_only).await?)
        }
        Commands::Review { export_only } => {
            exit_code(run_review(service, &config, *export_only).await?)
        }
    }
}

fn exit_code(loaded: bool) -> Result<ExitCode> {
    Ok(if loaded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Returns true once the service has accepted a request.
async fn run_submit(service: Arc<dyn GrantService>, prefill: GenerationRequest) -> Result<bool> {
    let mut controller = SubmissionController::new(service);
    let mut request = console::prompt_request(prefill, false)?;

    loop {
        eprintln!("{}", submission::PROGRESS_MESSAGE);
        match controller.submit(request).await {
            SubmitOutcome::Redirect => return Ok(true),
            SubmitOutcome::Ignored => return Ok(false),
            SubmitOutcome::Failed(message) => {
                eprintln!("{message}");
                if !console::confirm("Edit and resubmit?")? {
                    return Ok(false);
                }
                request = console::prompt_request(controller.form().clone(), true)?;
            }
        }
    }
}

/// Returns false when the draft never loaded. The reason has already been
/// reported by the poll event printer.
async fn run_review(service: Arc<dyn GrantService>, config: &Config, export_only: bool) -> Result<bool> {
    let settings = PollSettings {
        interval: config.poll_interval,
        max_consecutive_failures: config.poll_max_failures,
    };
    let mut controller = ReviewController::new(service, settings);

    // Leaving (Ctrl-C) drops the wait future, which cancels the poller.
    let outcome = tokio::select! {
        outcome = controller.wait_for_draft(console::report_poll_event) => outcome,
        _ = tokio::signal::ctrl_c() => PollOutcome::Cancelled,
    };

    match outcome {
        PollOutcome::Completed => {}
        PollOutcome::Cancelled => {
            info!("Review cancelled");
            return Ok(true);
        }
        PollOutcome::Failed => return Ok(false),
    }

    if export_only {
        return match controller.export(&config.output_dir).await {
            Ok(path) => {
                println!("Saved {}", path.display());
                Ok(true)
            }
            Err(e) => bail!("{}", e.user_message(GENERIC_SAVE_ERROR)),
        };
    }

    console::review_loop(&mut controller, &config.output_dir).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::fake::FakeGrantService;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_load_failure_exits_without_error() {
        let fake = Arc::new(FakeGrantService::default());
        for _ in 0..3 {
            fake.push_status_failure();
        }

        let loaded = run_review(fake.clone(), &Config::default(), true).await.unwrap();

        assert!(!loaded);
        assert!(fake.saved_content().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_only_saves_loaded_draft() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeGrantService::default());
        fake.push_status(json!({
            "status": "completed",
            "data": {"organization_info": {"name": "Helping Hands"}}
        }));
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let loaded = run_review(fake.clone(), &config, true).await.unwrap();

        assert!(loaded);
        assert_eq!(fake.saved_content().len(), 1);
    }
}
