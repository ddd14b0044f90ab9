use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings, prepare_backend_url},
    ControllerEvent, SubmissionController, SubmissionOutcome, VideoClient, PROGRESS_MESSAGE,
};
use shared::{error::ErrorReport, protocol::SubmissionReport};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Submit a product image and a script to the video generator.
#[derive(Parser, Debug)]
#[command(name = "vidgen", version)]
struct Args {
    /// PNG or JPEG product image.
    #[arg(long)]
    image: PathBuf,
    #[arg(long, conflicts_with = "script_file", required_unless_present = "script_file")]
    script: Option<String>,
    #[arg(long)]
    script_file: Option<PathBuf>,
    /// Overrides vidgen.toml and the environment.
    #[arg(long)]
    backend_url: Option<String>,
    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings();
    let backend_url = prepare_backend_url(
        args.backend_url
            .as_deref()
            .unwrap_or(&settings.backend_url),
    )?;
    let script = match (&args.script, &args.script_file) {
        (Some(script), _) => script.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read script file '{}'", path.display()))?,
        (None, None) => anyhow::bail!("either --script or --script-file is required"),
    };
    info!(%backend_url, "using video backend");

    let mut controller = SubmissionController::new(Arc::new(VideoClient::new(backend_url)));
    if let Err(err) = controller.select_image_path(&args.image).await {
        eprintln!("Error: {err}");
        return Ok(ExitCode::FAILURE);
    }
    controller.set_script(script);
    info!(chars = controller.state().script_char_count(), "script ready");

    let progress = spawn_progress_logger(
        controller.subscribe_events(),
        Duration::from_secs(settings.progress_log_interval_secs.max(1)),
    );
    let outcome = controller.submit().await;
    let _ = progress.await;

    let Some(outcome) = outcome else {
        eprintln!("Error: a submission is already in flight");
        return Ok(ExitCode::FAILURE);
    };
    let (line, succeeded) = render_outcome(&outcome, args.json)?;
    if succeeded {
        println!("{line}");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{line}");
        Ok(ExitCode::FAILURE)
    }
}

/// Logs the progress message while the submission is in flight.
fn spawn_progress_logger(
    mut events: broadcast::Receiver<ControllerEvent>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        let mut loading = false;
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(ControllerEvent::LoadingChanged(true)) => {
                        loading = true;
                        info!("{PROGRESS_MESSAGE}");
                    }
                    Ok(ControllerEvent::LoadingChanged(false))
                    | Err(broadcast::error::RecvError::Closed) => break,
                    Ok(ControllerEvent::Settled(_))
                    | Err(broadcast::error::RecvError::Lagged(_)) => {}
                },
                _ = ticker.tick() => {
                    if loading {
                        info!("{PROGRESS_MESSAGE}");
                    }
                }
            }
        }
    })
}

fn render_outcome(outcome: &SubmissionOutcome, json: bool) -> Result<(String, bool)> {
    let succeeded = matches!(outcome, SubmissionOutcome::VideoUrl(_));
    let line = if json {
        let report = match outcome {
            SubmissionOutcome::VideoUrl(url) => SubmissionReport::VideoUrl(url.clone()),
            SubmissionOutcome::Failed(err) => SubmissionReport::Error(ErrorReport::from(err)),
        };
        serde_json::to_string(&report)?
    } else {
        match outcome {
            SubmissionOutcome::VideoUrl(url) => format!("video_url={url}"),
            SubmissionOutcome::Failed(err) => format!("Error: {err}"),
        }
    };
    Ok((line, succeeded))
}
