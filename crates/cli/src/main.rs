use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rustplay_client::{ClientConfig, PlaygroundApi};
use rustplay_core::{Flags, JobRequest, Options, Target};
use rustplay_events::EventLog;
use rustplay_orchestrator::{submit_with_retry, JobOrchestrator, OrchestratorConfig, RetryPolicy};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod args;
mod render;

use args::{Cli, Command};

/// How long to wait for the event log to drain after the session ends.
const EVENT_LOG_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rustplay=info,rustplay_orchestrator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Targets { file, options } => {
            let options = options.to_options();
            let code = match file {
                Some(path) => read_source(Some(&path)).await?,
                None => String::new(),
            };
            render::print_targets(&mut std::io::stdout(), Flags::derive(&options, &code))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit {
            target,
            file,
            options,
            url,
            timeout,
            retries,
            event_log,
        } => {
            let code = read_source(file.as_deref()).await?;
            let session = Session {
                target,
                code,
                options: options.to_options(),
                url,
                timeout,
                retries,
                event_log,
            };
            session.run().await
        }
    }
}

/// One `submit` invocation.
struct Session {
    target: Target,
    code: String,
    options: Options,
    url: Option<String>,
    timeout: Option<u64>,
    retries: u32,
    event_log: Option<PathBuf>,
}

impl Session {
    async fn run(self) -> anyhow::Result<ExitCode> {
        let mut client_config = ClientConfig::from_env()?;
        if let Some(url) = self.url {
            client_config.base_url = url;
        }
        let mut orchestrator_config = OrchestratorConfig::from_env()?;
        if let Some(secs) = self.timeout {
            orchestrator_config.request_timeout = Duration::from_secs(secs);
        }

        let api = PlaygroundApi::new(&client_config).context("Failed to build HTTP client")?;
        tracing::info!(base_url = api.base_url(), "Using playground backend");
        let orchestrator = JobOrchestrator::new(api, orchestrator_config);

        let log_task = match &self.event_log {
            Some(path) => {
                let file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .await
                    .with_context(|| format!("Failed to open event log {}", path.display()))?;
                Some(tokio::spawn(EventLog::run(file, orchestrator.subscribe())))
            }
            None => None,
        };

        let flags = Flags::derive(&self.options, &self.code);
        if let Some(note) = self.target.note(flags) {
            eprintln!("Note: {note}");
        }
        let request = JobRequest::prepare(self.target, self.code, &self.options, flags);

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupted, cancelling job");
                    cancel.cancel();
                    orchestrator.cancel().await;
                }
            })
        };

        let policy = RetryPolicy::with_retries(self.retries);
        let event = submit_with_retry(&orchestrator, request, &policy, &cancel).await;
        interrupt.abort();

        let code = match event {
            Some(event) => {
                render::print_outcome(&mut std::io::stdout(), &mut std::io::stderr(), &event)?
            }
            // Cancelled while waiting between retries.
            None => {
                eprintln!("cancelled");
                130
            }
        };

        orchestrator.shutdown().await;
        drop(orchestrator);

        if let Some(task) = log_task {
            match tokio::time::timeout(EVENT_LOG_DRAIN, task).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Event log task failed"),
                Err(_) => tracing::warn!("Event log did not drain in time"),
            }
        }

        Ok(render::exit_code(code))
    }
}

/// Read source code from `path`, or stdin for `None` and `-`.
async fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read source from stdin")?;
            Ok(code)
        }
    }
}
