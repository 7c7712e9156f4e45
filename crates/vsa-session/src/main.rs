//! Video script analyzer session binary.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vsa_core::{LanguageChange, Orchestrator, OrchestratorConfig, SubmitOutcome, YoutubeValidator};
use vsa_gemini::GeminiClient;
use vsa_models::Language;
use vsa_session::{Command, TerminalObserver, HELP};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // TLS for the Gemini and oEmbed calls
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let generator = GeminiClient::from_env().context("Failed to create Gemini client")?;
    info!(model = generator.model(), "Starting vsa-session");

    let config = OrchestratorConfig::from_env();
    let orch = Orchestrator::with_observer(
        config,
        Arc::new(YoutubeValidator::from_env()),
        Arc::new(generator),
        Arc::new(TerminalObserver::new()),
    );

    println!("{}", HELP);
    println!("Language: {}", orch.language());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match Command::parse(&line) {
            Command::Submit(input) => {
                let orch = orch.clone();
                tokio::spawn(async move {
                    match orch.submit(&input).await {
                        SubmitOutcome::EmptyInput => println!("Please enter a YouTube URL"),
                        SubmitOutcome::Ignored => println!("Still validating the previous URL"),
                        _ => {}
                    }
                });
            }
            Command::Language(None) => {
                let current = orch.language();
                for name in Language::SUPPORTED {
                    let marker = if current.as_str() == name { "*" } else { " " };
                    println!("{} {}", marker, name);
                }
            }
            Command::Language(Some(name)) => {
                let language = Language::new(name);
                if !language.is_supported() {
                    println!("Note: {} is not a listed language; using it as given", language);
                }
                let orch = orch.clone();
                tokio::spawn(async move {
                    match orch.change_language(language).await {
                        LanguageChange::Locked => {
                            println!("Language can't be changed while a video is being analyzed")
                        }
                        LanguageChange::Applied => println!("Language: {}", orch.language()),
                        LanguageChange::Unchanged | LanguageChange::Regenerated(_) => {}
                    }
                });
            }
            Command::Edit => orch.edit_input(),
            Command::State => {
                let snapshot = orch.snapshot();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(name) => println!("Unknown command :{} (try :help)", name),
        }
    }

    info!(session = orch.session_id(), "Session closed");
    Ok(())
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`. Logs go to stderr so
/// they do not interleave with session output.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"))
        .add_directive("vsa=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    Ok(())
}
