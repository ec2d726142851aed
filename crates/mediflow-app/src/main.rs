//! Mediflow application binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Load configuration from TOML (CLI > env > file > defaults)
//! 2. Load the provider and schedule tables
//! 3. Wire the completion and speech services
//! 4. Run the axum API server (`serve`) or the terminal conversation (`talk`)

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use mediflow_agent::Scheduler;
use mediflow_api::{start_server, AppState};
use mediflow_core::config::MediflowConfig;
use mediflow_llm::{ChatCompletionService, OpenAiClient};
use mediflow_store::Stores;
use mediflow_voice::{DeepgramClient, SpeechService};

use cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = MediflowConfig::load_or_default(&config_file);
    config.general.port = args.resolve_port(config.general.port);
    if let Some(dir) = &args.data_dir {
        config.data.providers_path = dir.join("providers.csv").to_string_lossy().to_string();
        config.data.schedules_path = dir.join("schedules.csv").to_string_lossy().to_string();
    }

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Mediflow v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Stores.
    let stores = Stores::load(&config.data)?;

    // Completion service; absent when no key is configured.
    let completion: Option<Arc<dyn ChatCompletionService>> =
        match OpenAiClient::from_config(&config.llm) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Completion service unavailable");
                None
            }
        };

    match args.command {
        Command::Serve => {
            let state = AppState::new(stores, completion);
            start_server(&config.general, state).await?;
        }
        Command::Talk { audio_out } => {
            let completion = completion.ok_or(
                "talk mode needs a completion service; set OPENAI_API_KEY or [llm].api_key",
            )?;
            let voice: Option<Arc<dyn SpeechService>> =
                match DeepgramClient::from_config(&config.voice) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Speech service unavailable; text only");
                        None
                    }
                };
            let scheduler = Scheduler::new(stores, completion);
            run_talk(scheduler, voice, audio_out).await?;
        }
    }

    Ok(())
}

/// Terminal conversation loop.
///
/// A line starting with `@` names an audio file to transcribe for that turn;
/// anything else is sent as typed text. `exit` or EOF ends the session.
async fn run_talk(
    scheduler: Scheduler,
    voice: Option<Arc<dyn SpeechService>>,
    audio_out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &audio_out {
        std::fs::create_dir_all(dir)?;
    }

    println!("Mediflow scheduling assistant. Type a message, @file.wav for audio, or 'exit'.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut conversation_id: Option<Uuid> = None;
    let mut turn = 0usize;

    loop {
        print!("you> ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let message = if let Some(path) = line.strip_prefix('@') {
            let Some(voice) = &voice else {
                println!("(no speech service configured; type your message instead)");
                continue;
            };
            let audio = std::fs::read(path)?;
            let transcript = voice.transcribe(&audio, mime_for(Path::new(path))).await?;
            if transcript.trim().is_empty() {
                println!("(no speech detected in {})", path);
                continue;
            }
            println!("you (voice)> {}", transcript);
            transcript
        } else {
            line
        };

        let outcome = scheduler.handle_message(conversation_id, &message).await?;
        conversation_id = Some(outcome.conversation_id);
        turn += 1;

        println!("assistant> {}", outcome.reply);
        if !outcome.suggestions.is_empty() {
            println!("  (try: {})", outcome.suggestions.join(" | "));
        }

        if let (Some(dir), Some(voice)) = (&audio_out, &voice) {
            let bytes = voice.synthesize(&outcome.reply).await?;
            if !bytes.is_empty() {
                let path = dir.join(format!("reply-{:03}.mp3", turn));
                std::fs::write(&path, &bytes)?;
                println!("  (audio reply: {})", path.display());
            }
        }
    }

    println!("Goodbye.");
    Ok(())
}

/// MIME type for an audio file, by extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "audio/wav",
    }
}
