use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chat_replay::{
    script_json_schema, simulate, PlaybackConfig, PlaybackEvent, PlaybackSession,
    PlaybackSnapshot, PlaybackTrace, RenderBackend, ReplayError, ScriptStore, TextRenderer,
    SCRIPT_SCHEMA_VERSION,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Scripted chat conversation replay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a chat script JSON file.
    Validate { script: PathBuf },
    /// Print the playback timeline of a script without waiting.
    Timeline {
        script: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = TimelineFormat::Text)]
        format: TimelineFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Play a script in the terminal in real time.
    Play {
        script: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Playback speed multiplier.
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Print the JSON schema of chat scripts.
    Schema,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TimelineFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Serialize)]
struct TimelineEnvelope<'a> {
    trace_format_version: u16,
    script_schema_version: &'a str,
    title: &'a str,
    trace: &'a PlaybackTrace,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { script } => validate_script(&script),
        Command::Timeline {
            script,
            config,
            format,
            output,
        } => print_timeline(&script, config.as_deref(), format, output.as_deref()),
        Command::Play {
            script,
            config,
            speed,
        } => play_script(&script, config.as_deref(), speed).await,
        Command::Schema => {
            println!("{}", script_json_schema()?);
            Ok(())
        }
    }
}

fn load_store(path: &Path) -> Result<ScriptStore> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    ScriptStore::from_json(&raw).map_err(|err| report(err, path))
}

fn load_config(path: Option<&Path>) -> Result<PlaybackConfig> {
    match path {
        Some(path) => PlaybackConfig::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(PlaybackConfig::default()),
    }
}

/// Prints the diagnostic with source context and converts it for `anyhow`.
fn report(err: ReplayError, path: &Path) -> anyhow::Error {
    let message = format!("invalid script {}", path.display());
    eprintln!("{:?}", miette::Report::new(err));
    anyhow::anyhow!(message)
}

fn validate_script(path: &Path) -> Result<()> {
    let store = load_store(path)?;
    let trace = simulate(&store, &PlaybackConfig::default())?;
    println!(
        "ok: '{}' with {} participants, {} messages, {} ms of playback",
        store.title(),
        store.participants().len(),
        store.len(),
        trace.total_ms
    );
    Ok(())
}

fn print_timeline(
    path: &Path,
    config: Option<&Path>,
    format: TimelineFormat,
    output: Option<&Path>,
) -> Result<()> {
    let store = load_store(path)?;
    let config = load_config(config)?;
    let trace = simulate(&store, &config)?;
    let envelope = TimelineEnvelope {
        trace_format_version: 1,
        script_schema_version: SCRIPT_SCHEMA_VERSION,
        title: store.title(),
        trace: &trace,
    };
    let rendered = match format {
        TimelineFormat::Text => timeline_text(&trace),
        TimelineFormat::Json => serde_json::to_string_pretty(&envelope)?,
        TimelineFormat::Yaml => serde_yaml::to_string(&envelope)?,
    };
    match output {
        Some(out) => {
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(out, rendered).with_context(|| format!("write {}", out.display()))?;
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn timeline_text(trace: &PlaybackTrace) -> String {
    trace
        .entries
        .iter()
        .map(|entry| {
            let what = match &entry.event {
                PlaybackEvent::Started { lead_in_ms } => format!("start (lead-in {lead_in_ms} ms)"),
                PlaybackEvent::TypingStarted {
                    index,
                    display_name,
                    delay_ms,
                    ..
                } => format!("#{index} {display_name} typing for {delay_ms} ms"),
                PlaybackEvent::TypingStopped { index, sender_id } => {
                    format!("#{index} {sender_id} stopped typing")
                }
                PlaybackEvent::MessageRevealed { index, message } => {
                    format!("#{index} {}: {}", message.sender_id, message.text)
                }
                PlaybackEvent::Finished { revealed } => format!("done ({revealed} messages)"),
                PlaybackEvent::Cancelled { cursor } => format!("cancelled at #{cursor}"),
            };
            format!("{:>8} ms  {what}", entry.at_ms)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn play_script(path: &Path, config: Option<&Path>, speed: Option<f64>) -> Result<()> {
    let store = Arc::new(load_store(path)?);
    let mut config = load_config(config)?;
    if let Some(speed) = speed {
        config = config.with_speed(speed)?;
    }

    println!("== {} ==", store.title());
    let handle = PlaybackSession::spawn(store.clone(), config);
    let mut updates = handle.subscribe();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let mut printed = 0usize;
    let mut typing_shown = false;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_delta(&snapshot, &store, &mut printed, &mut typing_shown);
                if snapshot.phase.is_terminal() {
                    break;
                }
            }
            _ = &mut interrupt => {
                info!("interrupted, cancelling playback");
                let snapshot = handle.cancel().await?;
                println!("-- stopped after {} messages --", snapshot.cursor);
                return Ok(());
            }
        }
    }

    let finished = handle.wait().await?;
    println!("-- {} messages --", finished.cursor);
    Ok(())
}

fn print_delta(
    snapshot: &PlaybackSnapshot,
    store: &ScriptStore,
    printed: &mut usize,
    typing_shown: &mut bool,
) {
    let renderer = TextRenderer;
    if snapshot.displayed.len() > *printed {
        let fresh = PlaybackSnapshot {
            displayed: snapshot.displayed[*printed..].to_vec(),
            ..PlaybackSnapshot::default()
        };
        println!("{}", renderer.render(&fresh, store).text);
        *printed = snapshot.displayed.len();
    }
    match (&snapshot.typing_indicator, *typing_shown) {
        (Some(typing), false) => {
            let only_typing = PlaybackSnapshot {
                typing_indicator: Some(typing.clone()),
                ..PlaybackSnapshot::default()
            };
            println!("{}", renderer.render(&only_typing, store).text);
            *typing_shown = true;
        }
        (None, true) => *typing_shown = false,
        _ => {}
    }
}
