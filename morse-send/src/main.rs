//! morse-send - Key a message as Morse code

use anyhow::{Context, Result};
use clap::Parser;
use libmorsecast::service::events::Event;
use libmorsecast::service::MorsecastService;
use libmorsecast::transmitter::{TransmitError, TransmitRequest};
use libmorsecast::{Config, MorsecastError, TransformMode};
use std::io::{Read, Write};
use std::time::Instant;
use tokio::sync::broadcast::error::RecvError;

#[derive(Parser, Debug)]
#[command(name = "morse-send")]
#[command(version, about = "Key a message as Morse code")]
#[command(long_about = r#"Key a message as Morse code, rendering each pulse as it sounds.

EXAMPLES:
    morse-send "CQ CQ DE N0CALL"
    echo "SOS" | morse-send
    morse-send --mode shift --shift 13 "HELLO"
    morse-send --mode xor --key 7 "secret"
    morse-send --priority --mute "QRZ"
    morse-send --format json "SOS" | jq -c 'select(.type == "flash_begin")'

OUTPUT FORMATS:
    text - Pulses as they are keyed, then a summary line (default)
    json - One JSON event per line

EXIT CODES:
    0 - Transmission completed and logged
    1 - Error (configuration, storage, etc.)
    3 - Invalid input (empty message)
"#)]
struct Cli {
    /// Message to send (reads from stdin if not provided)
    text: Vec<String>,

    /// Transform mode: none, shift, binary, xor
    #[arg(short, long, value_name = "MODE")]
    mode: Option<TransformMode>,

    /// Shift amount for shift mode
    #[arg(long, value_name = "N")]
    shift: Option<u8>,

    /// Key for xor mode (0-255)
    #[arg(short, long, value_name = "KEY")]
    key: Option<String>,

    /// Key at the priority frequency
    #[arg(short, long)]
    priority: bool,

    /// Disable tones for this transmission
    #[arg(long)]
    mute: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    libmorsecast::logging::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<MorsecastError>()
            .map(MorsecastError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

/// Message from arguments, or stdin when it is not a terminal
fn read_message(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    if atty::is(atty::Stream::Stdin) {
        return Ok(String::new());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read message from stdin")?;
    Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
}

async fn run(cli: Cli) -> Result<()> {
    let message = read_message(&cli.text)?;
    if message.trim().is_empty() {
        return Err(MorsecastError::InvalidInput(
            "Message is empty. Pass text as arguments or pipe it on stdin".to_string(),
        )
        .into());
    }

    let config = Config::load().context("Failed to load configuration")?;
    let service = MorsecastService::from_config(config).await?;
    if cli.mute {
        service.set_audio_enabled(false);
    }

    let mut request: TransmitRequest = service.request(message);
    if let Some(mode) = cli.mode {
        request.mode = mode;
    }
    if let Some(shift) = cli.shift {
        request.params.shift = shift;
    }
    if let Some(key) = cli.key {
        request.params.xor_key = key;
    }
    request.priority |= cli.priority;

    let mut events = service.subscribe();
    let started = Instant::now();
    let id = service.transmit(request).await.map_err(|e| match e {
        TransmitError::EmptyMessage => anyhow::Error::new(MorsecastError::InvalidInput(e.to_string())),
        other => anyhow::Error::new(other),
    })?;
    tracing::debug!(transmission_id = %id, "Transmitting");

    let json = cli.format == "json";
    let mut stdout = std::io::stdout();

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!("Renderer fell behind, skipped {} events", skipped);
                continue;
            }
            Err(RecvError::Closed) => anyhow::bail!("Transmitter stopped before completion"),
        };
        if event.transmission_id() != id {
            continue;
        }

        if json {
            writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        } else {
            render_text(&mut stdout, &event, started)?;
        }
        stdout.flush()?;

        if matches!(event, Event::TransmissionCompleted { .. }) {
            break;
        }
    }

    if !service.is_persistent() {
        eprintln!("Warning: transmission log unavailable, this message was not saved");
    }
    service.close().await;
    Ok(())
}

fn render_text(out: &mut impl Write, event: &Event, started: Instant) -> std::io::Result<()> {
    match event {
        Event::TransmissionStarted {
            display_text, mode, ..
        } => {
            if *mode == TransformMode::None {
                writeln!(out, "Transmitting: {}", display_text)
            } else {
                writeln!(out, "Transmitting ({}): {}", mode, display_text)
            }
        }
        Event::FlashBegin { pulse, .. } => write!(out, "{}", pulse.as_char()),
        Event::WordGap { .. } => write!(out, "/"),
        Event::CharacterAdvanced { .. } => write!(out, " "),
        Event::FlashEnd { .. } => Ok(()),
        Event::TransmissionCompleted { entry, .. } => {
            writeln!(out)?;
            writeln!(
                out,
                "Sent {} chars in {:.1}s",
                entry.plaintext.chars().count(),
                started.elapsed().as_secs_f64()
            )
        }
    }
}
