//! morse-decode - Translate pulse strings to text and back

use anyhow::{Context, Result};
use clap::Parser;
use libmorsecast::symbols;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "morse-decode")]
#[command(version, about = "Translate Morse pulse strings to text")]
#[command(long_about = r#"Translate Morse pulse strings to text, or text to pulse strings.

Tokens are separated by whitespace. A lone "/" is a word break. Tokens that
are not in the symbol table decode as "?". Put "--" before tokens that start
with a dash.

EXAMPLES:
    morse-decode ... --- ...
    morse-decode -- -.-. --.-
    echo "-.-. --.-" | morse-decode
    morse-decode --encode "CQ DE N0CALL"
    morse-decode --encode "SOS" | morse-decode

EXIT CODES:
    0 - Success
    1 - Error reading input
"#)]
struct Cli {
    /// Pulse strings (or text with --encode); reads stdin if not provided
    #[arg(allow_hyphen_values = true)]
    input: Vec<String>,

    /// Encode text into pulse strings instead of decoding
    #[arg(short, long)]
    encode: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    libmorsecast::logging::from_env(cli.verbose).init();

    let input = read_input(&cli.input)?;
    tracing::debug!(encode = cli.encode, "Translating {} bytes", input.len());

    for line in input.lines() {
        let translated = if cli.encode {
            symbols::to_pulse_string(line)
        } else {
            symbols::decode_message(line)
        };
        println!("{}", translated);
    }

    Ok(())
}

/// Arguments joined by spaces, or stdin when no arguments are given
fn read_input(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    if atty::is(atty::Stream::Stdin) {
        return Ok(String::new());
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}
