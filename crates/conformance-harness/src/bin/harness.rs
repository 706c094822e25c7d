//! CLI entrypoint for the ASN.1/TLS 1.3 conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conformance tooling for the decoder engine and handshake sequencer.
#[derive(Debug, Parser)]
#[command(name = "conformance-harness")]
#[command(about = "Conformance testing harness for asn1-core and tls13-handshake")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a single hex-encoded input against a catalog template.
    Decode {
        /// Catalog template name (see `conformance_harness::catalog`).
        #[arg(long)]
        template: String,
        /// Hex-encoded input bytes, no separators.
        #[arg(long)]
        input_hex: String,
    },
    /// Run a compiled-in handshake scenario.
    Handshake {
        /// Scenario name (see `conformance_harness::scenarios`).
        #[arg(long)]
        scenario: String,
    },
    /// Run every decode vector in a fixture file and report pass/fail.
    RunSuite {
        /// Path to a JSON vector file (see `tests/vectors/*.json`).
        #[arg(long)]
        vectors: PathBuf,
        /// Output path for the JSON report (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Decode { template, input_hex } => {
            let item = conformance_harness::catalog::lookup(&template)
                .ok_or_else(|| format!("unknown template '{template}'"))?;
            let input = conformance_harness::vectors::decode_hex(&input_hex)
                .ok_or_else(|| format!("'{input_hex}' is not valid hex"))?;
            match asn1_core::decode(&input, item) {
                Ok((value, consumed)) => {
                    println!("{value:#?}");
                    eprintln!("consumed {consumed} of {} bytes", input.len());
                }
                Err(err) => {
                    return Err(format!("decode failed: {err}").into());
                }
            }
        }
        Command::Handshake { scenario } => {
            let report = conformance_harness::scenarios::run(&scenario)?;
            let body = serde_json::to_string_pretty(&report)?;
            println!("{body}");
            if !report.completed && report.alerts.is_empty() && report.outcome != "WouldBlock" {
                return Err(format!("scenario '{scenario}' ended in {}", report.outcome).into());
            }
        }
        Command::RunSuite { vectors, output } => {
            let report = conformance_harness::run_decode_suite_from_path(&vectors)?;
            let body = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, body)?;
                    eprintln!("wrote report to {}", path.display());
                }
                None => println!("{body}"),
            }
            if !report.all_passed() {
                return Err(format!("{} of {} vectors failed", report.failed, report.total).into());
            }
        }
    }

    Ok(())
}
