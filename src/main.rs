use clap::Parser;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use hefty::codec::digest::{attribute_digest, body_digest};
use hefty::codec::error_message::{is_error_message, ErrorMessage};
use hefty::codec::receipt_handle::{self, ReceiptHandle};
use hefty::codec::reference::{is_reference_message, ReferenceMessage};
use hefty::codec::size::message_size;
use hefty::codec::threshold::Thresholds;
use hefty::config::HeftyConfig;
use hefty::domains::message::MessageAttributes;
use hefty::error::{HeftyError, Result};

#[derive(Parser, Debug)]
#[command(name = "hefty")]
#[command(about = "Inspect and compute hefty offload markers")]
struct Cli {
    #[arg(long, env = "HEFTY_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Decide inline, offload or reject for a message size.
    Classify {
        #[arg(long)]
        size: usize,
    },
    /// Body and attribute digests as the queue would report them.
    Digest {
        #[arg(long)]
        body_file: String,

        /// JSON object of attribute name to {data_type, string_value | binary_value}.
        #[arg(long)]
        attributes_file: Option<String>,
    },
    /// Report whether a message body is a reference, an error report or plain.
    Inspect {
        #[arg(long)]
        file: String,
    },
    HandleDecode {
        handle: String,
    },
    HandleEncode {
        #[arg(long)]
        handle: String,

        #[arg(long)]
        bucket: String,

        #[arg(long)]
        key: String,
    },
}

fn read_file(path: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| HeftyError::Config(format!("{path}: {e}")))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| HeftyError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Classify { size } => {
            let thresholds = match &cli.config {
                Some(path) => Thresholds::from_config(&HeftyConfig::from_file(path)?),
                None => Thresholds::default(),
            };
            debug!(?thresholds, "loaded thresholds");
            println!("{:?}", thresholds.classify(size));
        }
        Commands::Digest {
            body_file,
            attributes_file,
        } => {
            let body = read_file(&body_file)?;
            let attributes: MessageAttributes = match attributes_file {
                Some(path) => serde_json::from_slice(&read_file(&path)?)
                    .map_err(|e| HeftyError::Config(format!("{path}: {e}")))?,
                None => MessageAttributes::new(),
            };
            print_json(&json!({
                "size": message_size(&body, &attributes)?,
                "md5_of_body": body_digest(&body),
                "md5_of_message_attributes": attribute_digest(&attributes)?,
            }))?;
        }
        Commands::Inspect { file } => {
            let bytes = read_file(&file)?;
            let text = String::from_utf8_lossy(&bytes);
            if is_reference_message(&text) {
                let reference = ReferenceMessage::from_json(&text)?;
                print_json(&json!({ "kind": "reference", "message": reference }))?;
            } else if is_error_message(&text) {
                let report = ErrorMessage::from_json(&text)?;
                print_json(&json!({ "kind": "error", "message": report }))?;
            } else {
                print_json(&json!({ "kind": "plain", "bytes": bytes.len() }))?;
            }
        }
        Commands::HandleDecode { handle } => match receipt_handle::unwrap(&handle)? {
            ReceiptHandle::Native(native) => {
                print_json(&json!({ "offloaded": false, "receipt_handle": native }))?;
            }
            ReceiptHandle::Offloaded {
                native_handle,
                store_container,
                store_key,
            } => {
                print_json(&json!({
                    "offloaded": true,
                    "receipt_handle": native_handle,
                    "bucket": store_container,
                    "key": store_key,
                }))?;
            }
        },
        Commands::HandleEncode {
            handle,
            bucket,
            key,
        } => {
            println!("{}", receipt_handle::wrap(&handle, &bucket, &key)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hefty=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
