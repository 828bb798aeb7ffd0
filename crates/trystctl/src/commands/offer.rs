//! Offer command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::value::RawValue;
use tryst::client::{ConnectConfig, TrystClient};

use super::read_payload;
use crate::OutputFormat;

#[derive(Serialize)]
struct OfferOutput<'a> {
    uid: &'a str,
    answer: &'a RawValue,
}

pub async fn run(
    config: ConnectConfig,
    uid: &str,
    payload: Option<String>,
    file: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let offer = read_payload(payload, file)?;

    let client = TrystClient::connect(config).context("failed to create client")?;

    if format == OutputFormat::Text {
        eprintln!("Waiting for an answer to '{}'...", uid);
    }

    let answer = client.offer(uid, &offer).await.context("offer failed")?;

    match format {
        OutputFormat::Text => println!("{}", answer),
        OutputFormat::Json => {
            let answer: Box<RawValue> =
                serde_json::from_str(&answer).context("relay returned a non-JSON answer")?;
            let output = OfferOutput {
                uid,
                answer: &answer,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
