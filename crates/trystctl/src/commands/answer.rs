//! Answer command implementation.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tryst::client::{AnswerStatus, ConnectConfig, TrystClient};

use super::read_payload;
use crate::OutputFormat;

#[derive(Serialize)]
struct AnswerOutput<'a> {
    uid: &'a str,
    delivered: bool,
}

pub async fn run(
    config: ConnectConfig,
    uid: &str,
    payload: Option<String>,
    file: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let answer = read_payload(payload, file)?;

    let client = TrystClient::connect(config).context("failed to create client")?;

    let status = client.answer(uid, &answer).await.context("answer failed")?;
    let delivered = status == AnswerStatus::Delivered;

    match format {
        OutputFormat::Text if delivered => println!("Delivered answer to '{}'", uid),
        OutputFormat::Text => {}
        OutputFormat::Json => {
            let output = AnswerOutput { uid, delivered };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if !delivered {
        bail!("no pending offer for '{}'", uid);
    }
    Ok(())
}
