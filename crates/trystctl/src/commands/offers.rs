//! Offers command implementation.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::value::RawValue;
use tryst::client::{ConnectConfig, TrystClient};

use crate::OutputFormat;

#[derive(Serialize)]
struct OffersOutput {
    uids: Vec<String>,
    total: usize,
}

#[derive(Serialize)]
struct OfferOutput<'a> {
    uid: &'a str,
    offer: &'a RawValue,
}

pub async fn list(config: ConnectConfig, format: OutputFormat) -> Result<()> {
    let client = TrystClient::connect(config).context("failed to create client")?;

    let mut uids = client.list_offers().await?;
    uids.sort();

    let output = OffersOutput {
        total: uids.len(),
        uids,
    };

    match format {
        OutputFormat::Text => {
            if output.uids.is_empty() {
                println!("No pending offers.");
            } else {
                println!("UID");
                println!("{}", "-".repeat(40));
                for uid in &output.uids {
                    println!("{}", uid);
                }
                println!();
                println!("Total: {} offer(s)", output.total);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

pub async fn describe(config: ConnectConfig, uid: &str, format: OutputFormat) -> Result<()> {
    let client = TrystClient::connect(config).context("failed to create client")?;

    let Some(offer) = client.describe_offer(uid).await? else {
        bail!("no pending offer for '{}'", uid);
    };

    print_offer(uid, &offer, format)
}

pub async fn matching(
    config: ConnectConfig,
    exclude: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let client = TrystClient::connect(config).context("failed to create client")?;

    let Some(found) = client.match_offer(exclude).await? else {
        bail!("no other pending offer");
    };

    print_offer(&found.uid, &found.offer, format)
}

fn print_offer(uid: &str, offer: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("Offer '{}':", uid);
            println!("{}", offer);
        }
        OutputFormat::Json => {
            let offer: Box<RawValue> =
                serde_json::from_str(offer).context("relay returned a non-JSON offer")?;
            let output = OfferOutput { uid, offer: &offer };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
