//! Command implementations for trystctl.

pub mod answer;
pub mod offer;
pub mod offers;

use std::fs;
use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

/// Read a JSON payload from the argument, a file, or stdin.
pub fn read_payload(payload: Option<String>, file: Option<String>) -> Result<Value> {
    let text = match (payload, file) {
        (Some(p), None) => p,
        (None, Some(f)) => {
            fs::read_to_string(&f).with_context(|| format!("failed to read file: {}", f))?
        }
        (Some(_), Some(_)) => {
            return Err(anyhow!("cannot specify both payload and --file"));
        }
        (None, None) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read from stdin")?;
            buffer
        }
    };

    serde_json::from_str(&text).context("payload is not valid JSON")
}
