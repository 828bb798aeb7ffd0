//! Relay client over HTTP.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

/// Default endpoint of a locally running relay.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Configuration for connecting to a relay.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// Base URL, e.g. `http://localhost:8080`.
    pub endpoint: String,
    /// How many times an offer is posted before giving up, when the relay
    /// keeps answering 408 (no answer in time).
    pub offer_attempts: u32,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            offer_attempts: 10,
        }
    }
}

/// Result of delivering an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Delivered,
    /// Nobody is waiting under that uid (any more).
    NoPendingOffer,
}

/// A pending offer picked by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatchedOffer {
    pub uid: String,
    /// The offer's JSON text.
    pub offer: String,
}

#[derive(Deserialize)]
struct OfferReply {
    answer: String,
}

#[derive(Deserialize)]
struct ListOffersReply {
    uids: Vec<String>,
}

#[derive(Deserialize)]
struct DescribeOfferReply {
    offer: String,
}

/// Client for a Tryst relay.
#[derive(Debug, Clone)]
pub struct TrystClient {
    http: Client,
    endpoint: String,
    offer_attempts: u32,
}

impl TrystClient {
    /// Create a client for the relay at `config.endpoint`.
    pub fn connect(config: ConnectConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            offer_attempts: config.offer_attempts.max(1),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Publish an offer under `uid` and wait for its answer.
    ///
    /// Returns the answer's JSON text. Re-posts the offer whenever the relay
    /// reports that no answer arrived in time.
    pub async fn offer(&self, uid: &str, offer: &Value) -> Result<String> {
        let url = self.url("/offer");
        let body = json!({ "uid": uid, "offer": offer });

        for attempt in 1..=self.offer_attempts {
            tracing::debug!(%url, attempt, "Posting offer");
            let response = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("failed to post offer to {url}"))?;

            if response.status() == StatusCode::REQUEST_TIMEOUT {
                tracing::debug!(attempt, "No answer yet, re-offering");
                continue;
            }

            let reply: OfferReply = ensure_success(response).await?.json().await?;
            return Ok(reply.answer);
        }

        Err(anyhow!(
            "no answer for {uid:?} after {} attempt(s)",
            self.offer_attempts
        ))
    }

    /// Deliver `answer` to the offer waiting under `uid_remote`.
    pub async fn answer(&self, uid_remote: &str, answer: &Value) -> Result<AnswerStatus> {
        let response = self
            .http
            .post(self.url("/accept"))
            .json(&json!({ "uidRemote": uid_remote, "answer": answer }))
            .send()
            .await
            .context("failed to post answer")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(AnswerStatus::NoPendingOffer);
        }
        ensure_success(response).await?;
        Ok(AnswerStatus::Delivered)
    }

    /// Uids of all pending offers.
    pub async fn list_offers(&self) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.url("/listoffers"))
            .send()
            .await
            .context("failed to list offers")?;

        let reply: ListOffersReply = ensure_success(response).await?.json().await?;
        Ok(reply.uids)
    }

    /// The offer JSON text pending under `uid`, if any.
    pub async fn describe_offer(&self, uid: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.url("/describeoffer"))
            .query(&[("uid", uid)])
            .send()
            .await
            .context("failed to describe offer")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let reply: DescribeOfferReply = ensure_success(response).await?.json().await?;
        Ok(Some(reply.offer))
    }

    /// Any pending offer other than the one under `own_uid`.
    pub async fn match_offer(&self, own_uid: Option<&str>) -> Result<Option<MatchedOffer>> {
        let mut request = self.http.get(self.url("/matchoffer"));
        if let Some(uid) = own_uid {
            request = request.query(&[("uid", uid)]);
        }
        let response = request.send().await.context("failed to match offer")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(ensure_success(response).await?.json().await?))
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    bail!("relay returned {status}: {}", message.trim())
}
