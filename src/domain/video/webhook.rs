//! Mux webhook verification and payloads
//!
//! Mux signs each delivery with a `mux-signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac>`. The HMAC-SHA256 is computed over
//! `"{t}.{raw body}"` with the webhook signing secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "mux-signature";

/// Default replay window for signed deliveries
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Missing webhook signature")]
    MissingSignature,

    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("Signature timestamp outside tolerance")]
    TimestampOutsideTolerance,

    #[error("Signature does not match payload")]
    SignatureMismatch,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedSignature {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<ParsedSignature, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(WebhookError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| WebhookError::MalformedHeader)?,
                )
            }
            "v1" => {
                signatures.push(hex::decode(value).map_err(|_| WebhookError::MalformedHeader)?)
            }
            // Unknown schemes are ignored so Mux can add new ones
            _ => {}
        }
    }

    match (timestamp, signatures.is_empty()) {
        (Some(timestamp), false) => Ok(ParsedSignature {
            timestamp,
            signatures,
        }),
        _ => Err(WebhookError::MalformedHeader),
    }
}

fn mac_for(secret: &str, timestamp: i64, body: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC can take key of any size"));
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    mac
}

/// Computes the `mux-signature` header value for a payload
///
/// Used by tests and tooling that replay webhooks.
pub fn sign_payload(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let signature = hex::encode(mac_for(secret, timestamp, body).finalize().into_bytes());
    format!("t={},v1={}", timestamp, signature)
}

/// Verifies a Mux webhook delivery
///
/// Any `v1` entry may match; comparison is constant time.
pub fn verify_webhook_signature(
    header: Option<&str>,
    body: &[u8],
    secret: &str,
    now: DateTime<Utc>,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(WebhookError::MissingSignature)?;
    let parsed = parse_header(header)?;

    let skew = now
        .timestamp()
        .checked_sub(parsed.timestamp)
        .map(i64::unsigned_abs)
        .ok_or(WebhookError::TimestampOutsideTolerance)?;
    if skew > tolerance_secs.max(0).unsigned_abs() {
        return Err(WebhookError::TimestampOutsideTolerance);
    }

    let mac = mac_for(secret, parsed.timestamp, body);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| mac.clone().verify_slice(candidate).is_ok());

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlaybackId {
    pub id: String,
    pub policy: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MuxErrorInfo {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
}

/// The `data` object of a Mux event (asset or upload)
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct MuxEventData {
    pub id: String,
    pub upload_id: Option<String>,
    pub asset_id: Option<String>,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
    pub passthrough: Option<String>,
    pub duration: Option<f64>,
    pub status: Option<String>,
    pub errors: Option<MuxErrorInfo>,
    /// Uploads nest the asset settings (and so the passthrough) here
    pub new_asset_settings: Option<NewAssetSettings>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct NewAssetSettings {
    pub passthrough: Option<String>,
}

impl MuxEventData {
    /// Passthrough from the asset, or from the upload's asset settings
    pub fn passthrough(&self) -> Option<&str> {
        self.passthrough
            .as_deref()
            .or_else(|| {
                self.new_asset_settings
                    .as_ref()
                    .and_then(|s| s.passthrough.as_deref())
            })
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MuxWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub data: MuxEventData,
}

impl MuxWebhookEvent {
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::InvalidPayload(e.to_string()))
    }
}
