//! Outbound email client
//!
//! Posts JSON messages to an HTTP mail gateway. Delivery is fire-and-forget:
//! failures are logged and reported to the caller as a boolean, never as an
//! error that could unwind workflow state.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Message handed to the mail gateway
#[derive(Debug, Serialize)]
pub struct OutboundEmail<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub body: &'a str,
}

/// HTTP mail gateway client
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    /// Gateway endpoint; None disables delivery (messages are logged only)
    endpoint: Option<String>,
    from_address: String,
}

impl Mailer {
    pub fn new(endpoint: Option<String>, from_address: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            from_address,
        }
    }

    /// Whether a gateway endpoint is configured
    pub fn delivery_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Send one message; returns whether delivery succeeded
    ///
    /// With no endpoint configured the message is logged and counted as
    /// delivered, so local setups work without a gateway.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(endpoint) = &self.endpoint else {
            debug!("Mail delivery disabled; would send '{}' to {}", subject, to);
            return true;
        };

        let message = OutboundEmail {
            from: &self.from_address,
            to,
            subject,
            body,
        };

        match self.client.post(endpoint).json(&message).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    "Mail gateway rejected message to {} ({}): {}",
                    to,
                    subject,
                    response.status()
                );
                false
            }
            Err(e) => {
                warn!("Mail gateway unreachable sending to {}: {}", to, e);
                false
            }
        }
    }
}
