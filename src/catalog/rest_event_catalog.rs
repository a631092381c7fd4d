//! REST-based implementation of `EventCatalog`.
//!
//! Operates against the query-string-authenticated events API under
//! `<host>/ecm/api/rest/ecm/globalevent/`.

use async_trait::async_trait;
use percent_encoding::{percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;

use crate::config::ServerProfile;

use super::event_catalog::EventCatalog;
use super::types::{CatalogError, GlobalEvent, PushOutcome, Result};

const BASE_PATH: &str = "/ecm/api/rest/ecm/globalevent/";

/// The sentinel status string the events service uses to signal acceptance.
const ACCEPTED_SENTINEL: &str = "OK";

// =============================================================================
// Wire Types
// =============================================================================

/// Response envelope for save/delete calls, and for list calls that failed.
#[derive(Debug, Deserialize)]
struct RestEnvelope {
    content: Option<String>,
    message: Option<RestMessage>,
}

#[derive(Debug, Deserialize)]
struct RestMessage {
    message: String,
}

impl RestEnvelope {
    fn into_outcome(self) -> PushOutcome {
        match self.content.as_deref() {
            Some(ACCEPTED_SENTINEL) => PushOutcome::Accepted,
            other => {
                let message = self
                    .message
                    .map(|m| m.message)
                    .or_else(|| other.map(str::to_string))
                    .unwrap_or_else(|| "request rejected".to_string());
                PushOutcome::Rejected(message)
            }
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// An `EventCatalog` over the global events REST service.
pub struct RestEventCatalog {
    client: Client,
    profile: ServerProfile,
}

impl RestEventCatalog {
    /// Create a new catalog for the given server profile.
    pub fn new(profile: ServerProfile) -> Self {
        Self {
            client: Client::new(),
            profile,
        }
    }

    /// Create a new catalog with a custom reqwest client.
    pub fn with_client(client: Client, profile: ServerProfile) -> Self {
        Self { client, profile }
    }

    /// Build an action URL carrying the credentials in the query string.
    fn action_url(&self, action: &str) -> String {
        format!(
            "{}{}{}?username={}&password={}",
            self.profile.host,
            BASE_PATH,
            action,
            encode(&self.profile.username),
            encode(&self.profile.password),
        )
    }

    fn transport(e: reqwest::Error) -> CatalogError {
        CatalogError::Transport(e.to_string())
    }
}

fn encode(s: &str) -> String {
    percent_encode(s.as_bytes(), NON_ALPHANUMERIC).to_string()
}

#[async_trait]
impl EventCatalog for RestEventCatalog {
    async fn list_events(&self) -> Result<Vec<GlobalEvent>> {
        let response = self
            .client
            .get(self.action_url("getEventList"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Self::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::transport)?;

        // A successful list is a bare JSON array; failures come back as the
        // usual envelope with an embedded message.
        if let Ok(events) = serde_json::from_str::<Vec<GlobalEvent>>(&body) {
            return Ok(events);
        }
        if let Ok(envelope) = serde_json::from_str::<RestEnvelope>(&body) {
            if let Some(message) = envelope.message {
                return Err(CatalogError::Rejected(message.message));
            }
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        Err(CatalogError::Malformed(format!(
            "unexpected event list payload: {}",
            body
        )))
    }

    async fn save_events(&self, events: &[GlobalEvent]) -> Result<PushOutcome> {
        let payload =
            serde_json::to_string(events).map_err(|e| CatalogError::Malformed(e.to_string()))?;

        // The service expects the JSON payload under a form content type.
        let response = self
            .client
            .post(self.action_url("saveEventList"))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            .await
            .map_err(Self::transport)?;

        let envelope: RestEnvelope = response.json().await.map_err(Self::transport)?;
        Ok(envelope.into_outcome())
    }

    async fn delete_event(&self, event_id: &str) -> Result<PushOutcome> {
        let url = format!(
            "{}&eventName={}",
            self.action_url("deleteGlobalEvent"),
            encode(event_id)
        );

        let response = self
            .client
            .delete(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Self::transport)?;

        let envelope: RestEnvelope = response.json().await.map_err(Self::transport)?;
        Ok(envelope.into_outcome())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_accepted() {
        let envelope: RestEnvelope = serde_json::from_str(r#"{"content": "OK"}"#).unwrap();
        assert_eq!(envelope.into_outcome(), PushOutcome::Accepted);
    }

    #[test]
    fn test_envelope_rejection_carries_message() {
        let envelope: RestEnvelope =
            serde_json::from_str(r#"{"content": "ERROR", "message": {"message": "denied"}}"#)
                .unwrap();
        assert_eq!(
            envelope.into_outcome(),
            PushOutcome::Rejected("denied".to_string())
        );
    }

    #[test]
    fn test_envelope_rejection_without_message_falls_back_to_content() {
        let envelope: RestEnvelope = serde_json::from_str(r#"{"content": "ERROR"}"#).unwrap();
        assert_eq!(
            envelope.into_outcome(),
            PushOutcome::Rejected("ERROR".to_string())
        );
    }

    #[test]
    fn test_action_url_encodes_credentials() {
        let catalog = RestEventCatalog::new(ServerProfile {
            name: "t".into(),
            host: "https://ecm.example.com".into(),
            company_id: 1,
            username: "user@example.com".into(),
            password: "p&ss wd".into(),
            user_code: String::new(),
            confirm_exporting: false,
        });

        let url = catalog.action_url("getEventList");
        assert!(url.starts_with(
            "https://ecm.example.com/ecm/api/rest/ecm/globalevent/getEventList?username="
        ));
        assert!(url.contains("user%40example%2Ecom"));
        assert!(url.contains("p%26ss%20wd"));
    }
}
