//! SOAP-based implementation of `FormCatalog`.
//!
//! Operates against the server's card-index service at
//! `<host>/webdesk/ECMCardIndexService`.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use crate::config::ServerProfile;

use super::form_catalog::FormCatalog;
use super::soap::{self, field, node, XmlValue};
use super::types::{
    Attachment, CatalogError, CustomEvent, FormRecord, FormUpdate, NewForm, PushOutcome, Result,
};

const SERVICE_PATH: &str = "/webdesk/ECMCardIndexService";

/// The sentinel status string the forms service uses to signal acceptance.
const ACCEPTED_SENTINEL: &str = "ok";

/// A `FormCatalog` over the card-index SOAP service.
pub struct SoapFormCatalog {
    client: Client,
    profile: ServerProfile,
}

impl SoapFormCatalog {
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

    fn service_url(&self) -> String {
        format!("{}{}", self.profile.host, SERVICE_PATH)
    }

    /// Credential parameters shared by every operation.
    fn credentials(&self) -> Vec<(String, XmlValue)> {
        vec![
            field("username", &self.profile.username),
            field("password", &self.profile.password),
            field("companyId", self.profile.company_id),
        ]
    }

    /// POST one operation envelope and parse the response document.
    ///
    /// A SOAP fault is reported via its fault string even though the server
    /// also responds with a non-success HTTP status.
    async fn call(&self, operation: &str, params: Vec<(String, XmlValue)>) -> Result<Value> {
        let body = soap::envelope(operation, &params);

        let response = self
            .client
            .post(self.service_url())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "")
            .body(body)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let value = soap::xml_to_value(&text)
            .map_err(|e| CatalogError::Malformed(format!("{}: {}", operation, e)))?;

        if let Some(fault) = soap::find_key(&value, "faultstring") {
            return Err(CatalogError::Rejected(string_of(fault)));
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(value)
    }

    /// Interpret a create/update response: `result.item.webServiceMessage`
    /// equal to the sentinel means accepted, anything else is the rejection
    /// message surfaced verbatim.
    fn push_outcome(response: &Value) -> Result<PushOutcome> {
        let message = soap::find_key(response, "webServiceMessage")
            .map(string_of)
            .ok_or_else(|| {
                CatalogError::Malformed("push response carries no status message".to_string())
            })?;

        if message == ACCEPTED_SENTINEL {
            Ok(PushOutcome::Accepted)
        } else {
            Ok(PushOutcome::Rejected(message))
        }
    }

    /// Build the `Attachments` parameter from decoded attachment data.
    fn attachments_param(attachments: &[Attachment]) -> (String, XmlValue) {
        node(
            "Attachments",
            attachments
                .iter()
                .map(|attachment| {
                    node(
                        "item",
                        vec![
                            field("fileName", &attachment.file_name),
                            field("filecontent", BASE64.encode(&attachment.content)),
                            field("principal", attachment.principal),
                        ],
                    )
                })
                .collect(),
        )
    }

    /// Build the `customEvents` parameter.
    fn custom_events_param(events: &[CustomEvent], updating: bool) -> (String, XmlValue) {
        node(
            "customEvents",
            events
                .iter()
                .map(|event| {
                    let mut children = vec![
                        field("eventDescription", &event.script),
                        field("eventId", &event.event_id),
                    ];
                    if updating {
                        children.push(field("eventVersAnt", false));
                    }
                    node("item", children)
                })
                .collect(),
        )
    }
}

/// Render a leaf value as a plain string.
fn string_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a string child of a response item.
fn item_str(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        other => Some(other.to_string()),
    }
}

/// Read a numeric child of a response item (the wire carries it as text).
fn item_u64(item: &Value, key: &str) -> Option<u64> {
    match item.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Parse one form record out of a list response item.
fn parse_form(item: &Value) -> Option<FormRecord> {
    Some(FormRecord {
        document_id: item_u64(item, "documentId")?,
        document_description: item_str(item, "documentDescription")?,
        dataset_name: item_str(item, "datasetName").unwrap_or_default(),
        version: item_u64(item, "version").unwrap_or(1000),
    })
}

#[async_trait]
impl FormCatalog for SoapFormCatalog {
    async fn list_forms(&self) -> Result<Vec<FormRecord>> {
        let mut params = self.credentials();
        params.push(field("colleagueId", &self.profile.user_code));

        let response = self.call("getCardIndexesWithoutApprover", params).await?;

        soap::result_items(&response, "result", "item")
            .iter()
            .map(|item| {
                parse_form(item).ok_or_else(|| {
                    CatalogError::Malformed("form list item missing documentId".to_string())
                })
            })
            .collect()
    }

    async fn attachment_names(&self, document_id: u64) -> Result<Vec<String>> {
        let mut params = self.credentials();
        params.push(field("documentId", document_id));
        params.push(field("colleagueId", &self.profile.user_code));

        let response = self.call("getAttachmentsList", params).await?;

        Ok(soap::result_items(&response, "result", "item")
            .iter()
            .map(string_of)
            .filter(|name| !name.is_empty())
            .collect())
    }

    async fn attachment_content(
        &self,
        document_id: u64,
        version: u64,
        file_name: &str,
    ) -> Result<Vec<u8>> {
        let mut params = self.credentials();
        params.push(field("documentId", document_id));
        params.push(field("colleagueId", &self.profile.user_code));
        params.push(field("version", version));
        params.push(field("nomeArquivo", file_name));

        let response = self.call("getCardIndexContent", params).await?;

        // The content call returns the base64 payload in a `folder` element.
        let encoded = soap::find_key(&response, "folder")
            .map(string_of)
            .unwrap_or_default();

        Ok(BASE64.decode(encoded.as_bytes())?)
    }

    async fn custom_events(&self, document_id: u64) -> Result<Vec<CustomEvent>> {
        let mut params = self.credentials();
        params.push(field("documentId", document_id));

        let response = self.call("getCustomizationEvents", params).await?;

        Ok(soap::result_items(&response, "result", "item")
            .iter()
            .filter_map(|item| {
                Some(CustomEvent {
                    event_id: item_str(item, "eventId")?,
                    // The service carries the script body in eventDescription.
                    script: item_str(item, "eventDescription").unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn create_form(&self, form: &NewForm) -> Result<PushOutcome> {
        let mut params = self.credentials();
        params.push(field("publisherId", &self.profile.username));
        params.push(field("parentDocumentId", form.parent_document_id));
        params.push(field("documentDescription", &form.name));
        params.push(field("cardDescription", ""));
        params.push(field("datasetName", &form.dataset_name));
        params.push(Self::attachments_param(&form.attachments));
        params.push(Self::custom_events_param(&form.custom_events, false));
        params.push(field("persistenceType", form.persistence.code()));

        let response = self
            .call("createSimpleCardIndexWithDatasetPersisteType", params)
            .await?;
        Self::push_outcome(&response)
    }

    async fn update_form(&self, update: &FormUpdate) -> Result<PushOutcome> {
        let mut params = self.credentials();
        params.push(field("publisherId", &self.profile.username));
        params.push(field("documentId", update.document_id));
        params.push(field("descriptionField", ""));
        params.push(field("cardDescription", ""));
        params.push(field("datasetName", &update.dataset_name));
        params.push(Self::attachments_param(&update.attachments));
        params.push(Self::custom_events_param(&update.custom_events, true));
        params.push(node(
            "generalInfo",
            vec![field("versionOption", update.version_option.code())],
        ));

        let response = self
            .call("updateSimpleCardIndexWithDatasetAndGeneralInfo", params)
            .await?;
        Self::push_outcome(&response)
    }
}
