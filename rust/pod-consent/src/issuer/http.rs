use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    Approval, ConsentCredential, ConsentIssuer, Denial, DenialReceipt, IssuanceError, SignedGrant,
};

/// Configuration for [`HttpConsentIssuer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerConfig {
    /// Base URL of the issuance service; credentials are posted to
    /// `{endpoint}/issue`.
    pub endpoint: String,

    /// Optional timeout for requests in seconds (default: 30)
    pub timeout_seconds: Option<u64>,

    /// Optional custom headers to send with each request
    pub headers: Vec<(String, String)>,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            timeout_seconds: Some(30),
            headers: Vec::new(),
        }
    }
}

impl IssuerConfig {
    /// Configuration for the service at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Where credentials are posted.
    pub fn issue_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/issue", self.endpoint.trim_end_matches('/')))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn with_timeout(builder: ClientBuilder, seconds: Option<u64>) -> ClientBuilder {
    match seconds {
        Some(seconds) => builder.timeout(std::time::Duration::from_secs(seconds)),
        None => builder,
    }
}

// Browser fetch has no request timeout.
#[cfg(target_arch = "wasm32")]
fn with_timeout(builder: ClientBuilder, _seconds: Option<u64>) -> ClientBuilder {
    builder
}

#[derive(Serialize)]
struct IssueRequest<'a> {
    credential: &'a ConsentCredential,
}

/// Issues credentials through a remote consent-issuance service.
///
/// The service receives the unsigned credential and answers with the signed
/// one; its `id` is what the redirect carries.
///
/// ```no_run
/// use pod_consent::{HttpConsentIssuer, IssuerConfig};
///
/// let issuer = HttpConsentIssuer::new(
///     IssuerConfig::new("https://vc.example")
///         .with_timeout(10)
///         .with_header("Authorization", "Bearer my-token"),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct HttpConsentIssuer {
    config: IssuerConfig,
    client: Client,
}

impl HttpConsentIssuer {
    /// An issuer talking to the configured service.
    pub fn new(config: IssuerConfig) -> Self {
        let client = with_timeout(Client::builder(), config.timeout_seconds)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    /// The configuration in use.
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    async fn issue(
        &self,
        credential: &ConsentCredential,
    ) -> Result<(String, serde_json::Value), IssuanceError> {
        let url = self.config.issue_url()?;
        let mut request = self.client.post(url.clone()).json(&IssueRequest { credential });
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        tracing::debug!(%url, "requesting consent credential");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IssuanceError::Status {
                status: status.as_u16(),
                reason: if body.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    body
                },
            });
        }

        let document: serde_json::Value = response
            .json()
            .await
            .map_err(|error| IssuanceError::Response(error.to_string()))?;
        let id = document
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| IssuanceError::Response("credential has no id".to_string()))?
            .to_string();

        Ok((id, document))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ConsentIssuer for HttpConsentIssuer {
    async fn approve(&self, approval: &Approval) -> Result<SignedGrant, IssuanceError> {
        let credential = ConsentCredential::approval(approval, Utc::now());
        let (id, credential) = self.issue(&credential).await?;
        Ok(SignedGrant { id, credential })
    }

    async fn deny(&self, denial: &Denial) -> Result<DenialReceipt, IssuanceError> {
        let credential = ConsentCredential::denial(denial, Utc::now());
        let (id, credential) = self.issue(&credential).await?;
        Ok(DenialReceipt { id, credential })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_posts_below_the_endpoint() {
        assert_eq!(
            IssuerConfig::new("https://vc.example/").issue_url().unwrap().as_str(),
            "https://vc.example/issue"
        );
        assert_eq!(
            IssuerConfig::new("https://vc.example/v1").issue_url().unwrap().as_str(),
            "https://vc.example/v1/issue"
        );
    }

    #[test]
    fn it_reads_partial_configuration() {
        let config: IssuerConfig =
            serde_json::from_str(r#"{ "endpoint": "https://vc.example" }"#).unwrap();

        assert_eq!(config.timeout_seconds, Some(30));
        assert!(config.headers.is_empty());
    }

    #[test]
    fn it_rejects_a_relative_endpoint() {
        assert!(IssuerConfig::new("vc").issue_url().is_err());
    }
}
