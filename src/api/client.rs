use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::api::types::{Item, SettingsReply};
use crate::api::{ApiRequest, ApiResponse, Backend};
use crate::error::ClientError;

/// HTTP backend talking to the dashboard server.
///
/// No request timeout is configured: a call ends when the server answers or
/// the connection fails.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "{base_url} cannot be used as a server URL"
            )));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("muncher/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = request.resolve(&self.base_url)?;
        debug!(method = %request.method, %url, "sending request");

        let response = self.http.request(request.method.clone(), url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}

/// Load the items of a briefing, optionally restricted to one category.
pub async fn load_briefing_items(
    backend: &dyn Backend,
    briefing_id: &str,
    category: Option<&str>,
) -> Result<Vec<Item>, ClientError> {
    let response = backend
        .send(&ApiRequest::briefing_items(briefing_id, category))
        .await?;
    if !response.is_success() {
        return Err(ClientError::Status(response.status));
    }
    response.json()
}

/// Load the category list from the server settings.
pub async fn load_categories(backend: &dyn Backend) -> Result<SettingsReply, ClientError> {
    let response = backend.send(&ApiRequest::settings()).await?;
    if !response.is_success() {
        return Err(ClientError::Status(response.status));
    }
    response.json()
}
