//! HTTP access to the therapy backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CharacterId, SessionId},
    error::BackendRejection,
    protocol::{
        CharacterListResponse, CharacterSummary, ChatRequest, ChatResponse, EndSessionRequest,
        StartSessionRequest, StartSessionResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::ClientError,
    report::{parse_report, SessionReport},
};

pub mod endpoints {
    pub const CHARACTERS: &str = "/ai-characters";
    pub const START_SESSION: &str = "/start_session";
    pub const CHAT: &str = "/chat";
    pub const END_SESSION: &str = "/end_session";
    pub const SESSION_REPORT: &str = "/session_report";
}

/// Backend operations the view state depends on.
#[async_trait]
pub trait TherapyApi: Send + Sync {
    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, ClientError>;
    async fn start_session(
        &self,
        character_id: CharacterId,
    ) -> Result<StartSessionResponse, ClientError>;
    async fn send_chat(
        &self,
        session_id: SessionId,
        message: &str,
    ) -> Result<ChatResponse, ClientError>;
    async fn end_session(&self, session_id: SessionId) -> Result<(), ClientError>;
    async fn fetch_report(&self, session_id: SessionId) -> Result<SessionReport, ClientError>;
}

pub struct HttpTherapyApi {
    http: Client,
    base_url: Url,
}

impl HttpTherapyApi {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_request_timeout(
        base_url: Url,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::transport("client", err))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, mut base_url: Url) -> Self {
        // Joining relative paths onto a base without a trailing slash would
        // replace its last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: &'static str, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::transport(endpoint, err))
    }

    async fn send(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|err| ClientError::transport(endpoint, err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::transport(endpoint, err))?;

        if !status.is_success() {
            let rejection = BackendRejection::new(status.as_u16(), &body);
            warn!(
                endpoint,
                status = rejection.status,
                detail = rejection.detail.as_deref().unwrap_or(""),
                "backend rejected request"
            );
            return Err(ClientError::rejected(endpoint, rejection));
        }

        debug!(endpoint, status = status.as_u16(), bytes = body.len(), "backend call ok");
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(endpoint, request).await?;
        serde_json::from_slice(&body).map_err(|err| {
            ClientError::malformed(
                endpoint,
                format!("Invalid response data received from {endpoint}: {err}"),
            )
        })
    }
}

#[async_trait]
impl TherapyApi for HttpTherapyApi {
    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, ClientError> {
        let url = self.url(endpoints::CHARACTERS, endpoints::CHARACTERS)?;
        let body: CharacterListResponse = self
            .send_json(endpoints::CHARACTERS, self.http.get(url))
            .await?;
        Ok(body.characters)
    }

    async fn start_session(
        &self,
        character_id: CharacterId,
    ) -> Result<StartSessionResponse, ClientError> {
        let url = self.url(endpoints::START_SESSION, endpoints::START_SESSION)?;
        let request = self.http.post(url).json(&StartSessionRequest {
            ai_character_id: character_id,
        });
        self.send_json(endpoints::START_SESSION, request).await
    }

    async fn send_chat(
        &self,
        session_id: SessionId,
        message: &str,
    ) -> Result<ChatResponse, ClientError> {
        let url = self.url(endpoints::CHAT, endpoints::CHAT)?;
        let request = self.http.post(url).json(&ChatRequest {
            session_id,
            message: message.to_string(),
        });
        self.send_json(endpoints::CHAT, request).await
    }

    async fn end_session(&self, session_id: SessionId) -> Result<(), ClientError> {
        let url = self.url(endpoints::END_SESSION, endpoints::END_SESSION)?;
        let request = self
            .http
            .post(url)
            .json(&EndSessionRequest { session_id });
        // Success body is informational only.
        self.send(endpoints::END_SESSION, request).await.map(|_| ())
    }

    async fn fetch_report(&self, session_id: SessionId) -> Result<SessionReport, ClientError> {
        let path = format!("{}/{}", endpoints::SESSION_REPORT, session_id);
        let url = self.url(endpoints::SESSION_REPORT, &path)?;
        let body = self
            .send(endpoints::SESSION_REPORT, self.http.get(url))
            .await?;
        parse_report(&body)
    }
}
