use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::credential::{DefaultCredential, AI_SCOPE};
use super::errors::{error_from_status, FoundryError};
use super::types::{
    AgentDefinition, AgentReference, AgentVersion, Conversation, CreateAgentVersionRequest,
    CreateResponseRequest, Response,
};

const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
const CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";

pub struct ProjectClientConfig {
    pub endpoint: String,
    pub api_version: String,
}

struct ClientInner {
    http: Client,
    endpoint: String,
    api_version: String,
    credential: DefaultCredential,
}

impl ClientInner {
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, FoundryError> {
        let url = format!("{}{}", self.endpoint, path);
        let token = self.credential.get_token(AI_SCOPE).await?;
        let request_id = Uuid::new_v4().to_string();

        tracing::debug!(%method, %url, %request_id, "Sending request");

        let mut request = self
            .http
            .request(method, &url)
            .query(&[("api-version", self.api_version.as_str())])
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CLIENT_REQUEST_ID, request_id);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let err_text = response.text().await.unwrap_or_default();
            tracing::debug!(%url, status = status.as_u16(), body = %err_text, "Request failed");
            Err(error_from_status(status.as_u16(), &err_text))
        }
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, FoundryError> {
        let response = self.send(method, path, body).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, path: &str) -> Result<(), FoundryError> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }
}

/// Authenticated handle to one AI Foundry project.
#[derive(Clone)]
pub struct ProjectClient {
    inner: Arc<ClientInner>,
}

impl ProjectClient {
    pub fn new(
        config: ProjectClientConfig,
        credential: DefaultCredential,
    ) -> Result<Self, FoundryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .user_agent(format!("foundry-analyst/{}", CLIENT_VERSION))
            .build()?;

        tracing::debug!(endpoint = %config.endpoint, "Created project client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                api_version: config.api_version,
                credential,
            }),
        })
    }

    /// Derive a client for the project's OpenAI-compatible conversations and responses routes.
    pub fn openai_client(&self) -> OpenAiClient {
        OpenAiClient {
            inner: Arc::clone(&self.inner),
        }
    }

    pub async fn create_agent_version(
        &self,
        name: &str,
        definition: &AgentDefinition,
    ) -> Result<AgentVersion, FoundryError> {
        self.inner
            .request(
                Method::POST,
                &format!("/agents/{}/versions", name),
                Some(&CreateAgentVersionRequest { definition }),
            )
            .await
    }

    pub async fn delete_agent_version(
        &self,
        name: &str,
        version: &str,
    ) -> Result<(), FoundryError> {
        self.inner
            .delete(&format!("/agents/{}/versions/{}", name, version))
            .await
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<ClientInner>,
}

impl OpenAiClient {
    pub async fn create_conversation(&self) -> Result<Conversation, FoundryError> {
        self.inner
            .request(
                Method::POST,
                "/openai/conversations",
                Some(&serde_json::json!({})),
            )
            .await
    }

    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), FoundryError> {
        self.inner
            .delete(&format!("/openai/conversations/{}", conversation_id))
            .await
    }

    pub async fn create_response(
        &self,
        conversation_id: &str,
        input: &str,
        agent: &AgentReference,
    ) -> Result<Response, FoundryError> {
        self.inner
            .request(
                Method::POST,
                "/openai/responses",
                Some(&CreateResponseRequest {
                    conversation: conversation_id,
                    input,
                    agent,
                }),
            )
            .await
    }
}
