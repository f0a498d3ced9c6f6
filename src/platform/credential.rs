use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::env;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Token scope for AI Foundry project data-plane calls.
pub const AI_SCOPE: &str = "https://ai.azure.com/.default";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
const REFRESH_MARGIN_MINUTES: i64 = 5;
/// Upper bound on a token lifetime reported by the token endpoint.
const MAX_TOKEN_LIFETIME_SECS: u64 = 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No credential could provide a token:\n{0}")]
    Unavailable(String),

    #[error("Token request failed: {0}")]
    TokenRequest(String),

    #[error("Azure CLI credential failed: {0}")]
    AzureCli(String),

    #[error("Token request network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        self.expires_at - Duration::minutes(REFRESH_MARGIN_MINUTES) > Utc::now()
    }
}

/// One way of obtaining a bearer token.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// A pre-issued token, e.g. from `AZURE_AI_ACCESS_TOKEN`.
    Static(String),
    /// OAuth2 client-credentials grant for a service principal.
    ClientSecret {
        authority: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// `az account get-access-token` for a signed-in Azure CLI user.
    AzureCli,
}

impl CredentialSource {
    fn name(&self) -> &'static str {
        match self {
            CredentialSource::Static(_) => "AccessTokenCredential",
            CredentialSource::ClientSecret { .. } => "ClientSecretCredential",
            CredentialSource::AzureCli => "AzureCliCredential",
        }
    }
}

/// Tries each configured source in order and caches the first token that works.
pub struct DefaultCredential {
    sources: Vec<CredentialSource>,
    client: reqwest::Client,
    cache: Mutex<Option<AccessToken>>,
}

impl DefaultCredential {
    pub fn new(sources: Vec<CredentialSource>) -> Self {
        Self {
            sources,
            client: reqwest::Client::new(),
            cache: Mutex::new(None),
        }
    }

    /// Build the chain from the environment: static token, then service principal, then Azure CLI.
    pub fn from_env() -> Self {
        let mut sources = Vec::new();

        if let Some(token) = non_empty_env("AZURE_AI_ACCESS_TOKEN") {
            sources.push(CredentialSource::Static(token));
        }

        if let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
            non_empty_env("AZURE_TENANT_ID"),
            non_empty_env("AZURE_CLIENT_ID"),
            non_empty_env("AZURE_CLIENT_SECRET"),
        ) {
            sources.push(CredentialSource::ClientSecret {
                authority: non_empty_env("AZURE_AUTHORITY_HOST")
                    .unwrap_or_else(|| DEFAULT_AUTHORITY.to_string()),
                tenant_id,
                client_id,
                client_secret,
            });
        }

        sources.push(CredentialSource::AzureCli);
        Self::new(sources)
    }

    pub async fn get_token(&self, scope: &str) -> Result<String, CredentialError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.token.clone());
        }

        let mut failures = Vec::new();
        for source in &self.sources {
            match self.fetch(source, scope).await {
                Ok(token) => {
                    tracing::debug!(
                        credential = source.name(),
                        expires_at = %token.expires_at,
                        "Acquired access token"
                    );
                    let value = token.token.clone();
                    *cache = Some(token);
                    return Ok(value);
                }
                Err(err) => {
                    tracing::debug!(credential = source.name(), "Credential unavailable: {}", err);
                    failures.push(format!("  {}: {}", source.name(), err));
                }
            }
        }

        Err(CredentialError::Unavailable(failures.join("\n")))
    }

    async fn fetch(
        &self,
        source: &CredentialSource,
        scope: &str,
    ) -> Result<AccessToken, CredentialError> {
        match source {
            CredentialSource::Static(token) => Ok(AccessToken {
                token: token.clone(),
                expires_at: Utc::now() + Duration::hours(1),
            }),
            CredentialSource::ClientSecret {
                authority,
                tenant_id,
                client_id,
                client_secret,
            } => {
                request_client_credentials_token(
                    &self.client,
                    authority,
                    tenant_id,
                    client_id,
                    client_secret,
                    scope,
                )
                .await
            }
            CredentialSource::AzureCli => azure_cli_token(scope).await,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

async fn request_client_credentials_token(
    client: &reqwest::Client,
    authority: &str,
    tenant_id: &str,
    client_id: &str,
    client_secret: &str,
    scope: &str,
) -> Result<AccessToken, CredentialError> {
    let token_endpoint = format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant_id
    );
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("scope", scope),
    ];

    let resp = client.post(&token_endpoint).form(&params).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let err_text = resp.text().await.unwrap_or_default();
        return Err(CredentialError::TokenRequest(format!(
            "{} returned {}: {}",
            token_endpoint, status, err_text
        )));
    }

    let token_response: Value = resp.json().await?;
    let access_token = token_response
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            CredentialError::TokenRequest("access_token not found in token response".to_string())
        })?
        .to_string();

    let expires_in = token_response
        .get("expires_in")
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        .unwrap_or(3600);

    Ok(AccessToken {
        token: access_token,
        expires_at: expiry_after(expires_in),
    })
}

fn expiry_after(expires_in: u64) -> DateTime<Utc> {
    let seconds = expires_in.min(MAX_TOKEN_LIFETIME_SECS) as i64;
    Utc::now() + Duration::seconds(seconds)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzureCliToken {
    access_token: String,
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

async fn azure_cli_token(scope: &str) -> Result<AccessToken, CredentialError> {
    let resource = scope.trim_end_matches("/.default");
    let program = if cfg!(windows) { "az.cmd" } else { "az" };

    let output = Command::new(program)
        .args([
            "account",
            "get-access-token",
            "--resource",
            resource,
            "--output",
            "json",
        ])
        .output()
        .await
        .map_err(|e| CredentialError::AzureCli(format!("could not run '{}': {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CredentialError::AzureCli(format!(
            "'{} account get-access-token' failed: {}. Run 'az login' first.",
            program,
            stderr.trim()
        )));
    }

    parse_azure_cli_token(&output.stdout)
}

fn parse_azure_cli_token(stdout: &[u8]) -> Result<AccessToken, CredentialError> {
    let parsed: AzureCliToken = serde_json::from_slice(stdout)
        .map_err(|e| CredentialError::AzureCli(format!("unexpected output: {}", e)))?;

    let expires_at = parsed
        .expires_on_epoch
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(|| Utc::now() + Duration::hours(1));

    Ok(AccessToken {
        token: parsed.access_token,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_secret(authority: String) -> CredentialSource {
        CredentialSource::ClientSecret {
            authority,
            tenant_id: "tenant-1".to_string(),
            client_id: "app-1".to_string(),
            client_secret: "s3cret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_static_token() {
        let credential = DefaultCredential::new(vec![CredentialSource::Static("abc".to_string())]);
        assert_eq!(credential.get_token(AI_SCOPE).await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_client_secret_token_is_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=app-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "sp-token"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let credential = DefaultCredential::new(vec![client_secret(mock_server.uri())]);

        assert_eq!(credential.get_token(AI_SCOPE).await.unwrap(), "sp-token");
        assert_eq!(credential.get_token(AI_SCOPE).await.unwrap(), "sp-token");
    }

    #[tokio::test]
    async fn test_chain_falls_through_to_next_source() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&mock_server)
            .await;

        let credential = DefaultCredential::new(vec![
            client_secret(mock_server.uri()),
            CredentialSource::Static("fallback".to_string()),
        ]);

        assert_eq!(credential.get_token(AI_SCOPE).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_all_sources_failing_lists_each() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("AADSTS7000215"))
            .mount(&mock_server)
            .await;

        let credential = DefaultCredential::new(vec![client_secret(mock_server.uri())]);

        match credential.get_token(AI_SCOPE).await {
            Err(CredentialError::Unavailable(details)) => {
                assert!(details.contains("ClientSecretCredential"));
                assert!(details.contains("AADSTS7000215"));
            }
            other => panic!("Expected Unavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_azure_cli_token() {
        let stdout = br#"{
            "accessToken": "cli-token",
            "expiresOn": "2030-01-01 00:00:00.000000",
            "expires_on": 1893456000,
            "subscription": "sub",
            "tenant": "tenant",
            "tokenType": "Bearer"
        }"#;

        let token = parse_azure_cli_token(stdout).unwrap();
        assert_eq!(token.token, "cli-token");
        assert_eq!(token.expires_at.timestamp(), 1893456000);
        assert!(token.is_fresh());
    }

    #[test]
    fn test_expired_token_is_not_fresh() {
        let token = AccessToken {
            token: "old".to_string(),
            expires_at: Utc::now() + Duration::minutes(2),
        };
        assert!(!token.is_fresh());
    }

    #[test]
    fn test_expiry_is_clamped() {
        let before = Utc::now();
        let expires_at = expiry_after(u64::MAX);
        assert!(expires_at <= before + Duration::hours(24) + Duration::seconds(1));
        assert!(expires_at > before + Duration::hours(23));
    }

    #[tokio::test]
    async fn test_absurd_expires_in_is_accepted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expires_in": "18446744073709551615",
                "access_token": "long-lived"
            })))
            .mount(&mock_server)
            .await;

        let credential = DefaultCredential::new(vec![client_secret(mock_server.uri())]);

        assert_eq!(credential.get_token(AI_SCOPE).await.unwrap(), "long-lived");
    }
}
