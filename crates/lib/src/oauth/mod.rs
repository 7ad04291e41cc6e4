//! Interactive acquisition of an elevated credential.
//!
//! Drives the OAuth authorization-code exchange: build the authorization
//! URL, launch the system browser, capture the redirect on a single-use
//! loopback listener, exchange the code at the token endpoint, and persist
//! the resulting credential before handing it back. An acquisition that is
//! not durably saved counts as failed, since a process restart would lose
//! the capability upgrade.

mod callback;
mod errors;

pub use errors::AuthFlowError;

use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::constants::{
    AUTH_ENDPOINT, CALLBACK_PORT, CALLBACK_TIMEOUT, CLIENT_ID, CLIENT_SECRET, ELEVATED_SCOPES,
    HTTP_TIMEOUT, TOKEN_ENDPOINT,
};
use crate::credential::{Credential, CredentialStore, Provenance};

/// The token endpoint's success payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// The token endpoint's error payload. Parsed so diagnostics never echo the
/// authorization code or client secret back out of a raw body.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Interactive authorization-code flow with fixed client identity and a
/// fixed loopback redirect.
#[derive(Debug, Clone)]
pub struct AcquisitionFlow {
    client_id: String,
    client_secret: String,
    port: u16,
    scope: String,
    callback_timeout: Duration,
    http: reqwest::Client,
}

impl AcquisitionFlow {
    pub fn new() -> Result<Self, AuthFlowError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AuthFlowError::Network {
                detail: e.to_string(),
            })?;
        Ok(Self {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            port: CALLBACK_PORT,
            scope: ELEVATED_SCOPES.join(" "),
            callback_timeout: CALLBACK_TIMEOUT,
            http,
        })
    }

    fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }

    /// The authorization URL the browser is pointed at.
    pub fn authorization_url(&self) -> Url {
        let mut url = Url::parse(AUTH_ENDPOINT).expect("static auth endpoint");
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri())
            .append_pair("scope", &self.scope)
            .append_pair("response_mode", "query")
            .append_pair("prompt", "select_account");
        url
    }

    /// Run the full flow: browser, callback, exchange, persist.
    pub async fn acquire(&self, store: &CredentialStore) -> Result<Credential, AuthFlowError> {
        // Bind before launching the browser so the redirect always has a
        // listener waiting.
        let listener = callback::bind(self.port).await?;
        let auth_url = self.authorization_url();

        tracing::info!("starting interactive authorization, waiting for the browser");
        if let Err(e) = open_browser(auth_url.as_str()) {
            tracing::warn!(
                error = %e,
                "could not launch a browser; open this URL manually: {auth_url}"
            );
        }

        let code = callback::receive_code(listener, self.callback_timeout).await?;
        tracing::info!("authorization code received, exchanging for a token");

        let credential = self.exchange_code(&code).await?;
        store.save(&credential)?;
        tracing::info!("elevated credential acquired and saved");
        Ok(credential)
    }

    /// Exchange an authorization code for a credential. The scope sent here
    /// must match the authorization request or some providers reject the
    /// exchange.
    async fn exchange_code(&self, code: &str) -> Result<Credential, AuthFlowError> {
        let redirect_uri = self.redirect_uri();
        let params: [(&str, &str); 6] = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", &redirect_uri),
            ("scope", &self.scope),
        ];

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthFlowError::Network {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorBody>(&body) {
                Ok(parsed) => format!(
                    "{}: {}",
                    parsed.error.unwrap_or_else(|| "unknown error".to_string()),
                    parsed
                        .error_description
                        .unwrap_or_else(|| "no description".to_string())
                ),
                Err(_) => "unrecognized error body".to_string(),
            };
            return Err(AuthFlowError::TokenExchangeFailed {
                status: status.as_u16(),
                detail,
            });
        }

        let token: TokenResponse =
            response.json().await.map_err(|e| AuthFlowError::Network {
                detail: e.to_string(),
            })?;

        Ok(Credential {
            access_token: token.access_token,
            token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(token.expires_in)),
            // Verbatim from the response. Dropping it would demote future
            // capability resolution to the provenance heuristic.
            scope: token.scope,
            refresh_token: token.refresh_token,
            drive_id: None,
            provenance: Provenance::LocalElevated,
        })
    }
}

/// Open a URL in the platform's default browser.
fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(url);
        c
    };
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    };
    #[cfg(all(unix, not(target_os = "macos")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(url);
        c
    };

    command.spawn().map(|_| ())
}
