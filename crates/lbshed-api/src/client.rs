// Device management API HTTP client
//
// Wraps `reqwest::Client` with session establishment, URL construction,
// and fault-envelope handling. The operation groups (partitions, route
// domains, nodes, failover) are implemented as inherent methods via
// separate files to keep this module focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ApiFault, Capability, SessionRequest, SessionResponse};

const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// Raw HTTP client for one management session on one device.
///
/// Construction performs the session handshake: credentials go over
/// HTTP Basic exactly once, the returned token rides every subsequent
/// request as a default header. Dropping the client abandons the
/// session; the device expires it server-side.
#[derive(Debug)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    /// Open a management session on the device at `base_url`.
    ///
    /// `capabilities` names the operation families this session will
    /// call; the device rejects calls outside the requested set. Most
    /// callers pass [`Capability::ALL`].
    pub async fn connect(
        base_url: Url,
        username: &str,
        password: &SecretString,
        capabilities: &[Capability],
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let bootstrap = transport.build_client()?;
        let url = base_url.join("mgmt/sessions")?;

        debug!(%url, ?capabilities, "opening management session");

        let resp = bootstrap
            .post(url)
            .basic_auth(username, Some(password.expose_secret()))
            .json(&SessionRequest { capabilities })
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: format!("device rejected credentials for user '{username}'"),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("session open failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let session: SessionResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&session.token).map_err(|_| Error::Authentication {
            message: "device returned a malformed session token".into(),
        })?;
        headers.insert(SESSION_TOKEN_HEADER, token);

        let http = transport.build_client_with_headers(headers)?;

        debug!("management session established");
        Ok(Self { http, base_url })
    }

    /// The device base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for a management API path (e.g. `mgmt/sys/failover`).
    pub(crate) fn mgmt_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and parse the response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a POST request with JSON body and parse the response body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// Send a PUT request with JSON body and parse the response body.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_response(resp).await
    }

    /// Check status, surface device faults, and deserialize the body.
    ///
    /// 401 means the session token went stale. Other non-2xx statuses
    /// carry a `{code, message}` fault body when the device produced the
    /// failure itself; anything unparseable is reported with the raw body.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let fault: ApiFault = serde_json::from_str(&body).unwrap_or(ApiFault {
                code: None,
                message: None,
            });
            return Err(Error::Api {
                message: fault.message.unwrap_or_else(|| format!("HTTP {status}")),
                code: fault.code,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
