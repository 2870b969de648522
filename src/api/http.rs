//! HTTP transport for the backend API.
//!
//! [`Backend`] is the seam between the client components and the network:
//! components only ever see JSON values or a [`TransportError`]. The
//! production implementation, [`HttpBackend`], uses the synchronous `ureq`
//! client.
//!
//! Semantics follow a browser `fetch` + `response.json()` pair:
//!
//! - A non-2xx status is **not** an error by itself. The backend reports
//!   failures as `{ "success": false, "error": ... }` with 4xx/5xx statuses,
//!   and those bodies are returned to the caller.
//! - Connection failures and non-JSON bodies are transport errors.
//! - No client-side timeout and no retry.
//! - Cookies are sent and stored only for [`Credentials::Include`] requests,
//!   and only under the configured backend origin.

use std::cell::RefCell;

use serde_json::Value;

use super::ApiBase;
use super::cookies::CookieJar;
use crate::error::TransportError;

/// Whether a request carries (and accepts) session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    Include,
}

/// The remote API, addressed by paths relative to the API base
/// (e.g. `"auth/me"`).
pub trait Backend {
    fn get(&self, path: &str, credentials: Credentials) -> Result<Value, TransportError>;

    fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError>;

    fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError>;
}

// ---------------------------------------------------------------------------
// ureq implementation
// ---------------------------------------------------------------------------

/// `ureq`-backed [`Backend`] with a persisted cookie jar.
///
/// Single-threaded by construction (the jar sits in a `RefCell`), matching
/// the one-request-at-a-time flows that drive it.
pub struct HttpBackend {
    base: ApiBase,
    agent: ureq::Agent,
    cookies: RefCell<CookieJar>,
}

impl HttpBackend {
    pub fn new(base: ApiBase, cookies: CookieJar) -> Self {
        Self {
            base,
            agent: ureq::AgentBuilder::new().build(),
            cookies: RefCell::new(cookies),
        }
    }

    pub fn base(&self) -> &ApiBase {
        &self.base
    }

    fn send(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        let url = self.base.url(path);
        tracing::debug!(method, %url, ?credentials, "sending request");

        let mut request = self
            .agent
            .request(method, &url)
            .set("Accept", "application/json");

        if credentials == Credentials::Include
            && let Some(cookie) = self.cookies.borrow().header(self.base.origin())
        {
            request = request.set("Cookie", &cookie);
        }

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => response,
            // Error statuses still carry the backend's JSON verdict.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                tracing::warn!(method, %url, error = %transport, "request failed");
                return Err(TransportError::Network {
                    method,
                    url,
                    message: transport.to_string(),
                });
            }
        };

        let status = response.status();
        if credentials == Credentials::Include {
            self.store_cookies(&response);
        }

        let text = response
            .into_string()
            .map_err(|e| TransportError::Network {
                method,
                url: url.clone(),
                message: format!("failed to read response body: {e}"),
            })?;

        tracing::debug!(method, %url, status, bytes = text.len(), "response received");

        serde_json::from_str(&text).map_err(|_| {
            tracing::warn!(method, %url, status, "response body is not JSON");
            TransportError::InvalidBody { url, status }
        })
    }

    fn store_cookies(&self, response: &ureq::Response) {
        let headers = response.all("set-cookie");
        if headers.is_empty() {
            return;
        }
        let mut jar = self.cookies.borrow_mut();
        if jar.absorb(self.base.origin(), &headers)
            && let Err(e) = jar.save()
        {
            tracing::warn!(error = %e, "failed to persist cookies");
        }
    }
}

impl Backend for HttpBackend {
    fn get(&self, path: &str, credentials: Credentials) -> Result<Value, TransportError> {
        self.send("GET", path, None, credentials)
    }

    fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        self.send("POST", path, body, credentials)
    }

    fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        self.send("PUT", path, body, credentials)
    }
}
