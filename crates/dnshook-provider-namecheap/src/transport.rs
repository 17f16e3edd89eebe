// # HTTPS Transport
//
// POSTs URL-encoded forms to the XML API.
//
// - ✅ TLS verification always on
// - ✅ Trust pinned to a PEM bundle: the one shipped with this crate, or
//   `DNSHOOK_CA_BUNDLE` when set (built-in roots are never used)
// - ✅ 10 second request timeout
// - ✅ Form values sent literally: the body is produced by reqwest's
//   urlencoded serializer, so a leading `@` is just `%40`
// - ❌ NO retry logic (every failure is terminal for the invocation)

use async_trait::async_trait;
use dnshook_core::traits::Transport;
use dnshook_core::{Error, Result};
use std::path::Path;
use std::time::Duration;

/// Request timeout for API calls
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// CA bundle trusted when no other bundle is configured
pub const DEFAULT_CA_BUNDLE: &[u8] = include_bytes!("../ca-bundle.crt");

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    client: reqwest::Client,

    /// Number of trusted root certificates
    root_count: usize,
}

impl HttpsTransport {
    /// Create a transport
    ///
    /// # Parameters
    ///
    /// - `ca_bundle`: PEM file whose certificates are the only trusted roots;
    ///   `None` trusts [`DEFAULT_CA_BUNDLE`]
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the bundle cannot be read or holds no certificate,
    /// or the client cannot be built.
    pub fn new(ca_bundle: Option<&Path>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("dnshook/", env!("CARGO_PKG_VERSION")));

        let certificates = match ca_bundle {
            Some(path) => load_bundle(path)?,
            None => parse_bundle(DEFAULT_CA_BUNDLE, "shipped with dnshook")?,
        };
        let root_count = certificates.len();
        tracing::debug!("Pinning trust to {} CA certificate(s)", root_count);

        builder = builder.tls_built_in_root_certs(false);
        for certificate in certificates {
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, root_count })
    }

    /// Number of root certificates this transport trusts
    pub fn root_count(&self) -> usize {
        self.root_count
    }

    /// Build the POST request without sending it
    pub fn build_request(
        &self,
        endpoint: &str,
        form: &[(String, String)],
    ) -> Result<reqwest::Request> {
        self.client
            .post(endpoint)
            .form(&form)
            .build()
            .map_err(|e| Error::transport(format!("Invalid request to {}: {}", endpoint, e)))
    }
}

fn load_bundle(path: &Path) -> Result<Vec<reqwest::Certificate>> {
    let pem = std::fs::read(path).map_err(|e| {
        Error::config(format!("Cannot read CA bundle {}: {}", path.display(), e))
    })?;

    parse_bundle(&pem, &path.display().to_string())
}

fn parse_bundle(pem: &[u8], origin: &str) -> Result<Vec<reqwest::Certificate>> {
    let certificates = reqwest::Certificate::from_pem_bundle(pem)
        .map_err(|e| Error::config(format!("Invalid CA bundle {}: {}", origin, e)))?;

    if certificates.is_empty() {
        return Err(Error::config(format!(
            "CA bundle {} contains no certificates",
            origin
        )));
    }

    Ok(certificates)
}

/// Describe a reqwest failure for a TransportError
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out after {:?}: {}", REQUEST_TIMEOUT, error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("request failed: {}", error)
    }
}

#[async_trait]
impl Transport for HttpsTransport {
    async fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<String> {
        let request = self.build_request(endpoint, form)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| Error::transport(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(format!(
                "HTTP {} from {}",
                status, endpoint
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response: {}", e)))?;

        Ok(body.trim().to_string())
    }
}
