// # Namecheap Zone Provider
//
// This crate provides the Namecheap implementation of the hook's
// full-replace zone provider.
//
// ## Implementation Status
//
// - ✅ getHosts / setHosts over the XML API
// - ✅ Delegation check (`IsUsingOurDNS`) before any mutation
// - ✅ Non-OK status, malformed XML and transport failures are all fatal
// - ✅ Client IP resolved before credentials are placed into a request
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (every failure is terminal for the invocation)
// - ❌ NO caching of zone state (fetched fresh per operation)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Endpoint: POST `https://api.namecheap.com/xml.response`
// - `namecheap.domains.dns.getHosts`: SLD, TLD
// - `namecheap.domains.dns.setHosts`: SLD, TLD, HostName{n}, RecordType{n},
//   Address{n}, MXPref{n}, TTL{n} for n = 1..count

pub mod response;
pub mod transport;

pub use response::{ApiResponse, GET_HOSTS_COMMAND, SET_HOSTS_COMMAND};
pub use transport::HttpsTransport;

use async_trait::async_trait;
use dnshook_core::traits::{FormFields, Transport, ZoneProvider};
use dnshook_core::{Error, HookConfig, HostRecord, IpResolver, Result};

/// Namecheap zone provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform getHosts requests (including the delegation check)
/// - Log the records a setHosts request would write
/// - **NOT** send the setHosts request
pub struct NamecheapProvider {
    /// API user (also sent as UserName)
    api_user: String,

    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// XML API endpoint
    endpoint: String,

    /// Client IP required on every request
    resolver: IpResolver,

    /// Transport used for API calls
    transport: Box<dyn Transport>,

    /// Dry-run mode: if true, skip setHosts
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for NamecheapProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamecheapProvider")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .field("resolver", &self.resolver)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl NamecheapProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the API user or key is empty.
    pub fn new(
        api_user: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        resolver: IpResolver,
        transport: Box<dyn Transport>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_user = api_user.into();
        let api_key = api_key.into();

        if api_user.is_empty() {
            return Err(Error::config("Namecheap API user cannot be empty"));
        }
        if api_key.is_empty() {
            return Err(Error::config("Namecheap API key cannot be empty"));
        }

        Ok(Self {
            api_user,
            api_key,
            endpoint: endpoint.into(),
            resolver,
            transport,
            dry_run,
        })
    }

    /// Create a provider talking HTTPS from a validated configuration
    pub fn from_config(config: &HookConfig, resolver: IpResolver) -> Result<Self> {
        config.validate()?;

        let transport = HttpsTransport::new(config.ca_bundle.as_deref())?;

        if config.dry_run {
            tracing::warn!("Namecheap provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(
            config.api_user.clone(),
            config.api_key.clone(),
            config.endpoint.clone(),
            resolver,
            Box::new(transport),
            config.dry_run,
        )
    }

    /// Fields shared by every command
    ///
    /// The client IP is resolved first: a resolution failure aborts before
    /// any credential is put into a request.
    async fn command_fields(&self, domain: &str, command: &str) -> Result<FormFields> {
        let client_ip = self.resolver.resolve().await?;
        let (sld, tld) = split_domain(domain)?;

        Ok(vec![
            ("ClientIP".to_string(), client_ip.to_string()),
            ("UserName".to_string(), self.api_user.clone()),
            ("ApiUser".to_string(), self.api_user.clone()),
            ("ApiKey".to_string(), self.api_key.clone()),
            ("SLD".to_string(), sld),
            ("TLD".to_string(), tld),
            ("Command".to_string(), command.to_string()),
        ])
    }

    async fn call(&self, command: &str, form: &[(String, String)]) -> Result<ApiResponse> {
        tracing::debug!("Calling {} with {} field(s)", command, form.len());

        let body = self.transport.post(&self.endpoint, form).await.map_err(|e| {
            tracing::error!("Could not reach provider API for {}: {}", command, e);
            e
        })?;

        ApiResponse::parse(&body)
    }
}

/// Split a domain into second-level part and TLD at the first dot
///
/// `example.co.uk` → (`example`, `co.uk`).
pub fn split_domain(domain: &str) -> Result<(String, String)> {
    let domain = domain.to_ascii_lowercase();

    match domain.split_once('.') {
        Some((sld, tld)) if !sld.is_empty() && !tld.is_empty() => {
            Ok((sld.to_string(), tld.to_string()))
        }
        _ => Err(Error::validation(format!(
            "'{}' is not a registrable domain",
            domain
        ))),
    }
}

/// Numbered host fields of a setHosts request, in snapshot order
pub fn host_fields(hosts: &[HostRecord]) -> FormFields {
    let mut fields = Vec::with_capacity(hosts.len() * 5);

    for (index, host) in hosts.iter().enumerate() {
        let n = index + 1;
        fields.push((format!("HostName{}", n), host.name.clone()));
        fields.push((format!("RecordType{}", n), host.record_type.clone()));
        fields.push((format!("Address{}", n), host.address.clone()));
        fields.push((format!("MXPref{}", n), host.mx_pref.to_string()));
        fields.push((format!("TTL{}", n), host.ttl.to_string()));
    }

    fields
}

#[async_trait]
impl ZoneProvider for NamecheapProvider {
    async fn get_hosts(&self, domain: &str) -> Result<Vec<HostRecord>> {
        let domain = domain.to_ascii_lowercase();
        let form = self.command_fields(&domain, GET_HOSTS_COMMAND).await?;

        let hosts = self.call(GET_HOSTS_COMMAND, &form).await?.into_hosts(&domain)?;

        tracing::info!("Fetched {} host record(s) for {}", hosts.len(), domain);
        Ok(hosts)
    }

    async fn set_hosts(&self, domain: &str, hosts: &[HostRecord]) -> Result<()> {
        let domain = domain.to_ascii_lowercase();

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send {} for {} with records: {}",
                SET_HOSTS_COMMAND,
                domain,
                serde_json::to_string(hosts)?
            );
            return Ok(());
        }

        let mut form = self.command_fields(&domain, SET_HOSTS_COMMAND).await?;
        form.extend(host_fields(hosts));

        self.call(SET_HOSTS_COMMAND, &form).await?.confirm_set(&domain)?;

        tracing::info!("Wrote {} host record(s) for {}", hosts.len(), domain);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "namecheap"
    }
}
