// # dnshook - ACME DNS-01 hook
//
// ⚠️ ARCHITECTURAL CONSTRAINTS ⚠️
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add zone, record or XML logic here
// - All reconciliation logic MUST be in dnshook-core
// - Configuration is via environment variables ONLY
// - stdout belongs to the ACME client: logs go to stderr
//
// The binary is responsible for:
// 1. Dispatching on the hook verb
// 2. Validating the challenge arguments before any network call
// 3. Reading configuration from environment variables
// 4. Wiring resolver, provider and engine together and running them
// 5. Waiting for DNS propagation after a deploy
// 6. Chaining to a passthrough hook
//
// ## Usage
//
// ```text
// dnshook deploy_challenge <domain> <fqdn> <token> [<fqdn> <token> ...]
// dnshook clean_challenge  <domain> <fqdn> <token> [<fqdn> <token> ...]
// dnshook <any other verb> ...   (no-op)
// ```
//
// ## Configuration
//
// ### Provider
// - `DNSHOOK_API_USER`: API user (required for deploy/clean)
// - `DNSHOOK_API_KEY`: API key (required for deploy/clean)
// - `DNSHOOK_ENDPOINT`: API endpoint (default: production endpoint)
// - `DNSHOOK_CA_BUNDLE`: PEM bundle to trust instead of the shipped one
//
// ### Client IP
// - `DNSHOOK_CLIENT_IP`: IPv4 address to report instead of looking it up
// - `DNSHOOK_IP_LOOKUP_URL`: plain-text lookup service (default: icanhazip)
//
// ### Hook
// - `DNSHOOK_PROPAGATION_DELAY_SECS`: wait after deploy (default: 10)
// - `DNSHOOK_PASSTHROUGH`: command run with the same arguments on success
// - `DNSHOOK_MODE`: set to `dry-run` to fetch zones without writing them
// - `DNSHOOK_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DNSHOOK_API_USER=myuser
// export DNSHOOK_API_KEY=0123456789abcdef
// export DNSHOOK_PASSTHROUGH=/etc/dehydrated/hooks/deploy-cert.sh
//
// dnshook deploy_challenge example.com _acme-challenge.example.com token
// ```

use anyhow::{Context, Result};
use dnshook_core::{ChallengeEngine, ChallengeRequest, HookConfig, IpResolver};
use dnshook_ip_http::HttpIpSource;
use dnshook_provider_namecheap::NamecheapProvider;
use std::env;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes reported to the ACME client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookExitCode {
    /// Hook completed
    Success = 0,
    /// Validation, configuration, network or API failure
    Failure = 1,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Hook verbs this binary acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Deploy,
    Clean,
    /// Any other event the ACME client reports
    Ignored,
}

impl Verb {
    fn parse(verb: &str) -> Self {
        match verb {
            "deploy_challenge" => Verb::Deploy,
            "clean_challenge" => Verb::Clean,
            _ => Verb::Ignored,
        }
    }
}

/// Load configuration through `lookup`
///
/// Credentials are not checked here: verbs that never reach the provider
/// must not require them.
fn load_config<F>(lookup: F) -> Result<(HookConfig, Level)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = HookConfig::new(
        lookup("DNSHOOK_API_USER").unwrap_or_default(),
        lookup("DNSHOOK_API_KEY").unwrap_or_default(),
    );

    if let Some(ip) = lookup("DNSHOOK_CLIENT_IP").filter(|s| !s.is_empty()) {
        config.client_ip = Some(
            ip.trim()
                .parse::<Ipv4Addr>()
                .with_context(|| format!("DNSHOOK_CLIENT_IP '{}' is not an IPv4 address", ip))?,
        );
    }

    if let Some(endpoint) = lookup("DNSHOOK_ENDPOINT") {
        config.endpoint = endpoint;
    }

    config.ca_bundle = lookup("DNSHOOK_CA_BUNDLE")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    if let Some(url) = lookup("DNSHOOK_IP_LOOKUP_URL") {
        config.ip_lookup_url = url;
    }

    if let Some(delay) = lookup("DNSHOOK_PROPAGATION_DELAY_SECS") {
        config.propagation_delay_secs = delay.trim().parse().with_context(|| {
            format!("DNSHOOK_PROPAGATION_DELAY_SECS '{}' is not a number", delay)
        })?;
    }

    config.passthrough = lookup("DNSHOOK_PASSTHROUGH").filter(|s| !s.trim().is_empty());

    config.dry_run = match lookup("DNSHOOK_MODE").as_deref() {
        None | Some("") | Some("live") => false,
        Some("dry-run") => true,
        Some(other) => anyhow::bail!(
            "DNSHOOK_MODE '{}' is not valid. Valid modes: live, dry-run",
            other
        ),
    };

    let log_level = lookup("DNSHOOK_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => anyhow::bail!(
            "DNSHOOK_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            log_level
        ),
    };

    Ok((config, log_level))
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    let (config, log_level) = match load_config(|key| env::var(key).ok()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookExitCode::Failure.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::Failure.into();
    }

    let Some((verb, hook_args)) = args.split_first() else {
        error!("Usage: dnshook <verb> [args...]");
        return HookExitCode::Failure.into();
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookExitCode::Failure.into();
        }
    };

    rt.block_on(async {
        if let Err(e) = run_hook(&config, Verb::parse(verb), hook_args).await {
            error!("{} failed: {:#}", verb, e);
            return ExitCode::from(HookExitCode::Failure);
        }

        let Some(ref command) = config.passthrough else {
            return ExitCode::from(HookExitCode::Success);
        };

        match run_passthrough(command, &args).await {
            Ok(code) => code,
            Err(e) => {
                error!("Passthrough hook failed: {:#}", e);
                ExitCode::from(HookExitCode::Failure)
            }
        }
    })
}

/// Run one hook verb
async fn run_hook(config: &HookConfig, verb: Verb, args: &[String]) -> Result<()> {
    if verb == Verb::Ignored {
        return Ok(());
    }

    // Argument shape first: a malformed call never touches the network
    let request = ChallengeRequest::from_args(args)?;
    config.validate()?;

    let source = HttpIpSource::new(config.ip_lookup_url.clone())?;
    let resolver = IpResolver::with_override(config.client_ip, Some(Box::new(source)));
    let provider = NamecheapProvider::from_config(config, resolver)?;
    let engine = ChallengeEngine::new(Box::new(provider));

    match verb {
        Verb::Deploy => {
            let report = engine.deploy(&request).await?;
            info!(
                "Published {} challenge record(s) for {}",
                report.published, report.domain
            );

            if config.propagation_delay_secs > 0 {
                info!(
                    "Waiting {}s for DNS propagation",
                    config.propagation_delay_secs
                );
                tokio::time::sleep(Duration::from_secs(config.propagation_delay_secs)).await;
            }
        }
        Verb::Clean => {
            let report = engine.clean(&request).await?;
            info!("Removed challenge records for {}", report.domain);
        }
        Verb::Ignored => {}
    }

    Ok(())
}

/// Run the passthrough hook with the original arguments
///
/// The arguments become positional parameters of `sh -c`, so they are
/// never re-quoted.
async fn run_passthrough(command: &str, args: &[String]) -> Result<ExitCode> {
    info!("Running passthrough hook: {}", command);

    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$@\"", command))
        .arg("dnshook")
        .args(args)
        .status()
        .await
        .with_context(|| format!("Failed to spawn passthrough hook '{}'", command))?;

    match status.code() {
        Some(code) => Ok(ExitCode::from(u8::try_from(code).unwrap_or(1))),
        None => {
            error!("Passthrough hook terminated by signal");
            Ok(HookExitCode::Failure.into())
        }
    }
}
