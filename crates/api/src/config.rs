//! Server configuration loaded from environment variables.

use papertrail_core::policy::AuditPolicy;
use papertrail_core::severity::Severity;

/// Server configuration.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// How often the retention sweep runs, in seconds (default: hourly).
    pub sweep_interval_secs: u64,
    /// Write-time audit policy (severity gate, suppression, retention).
    pub audit: AuditPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                         |
    /// |-----------------------------|---------------------------------|
    /// | `HOST`                      | `0.0.0.0`                       |
    /// | `PORT`                      | `3000`                          |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                            |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                            |
    /// | `RETENTION_SWEEP_INTERVAL_SECS` | `3600`                      |
    /// | `MIN_SEVERITY`              | `info`                          |
    /// | `RETENTION_DAYS`            | `30`                            |
    /// | `SKIP_SUPPRESSED_SOURCES`   | `true`                          |
    /// | `SUPPRESSED_SOURCES`        | `_transient_,_site_transient_`  |
    /// | `LOG_IP`                    | `true`                          |
    /// | `LOG_ACTOR_ID`              | `true`                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let sweep_interval_secs: u64 = std::env::var("RETENTION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("RETENTION_SWEEP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            sweep_interval_secs,
            audit: audit_policy_from_env(),
        }
    }
}

/// Build the audit policy from environment variables, defaulting each knob.
fn audit_policy_from_env() -> AuditPolicy {
    let defaults = AuditPolicy::default();

    let min_severity = match std::env::var("MIN_SEVERITY") {
        Ok(raw) => Severity::from_str(raw.trim())
            .unwrap_or_else(|e| panic!("Invalid MIN_SEVERITY: {e}")),
        Err(_) => defaults.min_severity,
    };

    let retention_days: i64 = std::env::var("RETENTION_DAYS")
        .unwrap_or_else(|_| defaults.retention_days.to_string())
        .parse()
        .expect("RETENTION_DAYS must be a valid integer");
    assert!(retention_days > 0, "RETENTION_DAYS must be positive");

    let suppressed_sources: Vec<String> = match std::env::var("SUPPRESSED_SOURCES") {
        Ok(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => defaults.suppressed_sources,
    };

    AuditPolicy {
        min_severity,
        retention_days,
        skip_suppressed_sources: bool_env("SKIP_SUPPRESSED_SOURCES", defaults.skip_suppressed_sources),
        suppressed_sources,
        log_ip: bool_env("LOG_IP", defaults.log_ip),
        log_actor_id: bool_env("LOG_ACTOR_ID", defaults.log_actor_id),
    }
}

/// Parse a boolean environment variable, accepting `1/0/true/false/on/off`.
fn bool_env(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => panic!("Invalid {name}: '{other}' (expected a boolean)"),
        },
        Err(_) => default,
    }
}
