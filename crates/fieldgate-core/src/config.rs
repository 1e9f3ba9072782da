//! Configuration for the Fieldgate gateway.
//!
//! Built-in defaults, overridable from a JSON settings file. Timing knobs
//! are expressed in seconds in the file and exposed as `Duration` through
//! accessor methods.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Topic namespace prefix devices publish under.
    pub namespace: String,
    /// How long to wait for a device confirmation after publishing a
    /// certificate operation (seconds).
    pub confirmation_timeout_secs: u64,
    /// Renewal attempts after the first before giving up.
    pub renew_max_retries: u32,
    /// Delay between renewal attempts (seconds).
    pub renew_retry_delay_secs: u64,
    /// Attempt to repair telemetry JSON whose leading bytes were corrupted
    /// in transit. Off by default.
    pub legacy_json_recovery: bool,
    pub ca: CaServiceConfig,
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            namespace: "iot".to_string(),
            confirmation_timeout_secs: 30,
            renew_max_retries: 3,
            renew_retry_delay_secs: 5,
            legacy_json_recovery: false,
            ca: CaServiceConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// External CA service invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaServiceConfig {
    /// Interpreter or binary to run (e.g. `"node"`).
    pub program: String,
    pub issue_script: PathBuf,
    pub verify_script: PathBuf,
    pub revoke_script: PathBuf,
    pub ca_cert_path: PathBuf,
    pub ca_key_path: PathBuf,
    /// Per-invocation timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for CaServiceConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            issue_script: PathBuf::from("ca/issue.js"),
            verify_script: PathBuf::from("ca/verify.js"),
            revoke_script: PathBuf::from("ca/revoke.js"),
            ca_cert_path: PathBuf::from("ca/ca-cert.pem"),
            ca_key_path: PathBuf::from("ca/ca-key.pem"),
            timeout_secs: 60,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file. Missing fields fall back to
    /// the built-in defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() || self.namespace.contains('/') {
            return Err(Error::Config(
                "namespace must be a single non-empty topic segment".to_string(),
            ));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(Error::Config(
                "confirmation_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    pub fn renew_retry_delay(&self) -> Duration {
        Duration::from_secs(self.renew_retry_delay_secs)
    }
}

impl CaServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
