//! External certificate-authority service.
//!
//! Issuing, verifying, and revoking certificates is delegated to an
//! external program (the CA keeps its own key material). Each call spawns
//! the configured script, feeds the request as JSON on stdin, and parses a
//! JSON response from stdout. Key material travels over stdin/stdout only,
//! never argv.

use std::process::Stdio;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

use fieldgate_core::config::CaServiceConfig;

/// Failures talking to the CA program. Messages never carry key material,
/// only what the CA chose to put in its `status: error` response.
#[derive(Debug, Error)]
pub enum CaError {
    #[error("Failed to spawn CA program: {0}")]
    Spawn(String),

    #[error("CA program timed out after {0} seconds")]
    Timeout(u64),

    #[error("CA program exited with {status}")]
    NonZeroExit { status: String },

    #[error("CA program produced unparsable output: {0}")]
    UnparsableOutput(String),

    #[error("CA reported failure: {0}")]
    Service(String),
}

/// A freshly issued certificate bundle.
#[derive(Debug, Clone, Deserialize)]
pub struct CaIssue {
    pub certificate: String,
    pub private_key: String,
    pub serial: String,
    pub expiry: DateTime<Utc>,
}

/// CRL material produced by a revocation.
#[derive(Debug, Clone, Deserialize)]
pub struct CaRevocation {
    pub crl_hex: Option<String>,
    pub crl_pem: String,
}

/// The gateway's view of the CA.
pub trait CaService: Send + Sync {
    fn issue(&self, device_id: &str) -> impl Future<Output = Result<CaIssue, CaError>> + Send;

    /// Self-check of freshly issued material before it is sent anywhere.
    fn verify(
        &self,
        certificate: &str,
        private_key: &str,
    ) -> impl Future<Output = Result<(), CaError>> + Send;

    fn revoke(
        &self,
        device_id: &str,
        serial: &str,
    ) -> impl Future<Output = Result<CaRevocation, CaError>> + Send;
}

/// Spawns the configured external program per call.
#[derive(Clone)]
pub struct CommandCaService {
    config: CaServiceConfig,
}

impl CommandCaService {
    #[must_use]
    pub fn new(config: CaServiceConfig) -> Self {
        Self { config }
    }

    async fn run(
        &self,
        script: &std::path::Path,
        request: serde_json::Value,
    ) -> Result<serde_json::Value, CaError> {
        let mut child = Command::new(&self.config.program)
            .arg(script)
            .arg(&self.config.ca_cert_path)
            .arg(&self.config.ca_key_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaError::Spawn(e.to_string()))?;

        let outcome = tokio::time::timeout(self.config.timeout(), async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(request.to_string().as_bytes())
                    .await
                    .map_err(|e| CaError::Spawn(format!("cannot write request: {e}")))?;
                drop(stdin);
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| CaError::Spawn(e.to_string()))
        })
        .await;

        let output = match outcome {
            Ok(result) => result?,
            Err(_) => return Err(CaError::Timeout(self.config.timeout_secs)),
        };

        if !output.stderr.is_empty() {
            warn!(
                script = %script.display(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "CA program wrote to stderr"
            );
        }
        if !output.status.success() {
            return Err(CaError::NonZeroExit {
                status: output.status.to_string(),
            });
        }

        let response: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| CaError::UnparsableOutput(e.to_string()))?;
        if response.get("status").and_then(|s| s.as_str()) == Some("error") {
            let message = response
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("no message");
            return Err(CaError::Service(message.to_string()));
        }
        Ok(response)
    }
}

impl CaService for CommandCaService {
    async fn issue(&self, device_id: &str) -> Result<CaIssue, CaError> {
        let response = self
            .run(
                &self.config.issue_script,
                serde_json::json!({ "device_id": device_id }),
            )
            .await?;
        serde_json::from_value(response).map_err(|e| CaError::UnparsableOutput(e.to_string()))
    }

    async fn verify(&self, certificate: &str, private_key: &str) -> Result<(), CaError> {
        self.run(
            &self.config.verify_script,
            serde_json::json!({
                "certificate": certificate,
                "private_key": private_key,
            }),
        )
        .await?;
        Ok(())
    }

    async fn revoke(&self, device_id: &str, serial: &str) -> Result<CaRevocation, CaError> {
        let response = self
            .run(
                &self.config.revoke_script,
                serde_json::json!({ "device_id": device_id, "serial": serial }),
            )
            .await?;
        serde_json::from_value(response).map_err(|e| CaError::UnparsableOutput(e.to_string()))
    }
}
