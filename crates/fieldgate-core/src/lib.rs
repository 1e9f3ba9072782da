//! `Fieldgate` Core Library
//!
//! Shared functionality for `Fieldgate` components:
//! - Device, CRL, and confirmation models
//! - Storage seams with in-memory implementations
//! - Per-issuer CRL bookkeeping
//! - Configuration resolution and common error types

pub mod config;
pub mod crl_store;
pub mod error;
pub mod model;
pub mod secret_cache;
pub mod store;
pub mod tracing_init;

pub use config::{CaServiceConfig, GatewayConfig};
pub use crl_store::{CRL_VALIDITY_DAYS, CrlStore};
pub use error::{Error, Result};
pub use model::{
    CertConfirmation, ConfirmationStatus, Crl, Device, DeviceStatus, RevocationReason,
    RevokedCertificateEntry,
};
pub use secret_cache::{SECRET_LEN, SharedSecretCache};
pub use store::{ConfirmationStore, DeviceStore, MemoryConfirmationStore, MemoryDeviceStore};
