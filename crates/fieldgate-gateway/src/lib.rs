//! `Fieldgate` Gateway Library
//!
//! The trust and telemetry core of the deployment, transport-agnostic:
//! the embedder feeds inbound messages to the router and supplies a
//! publisher for outbound ones.
//!
//! - Onboarding: certificate verification, key binding, ECDH
//! - Certificate lifecycle: renewal with bounded retry, revocation with
//!   per-issuer CRL bookkeeping
//! - Telemetry: authenticated decryption under three cipher suites

pub mod ca;
pub mod error;
pub mod lifecycle;
pub mod pending;
pub mod router;
pub mod topic;
pub mod transport;

pub use ca::{CaError, CaIssue, CaRevocation, CaService, CommandCaService};
pub use error::{ErrorCategory, GatewayError};
pub use lifecycle::LifecycleCoordinator;
pub use pending::{Confirmation, OperationKind, PendingConfirmations};
pub use router::MessageRouter;
pub use topic::{MessageKind, Topic};
pub use transport::{NoopStatusSink, PublishError, Publisher, StatusSink, StatusUpdate};
