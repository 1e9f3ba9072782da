//! Device onboarding: certificate verification against the trusted CA,
//! public-key/certificate binding, and P-256 ECDH key agreement.
//!
//! Only certificate *verification* lives here; issuing and signing are the
//! external CA service's job. Each verification step fails with its own
//! [`HandshakeError`] variant so the caller can emit distinct status
//! updates.

use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, FieldBytes, PublicKey};
use rand::rngs::OsRng;
use tracing::debug;
use x509_parser::prelude::*;
use zeroize::Zeroizing;

use crate::error::HandshakeError;

/// Expected length of the raw certificate blob, in hex characters.
pub const CERT_HEX_LEN: usize = 1040;
/// Expected decoded certificate length in bytes.
pub const CERT_DER_LEN: usize = CERT_HEX_LEN / 2;

/// SPKI DER prefix for an uncompressed point on prime256v1.
const SPKI_PREFIX: [u8; 26] = [
    0x30, 0x59, 0x30, 0x13, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x08,
    0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07, 0x03, 0x42, 0x00,
];

/// Identity summary of a successfully verified certificate.
#[derive(Debug, Clone)]
pub struct CertificateSummary {
    pub subject: String,
    pub issuer: String,
    /// Serial number, hex.
    pub serial: String,
    /// Validity bounds as unix timestamps.
    pub not_before: i64,
    pub not_after: i64,
}

/// Result of a key agreement: the derived secret plus the local public key
/// coordinates to send back to the device.
pub struct KeyAgreement {
    /// 32-byte ECDH shared secret, zeroized on drop.
    pub shared_secret: Zeroizing<[u8; 32]>,
    pub server_public_x: String,
    pub server_public_y: String,
}

/// The trusted CA certificate, held as owned DER.
pub struct TrustedCa {
    der: Vec<u8>,
    subject: String,
}

impl TrustedCa {
    /// Build from a DER-encoded CA certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, HandshakeError> {
        let subject = parse_certificate(&der)?.subject().to_string();
        Ok(Self { der, subject })
    }

    /// The CA's subject DN, the issuer every device certificate must name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Build from a PEM-encoded CA certificate.
    pub fn from_pem(pem: &[u8]) -> Result<Self, HandshakeError> {
        let (_, parsed) = x509_parser::pem::parse_x509_pem(pem)
            .map_err(|e| HandshakeError::CertificateMalformed(e.to_string()))?;
        Self::from_der(parsed.contents)
    }

    /// Verify a raw hex certificate blob end to end.
    ///
    /// Strips non-hex characters, enforces the fixed 520-byte decoded
    /// length, then runs the DER-level checks of [`Self::verify_der`].
    /// Returns the identity summary and the decoded DER for downstream
    /// key binding.
    pub fn verify_certificate_hex(
        &self,
        certificate: &str,
    ) -> Result<(CertificateSummary, Vec<u8>), HandshakeError> {
        let clean: String = certificate
            .chars()
            .filter(char::is_ascii_hexdigit)
            .collect();
        if clean.is_empty() {
            return Err(HandshakeError::CertificateNotHex);
        }
        if clean.len() != CERT_HEX_LEN {
            return Err(HandshakeError::CertificateLength {
                expected: CERT_HEX_LEN,
                actual: clean.len(),
            });
        }
        let der = hex::decode(&clean).map_err(|_| HandshakeError::CertificateNotHex)?;
        debug_assert_eq!(der.len(), CERT_DER_LEN);

        let summary = self.verify_der(&der)?;
        Ok((summary, der))
    }

    /// DER-level verification: issuer must equal the CA subject, the
    /// validity window must cover now, and the signature must verify
    /// against the CA public key.
    pub fn verify_der(&self, der: &[u8]) -> Result<CertificateSummary, HandshakeError> {
        let cert = parse_certificate(der)?;
        let ca = parse_certificate(&self.der)?;

        if cert.tbs_certificate.issuer.as_raw() != ca.tbs_certificate.subject.as_raw() {
            return Err(HandshakeError::IssuerMismatch);
        }
        if !cert.validity().is_valid() {
            return Err(HandshakeError::NotCurrentlyValid);
        }
        cert.verify_signature(Some(ca.public_key()))
            .map_err(|_| HandshakeError::SignatureInvalid)?;

        let summary = CertificateSummary {
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: hex::encode(cert.raw_serial()),
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
        };
        debug!(subject = %summary.subject, issuer = %summary.issuer, "certificate verified");
        Ok(summary)
    }
}

/// Check that the claimed (x, y) public key equals the certificate's
/// embedded key, byte for byte at the SPKI level. Binds the session key to
/// the certificate's identity.
pub fn bind_public_key(
    cert_der: &[u8],
    public_key_x: &str,
    public_key_y: &str,
) -> Result<(), HandshakeError> {
    let (x, y) = decode_coordinates(public_key_x, public_key_y)?;

    let mut spki = Vec::with_capacity(SPKI_PREFIX.len() + 65);
    spki.extend_from_slice(&SPKI_PREFIX);
    spki.push(0x04);
    spki.extend_from_slice(&x);
    spki.extend_from_slice(&y);

    let cert = parse_certificate(cert_der)?;
    if cert.public_key().raw != spki.as_slice() {
        return Err(HandshakeError::KeyMismatch);
    }
    Ok(())
}

/// Perform ECDH against the device public key given as (x, y) coordinates.
///
/// Generates an ephemeral local keypair on prime256v1 and derives the
/// 32-byte shared secret. Persistence and transport publish are the
/// caller's responsibility.
pub fn agree_key(public_key_x: &str, public_key_y: &str) -> Result<KeyAgreement, HandshakeError> {
    let (x, y) = decode_coordinates(public_key_x, public_key_y)?;
    let point = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&x),
        FieldBytes::from_slice(&y),
        false,
    );
    let device_public: PublicKey = Option::from(PublicKey::from_encoded_point(&point))
        .ok_or_else(|| HandshakeError::InvalidPublicKey("point is not on the curve".into()))?;

    let local_secret = EphemeralSecret::random(&mut OsRng);
    let local_public = local_secret.public_key().to_encoded_point(false);

    let shared = local_secret.diffie_hellman(&device_public);
    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(shared.raw_secret_bytes());

    let server_public_x = local_public
        .x()
        .map(hex::encode)
        .ok_or_else(|| HandshakeError::KeyAgreementFailed("missing x coordinate".into()))?;
    let server_public_y = local_public
        .y()
        .map(hex::encode)
        .ok_or_else(|| HandshakeError::KeyAgreementFailed("missing y coordinate".into()))?;

    Ok(KeyAgreement {
        shared_secret: secret,
        server_public_x,
        server_public_y,
    })
}

fn decode_coordinates(x_hex: &str, y_hex: &str) -> Result<([u8; 32], [u8; 32]), HandshakeError> {
    let decode_one = |name: &str, value: &str| -> Result<[u8; 32], HandshakeError> {
        if value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HandshakeError::InvalidPublicKey(format!(
                "{name} must be 64 hex characters"
            )));
        }
        let bytes = hex::decode(value)
            .map_err(|e| HandshakeError::InvalidPublicKey(e.to_string()))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    };
    Ok((decode_one("X", x_hex)?, decode_one("Y", y_hex)?))
}

fn parse_certificate(der: &[u8]) -> Result<X509Certificate<'_>, HandshakeError> {
    let (rest, cert) = X509Certificate::from_der(der)
        .map_err(|e| HandshakeError::CertificateMalformed(e.to_string()))?;
    if !rest.is_empty() {
        return Err(HandshakeError::CertificateMalformed(
            "trailing bytes after certificate".into(),
        ));
    }
    Ok(cert)
}
