//! Envelope Signer
//!
//! Wraps the canonical ticket bytes in a CMS signed-data structure:
//! one signer, SHA-256 with RSA, content encapsulated so the document
//! travels inside the envelope, and the signer certificate included
//! for verification. The DER envelope is base64-encoded for the wire.

use crate::error::{Result, WsaaError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use openssl::cms::{CMSOptions, CmsContentInfo};
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::sync::Once;

static CRYPTO_INIT: Once = Once::new();

/// One-time library initialization, safe under concurrent first use.
fn ensure_crypto_init() {
    CRYPTO_INIT.call_once(openssl::init);
}

/// Sign `document` into a base64-encoded CMS envelope.
///
/// `BINARY` keeps the content bytes exactly as given; the signature
/// must cover the canonical serialization unchanged.
pub fn sign_envelope(
    document: &[u8],
    certificate: &X509,
    private_key: &PKey<Private>,
) -> Result<String> {
    ensure_crypto_init();
    let cms = CmsContentInfo::sign(
        Some(certificate),
        Some(private_key),
        None,
        Some(document),
        CMSOptions::BINARY,
    )
    .map_err(WsaaError::SigningFailed)?;
    let der = cms.to_der().map_err(WsaaError::SigningFailed)?;
    Ok(BASE64.encode(der))
}

/// Verify a base64-encoded CMS envelope against its embedded signer
/// certificate and return the encapsulated content.
///
/// Signature verification only; the signer certificate chain is not
/// validated against a trust store (the authority does that on its
/// side, and locally the certificate is operator-installed).
pub fn verify_envelope(envelope: &str) -> Result<Vec<u8>> {
    ensure_crypto_init();
    let der = BASE64
        .decode(envelope.trim())
        .map_err(|e| WsaaError::MalformedResponse(format!("envelope is not base64: {e}")))?;
    let mut cms = CmsContentInfo::from_der(&der).map_err(WsaaError::SigningFailed)?;
    let mut content = Vec::new();
    cms.verify(None, None, None, Some(&mut content), CMSOptions::NOVERIFY)
        .map_err(WsaaError::SigningFailed)?;
    Ok(content)
}
