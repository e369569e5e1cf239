//! Auth Client
//!
//! Orchestrates the credential lifecycle over the two collaborator
//! seams: identity storage and the login transport. The identity moves
//! through `NoIdentity → KeysOnly → Ready (keys + certificate) →
//! LoggedIn`; `login` is only valid once the record is complete,
//! rotating keys drops back to `KeysOnly`, and installing a
//! certificate advances to `Ready`.
//!
//! No operation retries internally and no partial record is ever
//! written: every mutation builds the full replacement record before
//! a single `save`.

use crate::config::Environment;
use crate::csr;
use crate::envelope;
use crate::error::{Result, WsaaError};
use crate::identity::IdentityRecord;
use crate::keys::{self, PemObject};
use crate::storage::IdentityStore;
use crate::ticket::{Credentials, LoginTicketRequest, LoginTicketResponse, Service};
use crate::transport::LoginCms;

/// WSAA client bound to an identity store and a login transport.
pub struct WsaaClient<S, T> {
    store: S,
    transport: T,
    environment: Environment,
    key_bits: u32,
}

impl<S: IdentityStore, T: LoginCms> WsaaClient<S, T> {
    pub fn new(store: S, transport: T, environment: Environment) -> Self {
        Self {
            store,
            transport,
            environment,
            key_bits: keys::DEFAULT_KEY_BITS,
        }
    }

    /// Override the RSA key strength used by `initialize` and
    /// `rotate_keys`.
    pub fn with_key_bits(mut self, key_bits: u32) -> Self {
        self.key_bits = key_bits;
        self
    }

    /// Provision a fresh identity: new key pair, no certificate.
    ///
    /// Destructive: any existing record for the principal is
    /// overwritten, not merged.
    pub fn initialize(&self, name: &str, unit: &str, cuit: &str) -> Result<IdentityRecord> {
        require_argument(name, "name")?;
        require_argument(unit, "unit")?;
        require_argument(cuit, "cuit")?;

        let key = keys::generate_keypair(self.key_bits)?;
        let record = IdentityRecord::new(name.to_owned(), unit.to_owned(), cuit.to_owned())
            .with_keys(keys::public_key_to_pem(&key)?, keys::private_key_to_pem(&key)?);
        self.store.save(&record)?;
        log::info!("initialized identity for {cuit} with {} bit keys", self.key_bits);
        Ok(record)
    }

    /// Replace the key pair of the existing identity.
    ///
    /// The installed certificate was issued for the old keys and is
    /// cleared from the written record. Nothing is written if key
    /// generation or encoding fails.
    pub fn rotate_keys(&self) -> Result<IdentityRecord> {
        let record = self.load_record()?;
        let key = keys::generate_keypair(self.key_bits)?;
        let record =
            record.with_keys(keys::public_key_to_pem(&key)?, keys::private_key_to_pem(&key)?);
        self.store.save(&record)?;
        log::info!("rotated identity keys for {}", record.cuit);
        Ok(record)
    }

    /// Install the operator-supplied certificate obtained for the
    /// current key pair's CSR.
    ///
    /// The certificate is not checked against the stored public key;
    /// installing one issued for different keys is the caller's error
    /// and will surface at login time on the authority side.
    pub fn install_certificate(&self, certificate_pem: &str) -> Result<IdentityRecord> {
        require_argument(certificate_pem, "certificate")?;
        let record = self.load_record()?.with_certificate(certificate_pem.to_owned());
        self.store.save(&record)?;
        log::info!("installed certificate for {}", record.cuit);
        Ok(record)
    }

    /// Build the PEM-encoded PKCS#10 request for the stored key pair.
    pub fn build_certificate_request(&self) -> Result<String> {
        let record = self.load_record()?;
        csr::build_certificate_request(&record)
    }

    /// Exchange a signed login ticket for short-lived credentials.
    ///
    /// Each call produces a fresh signed envelope and a fresh
    /// authority round trip; nothing is cached.
    pub fn login(&self, service: Service) -> Result<Credentials> {
        let record = self.load_record()?;
        let identity = record.require_complete()?;

        let certificate = match keys::parse_pem(identity.certificate)? {
            PemObject::Certificate(cert) => cert,
            _ => {
                return Err(WsaaError::MalformedKeyMaterial(
                    "stored certificate is not an X.509 certificate".into(),
                ))
            }
        };
        let private_key = match keys::parse_pem(identity.private_key)? {
            PemObject::KeyPair(key) => key,
            _ => {
                return Err(WsaaError::MalformedKeyMaterial(
                    "stored private key is not a key pair".into(),
                ))
            }
        };

        let ticket = LoginTicketRequest::build(&record.source(), service, self.environment);
        let document = ticket.to_xml();
        let cms = envelope::sign_envelope(document.as_bytes(), &certificate, &private_key)?;

        log::debug!("requesting {service} ticket for {}", record.cuit);
        let response_xml = self.transport.login_cms(&cms)?;
        let response = LoginTicketResponse::from_xml(&response_xml)?;
        log::info!(
            "obtained {service} credentials valid until {}",
            response.credentials.expiration_time
        );
        Ok(response.credentials)
    }

    fn load_record(&self) -> Result<IdentityRecord> {
        self.store.load()?.ok_or(WsaaError::NoIdentity)
    }
}

fn require_argument(value: &str, field: &'static str) -> Result<()> {
    if value.is_empty() {
        Err(WsaaError::IncompleteIdentity { field })
    } else {
        Ok(())
    }
}
