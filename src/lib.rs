//! AFIP WSAA client library
//!
//! Client for AFIP's WSAA ticket-granting authentication service. The
//! crate provisions an RSA key pair and X.509 identity for a company,
//! produces the PKCS#10 certificate signing request the operator
//! exchanges with AFIP out of band, and — once the signed certificate
//! is installed — signs time-boxed login tickets and exchanges them
//! for short-lived service credentials.
//!
//! # Credential lifecycle
//!
//! ```text
//! initialize(name, unit, cuit)      keys generated, no certificate
//!   └── build_certificate_request() CSR, submitted to AFIP by the operator
//!         └── install_certificate() identity complete
//!               └── login(service)  signed ticket → Credentials
//! ```
//!
//! Rotating keys invalidates the installed certificate and returns the
//! identity to the keys-only state.
//!
//! # Quick Start
//!
//! ```no_run
//! use afip_wsaa::client::WsaaClient;
//! use afip_wsaa::config::Environment;
//! use afip_wsaa::storage::FileIdentityStore;
//! use afip_wsaa::transport::SoapLoginClient;
//!
//! fn main() -> afip_wsaa::Result<()> {
//!     let store = FileIdentityStore::new("identity.toml");
//!     let transport = SoapLoginClient::new(Environment::Testing)?;
//!     let client = WsaaClient::new(store, transport, Environment::Testing);
//!
//!     client.initialize("Acme", "IT", "20111111112")?;
//!     let csr = client.build_certificate_request()?;
//!     println!("{csr}"); // submit to AFIP, then install the result:
//!     // client.install_certificate(&pem)?;
//!     // let credentials = client.login(afip_wsaa::Service::Wsfe)?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`identity`] — the durable principal + key + certificate record.
//! - [`keys`] — RSA generation and PEM round-tripping.
//! - [`csr`] — PKCS#10 request construction.
//! - [`ticket`] — login ticket documents and their canonical XML.
//! - [`envelope`] — CMS signed-data envelope over the ticket bytes.
//! - [`client`] — lifecycle orchestration over the collaborator seams.
//! - [`storage`] / [`transport`] — the collaborator seams themselves.
//!
//! # Concurrency
//!
//! Operations are synchronous: local computation plus one storage
//! round trip and, for login, one authority round trip. Record
//! mutations are read-modify-write without compare-and-swap; see
//! [`storage::IdentityStore`] for the single-writer contract.
//! Concurrent logins are safe: each builds an independent envelope
//! with its own timestamps.

pub mod client;
pub mod config;
pub mod csr;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod keys;
pub mod storage;
pub mod testutil;
pub mod ticket;
pub mod transport;

pub use client::WsaaClient;
pub use config::{Environment, WsaaConfig};
pub use error::{Result, WsaaError};
pub use identity::IdentityRecord;
pub use ticket::{Credentials, Service};
