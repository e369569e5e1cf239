//! End-to-end login flow against a stub authority.
//!
//! Exercises the whole lifecycle: provision keys, install a
//! certificate standing in for AFIP's CSR exchange, log in through a
//! captured transport, and verify the signed envelope the authority
//! would have received.

use afip_wsaa::client::WsaaClient;
use afip_wsaa::config::Environment;
use afip_wsaa::envelope;
use afip_wsaa::error::Result;
use afip_wsaa::keys;
use afip_wsaa::storage::MemoryIdentityStore;
use afip_wsaa::testutil;
use afip_wsaa::ticket::Service;
use afip_wsaa::transport::LoginCms;
use chrono::DateTime;
use std::sync::{Arc, Mutex};

/// Authority stub: records every submitted envelope and answers with a
/// fixed response body.
struct StubAuthority {
    response: String,
    received: Arc<Mutex<Vec<String>>>,
}

impl LoginCms for StubAuthority {
    fn login_cms(&self, cms: &str) -> Result<String> {
        self.received.lock().unwrap().push(cms.to_owned());
        Ok(self.response.clone())
    }
}

fn response_body(token: &str, sign: &str, expiration: &str) -> String {
    format!(
        "<loginTicketResponse>\
         <header>\
         <source>cn=wsaahomo,o=afip,c=ar,serialNumber=CUIT 33693450239</source>\
         <destination>cn=Acme,serialNumber=20111111112,o=IT,c=AR</destination>\
         <uniqueId>1</uniqueId>\
         <generationTime>2026-03-01T11:50:00.000-03:00</generationTime>\
         <expirationTime>{expiration}</expirationTime>\
         </header>\
         <credentials>\
         <token>{token}</token>\
         <sign>{sign}</sign>\
         <expirationTime>{expiration}</expirationTime>\
         </credentials>\
         </loginTicketResponse>"
    )
}

#[test]
fn full_lifecycle_yields_credentials_and_verifiable_envelope() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let authority = StubAuthority {
        response: response_body("T1", "S1", "2026-03-01T23:50:00.000-03:00"),
        received: Arc::clone(&received),
    };
    let store = MemoryIdentityStore::new();
    let client = WsaaClient::new(store, authority, Environment::Testing);

    // Provision and walk the CSR exchange with a self-signed stand-in.
    let record = client.initialize("Acme", "IT", "20111111112").unwrap();
    assert!(record.has_keys());

    let csr = client.build_certificate_request().unwrap();
    assert!(csr.starts_with("-----BEGIN CERTIFICATE REQUEST-----"));

    let key = keys::private_key_from_pem(record.private_key.as_deref().unwrap()).unwrap();
    let cert_pem = testutil::self_signed_certificate_pem(&key, "Acme").unwrap();
    client.install_certificate(&cert_pem).unwrap();

    // Login round trip.
    let credentials = client.login(Service::Wsfe).unwrap();
    assert_eq!(credentials.token, "T1");
    assert_eq!(credentials.sign, "S1");
    assert_eq!(
        credentials.expiration_time,
        DateTime::parse_from_rfc3339("2026-03-01T23:50:00.000-03:00").unwrap()
    );

    // The stub received exactly one envelope; its signature verifies
    // and the enclosed document carries the lower-cased service and
    // the canonical source DN.
    let envelopes = received.lock().unwrap();
    assert_eq!(envelopes.len(), 1);
    let document = envelope::verify_envelope(&envelopes[0]).unwrap();
    let document = String::from_utf8(document).unwrap();
    assert!(document.starts_with("<loginTicketRequest>"));
    assert!(document.contains("<service>wsfe</service>"));
    assert!(document.contains("<source>cn=Acme,serialNumber=20111111112,o=IT,c=AR</source>"));
    assert!(document.contains("<destination>cn=wsaahomo,o=afip,c=ar,serialNumber=CUIT 33693450239</destination>"));
    assert!(document.contains("<version>1.0</version>"));
}

#[test]
fn each_login_produces_a_fresh_envelope() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let authority = StubAuthority {
        response: response_body("T1", "S1", "2026-03-01T23:50:00.000-03:00"),
        received: Arc::clone(&received),
    };
    let client = WsaaClient::new(MemoryIdentityStore::new(), authority, Environment::Testing);

    let record = client.initialize("Acme", "IT", "20111111112").unwrap();
    let key = keys::private_key_from_pem(record.private_key.as_deref().unwrap()).unwrap();
    let cert_pem = testutil::self_signed_certificate_pem(&key, "Acme").unwrap();
    client.install_certificate(&cert_pem).unwrap();

    client.login(Service::Wsfe).unwrap();
    client.login(Service::Wsmtxca).unwrap();

    let envelopes = received.lock().unwrap();
    assert_eq!(envelopes.len(), 2);
    let first = String::from_utf8(envelope::verify_envelope(&envelopes[0]).unwrap()).unwrap();
    let second = String::from_utf8(envelope::verify_envelope(&envelopes[1]).unwrap()).unwrap();
    assert!(first.contains("<service>wsfe</service>"));
    assert!(second.contains("<service>wsmtxca</service>"));
}

#[test]
fn rotate_keys_invalidates_certificate_in_storage() {
    let authority = StubAuthority {
        response: response_body("T1", "S1", "2026-03-01T23:50:00.000-03:00"),
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let store = MemoryIdentityStore::new();
    let client = WsaaClient::new(store, authority, Environment::Testing);

    let record = client.initialize("Acme", "IT", "20111111112").unwrap();
    let key = keys::private_key_from_pem(record.private_key.as_deref().unwrap()).unwrap();
    let cert_pem = testutil::self_signed_certificate_pem(&key, "Acme").unwrap();
    client.install_certificate(&cert_pem).unwrap();

    client.rotate_keys().unwrap();

    // Login must now fail on the missing certificate, not sign with a
    // stale one.
    match client.login(Service::Wsfe) {
        Err(afip_wsaa::WsaaError::IncompleteIdentity { field }) => {
            assert_eq!(field, "certificate")
        }
        other => panic!("expected IncompleteIdentity, got {other:?}"),
    }
}
