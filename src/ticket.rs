//! Login ticket documents.
//!
//! The time-boxed access request submitted to WSAA and the
//! credential-bearing response it returns. Request serialization is
//! deterministic because the CMS signature covers the exact bytes;
//! element order and timestamp formatting are fixed.

use crate::config::Environment;
use crate::error::{Result, WsaaError};
use chrono::{DateTime, Duration, FixedOffset, Local, SecondsFormat};
use quick_xml::escape::escape;
use serde::Deserialize;
use std::fmt;

/// Protocol version carried in every ticket request.
pub const TICKET_VERSION: &str = "1.0";

/// Minutes the generation time is backdated to tolerate clock skew
/// against the authority.
const GENERATION_SKEW_MINUTES: i64 = 10;

/// Minutes until the requested ticket expires.
const EXPIRATION_MINUTES: i64 = 60;

/// WSAA-protected service a ticket can be requested for.
///
/// The wire identifier is the lower-cased service name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Electronic invoicing (domestic market).
    Wsfe,
    /// Electronic invoicing (exports).
    Wsfex,
    /// Electronic invoicing with item detail.
    Wsmtxca,
    /// Fiscal bond invoicing.
    Wsbfe,
    /// Taxpayer registry, scope A4.
    WsSrPadronA4,
    /// Taxpayer registry, scope A13.
    WsSrPadronA13,
}

impl Service {
    /// Service identifier as embedded in the ticket document.
    pub fn name(self) -> &'static str {
        match self {
            Service::Wsfe => "wsfe",
            Service::Wsfex => "wsfex",
            Service::Wsmtxca => "wsmtxca",
            Service::Wsbfe => "wsbfe",
            Service::WsSrPadronA4 => "ws_sr_padron_a4",
            Service::WsSrPadronA13 => "ws_sr_padron_a13",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header of a login ticket request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub source: String,
    pub destination: String,
    pub unique_id: i64,
    pub generation_time: DateTime<FixedOffset>,
    pub expiration_time: DateTime<FixedOffset>,
}

/// The access-request document signed and submitted to WSAA.
///
/// Immutable once built; the validity window and uniqueness value are
/// fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTicketRequest {
    pub header: Header,
    pub service: String,
    pub version: String,
}

impl LoginTicketRequest {
    /// Build a ticket request for `service` against `environment`,
    /// stamped from the current local clock.
    pub fn build(source: &str, service: Service, environment: Environment) -> Self {
        Self::build_at(source, service, environment, Local::now().fixed_offset())
    }

    /// Build a ticket request with an explicit construction time.
    ///
    /// The clock is read once: `generation_time` is `now` backdated by
    /// ten minutes, `expiration_time` is `now` plus one hour, and
    /// `unique_id` is the generation time in epoch seconds.
    pub fn build_at(
        source: &str,
        service: Service,
        environment: Environment,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let generation_time = now - Duration::minutes(GENERATION_SKEW_MINUTES);
        let expiration_time = now + Duration::minutes(EXPIRATION_MINUTES);
        Self {
            header: Header {
                source: source.to_owned(),
                destination: format!(
                    "cn={},o=afip,c=ar,serialNumber=CUIT 33693450239",
                    environment.name()
                ),
                unique_id: generation_time.timestamp(),
                generation_time,
                expiration_time,
            },
            service: service.name().to_owned(),
            version: TICKET_VERSION.to_owned(),
        }
    }

    /// Serialize to the canonical XML form.
    ///
    /// Byte-for-byte deterministic: fixed element order (header,
    /// service, version; header children source, destination,
    /// uniqueId, generationTime, expirationTime) and millisecond
    /// RFC 3339 timestamps.
    pub fn to_xml(&self) -> String {
        format!(
            "<loginTicketRequest>\
             <header>\
             <source>{}</source>\
             <destination>{}</destination>\
             <uniqueId>{}</uniqueId>\
             <generationTime>{}</generationTime>\
             <expirationTime>{}</expirationTime>\
             </header>\
             <service>{}</service>\
             <version>{}</version>\
             </loginTicketRequest>",
            escape(&self.header.source),
            escape(&self.header.destination),
            self.header.unique_id,
            format_time(self.header.generation_time),
            format_time(self.header.expiration_time),
            escape(&self.service),
            escape(&self.version),
        )
    }
}

fn format_time(time: DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Header echoed back by the authority. Tolerant of omissions; only
/// the credentials block is load-bearing for callers.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResponseHeader {
    pub source: String,
    pub destination: String,
    #[serde(rename = "uniqueId")]
    pub unique_id: i64,
    #[serde(rename = "generationTime")]
    pub generation_time: String,
    #[serde(rename = "expirationTime")]
    pub expiration_time: String,
}

/// Short-lived service credentials issued by WSAA.
///
/// Opaque beyond these fields; the caller decides caching and reuse.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub sign: String,
    #[serde(rename = "expirationTime")]
    pub expiration_time: DateTime<FixedOffset>,
}

/// The authority's reply to a signed login ticket request.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoginTicketResponse {
    pub header: ResponseHeader,
    pub credentials: Credentials,
}

impl LoginTicketResponse {
    /// Parse the authority's XML response body.
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml).map_err(|e| WsaaError::MalformedResponse(e.to_string()))
    }
}
