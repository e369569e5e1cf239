//! Remote authority transport.
//!
//! The client core only needs one logical operation: submit an opaque
//! base64 envelope, get an opaque XML body back. [`LoginCms`] is that
//! seam; [`SoapLoginClient`] is the production implementation speaking
//! SOAP 1.2 to the WSAA `loginCms` endpoint.

use crate::config::Environment;
use crate::error::{Result, WsaaError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::time::Duration;

/// The authority's single login operation.
///
/// Implementations report transport failures as
/// [`WsaaError::AuthorityUnreachable`] and understood-but-declined
/// requests as [`WsaaError::AuthorityRejected`]; the core propagates
/// both without retrying.
pub trait LoginCms {
    /// Submit a base64 CMS envelope, returning the raw XML response
    /// body.
    fn login_cms(&self, cms: &str) -> Result<String>;
}

const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking SOAP 1.2 client for the WSAA `loginCms` operation.
pub struct SoapLoginClient {
    http: reqwest::blocking::Client,
    url: String,
}

impl SoapLoginClient {
    /// Client targeting the given deployment's login endpoint.
    pub fn new(environment: Environment) -> Result<Self> {
        Self::with_url(environment.login_url())
    }

    /// Client targeting an explicit endpoint URL.
    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WsaaError::AuthorityUnreachable(Box::new(e)))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

impl LoginCms for SoapLoginClient {
    fn login_cms(&self, cms: &str) -> Result<String> {
        log::debug!("posting loginCms request to {}", self.url);
        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(soap_request_body(cms))
            .send()
            .map_err(|e| WsaaError::AuthorityUnreachable(Box::new(e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| WsaaError::AuthorityUnreachable(Box::new(e)))?;

        // The ticket travels XML-escaped inside loginCmsReturn; a
        // missing return element means the authority declined.
        if let Some(ticket) = element_text(&body, "loginCmsReturn") {
            return Ok(ticket);
        }
        let fault = element_text(&body, "faultstring")
            .or_else(|| element_text(&body, "Text"))
            .unwrap_or_else(|| format!("HTTP {status}"));
        log::debug!("loginCms rejected: {fault}");
        Err(WsaaError::AuthorityRejected(fault))
    }
}

fn soap_request_body(cms: &str) -> String {
    format!(
        "<soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\" \
         xmlns:wsaa=\"http://wsaa.view.sua.dvadac.desein.afip.gov\">\
         <soap:Body><wsaa:loginCms><wsaa:in0>{cms}</wsaa:in0></wsaa:loginCms></soap:Body>\
         </soap:Envelope>"
    )
}

/// Unescaped text content of the first element with the given local
/// name, ignoring namespace prefixes.
fn element_text(xml: &str, local: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == local.as_bytes() => inside = true,
            Ok(Event::Text(t)) if inside => text.push_str(&t.unescape().ok()?),
            Ok(Event::End(e)) if e.local_name().as_ref() == local.as_bytes() => {
                return if text.is_empty() { None } else { Some(text) };
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_body_embeds_envelope() {
        let body = soap_request_body("QkFTRTY0");
        assert!(body.contains("<wsaa:in0>QkFTRTY0</wsaa:in0>"));
        assert!(body.contains("http://www.w3.org/2003/05/soap-envelope"));
    }

    #[test]
    fn test_element_text_unescapes_embedded_document() {
        let soap = "<soapenv:Envelope xmlns:soapenv=\"http://www.w3.org/2003/05/soap-envelope\">\
                    <soapenv:Body><ns1:loginCmsResponse xmlns:ns1=\"http://wsaa\">\
                    <ns1:loginCmsReturn>&lt;loginTicketResponse&gt;&lt;/loginTicketResponse&gt;</ns1:loginCmsReturn>\
                    </ns1:loginCmsResponse></soapenv:Body></soapenv:Envelope>";
        assert_eq!(
            element_text(soap, "loginCmsReturn").as_deref(),
            Some("<loginTicketResponse></loginTicketResponse>")
        );
    }

    #[test]
    fn test_element_text_finds_fault() {
        let soap = "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
                    <soapenv:Body><soapenv:Fault><faultcode>ns1:cms.expired</faultcode>\
                    <faultstring>CMS expirado</faultstring></soapenv:Fault></soapenv:Body>\
                    </soapenv:Envelope>";
        assert_eq!(element_text(soap, "faultstring").as_deref(), Some("CMS expirado"));
        assert_eq!(element_text(soap, "loginCmsReturn"), None);
    }

    #[test]
    fn test_element_text_missing_element() {
        assert_eq!(element_text("<a><b>x</b></a>", "c"), None);
    }
}
