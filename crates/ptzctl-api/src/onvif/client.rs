// SOAP-over-HTTP client for one ONVIF device
//
// Wraps `reqwest::Client` with envelope construction, WS-Security
// signing, and fault mapping. The service-specific request bodies live
// in `driver.rs`.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use super::{soap, xml};
use crate::error::Error;

/// ONVIF service namespaces, one per WSDL the driver talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Service {
    Device,
    Media,
    Ptz,
    Imaging,
}

pub(crate) const NS_SCHEMA: &str = "http://www.onvif.org/ver10/schema";

impl Service {
    pub(crate) const fn namespace(self) -> &'static str {
        match self {
            Self::Device => "http://www.onvif.org/ver10/device/wsdl",
            Self::Media => "http://www.onvif.org/ver10/media/wsdl",
            Self::Ptz => "http://www.onvif.org/ver20/ptz/wsdl",
            Self::Imaging => "http://www.onvif.org/ver20/imaging/wsdl",
        }
    }

    pub(crate) const fn prefix(self) -> &'static str {
        match self {
            Self::Device => "tds",
            Self::Media => "trt",
            Self::Ptz => "tptz",
            Self::Imaging => "timg",
        }
    }
}

/// Signs and posts SOAP requests, returning the raw response body.
#[derive(Debug)]
pub(crate) struct SoapClient {
    http: reqwest::Client,
    username: String,
    password: SecretString,
}

impl SoapClient {
    pub(crate) fn new(http: reqwest::Client, username: String, password: SecretString) -> Self {
        Self {
            http,
            username,
            password,
        }
    }

    /// Invoke `operation` on `service` at `url` and parse the response.
    ///
    /// `inner` is the XML placed inside the operation element; it may use
    /// the service prefix and the `tt:` schema prefix, both of which are
    /// declared on the operation element.
    pub(crate) async fn call(
        &self,
        url: &Url,
        service: Service,
        operation: &str,
        inner: &str,
    ) -> Result<xml::Element, Error> {
        let prefix = service.prefix();
        let ns = service.namespace();
        let body = format!(
            r#"<{prefix}:{operation} xmlns:{prefix}="{ns}" xmlns:tt="{NS_SCHEMA}">{inner}</{prefix}:{operation}>"#
        );

        let header = if self.username.is_empty() {
            None
        } else {
            Some(soap::security_header(
                &self.username,
                self.password.expose_secret(),
            ))
        };
        let envelope = soap::envelope(header.as_deref(), &body);

        debug!(%url, operation, "SOAP request");
        trace!(body = %body, "SOAP body");

        let resp = self
            .http
            .post(url.clone())
            .header(
                reqwest::header::CONTENT_TYPE,
                format!(r#"application/soap+xml; charset=utf-8; action="{ns}/{operation}""#),
            )
            .body(envelope)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;
        trace!(status = status.as_u16(), len = text.len(), "SOAP response");

        // Error pages from embedded web servers are often not XML at all.
        let document = xml::parse(&text);
        if let Some((code, reason)) = document.as_ref().ok().and_then(xml::fault) {
            return Err(if code.ends_with("NotAuthorized") {
                Error::Authentication { message: reason }
            } else {
                Error::Fault { code, reason }
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "device rejected credentials (HTTP 401)".into(),
            });
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
            });
        }

        document
    }
}
