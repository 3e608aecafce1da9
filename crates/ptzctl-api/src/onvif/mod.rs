// ── ONVIF driver ──
//
// Talks SOAP 1.2 to the device, media, PTZ and imaging services of an
// ONVIF camera. Service addresses come from GetCapabilities; their paths
// are re-rooted onto the configured host and port, since cameras behind
// NAT or port forwards routinely advertise internal addresses.

mod client;
mod driver;
mod soap;
mod xml;

pub use driver::OnvifDriver;

use tracing::debug;
use url::Url;

use self::client::{Service, SoapClient};
use crate::driver::{DeviceEndpoint, DriverConnector};
use crate::error::Error;
use crate::transport::TransportConfig;

const DEVICE_SERVICE_PATH: &str = "/onvif/device_service";

/// Connects to ONVIF cameras over a shared HTTP client.
#[derive(Debug, Clone)]
pub struct OnvifConnector {
    http: reqwest::Client,
}

impl OnvifConnector {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Use a pre-built HTTP client (tests, custom middleware).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl DriverConnector for OnvifConnector {
    type Driver = OnvifDriver;

    async fn connect(&self, endpoint: &DeviceEndpoint) -> Result<OnvifDriver, Error> {
        let device_url = Url::parse(&format!(
            "http://{}{DEVICE_SERVICE_PATH}",
            endpoint.address()
        ))?;
        let soap = SoapClient::new(
            self.http.clone(),
            endpoint.username.clone(),
            endpoint.password.clone(),
        );

        let caps = soap
            .call(
                &device_url,
                Service::Device,
                "GetCapabilities",
                "<tds:Category>All</tds:Category>",
            )
            .await?;
        let media = service_url(&device_url, &caps, "Media").unwrap_or_else(|| device_url.clone());
        let ptz = service_url(&device_url, &caps, "PTZ").unwrap_or_else(|| device_url.clone());
        let imaging = service_url(&device_url, &caps, "Imaging");

        let profiles = soap.call(&media, Service::Media, "GetProfiles", "").await?;
        let profile_token = profiles
            .child("Profiles")
            .and_then(|p| p.attr("token"))
            .map(str::to_owned)
            .ok_or_else(|| Error::protocol("device reported no media profiles"))?;

        let sources = soap
            .call(&media, Service::Media, "GetVideoSources", "")
            .await?;
        let video_source = sources
            .child("VideoSources")
            .and_then(|v| v.attr("token"))
            .map(str::to_owned);

        debug!(
            address = %endpoint.address(),
            profile = %profile_token,
            video_source = ?video_source,
            imaging = imaging.is_some(),
            "ONVIF services resolved"
        );

        let driver = OnvifDriver::new(soap, ptz, imaging, profile_token, video_source);

        // A status read proves the PTZ service answers for this profile.
        driver.read_status().await?;
        Ok(driver)
    }
}

/// XAddr of a capability section, re-rooted onto the device URL.
fn service_url(device_url: &Url, capabilities: &xml::Element, section: &str) -> Option<Url> {
    let xaddr = capabilities.child(section)?.child_text("XAddr")?;
    let advertised = Url::parse(&xaddr).ok()?;
    device_url.join(advertised.path()).ok()
}
