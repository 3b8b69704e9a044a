//! HTTP transport adapter for the alarm POST.
//!
//! Implements [`TransportPort`] over the ESP-IDF HTTP client. Each send
//! opens a fresh connection (the NVR expects `Connection: close` anyway),
//! issues the single POST with Basic auth, reads what it can of the
//! response body for the log, and returns the status code.
//!
//! The 5 s timeout is the only bound on the transaction; there is no
//! cancellation of an in-flight request.

use log::info;

use crate::app::ports::{TransportError, TransportPort};
use crate::dispatch::AlarmRequest;

#[cfg(target_os = "espidf")]
use crate::config::HTTP_TIMEOUT_MS;

pub struct HttpTransport {
    /// Simulation: scripted response for host-side runs.
    #[cfg(not(target_os = "espidf"))]
    sim_response: Result<u16, TransportError>,
    #[cfg(not(target_os = "espidf"))]
    sim_sent: u32,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_response: Ok(200),
            #[cfg(not(target_os = "espidf"))]
            sim_sent: 0,
        }
    }

    // ── Simulation hooks ──────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_response(&mut self, response: Result<u16, TransportError>) {
        self.sim_response = response;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_sent_count(&self) -> u32 {
        self.sim_sent
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_send(&mut self, request: &AlarmRequest) -> Result<u16, TransportError> {
        use embedded_svc::http::Status;
        use embedded_svc::http::client::Client;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(core::time::Duration::from_millis(u64::from(
                HTTP_TIMEOUT_MS,
            ))),
            ..Default::default()
        })
        .map_err(|_| TransportError::OpenFailed)?;
        let mut client = Client::wrap(connection);

        let content_length = request.body.len().to_string();
        let headers = [
            ("Content-Type", "application/xml"),
            ("Accept", "application/xml"),
            ("Connection", "close"),
            ("Content-Length", content_length.as_str()),
            ("Authorization", request.authorization.as_str()),
        ];

        let mut post = client
            .post(&request.url, &headers)
            .map_err(|_| TransportError::OpenFailed)?;
        post.write_all(request.body.as_bytes())
            .map_err(|_| TransportError::RequestFailed)?;

        let mut response = post.submit().map_err(|_| TransportError::RequestFailed)?;
        let status = response.status();

        // The response body is not parsed, only logged.
        let mut body = [0u8; 256];
        if let Ok(n) = response.read(&mut body) {
            if n > 0 {
                info!(
                    "http: response body: {}",
                    String::from_utf8_lossy(&body[..n])
                );
            }
        }

        Ok(status)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_send(&mut self, request: &AlarmRequest) -> Result<u16, TransportError> {
        self.sim_sent += 1;
        info!("http(sim): POST {} ({} bytes)", request.url, request.body.len());
        self.sim_response
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportPort for HttpTransport {
    fn send(&mut self, request: &AlarmRequest) -> Result<u16, TransportError> {
        self.platform_send(request)
    }
}
