//! Captive configuration portal.
//!
//! Implements [`PortalPort`]. While the device is unprovisioned it runs
//! an HTTP server on the fixed access point and serves one form: network
//! SSID/passphrase plus the five NVR fields, pre-populated with current
//! values. A valid submission is parked until the control loop takes it,
//! persists it, and restarts — the same pending-handoff shape as the WiFi
//! credential flow.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpServer` with `GET /`,
//!   `POST /save`, and a JSON status endpoint.
//! - **all other targets**: an in-memory submission queue driven by
//!   [`PortalAdapter::sim_submit`] / the shared [`parse_form`].

use log::info;

#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{PortalError, PortalPort, ProvisioningForm};
use crate::config::{self, AlarmConfig, clamp_str};

use super::utils::is_printable_ascii;

#[cfg(target_os = "espidf")]
use std::sync::{Arc, Mutex};

#[cfg(target_os = "espidf")]
use esp_idf_svc::http::server::{Configuration as HttpConfig, EspHttpServer};

/// Largest accepted form body. The seven fields plus URL-encoding
/// overhead stay well under this.
const MAX_FORM_BODY: usize = 768;

// ───────────────────────────────────────────────────────────────
// Form parsing (shared between the espidf handler and host tests)
// ───────────────────────────────────────────────────────────────

/// Parse an `application/x-www-form-urlencoded` submission.
///
/// Empty NVR fields inherit `current` — the form is pre-populated, so an
/// untouched field round-trips unchanged. The SSID is the only mandatory
/// field. The resulting record must pass [`config::validate`].
pub fn parse_form(body: &str, current: &AlarmConfig) -> Result<ProvisioningForm, PortalError> {
    if body.len() > MAX_FORM_BODY {
        return Err(PortalError::InvalidField("form body too large"));
    }

    let mut ssid = heapless::String::<32>::new();
    let mut passphrase = heapless::String::<64>::new();
    let mut config = current.clone();

    for pair in body.split('&') {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");
        let value = urlencoding::decode(value)
            .map_err(|_| PortalError::InvalidField("malformed URL encoding"))?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match key {
            "ssid" => {
                if value.len() > 32 || !is_printable_ascii(value) {
                    return Err(PortalError::InvalidField("ssid"));
                }
                ssid = clamp_str(value);
            }
            "pass" => {
                if value.len() < 8 || value.len() > 64 {
                    return Err(PortalError::InvalidField("pass"));
                }
                passphrase = clamp_str(value);
            }
            "addr" => config.server_address = clamp_str(value),
            "port" => {
                config.server_port = value
                    .parse::<u16>()
                    .ok()
                    .filter(|&p| p != 0)
                    .ok_or(PortalError::InvalidField("port"))?;
            }
            "user" => config.user_id = clamp_str(value),
            "pwd" => config.password = clamp_str(value),
            "suffix" => config.alarm_port_suffix = clamp_str(value),
            _ => {}
        }
    }

    if ssid.is_empty() {
        return Err(PortalError::InvalidField("ssid"));
    }
    config::validate(&config).map_err(|_| PortalError::InvalidField("nvr record"))?;

    Ok(ProvisioningForm {
        ssid,
        passphrase,
        config,
    })
}

/// Render the configuration form, pre-populated with `current`.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn render_form(current: &AlarmConfig) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>Panic Button Setup</title></head><body>\
         <h1>Panic Button Setup</h1>\
         <form method=\"post\" action=\"/save\">\
         <h2>Network</h2>\
         <label>WiFi SSID <input name=\"ssid\"></label><br>\
         <label>WiFi passphrase <input name=\"pass\" type=\"password\"></label><br>\
         <h2>NVR</h2>\
         <label>Address <input name=\"addr\" value=\"{}\"></label><br>\
         <label>Port <input name=\"port\" value=\"{}\"></label><br>\
         <label>User <input name=\"user\" value=\"{}\"></label><br>\
         <label>Password <input name=\"pwd\" type=\"password\" value=\"{}\"></label><br>\
         <label>Alarm port <input name=\"suffix\" value=\"{}\"></label><br>\
         <button type=\"submit\">Save &amp; restart</button>\
         </form></body></html>",
        current.server_address,
        current.server_port,
        current.user_id,
        current.password,
        current.alarm_port_suffix,
    )
}

// ───────────────────────────────────────────────────────────────
// Portal adapter
// ───────────────────────────────────────────────────────────────

pub struct PortalAdapter {
    active: bool,
    #[cfg(target_os = "espidf")]
    server: Option<EspHttpServer<'static>>,
    #[cfg(target_os = "espidf")]
    pending: Arc<Mutex<Option<ProvisioningForm>>>,
    #[cfg(not(target_os = "espidf"))]
    pending: Option<ProvisioningForm>,
}

impl PortalAdapter {
    pub fn new() -> Self {
        Self {
            active: false,
            #[cfg(target_os = "espidf")]
            server: None,
            #[cfg(target_os = "espidf")]
            pending: Arc::new(Mutex::new(None)),
            #[cfg(not(target_os = "espidf"))]
            pending: None,
        }
    }

    /// Simulation: inject a raw form body as if a browser had posted it.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_submit(
        &mut self,
        body: &str,
        current: &AlarmConfig,
    ) -> Result<(), PortalError> {
        if !self.active {
            return Err(PortalError::StartFailed);
        }
        let form = parse_form(body, current)?;
        info!("portal(sim): submission accepted for SSID '{}'", form.ssid);
        self.pending = Some(form);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self, current: &AlarmConfig) -> Result<(), PortalError> {
        use embedded_svc::http::Method;
        use embedded_svc::io::{Read, Write};

        let mut server =
            EspHttpServer::new(&HttpConfig::default()).map_err(|_| PortalError::StartFailed)?;

        let form_page = render_form(current);
        server
            .fn_handler("/", Method::Get, move |req| {
                let mut resp = req.into_ok_response()?;
                resp.write_all(form_page.as_bytes())?;
                Ok::<(), anyhow::Error>(())
            })
            .map_err(|_| PortalError::StartFailed)?;

        let current_for_save = current.clone();
        let pending = Arc::clone(&self.pending);
        server
            .fn_handler("/save", Method::Post, move |mut req| {
                let mut body = [0u8; MAX_FORM_BODY];
                let len = req.read(&mut body).unwrap_or(0);
                let body_str = core::str::from_utf8(&body[..len]).unwrap_or("");

                match parse_form(body_str, &current_for_save) {
                    Ok(form) => {
                        info!("portal: submission accepted for SSID '{}'", form.ssid);
                        *pending.lock().unwrap() = Some(form);
                        let mut resp = req.into_ok_response()?;
                        resp.write_all(b"Saved. The device is restarting.")?;
                    }
                    Err(e) => {
                        warn!("portal: submission rejected — {}", e);
                        let mut resp =
                            req.into_response(400, Some("Bad Request"), &[])?;
                        resp.write_all(b"Invalid form submission.")?;
                    }
                }
                Ok::<(), anyhow::Error>(())
            })
            .map_err(|_| PortalError::StartFailed)?;

        let current_for_status = current.clone();
        server
            .fn_handler("/api/config", Method::Get, move |req| {
                // Secrets stay out of the status endpoint.
                let json = serde_json::json!({
                    "server_address": current_for_status.server_address.as_str(),
                    "server_port": current_for_status.server_port,
                    "user_id": current_for_status.user_id.as_str(),
                    "alarm_port_suffix": current_for_status.alarm_port_suffix.as_str(),
                });
                let mut resp = req.into_response(
                    200,
                    Some("OK"),
                    &[("Content-Type", "application/json")],
                )?;
                resp.write_all(json.to_string().as_bytes())?;
                Ok::<(), anyhow::Error>(())
            })
            .map_err(|_| PortalError::StartFailed)?;

        self.server = Some(server);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self, _current: &AlarmConfig) -> Result<(), PortalError> {
        info!("portal(sim): serving configuration form");
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        self.server = None;
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        info!("portal(sim): stopped");
    }
}

impl Default for PortalAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalPort for PortalAdapter {
    fn start(&mut self, current: &AlarmConfig) -> Result<(), PortalError> {
        self.platform_start(current)?;
        self.active = true;
        info!("portal: configuration form available");
        Ok(())
    }

    fn stop(&mut self) {
        self.platform_stop();
        self.active = false;
        #[cfg(target_os = "espidf")]
        {
            *self.pending.lock().unwrap() = None;
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.pending = None;
        }
        info!("portal: stopped");
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn take_submission(&mut self) -> Option<ProvisioningForm> {
        #[cfg(target_os = "espidf")]
        {
            self.pending.lock().unwrap().take()
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.pending.take()
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
