//! WiFi adapter — station mode plus the provisioning access point.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! connectivity. Owns the association state machine:
//!
//! ```text
//! Unprovisioned ──set_credentials──▶ Disconnected ──connect──▶ Connecting ──▶ Connected
//!        ▲                                ▲                                      │
//!        └──────clear_credentials─────────┴───────────poll (link lost)───────────┘
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`, handed in from `main()`.
//! - **all other targets**: simulation backend for host-side tests, with
//!   a controllable link flag.
//!
//! Retry policy lives in the control loop (indefinite blocking retry with
//! the 500 ms LED cadence) — this adapter performs single attempts.

use log::{info, warn};

use crate::app::ports::{ConnectivityError, ConnectivityPort, ConnectivityState};
use crate::config::{PROVISIONING_AP_PASSPHRASE, PROVISIONING_AP_SSID};

use super::utils::is_printable_ascii;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
    EspWifi,
};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

const MAX_SSID_LEN: usize = 32;
const MAX_PASSPHRASE_LEN: usize = 64;
const MIN_WPA2_PASSPHRASE_LEN: usize = 8;

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_passphrase(passphrase: &str) -> Result<(), ConnectivityError> {
    if passphrase.is_empty() {
        return Ok(());
    }
    if passphrase.len() < MIN_WPA2_PASSPHRASE_LEN || passphrase.len() > MAX_PASSPHRASE_LEN {
        return Err(ConnectivityError::InvalidPassphrase);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: ConnectivityState,
    ssid: heapless::String<32>,
    passphrase: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    driver: BlockingWifi<EspWifi<'static>>,
    /// Simulation: link health, toggled by tests.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    /// Simulation: fail the next N connect attempts.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_failures: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: BlockingWifi<EspWifi<'static>>) -> Self {
        Self {
            state: ConnectivityState::Unprovisioned,
            ssid: heapless::String::new(),
            passphrase: heapless::String::new(),
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: ConnectivityState::Unprovisioned,
            ssid: heapless::String::new(),
            passphrase: heapless::String::new(),
            sim_link_up: true,
            sim_connect_failures: 0,
        }
    }

    /// Bring up the fixed provisioning access point. Station state is
    /// abandoned; the device restarts after a portal save.
    pub fn start_access_point(&mut self) -> Result<(), ConnectivityError> {
        info!(
            "WiFi: starting provisioning AP '{}'",
            PROVISIONING_AP_SSID
        );
        self.platform_start_ap()?;
        self.state = ConnectivityState::Unprovisioned;
        Ok(())
    }

    // ── Simulation hooks ──────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_restore_link(&mut self) {
        self.sim_link_up = true;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_fail_next_connects(&mut self, n: u32) {
        self.sim_connect_failures = n;
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        let ssid = self
            .ssid
            .as_str()
            .try_into()
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        let password = self
            .passphrase
            .as_str()
            .try_into()
            .map_err(|_| ConnectivityError::InvalidPassphrase)?;
        let auth_method = if self.passphrase.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let client_cfg = ClientConfiguration {
            ssid,
            password,
            auth_method,
            ..Default::default()
        };
        self.driver
            .set_configuration(&Configuration::Client(client_cfg))
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        self.driver
            .start()
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        self.driver
            .connect()
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        self.driver
            .wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_connect_failures > 0 {
            self.sim_connect_failures -= 1;
            warn!("WiFi(sim): simulated connect failure");
            return Err(ConnectivityError::ConnectFailed);
        }
        self.sim_link_up = true;
        info!("WiFi(sim): connected to '{}'", self.ssid);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_disconnect(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            warn!("WiFi: disconnect returned {:?}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_disconnect(&mut self) {
        info!("WiFi(sim): disconnected");
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.sim_link_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_ap(&mut self) -> Result<(), ConnectivityError> {
        let ssid = PROVISIONING_AP_SSID
            .try_into()
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        let password = PROVISIONING_AP_PASSPHRASE
            .try_into()
            .map_err(|_| ConnectivityError::InvalidPassphrase)?;
        let ap_cfg = AccessPointConfiguration {
            ssid,
            password,
            auth_method: AuthMethod::WPA2Personal,
            channel: 1,
            ..Default::default()
        };
        self.driver
            .set_configuration(&Configuration::AccessPoint(ap_cfg))
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        self.driver
            .start()
            .map_err(|_| ConnectivityError::ConnectFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_ap(&mut self) -> Result<(), ConnectivityError> {
        info!(
            "WiFi(sim): AP '{}' up (passphrase '{}')",
            PROVISIONING_AP_SSID, PROVISIONING_AP_PASSPHRASE
        );
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn state(&self) -> ConnectivityState {
        self.state
    }

    fn has_credentials(&self) -> bool {
        !self.ssid.is_empty()
    }

    fn set_credentials(&mut self, ssid: &str, passphrase: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_passphrase(passphrase)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.passphrase.clear();
        self.passphrase
            .push_str(passphrase)
            .map_err(|_| ConnectivityError::InvalidPassphrase)?;
        if self.state == ConnectivityState::Unprovisioned {
            self.state = ConnectivityState::Disconnected;
        }
        info!("WiFi: credentials updated (SSID='{}')", self.ssid);
        Ok(())
    }

    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == ConnectivityState::Connected {
            return Ok(());
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = ConnectivityState::Connecting;

        match self.platform_connect() {
            Ok(()) => {
                self.state = ConnectivityState::Connected;
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                warn!("WiFi: connection failed — {}", e);
                self.state = ConnectivityState::Disconnected;
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        if self.state != ConnectivityState::Unprovisioned {
            self.state = ConnectivityState::Disconnected;
        }
        info!("WiFi: disconnected");
    }

    fn poll(&mut self) {
        if self.state == ConnectivityState::Connected && !self.platform_is_connected() {
            warn!("WiFi: link lost");
            self.state = ConnectivityState::Disconnected;
        }
    }

    fn clear_credentials(&mut self) {
        self.platform_disconnect();
        self.ssid.clear();
        self.passphrase.clear();
        self.state = ConnectivityState::Unprovisioned;
        info!("WiFi: credentials cleared");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unprovisioned() {
        let a = WifiAdapter::new();
        assert_eq!(a.state(), ConnectivityState::Unprovisioned);
        assert!(!a.has_credentials());
    }

    #[test]
    fn rejects_empty_ssid() {
        let mut a = WifiAdapter::new();
        assert_eq!(
            a.set_credentials("", "password123"),
            Err(ConnectivityError::InvalidSsid)
        );
    }

    #[test]
    fn rejects_short_passphrase() {
        let mut a = WifiAdapter::new();
        assert_eq!(
            a.set_credentials("MyNet", "short"),
            Err(ConnectivityError::InvalidPassphrase)
        );
    }

    #[test]
    fn accepts_open_network() {
        let mut a = WifiAdapter::new();
        assert!(a.set_credentials("OpenCafe", "").is_ok());
    }

    #[test]
    fn credentials_move_state_to_disconnected() {
        let mut a = WifiAdapter::new();
        a.set_credentials("HomeWiFi", "mysecret8").unwrap();
        assert_eq!(a.state(), ConnectivityState::Disconnected);
        assert!(a.has_credentials());
    }

    #[test]
    fn connect_without_credentials_fails() {
        let mut a = WifiAdapter::new();
        assert_eq!(a.connect(), Err(ConnectivityError::NoCredentials));
    }

    #[test]
    fn connect_disconnect_roundtrip() {
        let mut a = WifiAdapter::new();
        a.set_credentials("TestNet", "password1").unwrap();
        a.connect().unwrap();
        assert_eq!(a.state(), ConnectivityState::Connected);
        a.disconnect();
        assert_eq!(a.state(), ConnectivityState::Disconnected);
    }

    #[test]
    fn connect_while_connected_is_a_no_op() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Net", "password1").unwrap();
        a.connect().unwrap();
        assert!(a.connect().is_ok());
        assert_eq!(a.state(), ConnectivityState::Connected);
    }

    #[test]
    fn failed_connect_lands_in_disconnected() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Net", "password1").unwrap();
        a.sim_fail_next_connects(1);
        assert_eq!(a.connect(), Err(ConnectivityError::ConnectFailed));
        assert_eq!(a.state(), ConnectivityState::Disconnected);
        a.connect().unwrap();
        assert_eq!(a.state(), ConnectivityState::Connected);
    }

    #[test]
    fn poll_detects_link_loss() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Net", "password1").unwrap();
        a.connect().unwrap();
        a.sim_drop_link();
        a.poll();
        assert_eq!(a.state(), ConnectivityState::Disconnected);
    }

    #[test]
    fn poll_is_quiet_while_link_healthy() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Net", "password1").unwrap();
        a.connect().unwrap();
        a.poll();
        assert_eq!(a.state(), ConnectivityState::Connected);
    }

    #[test]
    fn clear_credentials_returns_to_unprovisioned() {
        let mut a = WifiAdapter::new();
        a.set_credentials("Net", "password1").unwrap();
        a.connect().unwrap();
        a.clear_credentials();
        assert_eq!(a.state(), ConnectivityState::Unprovisioned);
        assert!(!a.has_credentials());
    }

    #[test]
    fn access_point_mode_reports_unprovisioned() {
        let mut a = WifiAdapter::new();
        a.start_access_point().unwrap();
        assert_eq!(a.state(), ConnectivityState::Unprovisioned);
    }
}
