//! Integration tests for the portal → storage provisioning flow.
//!
//! Verifies the end-to-end sequence: the portal accepts a form
//! submission, the control loop persists it, and the next boot
//! reconnects with the saved record.

use panicbutton::adapters::portal::PortalAdapter;
use panicbutton::adapters::wifi::WifiAdapter;
use panicbutton::app::ports::{ConnectivityPort, ConnectivityState, PortalPort};
use panicbutton::config::AlarmConfig;
use panicbutton::store;

use crate::mock_hw::MockStorage;

const BODY: &str =
    "ssid=HomeWiFi&pass=hunter22&addr=10.0.0.5&port=8080&user=operator&pwd=secret&suffix=17";

#[test]
fn portal_submission_persists_record_and_credentials() {
    let mut storage = MockStorage::new();
    let current = store::load(&storage);
    assert_eq!(current, AlarmConfig::default(), "first boot sees defaults");

    let mut portal = PortalAdapter::new();
    portal.start(&current).unwrap();
    portal.sim_submit(BODY, &current).unwrap();

    // What the provisioning loop does with a submission.
    let form = portal.take_submission().unwrap();
    store::save(&mut storage, &form.config).unwrap();
    store::save_credentials(&mut storage, &form.ssid, &form.passphrase).unwrap();
    portal.stop();

    // Next boot: record and credentials come back verbatim.
    let loaded = store::load(&storage);
    assert_eq!(loaded.server_address.as_str(), "10.0.0.5");
    assert_eq!(loaded.server_port, 8080);
    assert_eq!(loaded.user_id.as_str(), "operator");
    assert_eq!(loaded.password.as_str(), "secret");
    assert_eq!(loaded.alarm_port_suffix.as_str(), "17");

    let (ssid, passphrase) = store::load_credentials(&storage).unwrap();
    assert_eq!(ssid.as_str(), "HomeWiFi");
    assert_eq!(passphrase.as_str(), "hunter22");
}

#[test]
fn saved_credentials_feed_the_wifi_adapter_on_next_boot() {
    let mut storage = MockStorage::new();
    store::save_credentials(&mut storage, "HomeWiFi", "hunter22").unwrap();

    // Boot sequence from main(): load credentials, hand to the adapter.
    let mut wifi = WifiAdapter::new();
    assert_eq!(wifi.state(), ConnectivityState::Unprovisioned);

    let (ssid, passphrase) = store::load_credentials(&storage).unwrap();
    wifi.set_credentials(&ssid, &passphrase).unwrap();
    assert!(wifi.has_credentials());
    assert_eq!(wifi.state(), ConnectivityState::Disconnected);

    wifi.connect().unwrap();
    assert_eq!(wifi.state(), ConnectivityState::Connected);
}

#[test]
fn invalid_submission_leaves_nothing_pending() {
    let current = AlarmConfig::default();
    let mut portal = PortalAdapter::new();
    portal.start(&current).unwrap();

    assert!(portal.sim_submit("addr=10.0.0.5", &current).is_err());
    assert!(portal.take_submission().is_none());
}

#[test]
fn untouched_form_fields_keep_current_record() {
    let mut storage = MockStorage::new();
    let existing = AlarmConfig {
        server_port: 9000,
        ..Default::default()
    };
    store::save(&mut storage, &existing).unwrap();

    let current = store::load(&storage);
    let mut portal = PortalAdapter::new();
    portal.start(&current).unwrap();
    // The user only fills in the network section.
    portal.sim_submit("ssid=Net&pass=password1", &current).unwrap();

    let form = portal.take_submission().unwrap();
    assert_eq!(form.config, existing);
}

#[test]
fn provisioning_save_is_one_commit_per_region() {
    let mut storage = MockStorage::new();
    let current = AlarmConfig::default();
    let mut portal = PortalAdapter::new();
    portal.start(&current).unwrap();
    portal.sim_submit(BODY, &current).unwrap();
    let form = portal.take_submission().unwrap();

    store::save(&mut storage, &form.config).unwrap();
    // The whole record is one blob write — all five fields commit together.
    assert_eq!(storage.writes, 1);
}
