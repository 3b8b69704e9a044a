//! End-to-end alarm flow: raw button level → debounce → dispatch → LED.

use panicbutton::app::ports::{ClockPort, ConnectivityPort};
use panicbutton::app::service::{AppService, TickOutcome};
use panicbutton::adapters::wifi::WifiAdapter;
use panicbutton::app::events::AppEvent;
use panicbutton::config::{AlarmConfig, CONTROL_TICK_MS};
use panicbutton::dispatch::DispatchResult;

use crate::mock_hw::{EventSpy, FakeClock, MockHardware, MockStorage, MockTransport, timeline};

struct Rig {
    app: AppService,
    hw: MockHardware,
    wifi: WifiAdapter,
    storage: MockStorage,
    clock: FakeClock,
    sink: EventSpy,
}

impl Rig {
    fn connected() -> Self {
        let now = timeline();
        let mut wifi = WifiAdapter::new();
        wifi.set_credentials("TestNet", "password1").unwrap();
        wifi.connect().unwrap();
        Self {
            app: AppService::new(AlarmConfig::default()),
            hw: MockHardware::new(now.clone()),
            wifi,
            storage: MockStorage::new(),
            clock: FakeClock::new(now),
            sink: EventSpy::new(),
        }
    }

    /// Hold the button at `level` for `ms`, ticking at the control rate.
    fn drive(&mut self, transport: &mut MockTransport, level: bool, ms: u64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        let ticks = ms / u64::from(CONTROL_TICK_MS);
        for _ in 0..ticks {
            self.hw.set_pressed(level);
            let now = self.clock.now_ms();
            let outcome = self.app.tick(
                now,
                &mut self.hw,
                &mut self.wifi,
                transport,
                &mut self.storage,
                &mut self.clock,
                &mut self.sink,
            );
            if outcome != TickOutcome::Idle {
                outcomes.push(outcome);
            }
            self.clock.sleep_ms(CONTROL_TICK_MS);
        }
        outcomes
    }
}

#[test]
fn happy_path_press_dispatches_and_blinks_success() {
    let mut rig = Rig::connected();
    let mut transport = MockTransport::replying(200);

    let mut outcomes = rig.drive(&mut transport, true, 300);
    outcomes.extend(rig.drive(&mut transport, false, 200));

    assert_eq!(outcomes, vec![TickOutcome::Dispatched(DispatchResult::Success)]);
    assert_eq!(transport.sent.len(), 1);
    assert_eq!(
        transport.sent[0].url,
        "http://192.168.0.100:80/TriggerVirtualAlarm/9"
    );

    // Two blinks, each half-cycle 200 ms.
    assert_eq!(rig.hw.blink_count(), 2);
    let trace = &rig.hw.led_trace;
    assert_eq!(trace.len(), 4);
    for pair in trace.windows(2) {
        assert_eq!(pair[1].0 - pair[0].0, 200);
    }

    assert!(
        rig.sink
            .events
            .contains(&AppEvent::AlarmDispatched(DispatchResult::Success))
    );
}

#[test]
fn failure_status_blinks_five_times_fast() {
    let mut rig = Rig::connected();
    let mut transport = MockTransport::replying(401);

    let mut outcomes = rig.drive(&mut transport, true, 300);
    outcomes.extend(rig.drive(&mut transport, false, 200));

    assert_eq!(
        outcomes,
        vec![TickOutcome::Dispatched(DispatchResult::HttpStatusFailure(401))]
    );
    assert_eq!(rig.hw.blink_count(), 5);
    let trace = &rig.hw.led_trace;
    for pair in trace.windows(2) {
        assert_eq!(pair[1].0 - pair[0].0, 100);
    }
}

#[test]
fn offline_press_is_lost_without_a_network_call() {
    let mut rig = Rig::connected();
    rig.wifi.sim_drop_link();
    rig.wifi.poll();

    let mut transport = MockTransport::replying(200);
    let mut outcomes = rig.drive(&mut transport, true, 300);
    outcomes.extend(rig.drive(&mut transport, false, 200));

    assert_eq!(
        outcomes,
        vec![TickOutcome::Dispatched(DispatchResult::TransportUnavailable)]
    );
    assert!(transport.sent.is_empty(), "no request while disconnected");
    // The failure pattern still tells the user the press was lost.
    assert_eq!(rig.hw.blink_count(), 5);
}

#[test]
fn transport_open_failure_reports_and_blinks_failure() {
    let mut rig = Rig::connected();
    let mut transport =
        MockTransport::failing(panicbutton::app::ports::TransportError::OpenFailed);

    let mut outcomes = rig.drive(&mut transport, true, 300);
    outcomes.extend(rig.drive(&mut transport, false, 200));

    assert_eq!(
        outcomes,
        vec![TickOutcome::Dispatched(DispatchResult::TransportOpenFailure)]
    );
    assert_eq!(rig.hw.blink_count(), 5);
}

#[test]
fn press_during_dispatch_window_is_not_queued() {
    let mut rig = Rig::connected();
    let mut transport = MockTransport::replying(200);

    // First press dispatches.
    rig.drive(&mut transport, true, 300);
    rig.drive(&mut transport, false, 200);
    assert_eq!(transport.sent.len(), 1);

    // A second full press dispatches again — one request per press,
    // nothing accumulated from the blocking window.
    rig.drive(&mut transport, true, 300);
    rig.drive(&mut transport, false, 200);
    assert_eq!(transport.sent.len(), 2);
}

#[test]
fn sub_debounce_blip_never_reaches_the_transport() {
    let mut rig = Rig::connected();
    let mut transport = MockTransport::replying(200);

    let outcomes = rig.drive(&mut transport, true, 30);
    let outcomes2 = rig.drive(&mut transport, false, 300);

    assert!(outcomes.is_empty() && outcomes2.is_empty());
    assert!(transport.sent.is_empty());
}

#[test]
fn reconnect_loop_blinks_at_500ms_until_link_returns() {
    let mut rig = Rig::connected();
    rig.wifi.sim_drop_link();
    rig.wifi.poll();
    rig.wifi.sim_fail_next_connects(2);

    let state = rig
        .app
        .ensure_connected(&mut rig.wifi, &mut rig.hw, &mut rig.clock, &mut rig.sink);

    assert_eq!(state, panicbutton::app::ports::ConnectivityState::Connected);
    // Two failures → two on/off cycles at the 500 ms cadence.
    assert_eq!(rig.clock.slept, vec![500, 500, 500, 500]);
    assert_eq!(rig.hw.blink_count(), 2);
}
