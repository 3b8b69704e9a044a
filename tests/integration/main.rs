//! Host-side integration test harness.
//!
//! These run on the host (x86_64) and verify the full control-flow chain
//! from a raw button level down to the transport and storage adapters,
//! without any real hardware or timing.

mod mock_hw;

mod alarm_flow_tests;
mod factory_reset_tests;
mod provisioning_flow_tests;
