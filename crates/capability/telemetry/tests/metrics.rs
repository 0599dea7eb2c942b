use minemon_telemetry::{metrics, record_alert_raised, record_authz_check};

#[test]
fn counters_accumulate_into_snapshot() {
    let before = metrics().snapshot();
    record_alert_raised();
    record_authz_check();
    let after = metrics().snapshot();
    assert!(after.alerts_raised >= before.alerts_raised + 1);
    assert!(after.authz_checks >= before.authz_checks + 1);
}
