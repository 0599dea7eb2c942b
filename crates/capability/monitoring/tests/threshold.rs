use domain::{SensorType, StatusTier};
use minemon_monitoring::{ThresholdBounds, ThresholdError, ThresholdTable};

#[test]
fn evaluation_matches_boundaries() {
    let table = ThresholdTable::defaults();
    // gas: warning 50, critical 100
    assert_eq!(
        table.evaluate(SensorType::Gas, 49.9).expect("eval"),
        StatusTier::Normal
    );
    assert_eq!(
        table.evaluate(SensorType::Gas, 50.0).expect("eval"),
        StatusTier::Warning
    );
    assert_eq!(
        table.evaluate(SensorType::Gas, 99.9).expect("eval"),
        StatusTier::Warning
    );
    assert_eq!(
        table.evaluate(SensorType::Gas, 100.0).expect("eval"),
        StatusTier::Critical
    );
}

#[test]
fn evaluation_is_monotonic_in_value() {
    let table = ThresholdTable::defaults();
    for sensor_type in SensorType::ALL {
        let mut last = StatusTier::Normal;
        let mut value = -10.0;
        while value < 500.0 {
            let tier = table.evaluate(sensor_type, value).expect("eval");
            assert!(tier >= last, "tier dropped for {sensor_type:?} at {value}");
            last = tier;
            value += 0.5;
        }
    }
}

#[test]
fn inverted_bounds_are_rejected() {
    let err = ThresholdTable::new([(
        SensorType::Gas,
        ThresholdBounds {
            warning: 100.0,
            critical: 50.0,
        },
    )])
    .expect_err("inverted");
    assert!(matches!(err, ThresholdError::InvalidBounds { .. }));

    // warning == critical 同样非法
    let err = ThresholdTable::new([(
        SensorType::Gas,
        ThresholdBounds {
            warning: 50.0,
            critical: 50.0,
        },
    )])
    .expect_err("equal");
    assert!(matches!(err, ThresholdError::InvalidBounds { .. }));
}

#[test]
fn missing_type_fails_instead_of_defaulting() {
    let table = ThresholdTable::new([(
        SensorType::Gas,
        ThresholdBounds {
            warning: 50.0,
            critical: 100.0,
        },
    )])
    .expect("table");
    let err = table
        .evaluate(SensorType::Seismic, 1.0)
        .expect_err("unknown");
    assert!(matches!(err, ThresholdError::UnknownSensorType(_)));
}

#[test]
fn json_overrides_replace_defaults() {
    let table = ThresholdTable::defaults_with_overrides_json(
        r#"{"gas": {"warning": 30, "critical": 60}}"#,
    )
    .expect("table");
    assert_eq!(
        table.evaluate(SensorType::Gas, 40.0).expect("eval"),
        StatusTier::Warning
    );
    // 其他类型保持默认
    assert_eq!(
        table.evaluate(SensorType::Temperature, 40.0).expect("eval"),
        StatusTier::Warning
    );
}

#[test]
fn json_overrides_validate_names_and_bounds() {
    assert!(matches!(
        ThresholdTable::defaults_with_overrides_json(r#"{"plasma": {"warning": 1, "critical": 2}}"#),
        Err(ThresholdError::UnknownSensorType(_))
    ));
    assert!(matches!(
        ThresholdTable::defaults_with_overrides_json(r#"{"gas": {"warning": 9, "critical": 3}}"#),
        Err(ThresholdError::InvalidBounds { .. })
    ));
    assert!(matches!(
        ThresholdTable::defaults_with_overrides_json("not json"),
        Err(ThresholdError::InvalidJson(_))
    ));
}
