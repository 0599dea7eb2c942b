use domain::{AlertSeverity, MonitoredEntity, SensorType, StatusTier};

#[test]
fn tiers_are_totally_ordered() {
    assert!(StatusTier::Normal < StatusTier::Warning);
    assert!(StatusTier::Warning < StatusTier::Critical);
    assert_eq!(
        StatusTier::Warning.max(StatusTier::Critical),
        StatusTier::Critical
    );
}

#[test]
fn tier_codes_round_trip() {
    for tier in [StatusTier::Normal, StatusTier::Warning, StatusTier::Critical] {
        assert_eq!(StatusTier::parse(tier.as_str()), Some(tier));
    }
    assert_eq!(StatusTier::parse("unknown"), None);
}

#[test]
fn severity_from_tier_skips_normal() {
    assert_eq!(AlertSeverity::from_tier(StatusTier::Normal), None);
    assert_eq!(
        AlertSeverity::from_tier(StatusTier::Warning),
        Some(AlertSeverity::Warning)
    );
    assert_eq!(
        AlertSeverity::from_tier(StatusTier::Critical),
        Some(AlertSeverity::Critical)
    );
}

#[test]
fn sensor_types_carry_units() {
    assert_eq!(SensorType::Gas.unit(), "PPM");
    assert_eq!(SensorType::Strain.unit(), "MPa");
    for sensor_type in SensorType::ALL {
        assert_eq!(SensorType::parse(sensor_type.as_str()), Some(sensor_type));
    }
}

#[test]
fn entity_keys_are_stable() {
    assert_eq!(MonitoredEntity::mine("m1").key(), "mine:m1");
    assert_eq!(MonitoredEntity::sector("m1", "s2").key(), "sector:m1:s2");
    let sensor = MonitoredEntity::sensor("m1", "s2", "x9");
    assert_eq!(sensor.key(), "sensor:m1:s2:x9");
    assert_eq!(sensor.mine_id(), "m1");
    assert_eq!(sensor.sector_id(), Some("s2"));
    assert_eq!(sensor.sensor_id(), Some("x9"));
}
