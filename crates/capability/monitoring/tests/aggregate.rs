use domain::StatusTier;
use minemon_monitoring::aggregate;

#[test]
fn empty_aggregates_to_normal() {
    assert_eq!(aggregate([]), StatusTier::Normal);
}

#[test]
fn worst_tier_wins() {
    assert_eq!(
        aggregate([StatusTier::Warning, StatusTier::Normal, StatusTier::Critical]),
        StatusTier::Critical
    );
    assert_eq!(
        aggregate([StatusTier::Normal, StatusTier::Normal]),
        StatusTier::Normal
    );
    assert_eq!(
        aggregate([StatusTier::Normal, StatusTier::Warning]),
        StatusTier::Warning
    );
}

#[test]
fn order_does_not_matter() {
    let tiers = [
        StatusTier::Normal,
        StatusTier::Warning,
        StatusTier::Critical,
        StatusTier::Warning,
    ];
    let expected = aggregate(tiers);

    // 所有旋转与一次反转都应得到同一结果
    for start in 0..tiers.len() {
        let mut rotated = tiers.to_vec();
        rotated.rotate_left(start);
        assert_eq!(aggregate(rotated), expected);
    }
    let mut reversed = tiers.to_vec();
    reversed.reverse();
    assert_eq!(aggregate(reversed), expected);
}

#[test]
fn incremental_aggregation_matches_batch() {
    let tiers = [StatusTier::Warning, StatusTier::Normal, StatusTier::Critical];
    let batch = aggregate(tiers);
    let incremental = tiers
        .into_iter()
        .fold(StatusTier::Normal, |acc, tier| aggregate([acc, tier]));
    assert_eq!(batch, incremental);
}
