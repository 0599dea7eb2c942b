/// 采集源输入的原始读数（按到达原样保留，未经标定）。
#[derive(Debug, Clone)]
pub struct RawReading {
    pub mine_id: String,
    pub sector_id: String,
    pub sensor_id: String,
    pub payload: Vec<u8>,
    pub received_at_ms: i64,
}

/// 标定后的读数：已应用传感器标定系数，可直接做阈值评估。
#[derive(Debug, Clone)]
pub struct CalibratedReading {
    pub mine_id: String,
    pub sector_id: String,
    pub sensor_id: String,
    pub sensor_type: crate::SensorType,
    pub value: f64,
    pub ts_ms: i64,
}
