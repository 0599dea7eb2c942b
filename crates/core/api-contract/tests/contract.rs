use api_contract::{AlertsQuery, LoginRequest, LoginResponse, RefreshTokenRequest, SensorDto};
use serde_json::Value;

#[test]
fn login_response_is_camel_case() {
    let response = LoginResponse {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires: 1_700_000_000_000,
        username: "admin".to_string(),
        nickname: "admin".to_string(),
        avatar: "".to_string(),
        roles: vec!["admin".to_string()],
        permissions: vec![],
    };
    let value = serde_json::to_value(response).expect("serialize");
    assert!(value.get("accessToken").is_some());
    assert!(value.get("refreshToken").is_some());
    assert!(value.get("access_token").is_none());
}

#[test]
fn login_request_uses_email() {
    let payload = r#"{"email":"chief@mine.example","password":"secret"}"#;
    let req: LoginRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.email, "chief@mine.example");
}

#[test]
fn refresh_token_request_accepts_both_casings() {
    let req: RefreshTokenRequest =
        serde_json::from_str(r#"{"refreshToken":"token-1"}"#).expect("parse");
    assert_eq!(req.refresh_token, "token-1");
    let req: RefreshTokenRequest =
        serde_json::from_str(r#"{"refresh_token":"token-2"}"#).expect("parse");
    assert_eq!(req.refresh_token, "token-2");
}

#[test]
fn sensor_dto_is_camel_case() {
    let dto = SensorDto {
        sensor_id: "sensor-1".to_string(),
        mine_id: "mine-1".to_string(),
        sector_id: "sector-1".to_string(),
        sensor_type: "gas".to_string(),
        unit: "PPM".to_string(),
        location: "north gallery".to_string(),
        latitude: 0.0,
        longitude: 0.0,
        status: "active".to_string(),
        calibration_scale: 1.0,
        calibration_offset: 0.0,
        calibrated_at_ms: None,
        manufacturer: None,
        model: None,
        range_min: None,
        range_max: None,
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert!(value.get("sensorType").is_some());
    assert!(value.get("calibrationScale").is_some());
    assert!(value.get("sensor_type").is_none());
}

#[test]
fn alerts_query_parses_partial_filters() {
    let query: AlertsQuery =
        serde_json::from_str(r#"{"mineId":"mine-1","acknowledged":false}"#).expect("parse");
    assert_eq!(query.mine_id.as_deref(), Some("mine-1"));
    assert_eq!(query.acknowledged, Some(false));
    assert!(query.sector_id.is_none());
}

#[test]
fn expires_is_number() {
    let response = LoginResponse {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires: 1_700_000_000_000,
        username: "admin".to_string(),
        nickname: "admin".to_string(),
        avatar: "".to_string(),
        roles: vec![],
        permissions: vec![],
    };
    let value = serde_json::to_value(response).expect("serialize");
    assert!(matches!(value.get("expires"), Some(Value::Number(_))));
}
