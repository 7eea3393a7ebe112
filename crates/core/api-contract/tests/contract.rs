use api_contract::{
    LoginResponse, MediaBundleDto, OpenTripRequest, RefreshTokenRequest, TripDto,
};
use serde_json::Value;

#[test]
fn login_response_is_camel_case() {
    let response = LoginResponse {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        expires: 1_700_000_000_000,
        username: "admin".to_string(),
        roles: vec!["ADMIN".to_string()],
        permissions: vec![],
    };
    let value = serde_json::to_value(response).expect("serialize");
    assert!(value.get("accessToken").is_some());
    assert!(value.get("refreshToken").is_some());
    assert!(value.get("expires").is_some());
    assert!(value.get("access_token").is_none());
    assert!(value.get("refresh_token").is_none());
}

#[test]
fn refresh_token_request_accepts_camel_case() {
    let payload = r#"{"refreshToken":"token-1"}"#;
    let req: RefreshTokenRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.refresh_token, "token-1");
}

#[test]
fn refresh_token_request_accepts_snake_case() {
    let payload = r#"{"refresh_token":"token-2"}"#;
    let req: RefreshTokenRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.refresh_token, "token-2");
}

#[test]
fn open_trip_request_parses_media_bundle() {
    let payload = r#"{
        "vendorId": "vendor-1",
        "plateText": "MH12AB1234",
        "loadStatus": "LOADED",
        "entryMedia": {
            "challan": "challan.jpg",
            "photos": ["a.jpg", "b.jpg", "c.jpg", "d.jpg"]
        }
    }"#;
    let req: OpenTripRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.vendor_id, "vendor-1");
    assert_eq!(req.plate_text, "MH12AB1234");
    assert_eq!(req.entry_media.photos.len(), 4);
}

#[test]
fn trip_dto_is_camel_case_and_omits_nothing() {
    let dto = TripDto {
        trip_id: "trip-1".to_string(),
        site_id: "site-1".to_string(),
        vendor_id: "vendor-1".to_string(),
        plate_text: "MH12AB1234".to_string(),
        load_status: "LOADED".to_string(),
        status: "INSIDE".to_string(),
        entry_at_ms: 1_700_000_000_000,
        entry_media: MediaBundleDto {
            challan: "challan.jpg".to_string(),
            photos: vec!["a.jpg".to_string(); 4],
        },
        exit_at_ms: None,
        exit_media: None,
        opened_by: "user-1".to_string(),
        closed_by: None,
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert!(value.get("tripId").is_some());
    assert!(value.get("plateText").is_some());
    assert!(value.get("entryAtMs").is_some());
    assert_eq!(value.get("exitAtMs"), Some(&Value::Null));
    assert_eq!(value.get("exitMedia"), Some(&Value::Null));
}
