//! Canned CoWIN calendar responses served from a wiremock server.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BY_PIN: &str = "/v2/appointment/sessions/public/calendarByPin";
pub const BY_DISTRICT: &str = "/v2/appointment/sessions/public/calendarByDistrict";

/// A calendar body with one center holding one session.
pub fn one_session(center: &str, pincode: u32, capacity: i64, vaccine: &str, date: &str) -> Value {
    json!({
        "centers": [{
            "center_id": 1,
            "name": center,
            "pincode": pincode,
            "district_name": "New Delhi",
            "fee_type": "Free",
            "sessions": [{
                "session_id": "abc",
                "date": date,
                "min_age_limit": 18,
                "available_capacity": capacity,
                "vaccine": vaccine
            }]
        }]
    })
}

/// Serves `body` for the pincode calendar on `date`, expecting exactly `calls` requests.
pub async fn mount_pincode(
    server: &MockServer,
    pincode: &str,
    date: &str,
    body: Value,
    calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(BY_PIN))
        .and(query_param("pincode", pincode))
        .and(query_param("date", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Serves `body` for the district calendar on `date`, expecting exactly `calls` requests.
pub async fn mount_district(
    server: &MockServer,
    district: &str,
    date: &str,
    body: Value,
    calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(BY_DISTRICT))
        .and(query_param("district_id", district))
        .and(query_param("date", date))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Answers any other calendar request with no centers.
pub async fn mount_empty_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "centers": [] })))
        .with_priority(10)
        .mount(server)
        .await;
}
