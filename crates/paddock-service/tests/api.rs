//! End-to-end tests of the router against the in-memory fixture provider.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Datelike, Utc};
use serde_json::{Value, json};

use paddock_service::app;
use paddock_service_shared::{MetricsConfig, test_utils::test_state};

fn server() -> TestServer {
    TestServer::new(app(test_state(), &MetricsConfig::default())).unwrap()
}

fn assert_error(body: &Value, status: u16, code: &str) {
    assert_eq!(body["error"]["status"], status, "body: {body}");
    assert_eq!(body["error"]["code"], code, "body: {body}");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn seasons_are_current_and_previous_year() {
    let response = server().get("/api/v1/events/seasons").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let year = Utc::now().year();
    assert_eq!(response.json::<Value>(), json!({"seasons": [year, year - 1]}));
}

#[tokio::test]
async fn unexpected_parameter_is_rejected() {
    let response = server()
        .get("/api/v1/events/seasons")
        .add_query_param("year", "2024")
        .add_query_param("foo", "1")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body = response.json::<Value>();
    assert_error(&body, 400, "invalid_query_params");
    assert_eq!(body["error"]["message"], "Invalid query parameters");
    assert_eq!(body["error"]["details"]["unexpected"], json!(["foo", "year"]));
}

#[tokio::test]
async fn season_calendar() {
    let response = server().get("/api/v1/events/2024").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["year"], 2024);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["round"], 1);
    assert_eq!(events[0]["name"], "Bahrain Grand Prix");
    assert_eq!(events[1]["official_name"], Value::Null);
}

#[tokio::test]
async fn unknown_season_is_bad_gateway() {
    let response = server().get("/api/v1/events/2023").await;
    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    assert_error(&response.json::<Value>(), 502, "bad_gateway");
}

#[tokio::test]
async fn event_detail_lists_named_sessions() {
    let response = server().get("/api/v1/events/2024/2").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["year"], 2024);
    assert_eq!(body["name"], "Chinese Grand Prix");

    let sessions = body["sessions"].as_array().unwrap();
    let codes: Vec<&Value> = sessions.iter().map(|s| &s["code"]).collect();
    assert_eq!(codes, vec!["FP1", "SQ", "S", "Q"]);
    assert_eq!(sessions[0]["index"], 1);
    assert_eq!(sessions[3]["index"], 4);
    assert_eq!(sessions[1]["start_utc"], "2024-04-19T07:30:00Z");
}

#[tokio::test]
async fn unknown_round_is_not_found() {
    let response = server().get("/api/v1/events/2024/9").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_error(&response.json::<Value>(), 404, "not_found");
}

#[tokio::test]
async fn malformed_path_and_unknown_route_use_error_envelope() {
    let server = server();
    for path in ["/api/v1/events/twenty", "/api/v1/nope", "/"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
        assert_error(&response.json::<Value>(), 404, "not_found");
    }
}

#[tokio::test]
async fn wrong_method_uses_error_envelope() {
    let response = server().post("/api/v1/events/seasons").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert_error(&response.json::<Value>(), 405, "error");
}

#[tokio::test]
async fn replay_timeline() {
    let response = server().get("/api/v1/sessions/2024/1/R/replay").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(
        body["metadata"],
        json!({
            "year": 2024,
            "round": 1,
            "session_code": "R",
            "event_name": "Bahrain Grand Prix",
            "country": "Bahrain",
            "location": "Sakhir"
        })
    );
    assert_eq!(
        body["drivers"][0],
        json!({"driver_id": "44", "code": "HAM", "name": "Lewis Hamilton", "team": "Mercedes"})
    );

    let lap1 = &body["timeline"][0];
    assert_eq!(lap1["lap"], 1);
    assert_eq!(lap1["driver_timings"][0]["gap_to_leader_s"], 0.0);
    assert_eq!(lap1["driver_timings"][0]["interval_to_front_s"], Value::Null);
    assert_eq!(lap1["driver_timings"][1]["gap_to_leader_s"], 1.0);
    assert_eq!(lap1["driver_timings"][1]["interval_to_front_s"], 1.0);

    let ver = &body["timeline"][1]["driver_timings"][1];
    assert_eq!(ver["driver_code"], "VER");
    assert_eq!(ver["lap_time_s"], Value::Null);
    assert_eq!(ver["gap_to_leader_s"], Value::Null);
    assert_eq!(ver["interval_to_front_s"], Value::Null);
}

#[tokio::test]
async fn session_code_is_case_insensitive() {
    let response = server().get("/api/v1/sessions/2024/1/r/replay").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["metadata"]["session_code"], "R");
}

#[tokio::test]
async fn replay_rejects_query_parameters() {
    let response = server()
        .get("/api/v1/sessions/2024/1/R/replay")
        .add_query_param("lap", "3")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["unexpected"],
        json!(["lap"])
    );
}

#[tokio::test]
async fn missing_session_is_not_found() {
    let response = server().get("/api/v1/sessions/2024/1/SQ/replay").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_error(&response.json::<Value>(), 404, "session_not_found");
}

#[tokio::test]
async fn track_map_of_overall_fastest_lap() {
    let response = server().get("/api/v1/sessions/2024/1/R/track").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["session_code"], "R");
    assert_eq!(body["driver"], "HAM");
    assert_eq!(body["polyline"]["x"], json!([0.0, 120.5, 240.0]));
    assert_eq!(body["polyline"]["y"], json!([10.0, -35.25, 10.0]));
}

#[tokio::test]
async fn track_map_driver_is_upper_cased() {
    let response = server()
        .get("/api/v1/sessions/2024/1/R/track")
        .add_query_param("driver", "ver")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["driver"], "VER");
    assert_eq!(body["polyline"]["x"][0], 1.5);
}

#[tokio::test]
async fn track_map_repeated_driver_uses_first() {
    let response = server()
        .get("/api/v1/sessions/2024/1/R/track?driver=ver&driver=ham")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["driver"], "VER");
}

#[tokio::test]
async fn track_map_rejects_invalid_driver() {
    let response = server()
        .get("/api/v1/sessions/2024/1/R/track")
        .add_query_param("driver", "V3R")
        .add_query_param("lap", "2")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body = response.json::<Value>();
    let details = &body["error"]["details"];
    assert_eq!(details["driver"], "Driver must be a 3-letter code");
    assert_eq!(details["unexpected"], json!(["lap"]));
}

#[tokio::test]
async fn track_map_failures() {
    let server = server();
    let cases = [
        ("/api/v1/sessions/2024/1/R/track?driver=NOR", "driver_laps_not_found"),
        ("/api/v1/sessions/2024/1/Q/track", "lap_not_found"),
        ("/api/v1/sessions/2024/2/FP1/track", "telemetry_unavailable"),
        ("/api/v1/sessions/2024/3/R/track", "session_not_found"),
    ];
    for (path, code) in cases {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
        assert_error(&response.json::<Value>(), 404, code);
    }
}

#[tokio::test]
async fn races_health() {
    let server = server();
    let response = server.get("/api/v1/races/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "ok", "service": "races"})
    );

    let response = server
        .get("/api/v1/races/health")
        .add_query_param("verbose", "1")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn probes_and_metrics() {
    let server = server();

    let live = server.get("/health/live").await;
    assert_eq!(live.status_code(), StatusCode::OK);

    let ready = server.get("/health/ready").await;
    assert_eq!(ready.status_code(), StatusCode::OK);
    assert_eq!(ready.json::<Value>()["seasons"], json!([2024]));

    let metrics = server.get("/metrics").await;
    assert_eq!(metrics.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let response = server()
        .get("/api/v1/events/seasons")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("replay-7"),
        )
        .await;
    assert_eq!(response.headers()["x-request-id"], "replay-7");

    let response = server().get("/api/v1/events/seasons").await;
    assert!(response.headers().contains_key("x-request-id"));
}
