use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use delivery_hub::api::rest::router;
use delivery_hub::config::Config;
use delivery_hub::ids::SequentialIds;
use delivery_hub::models::delivery::{Coordinates, Delivery, DeliveryStatus};
use delivery_hub::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        http_port: 0,
        log_level: "info".to_string(),
        event_buffer_size: 1024,
        admin_password: "123".to_string(),
        store_name: "Loja Central".to_string(),
        store_address: "Av. Paulista, 1000 - São Paulo".to_string(),
        audit_api_url: None,
        audit_api_key: None,
        ai_api_url: None,
        ai_api_key: None,
        ai_model: "gpt-4o-mini".to_string(),
        seed_demo_data: false,
    }
}

fn setup() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(
        AppState::new(&test_config()).with_ids(Arc::new(SequentialIds::new())),
    );
    (router(state.clone()), state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn driver_payload(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "(11) 98888-7777",
        "password": "entrega1",
        "vehicle": "bicycle",
        "bio": "Entregas sustentáveis."
    })
}

async fn register_and_approve(app: &axum::Router, name: &str, email: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request("POST", "/drivers", driver_payload(name, email)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let driver = body_json(res).await;
    let id = driver["id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(post_request(&format!("/drivers/{id}/approve")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    id
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["drivers"], 0);
    assert_eq!(body["deliveries"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _state) = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("open_broadcasts"));
}

#[tokio::test]
async fn register_driver_enters_pending() {
    let (app, _state) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers",
            driver_payload("Ana Beatriz", "ana@loja.com"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["total_deliveries"], 0);
    assert_eq!(body["rating"], 5.0);
    assert_eq!(body["vehicle"], "bicycle");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_driver_malformed_email_returns_400() {
    let (app, _state) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/drivers",
            driver_payload("Ana Beatriz", "ana-sem-email"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_then_approve_again_returns_409() {
    let (app, _state) = setup();
    let id = register_and_approve(&app, "Ana Beatriz", "ana@loja.com").await;

    let res = app
        .clone()
        .oneshot(get_request(&format!("/drivers/{id}")))
        .await
        .unwrap();
    let driver = body_json(res).await;
    assert_eq!(driver["status"], "active");

    let res = app
        .oneshot(post_request(&format!("/drivers/{id}/approve")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reject_moves_driver_to_inactive() {
    let (app, _state) = setup();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers",
            driver_payload("Bruno Costa", "bruno@loja.com"),
        ))
        .await
        .unwrap();
    let driver = body_json(res).await;
    let id = driver["id"].as_str().unwrap();

    let res = app
        .oneshot(post_request(&format!("/drivers/{id}/reject")))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "inactive");
}

#[tokio::test]
async fn launch_without_driver_is_an_open_broadcast() {
    let (app, _state) = setup();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/deliveries",
            json!({
                "customer_name": "Mariana Silva",
                "address": "Av. Paulista, 1000 - Bela Vista",
                "driver_id": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["is_broadcast"], true);
    assert!(body["driver_id"].is_null());
    assert_eq!(body["origin_name"], "Loja Central");

    let response = app.oneshot(get_request("/deliveries/available")).await.unwrap();
    let available = body_json(response).await;
    assert_eq!(available.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn launch_with_driver_ships_immediately() {
    let (app, _state) = setup();
    let driver_id = register_and_approve(&app, "Carlos Oliveira", "carlos@loja.com").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/deliveries",
            json!({
                "customer_name": "Mariana Silva",
                "address": "Av. Paulista, 1000 - Bela Vista",
                "driver_id": driver_id
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "shipped");
    assert_eq!(body["is_broadcast"], false);
    assert_eq!(body["driver_id"], driver_id.as_str());

    let response = app
        .oneshot(get_request(&format!("/drivers/{driver_id}")))
        .await
        .unwrap();
    let driver = body_json(response).await;
    assert_eq!(driver["status"], "on-delivery");
}

#[tokio::test]
async fn launch_with_pending_driver_returns_409() {
    let (app, _state) = setup();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers",
            driver_payload("Ana Beatriz", "ana@loja.com"),
        ))
        .await
        .unwrap();
    let driver = body_json(res).await;
    let driver_id = driver["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/deliveries",
            json!({
                "customer_name": "Mariana Silva",
                "address": "Av. Paulista, 1000 - Bela Vista",
                "driver_id": driver_id
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn full_broadcast_flow_with_deterministic_ids() {
    let (app, _state) = setup();
    let driver_id = register_and_approve(&app, "Carlos Oliveira", "carlos@loja.com").await;
    assert_eq!(driver_id, "1");

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/deliveries",
            json!({
                "customer_name": "Mariana Silva",
                "address": "Av. Paulista, 1000 - Bela Vista"
            }),
        ))
        .await
        .unwrap();
    let delivery = body_json(res).await;
    assert_eq!(delivery["id"], "DEL-001");

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/deliveries/DEL-001/accept",
            json!({ "driver_id": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let accepted = body_json(res).await;
    assert_eq!(accepted["status"], "shipped");
    assert_eq!(accepted["is_broadcast"], false);
    assert_eq!(accepted["driver_id"], "1");

    // A second acceptance cannot silently steal the delivery.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/deliveries/DEL-001/accept",
            json!({ "driver_id": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(post_request("/deliveries/DEL-001/finish"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let finished = body_json(res).await;
    assert_eq!(finished["status"], "delivered");

    let res = app
        .clone()
        .oneshot(get_request("/drivers/1"))
        .await
        .unwrap();
    let driver = body_json(res).await;
    assert_eq!(driver["status"], "active");
    assert_eq!(driver["total_deliveries"], 1);

    // Finishing twice must not count the delivery again.
    let res = app
        .clone()
        .oneshot(post_request("/deliveries/DEL-001/finish"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.oneshot(get_request("/drivers/1")).await.unwrap();
    let driver = body_json(res).await;
    assert_eq!(driver["total_deliveries"], 1);
}

#[tokio::test]
async fn get_nonexistent_delivery_returns_404() {
    let (app, _state) = setup();
    let response = app
        .oneshot(get_request("/deliveries/DEL-999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_update_changes_the_default_origin() {
    let (app, _state) = setup();

    let res = app.clone().oneshot(get_request("/settings")).await.unwrap();
    let settings = body_json(res).await;
    assert_eq!(settings["name"], "Loja Central");

    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/settings",
            json!({ "name": "Unidade Norte", "address": "Rua das Flores, 52" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request(
            "POST",
            "/deliveries",
            json!({
                "customer_name": "Mariana Silva",
                "address": "Av. Paulista, 1000 - Bela Vista"
            }),
        ))
        .await
        .unwrap();
    let delivery = body_json(res).await;
    assert_eq!(delivery["origin_name"], "Unidade Norte");
    assert_eq!(delivery["origin_address"], "Rua das Flores, 52");
}

#[tokio::test]
async fn settings_rejects_empty_name() {
    let (app, _state) = setup();
    let res = app
        .oneshot(json_request(
            "PUT",
            "/settings",
            json!({ "name": "  ", "address": "Rua das Flores, 52" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_login_accepts_the_shared_secret() {
    let (app, _state) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "gestor@loja.com", "password": "123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    // Advisory only; the sink is unconfigured here.
    assert_eq!(body["known_account"], false);
}

#[tokio::test]
async fn admin_login_rejects_a_wrong_password() {
    let (app, _state) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": "gestor@loja.com", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recent_logins_degrade_to_empty_without_a_sink() {
    let (app, _state) = setup();
    let response = app
        .oneshot(get_request("/auth/logins?limit=5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn driver_login_checks_password_and_status() {
    let (app, _state) = setup();
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers",
            driver_payload("Ana Beatriz", "ana@loja.com"),
        ))
        .await
        .unwrap();
    let driver = body_json(res).await;
    let id = driver["id"].as_str().unwrap().to_string();

    // Still pending: login is refused with guidance.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers/login",
            json!({ "email": "ana@loja.com", "password": "entrega1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(post_request(&format!("/drivers/{id}/approve")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/drivers/login",
            json!({ "email": "ana@loja.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(json_request(
            "POST",
            "/drivers/login",
            json!({ "email": "ANA@loja.com", "password": "entrega1" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["status"], "active");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn assistant_falls_back_when_unconfigured() {
    let (app, _state) = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/assistant/advice",
            json!({ "query": "Como reduzir atrasos no horário de pico?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reply"], delivery_hub::advisor::ADVICE_FALLBACK);
}

#[tokio::test]
async fn driver_analysis_falls_back_when_unconfigured() {
    let (app, _state) = setup();
    let id = register_and_approve(&app, "Ana Beatriz", "ana@loja.com").await;

    let response = app
        .oneshot(post_request(&format!("/drivers/{id}/analyze")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["reply"], delivery_hub::advisor::PROFILE_FALLBACK);
}

#[tokio::test]
async fn tracking_reports_distance_and_eta_from_coordinates() {
    let (app, state) = setup();

    let delivery = Delivery {
        id: "DEL-777".to_string(),
        customer_name: "Mariana Silva".to_string(),
        address: "Av. Paulista, 1000 - Bela Vista".to_string(),
        origin_name: Some("Loja Central".to_string()),
        origin_address: Some("Av. Paulista, 1000 - São Paulo".to_string()),
        status: DeliveryStatus::Shipped,
        driver_id: Some("1".to_string()),
        created_at: chrono::Utc::now(),
        destination: Some(Coordinates {
            lat: -23.5614,
            lng: -46.6559,
        }),
        current_location: Some(Coordinates {
            lat: -23.5505,
            lng: -46.6333,
        }),
        eta: None,
        is_broadcast: false,
        created_by: None,
    };
    state.deliveries.insert(delivery.id.clone(), delivery);

    let response = app
        .oneshot(get_request("/deliveries/DEL-777/tracking"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["delivery"]["id"], "DEL-777");
    assert!(body["distance_km"].as_f64().unwrap() > 0.0);
    assert!(body["eta_estimate"].as_str().unwrap().ends_with("min"));
}
