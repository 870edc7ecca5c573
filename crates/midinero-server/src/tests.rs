//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use midinero_core::test_utils::{seeded_database, today};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn setup_test_app() -> Router {
    let (db, user_id) = seeded_database();
    let config = ServerConfig {
        require_auth: false,
        dev_user_id: Some(user_id),
        today: Some(today()),
        ..Default::default()
    };
    create_router(db, None, config)
}

fn setup_auth_app() -> (Router, i64) {
    let (db, user_id) = seeded_database();
    let config = ServerConfig {
        require_auth: true,
        jwt_secret: Some(SECRET.to_string()),
        today: Some(today()),
        ..Default::default()
    };
    (create_router(db, None, config), user_id)
}

fn token_for(user_id: i64, secret: &str) -> String {
    let claims = Claims {
        user_id,
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn get_request(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ========== Health & Auth ==========

#[tokio::test]
async fn test_health_needs_no_auth() {
    let (app, _) = setup_auth_app();

    let response = get_request(app, "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
}

#[tokio::test]
async fn test_auth_required() {
    let (app, _) = setup_auth_app();

    let response = get_request(app, "/api/finances/dashboard/overview").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["errors"].is_object());
}

#[tokio::test]
async fn test_auth_with_valid_token() {
    let (app, user_id) = setup_auth_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header("authorization", format!("Bearer {}", token_for(user_id, SECRET)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["data"]["username"], "ana");
    assert_eq!(json["data"]["auth_method"], "jwt");
}

#[tokio::test]
async fn test_auth_rejects_bad_tokens() {
    let (app, user_id) = setup_auth_app();

    for token in [
        token_for(user_id, "wrong-secret"),
        token_for(9999, SECRET),
        "not-a-jwt".to_string(),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/finances/dashboard/summary")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_no_auth_binds_dev_user() {
    let app = setup_test_app();

    let response = get_request(app, "/api/auth/profile").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["data"]["username"], "ana");
    assert_eq!(json["data"]["auth_method"], "none");
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = get_request(app, "/api/health").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

// ========== Dashboard ==========

#[tokio::test]
async fn test_overview() {
    let app = setup_test_app();

    let response = get_request(app, "/api/finances/dashboard/overview").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["total_income"], 18000.0);
    assert_eq!(json["data"]["total_expense"], 7500.0);
    assert_eq!(json["data"]["savings_rate"], 58.33);
}

#[tokio::test]
async fn test_overview_rejects_inverted_period() {
    let app = setup_test_app();

    let response = get_request(
        app,
        "/api/finances/dashboard/overview?start_date=2025-06-01&end_date=2025-01-01",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "error");
    assert!(json["errors"]["end_date"].is_array());
}

#[tokio::test]
async fn test_trends_months_bounds() {
    let app = setup_test_app();

    let response = get_request(app.clone(), "/api/finances/dashboard/trends?months=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let trends = json["data"].as_array().unwrap();
    assert_eq!(trends.len(), 3);
    assert_eq!(trends[0]["month"], "2025-04");

    for bad in ["0", "37", "abc"] {
        let response = get_request(
            app.clone(),
            &format!("/api/finances/dashboard/trends?months={}", bad),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = get_body_json(response).await;
        assert!(json["errors"]["months"].is_array());
    }
}

#[tokio::test]
async fn test_categories_by_type() {
    let app = setup_test_app();

    let response = get_request(
        app.clone(),
        "/api/finances/dashboard/categories?category_type=income",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let categories = json["data"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["category_name"], "Salary");
    assert_eq!(categories[0]["percentage"], 100.0);

    let response = get_request(app, "/api/finances/dashboard/categories?category_type=transfer").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patterns_days_bounds() {
    let app = setup_test_app();

    let response = get_request(app.clone(), "/api/finances/dashboard/patterns?days=30").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["analysis_period_days"], 30);

    let response = get_request(app, "/api/finances/dashboard/patterns?days=6").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_prediction() {
    let app = setup_test_app();

    let response = get_request(
        app,
        "/api/finances/dashboard/prediction?months_to_analyze=6",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["predicted_total"], 1354.13);
    assert_eq!(data["trend"], "increasing");
    assert_eq!(data["trend_percentage"], 8.33);
    assert_eq!(data["confidence"], "medium");
    assert_eq!(data["based_on_months"], 6);
    assert_eq!(data["category_predictions"][0]["category"], "Rent");
}

#[tokio::test]
async fn test_prediction_without_history_is_empty_success() {
    let db = Database::in_memory().unwrap();
    let user_id = db.upsert_user("nuevo", None).unwrap();
    let app = create_router(
        db,
        None,
        ServerConfig {
            require_auth: false,
            dev_user_id: Some(user_id),
            today: Some(today()),
            ..Default::default()
        },
    );

    let response = get_request(app, "/api/finances/dashboard/prediction").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["predicted_total"], 0.0);
    assert_eq!(json["data"]["trend"], "stable");
    assert_eq!(json["data"]["confidence"], "low");
    assert_eq!(json["data"]["based_on_months"], 0);
}

#[tokio::test]
async fn test_prediction_months_bounds() {
    let app = setup_test_app();

    let response = get_request(
        app,
        "/api/finances/dashboard/prediction?months_to_analyze=2",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["errors"]["months_to_analyze"].is_array());
}

#[tokio::test]
async fn test_budget_health() {
    let app = setup_test_app();

    let response = get_request(app.clone(), "/api/finances/dashboard/budget-health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["month"], "2025-06");
    assert_eq!(data["overall_status"], "exceeded");
    assert_eq!(data["has_budgets"], true);
    assert_eq!(data["budgets"].as_array().unwrap().len(), 3);

    let response = get_request(
        app.clone(),
        "/api/finances/dashboard/budget-health?month=2025-01",
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["has_budgets"], false);
    assert_eq!(json["data"]["overall_status"], "healthy");

    let response = get_request(app, "/api/finances/dashboard/budget-health?month=2025-13").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary() {
    let app = setup_test_app();

    let response = get_request(app, "/api/finances/dashboard/summary").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = &json["data"];
    assert!(data["overview"].is_object());
    assert!(data["trends"].is_array());
    assert!(data["categories"].is_array());
    assert_eq!(data["prediction"]["based_on_months"], 6);
    assert_eq!(data["budget_health"]["month"], "2025-06");
}

#[tokio::test]
async fn test_dashboard_reads_are_audited() {
    let (db, user_id) = seeded_database();
    let app = create_router(
        db.clone(),
        None,
        ServerConfig {
            require_auth: false,
            dev_user_id: Some(user_id),
            today: Some(today()),
            ..Default::default()
        },
    );

    let response = get_request(app, "/api/finances/dashboard/trends?months=6").await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries = db.list_audit_log(user_id, 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entity_type.as_deref(), Some("trends"));
    assert_eq!(entries[0].details.as_deref(), Some("months=6"));
}

// ========== Goals ==========

#[tokio::test]
async fn test_goal_create_and_list() {
    let app = setup_test_app();

    let response = post_json(
        app.clone(),
        "/api/finances/goals",
        serde_json::json!({ "name": "Vacation", "month": "2025-06", "target_amount": 1500 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["data"]["name"], "Vacation");
    assert_eq!(json["data"]["month"], "2025-06");
    assert_eq!(json["data"]["target_amount"], 1500.0);
    assert_eq!(json["data"]["achieved"], false);

    // Month defaults to the current one
    post_json(
        app.clone(),
        "/api/finances/goals",
        serde_json::json!({ "name": "Bike", "target_amount": "300.50" }),
    )
    .await;

    let response = get_request(app, "/api/finances/goals").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let goals = json["data"].as_array().unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0]["name"], "Bike");
    assert_eq!(goals[0]["month"], "2025-06");
    assert_eq!(goals[1]["name"], "Vacation");
}

#[tokio::test]
async fn test_goal_create_validation() {
    let app = setup_test_app();

    let cases = [
        (serde_json::json!({ "target_amount": 100 }), "name"),
        (
            serde_json::json!({ "name": "Car", "month": "2025-13", "target_amount": 100 }),
            "month",
        ),
        (serde_json::json!({ "name": "Car" }), "target_amount"),
        (
            serde_json::json!({ "name": "Car", "target_amount": -5 }),
            "target_amount",
        ),
        (
            serde_json::json!({ "name": "Car", "target_amount": "lots" }),
            "target_amount",
        ),
    ];

    for (body, field) in cases {
        let response = post_json(app.clone(), "/api/finances/goals", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = get_body_json(response).await;
        assert!(json["errors"][field].is_array(), "expected error on {}", field);
    }
}

#[tokio::test]
async fn test_goal_add_amount() {
    let (db, user_id) = seeded_database();
    let goal_id = db
        .set_goal(
            user_id,
            "Vacation",
            midinero_core::models::YearMonth::new(2025, 6).unwrap(),
            "1000".parse().unwrap(),
        )
        .unwrap();
    let app = create_router(
        db.clone(),
        None,
        ServerConfig {
            require_auth: false,
            dev_user_id: Some(user_id),
            today: Some(today()),
            ..Default::default()
        },
    );
    let uri = format!("/api/finances/goals/{}/add-amount", goal_id);

    let response = post_json(app.clone(), &uri, serde_json::json!({ "amount": 400 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["current_amount"], 400.0);
    assert_eq!(json["data"]["progress"], 40.0);
    assert_eq!(json["data"]["achieved"], false);

    let response = post_json(app.clone(), &uri, serde_json::json!({ "amount": "600" })).await;
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["achieved"], true);

    let response = post_json(app.clone(), &uri, serde_json::json!({ "amount": 0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["errors"]["amount"].is_array());

    let response = post_json(
        app.clone(),
        "/api/finances/goals/9999/add-amount",
        serde_json::json!({ "amount": 10 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let entries = db.list_audit_log(user_id, 10).unwrap();
    assert_eq!(entries[0].action, "goal_add_amount");
}

#[tokio::test]
async fn test_goal_progress() {
    let (db, user_id) = seeded_database();
    let goal_id = db
        .set_goal(
            user_id,
            "Emergency fund",
            midinero_core::models::YearMonth::new(2025, 6).unwrap(),
            "5000".parse().unwrap(),
        )
        .unwrap();
    let app = create_router(
        db,
        None,
        ServerConfig {
            require_auth: false,
            dev_user_id: Some(user_id),
            today: Some(today()),
            ..Default::default()
        },
    );

    let response = get_request(
        app.clone(),
        &format!("/api/finances/goals/{}/progress", goal_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["goal_id"], goal_id);
    assert_eq!(data["month"], "2025-06");
    // June: 3000 salary - 900 rent - 400 food
    assert_eq!(data["current_savings"], 1700.0);
    assert_eq!(data["progress_percentage"], 34.0);

    let response = get_request(app.clone(), "/api/finances/goals/9999/progress").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_request(app, "/api/finances/goals/abc/progress").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Error mapping ==========

#[test]
fn test_core_errors_map_to_status() {
    let invalid = AppError::from(midinero_core::Error::InvalidData("bad".to_string()));
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.message, "bad");

    let internal = AppError::from(midinero_core::Error::Config("secret path".to_string()));
    assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(internal.message, "An internal error occurred");
}
