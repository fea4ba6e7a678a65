use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::orm::testing::test_rocket;

/// Helper to login with specific credentials and get session cookie
async fn login_user(client: &Client, email: &str, password: &str) -> rocket::http::Cookie<'static> {
    let login_body = json!({
        "email": email,
        "password": password
    });

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(login_body.to_string())
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    response
        .cookies()
        .get("session")
        .expect("Session cookie should be set")
        .clone()
        .into_owned()
}

#[rocket::async_test]
async fn test_status_is_public() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let response = client.get("/api/1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.expect("valid status JSON");
    assert_eq!(body["status"], "running");
}

#[rocket::async_test]
async fn test_protected_endpoints_require_authentication() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let response = client.get("/api/1/customers").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.get("/api/1/stations").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client.get("/api/1/hello").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .post("/api/1/filling-requests/1/otp")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_login_with_valid_credentials() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let login_body = json!({
        "email": "admin@fueldesk.example",
        "password": "admin"
    });

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(login_body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.expect("valid login JSON");
    assert_eq!(body["email"], "admin@fueldesk.example");
    assert!(
        body["roles"]
            .as_array()
            .expect("roles array")
            .iter()
            .any(|r| r == "admin")
    );
}

#[rocket::async_test]
async fn test_login_with_wrong_password_fails() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let login_body = json!({
        "email": "admin@fueldesk.example",
        "password": "not-the-password"
    });

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(login_body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_login_with_unknown_email_fails() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let login_body = json!({
        "email": "ghost@fueldesk.example",
        "password": "whatever"
    });

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(login_body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn test_login_with_empty_fields_fails() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let login_body = json!({ "email": "", "password": "" });

    let response = client
        .post("/api/1/login")
        .header(ContentType::JSON)
        .body(login_body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[rocket::async_test]
async fn test_hello_reflects_session_identity() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let cookie = login_user(&client, "manager@station1.example", "manager").await;

    let response = client.get("/api/1/hello").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.expect("valid hello JSON");
    assert_eq!(body["email"], "manager@station1.example");
    assert_eq!(body["roles"][0], "station-manager");
    assert_eq!(body["station_ids"].as_array().map(|a| a.len()), Some(1));
}

#[rocket::async_test]
async fn test_logout_revokes_session() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let cookie = login_user(&client, "admin@fueldesk.example", "admin").await;

    let response = client
        .get("/api/1/hello")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post("/api/1/logout")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // The revoked session no longer authenticates
    let response = client.get("/api/1/hello").cookie(cookie).dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}
