use chrono::{Duration, Utc};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::models::{DealPrice, FillingStation, Product};
use fueldesk_api::orm::testing::test_rocket;

async fn login_user(client: &Client, email: &str, password: &str) -> rocket::http::Cookie<'static> {
    let login_body = json!({ "email": email, "password": password });

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

async fn seeded_scope(
    client: &Client,
    cookie: &rocket::http::Cookie<'static>,
) -> (FillingStation, Product) {
    let response = client
        .get("/api/1/stations")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    let stations: Vec<FillingStation> = response.into_json().await.expect("stations JSON");
    let station = stations
        .into_iter()
        .find(|s| s.name == "Test Station 1")
        .expect("seeded station");

    let response = client
        .get("/api/1/products")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    let products: Vec<Product> = response.into_json().await.expect("products JSON");
    let product = products
        .into_iter()
        .find(|p| p.code == "HSD")
        .expect("seeded product");

    (station, product)
}

#[rocket::async_test]
async fn test_schedule_and_activate_price() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;
    let (station, product) = seeded_scope(&client, &accounts_cookie).await;

    let effective = (Utc::now().naive_utc() - Duration::hours(1))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    let body = json!({
        "station_id": station.id,
        "product_id": product.id,
        "customer_id": null,
        "price": 26500,
        "effective_from": effective
    });
    let response = client
        .post("/api/1/deal-prices")
        .cookie(accounts_cookie.clone())
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let scheduled: DealPrice = response.into_json().await.expect("deal price JSON");
    assert_eq!(scheduled.status, "scheduled");

    // The sweep activates the new price and expires the seeded one
    let response = client
        .post("/api/1/deal-prices/activate")
        .cookie(accounts_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let summary: serde_json::Value = response.into_json().await.expect("summary JSON");
    assert_eq!(summary["activated"], 1);
    assert_eq!(summary["expired"], 1);

    let response = client
        .get(format!("/api/1/deal-prices?station_id={}", station.id))
        .cookie(accounts_cookie.clone())
        .dispatch()
        .await;
    let prices: Vec<DealPrice> = response.into_json().await.expect("deal prices JSON");
    let active: Vec<_> = prices.iter().filter(|p| p.status == "active").collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].price, 26500);

    // Re-running the sweep is a no-op
    let response = client
        .post("/api/1/deal-prices/activate")
        .cookie(accounts_cookie)
        .dispatch()
        .await;
    let summary: serde_json::Value = response.into_json().await.expect("summary JSON");
    assert_eq!(summary["activated"], 0);
}

#[rocket::async_test]
async fn test_future_price_is_not_activated_early() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;
    let (station, product) = seeded_scope(&client, &accounts_cookie).await;

    let effective = (Utc::now().naive_utc() + Duration::days(2))
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string();
    let body = json!({
        "station_id": station.id,
        "product_id": product.id,
        "customer_id": null,
        "price": 30000,
        "effective_from": effective
    });
    let response = client
        .post("/api/1/deal-prices")
        .cookie(accounts_cookie.clone())
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let response = client
        .post("/api/1/deal-prices/activate")
        .cookie(accounts_cookie.clone())
        .dispatch()
        .await;
    let summary: serde_json::Value = response.into_json().await.expect("summary JSON");
    assert_eq!(summary["activated"], 0);

    let response = client
        .get("/api/1/deal-prices?status=scheduled")
        .cookie(accounts_cookie)
        .dispatch()
        .await;
    let prices: Vec<DealPrice> = response.into_json().await.expect("deal prices JSON");
    assert!(prices.iter().any(|p| p.price == 30000));
}

#[rocket::async_test]
async fn test_price_management_requires_admin_or_accounts() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;

    let response = client
        .post("/api/1/deal-prices/activate")
        .cookie(attendant_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let body = json!({
        "station_id": 1,
        "product_id": 1,
        "customer_id": null,
        "price": 100,
        "effective_from": "2025-08-01T00:00:00"
    });
    let response = client
        .post("/api/1/deal-prices")
        .cookie(attendant_cookie)
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_nonpositive_price_is_rejected() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;
    let (station, product) = seeded_scope(&client, &accounts_cookie).await;

    let body = json!({
        "station_id": station.id,
        "product_id": product.id,
        "customer_id": null,
        "price": 0,
        "effective_from": "2025-08-01T00:00:00"
    });
    let response = client
        .post("/api/1/deal-prices")
        .cookie(accounts_cookie)
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}
