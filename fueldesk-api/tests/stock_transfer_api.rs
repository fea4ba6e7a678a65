use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::models::{FillingStation, Product, StationStock, StockTransfer};
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

struct Fixture {
    station1: FillingStation,
    station2: FillingStation,
    product: Product,
}

async fn fixture(client: &Client, cookie: &rocket::http::Cookie<'static>) -> Fixture {
    let response = client
        .get("/api/1/stations")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    let stations: Vec<FillingStation> = response.into_json().await.expect("stations JSON");
    let station1 = stations
        .iter()
        .find(|s| s.name == "Test Station 1")
        .expect("station 1")
        .clone();
    let station2 = stations
        .iter()
        .find(|s| s.name == "Test Station 2")
        .expect("station 2")
        .clone();

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

    Fixture {
        station1,
        station2,
        product,
    }
}

async fn stock_level(
    client: &Client,
    cookie: &rocket::http::Cookie<'static>,
    station_id: i32,
    product_id: i32,
) -> f64 {
    let response = client
        .get(format!("/api/1/stations/{}/stocks", station_id))
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let stocks: Vec<StationStock> = response.into_json().await.expect("stocks JSON");
    stocks
        .iter()
        .find(|s| s.product_id == product_id)
        .map(|s| s.stock)
        .unwrap_or(0.0)
}

#[rocket::async_test]
async fn test_transfer_moves_stock_between_stations() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let f = fixture(&client, &admin_cookie).await;

    // Seed 800 litres at station 1
    let response = client
        .post(format!("/api/1/stations/{}/stocks/adjust", f.station1.id))
        .cookie(admin_cookie.clone())
        .json(&json!({ "product_id": f.product.id, "quantity": 800.0 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let body = json!({
        "from_station_id": f.station1.id,
        "to_station_id": f.station2.id,
        "product_id": f.product.id,
        "quantity": 300.0,
        "note": "weekend rebalance"
    });
    let response = client
        .post("/api/1/stock-transfers")
        .cookie(admin_cookie.clone())
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let transfer: StockTransfer = response.into_json().await.expect("transfer JSON");
    assert_eq!(transfer.quantity, 300.0);

    assert_eq!(
        stock_level(&client, &admin_cookie, f.station1.id, f.product.id).await,
        500.0
    );
    assert_eq!(
        stock_level(&client, &admin_cookie, f.station2.id, f.product.id).await,
        300.0
    );

    // Visible in the listing, station-filtered too
    let response = client
        .get(format!("/api/1/stock-transfers?station_id={}", f.station2.id))
        .cookie(admin_cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let transfers: Vec<StockTransfer> = response.into_json().await.expect("transfers JSON");
    assert!(transfers.iter().any(|t| t.id == transfer.id));
}

#[rocket::async_test]
async fn test_transfer_with_insufficient_stock_conflicts() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let f = fixture(&client, &admin_cookie).await;

    let body = json!({
        "from_station_id": f.station1.id,
        "to_station_id": f.station2.id,
        "product_id": f.product.id,
        "quantity": 9999.0
    });
    let response = client
        .post("/api/1/stock-transfers")
        .cookie(admin_cookie.clone())
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    // No transfer row was persisted
    let response = client
        .get("/api/1/stock-transfers")
        .cookie(admin_cookie)
        .dispatch()
        .await;
    let transfers: Vec<StockTransfer> = response.into_json().await.expect("transfers JSON");
    assert!(transfers.is_empty());
}

#[rocket::async_test]
async fn test_transfer_to_same_station_is_unprocessable() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let f = fixture(&client, &admin_cookie).await;

    let body = json!({
        "from_station_id": f.station1.id,
        "to_station_id": f.station1.id,
        "product_id": f.product.id,
        "quantity": 10.0
    });
    let response = client
        .post("/api/1/stock-transfers")
        .cookie(admin_cookie)
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[rocket::async_test]
async fn test_manager_needs_access_to_both_stations() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let manager_cookie = login_user(&client, "manager@station1.example", "manager").await;
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let f = fixture(&client, &admin_cookie).await;

    // The manager is assigned to station 1 only
    let body = json!({
        "from_station_id": f.station1.id,
        "to_station_id": f.station2.id,
        "product_id": f.product.id,
        "quantity": 10.0
    });
    let response = client
        .post("/api/1/stock-transfers")
        .cookie(manager_cookie)
        .json(&body)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}
