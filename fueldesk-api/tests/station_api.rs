use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::models::FillingStation;
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

async fn list_stations(
    client: &Client,
    cookie: &rocket::http::Cookie<'static>,
) -> Vec<FillingStation> {
    let response = client
        .get("/api/1/stations")
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json().await.expect("valid stations JSON")
}

#[rocket::async_test]
async fn test_admin_can_create_station() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;

    let new_station = json!({
        "name": "Ring Road Pump",
        "address": "Plot 9, Ring Road"
    });

    let response = client
        .post("/api/1/stations")
        .cookie(admin_cookie.clone())
        .json(&new_station)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    let station: FillingStation = response.into_json().await.expect("valid station JSON");
    assert_eq!(station.name, "Ring Road Pump");
    assert!(station.is_active);
}

#[rocket::async_test]
async fn test_duplicate_station_name_conflicts() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;

    // Seeded by the test-data fairing, just with different casing
    let new_station = json!({
        "name": "test station 1",
        "address": "Anywhere"
    });

    let response = client
        .post("/api/1/stations")
        .cookie(admin_cookie)
        .json(&new_station)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
}

#[rocket::async_test]
async fn test_station_creation_requires_admin() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let manager_cookie = login_user(&client, "manager@station1.example", "manager").await;

    let new_station = json!({
        "name": "Rogue Pump",
        "address": "Nowhere"
    });

    let response = client
        .post("/api/1/stations")
        .cookie(manager_cookie)
        .json(&new_station)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_station_listing_is_scoped_by_assignment() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");

    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let all = list_stations(&client, &admin_cookie).await;
    assert!(all.len() >= 2);

    // The attendant is assigned to Test Station 1 only
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;
    let scoped = list_stations(&client, &attendant_cookie).await;
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].name, "Test Station 1");

    // And cannot read the other station directly
    let other = all
        .iter()
        .find(|s| s.name == "Test Station 2")
        .expect("seeded station 2");
    let response = client
        .get(format!("/api/1/stations/{}", other.id))
        .cookie(attendant_cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_admin_can_update_station() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;

    let stations = list_stations(&client, &admin_cookie).await;
    let target = stations
        .iter()
        .find(|s| s.name == "Test Station 2")
        .expect("seeded station 2");

    let update = json!({ "address": "New Bypass Road" });
    let response = client
        .put(format!("/api/1/stations/{}", target.id))
        .cookie(admin_cookie)
        .json(&update)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let updated: FillingStation = response.into_json().await.expect("valid station JSON");
    assert_eq!(updated.address, "New Bypass Road");
    assert_eq!(updated.name, "Test Station 2");
}
