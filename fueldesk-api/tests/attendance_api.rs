use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::models::Attendance;
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

#[rocket::async_test]
async fn test_check_in_and_out_flow() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;

    // Checking out before checking in
    let response = client
        .post("/api/1/attendance/check-out")
        .cookie(attendant_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .post("/api/1/attendance/check-in")
        .cookie(attendant_cookie.clone())
        .json(&json!({ "station_id": null, "note": null }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let record: Attendance = response.into_json().await.expect("attendance JSON");
    assert!(record.check_out.is_none());

    // A second check-in the same day conflicts
    let response = client
        .post("/api/1/attendance/check-in")
        .cookie(attendant_cookie.clone())
        .json(&json!({ "station_id": null, "note": null }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    let response = client
        .post("/api/1/attendance/check-out")
        .cookie(attendant_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let record: Attendance = response.into_json().await.expect("attendance JSON");
    assert!(record.check_out.is_some());

    // And a second check-out conflicts too
    let response = client
        .post("/api/1/attendance/check-out")
        .cookie(attendant_cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
}

#[rocket::async_test]
async fn test_check_in_against_foreign_station_is_forbidden() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;

    let response = client
        .get("/api/1/stations")
        .cookie(admin_cookie)
        .dispatch()
        .await;
    let stations: Vec<fueldesk_api::models::FillingStation> =
        response.into_json().await.expect("stations JSON");
    let station2 = stations
        .iter()
        .find(|s| s.name == "Test Station 2")
        .expect("station 2");

    let response = client
        .post("/api/1/attendance/check-in")
        .cookie(attendant_cookie)
        .json(&json!({ "station_id": station2.id, "note": null }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_listing_is_scoped_to_self_for_non_admins() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;
    let manager_cookie = login_user(&client, "manager@station1.example", "manager").await;
    let admin_cookie = login_user(&client, "admin@fueldesk.example", "admin").await;

    // Both employees check in
    for cookie in [&attendant_cookie, &manager_cookie] {
        let response = client
            .post("/api/1/attendance/check-in")
            .cookie((*cookie).clone())
            .json(&json!({ "station_id": null, "note": null }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
    }

    // The attendant sees only their own record
    let response = client
        .get("/api/1/attendance")
        .cookie(attendant_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let records: Vec<Attendance> = response.into_json().await.expect("attendance JSON");
    assert_eq!(records.len(), 1);

    // Asking for someone else's records is forbidden
    let other_id = records[0].employee_id + 1;
    let response = client
        .get(format!("/api/1/attendance?employee_id={}", other_id))
        .cookie(attendant_cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    // Admin sees everyone
    let response = client
        .get("/api/1/attendance")
        .cookie(admin_cookie)
        .dispatch()
        .await;
    let records: Vec<Attendance> = response.into_json().await.expect("attendance JSON");
    assert!(records.len() >= 2);
}
