use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;

use fueldesk_api::models::Customer;
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
async fn test_accounts_can_create_customer_with_balance() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;

    let new_customer = json!({
        "name": "Hill Top Transport",
        "contact_person": "Mr. Afzal",
        "phone": "0333-9999999",
        "agent_id": null,
        "credit_limit": 500000
    });

    let response = client
        .post("/api/1/customers")
        .cookie(accounts_cookie.clone())
        .json(&new_customer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let customer: Customer = response.into_json().await.expect("valid customer JSON");

    // The balance row is created in the same transaction
    let response = client
        .get(format!("/api/1/customers/{}/balance", customer.id))
        .cookie(accounts_cookie)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let balance: serde_json::Value = response.into_json().await.expect("valid balance JSON");
    assert_eq!(balance["credit_limit"], 500000);
    assert_eq!(balance["hold_balance"], 0);
    assert_eq!(balance["available"], 500000);
}

#[rocket::async_test]
async fn test_customer_creation_requires_admin_or_accounts() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let attendant_cookie = login_user(&client, "attendant@station1.example", "attendant").await;

    let new_customer = json!({
        "name": "Should Not Exist",
        "credit_limit": 0
    });

    let response = client
        .post("/api/1/customers")
        .cookie(attendant_cookie)
        .json(&new_customer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}

#[rocket::async_test]
async fn test_negative_credit_limit_is_rejected() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;

    let new_customer = json!({
        "name": "Negative Co",
        "credit_limit": -1
    });

    let response = client
        .post("/api/1/customers")
        .cookie(accounts_cookie)
        .json(&new_customer)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[rocket::async_test]
async fn test_update_customer_partial() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;

    let response = client
        .get("/api/1/customers")
        .cookie(accounts_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let customers: Vec<Customer> = response.into_json().await.expect("valid customers JSON");
    let target = customers
        .iter()
        .find(|c| c.name == "Test Customer 2")
        .expect("seeded customer 2");

    let update = json!({ "phone": "051-5550000" });
    let response = client
        .put(format!("/api/1/customers/{}", target.id))
        .cookie(accounts_cookie)
        .json(&update)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let updated: Customer = response.into_json().await.expect("valid customer JSON");
    assert_eq!(updated.phone.as_deref(), Some("051-5550000"));
    assert_eq!(updated.name, "Test Customer 2");
}

#[rocket::async_test]
async fn test_set_credit_limit() {
    let client = Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance");
    let accounts_cookie = login_user(&client, "accounts@fueldesk.example", "accounts").await;

    let response = client
        .get("/api/1/customers")
        .cookie(accounts_cookie.clone())
        .dispatch()
        .await;
    let customers: Vec<Customer> = response.into_json().await.expect("valid customers JSON");
    let target = customers
        .iter()
        .find(|c| c.name == "Test Customer 2")
        .expect("seeded customer 2");

    let response = client
        .put(format!("/api/1/customers/{}/credit-limit", target.id))
        .cookie(accounts_cookie.clone())
        .json(&json!({ "credit_limit": 75000 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let balance: serde_json::Value = response.into_json().await.expect("valid balance JSON");
    assert_eq!(balance["credit_limit"], 75000);
    assert_eq!(balance["available"], 75000);

    // Unknown customer
    let response = client
        .put("/api/1/customers/424242/credit-limit")
        .cookie(accounts_cookie)
        .json(&json!({ "credit_limit": 1000 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}
