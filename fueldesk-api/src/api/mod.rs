pub mod agent;
pub mod attendance;
pub mod audit;
pub mod customer;
pub mod deal_price;
pub mod employee;
pub mod filling_request;
pub mod login;
pub mod logout;
pub mod product;
pub mod purchase_invoice;
pub mod role;
pub mod station;
pub mod stock;
pub mod stock_transfer;
pub mod status;

use rocket::Route;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(agent::routes());
    routes.extend(attendance::routes());
    routes.extend(audit::routes());
    routes.extend(customer::routes());
    routes.extend(deal_price::routes());
    routes.extend(employee::routes());
    routes.extend(filling_request::routes());
    routes.extend(login::routes());
    routes.extend(logout::routes());
    routes.extend(product::routes());
    routes.extend(purchase_invoice::routes());
    routes.extend(role::routes());
    routes.extend(station::routes());
    routes.extend(stock::routes());
    routes.extend(stock_transfer::routes());
    routes.extend(status::routes());
    routes
}
