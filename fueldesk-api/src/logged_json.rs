//! A `Json<T>` data guard that logs deserialization failures.
//!
//! Rocket's stock `Json` guard rejects malformed payloads with a bare 422,
//! which makes client-side bugs hard to chase from the server logs. This
//! wrapper logs the parse error and the offending path before forwarding the
//! failure to the usual catcher.

use std::ops::Deref;

use rocket::data::{Data, FromData, Outcome};
use rocket::request::Request;
use rocket::serde::json::Json;
use serde::Deserialize;

pub struct LoggedJson<T>(pub T);

impl<T> Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromData<'r> for LoggedJson<T>
where
    T: Deserialize<'r>,
{
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            Outcome::Success(json) => Outcome::Success(LoggedJson(json.into_inner())),
            Outcome::Error((status, err)) => {
                error!(
                    "Failed to parse JSON body for {} {}: {:?}",
                    req.method(),
                    req.uri().path(),
                    err
                );
                Outcome::Error((status, err))
            }
            Outcome::Forward(f) => Outcome::Forward(f),
        }
    }
}
