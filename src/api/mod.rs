//! Typed calls for the console's public and admin views. All of them go
//! through [`ApiClient`](crate::client::ApiClient), so they carry the session's
//! bearer token and get the refresh-and-retry treatment.

pub mod account;
pub mod dashboard;
pub mod posts;
pub mod profile;
pub mod roles;
pub mod users;
