//! Client-side session, authorization and API access for the NYC360 admin
//! console and public portal.
//!
//! [`identity::SessionManager`] owns the signed-in identity and its tokens,
//! [`client::AuthInterceptor`] attaches them to backend calls and recovers from
//! an expired access token once per request, and [`routes`] decides which
//! console views the current identity may enter.

pub mod error;
pub mod config;
pub mod identity;
pub mod client;
pub mod routes;
pub mod api;
pub mod console;
pub mod cli;

pub use error::{AppError, AppResult};
