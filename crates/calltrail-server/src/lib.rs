//! # calltrail-server
//!
//! HTTP surface of the Calltrail demo: a configuration-binding endpoint and
//! student CRUD endpoints whose service calls go through the audit
//! interceptor.

pub mod caller;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;
pub mod student;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
