//! Resolves the caller context of an HTTP request.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use calltrail_audit::CallerContext;
use calltrail_audit::context::UNKNOWN_ADDRESS;
use std::convert::Infallible;
use std::net::SocketAddr;

/// Header carrying the authenticated username.
pub const USERNAME_HEADER: &str = "x-username";

/// Extractor yielding the [`CallerContext`] of the current request.
///
/// Never rejects: callers without identity are anonymous, and callers without
/// a resolvable address are recorded as `unknown`.
#[derive(Debug, Clone)]
pub struct Caller(pub CallerContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let ip = extract_ip(&parts.headers)
            .or(peer)
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());

        let caller = match extract_username(&parts.headers) {
            Some(username) => CallerContext::new(username, ip),
            None => CallerContext::anonymous(ip),
        };
        Ok(Caller(caller))
    }
}

fn extract_ip(headers: &HeaderMap) -> Option<String> {
    first_hop(headers, "x-forwarded-for").or_else(|| first_hop(headers, "x-real-ip"))
}

/// First comma-separated entry of `name`, if it is a usable address.
fn first_hop(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn extract_username(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USERNAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
