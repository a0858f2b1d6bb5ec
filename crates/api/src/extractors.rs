//! Request extractors.

use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};
use gateway_core::limits::UNKNOWN_CLIENT;

/// Client IP address.
///
/// Resolution order: first `X-Forwarded-For` entry, `X-Real-IP`, then the
/// socket peer when the server was started with connect info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl ClientIp {
    /// Rate-limit and audit key. Unresolvable clients share one bucket.
    pub fn key(&self) -> &str {
        self.0.as_deref().unwrap_or(UNKNOWN_CLIENT)
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Proxies append, so the first entry is the original client
        if let Some(ip) = header_value(parts, "X-Forwarded-For")
            .and_then(|xff| xff.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return Ok(ClientIp(Some(ip.to_string())));
        }

        if let Some(ip) = header_value(parts, "X-Real-IP") {
            return Ok(ClientIp(Some(ip.to_string())));
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(ClientIp(peer))
    }
}
