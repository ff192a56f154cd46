//! # Client Extractor
//!
//! Pulls the visitor's browser details out of a request so server-side
//! conversion events can be matched to the browser pixel.

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use landing_core::ClientContext;
use std::convert::Infallible;
use std::net::SocketAddr;

/// `User-Agent` plus the first `X-Forwarded-For` hop, falling back to the peer address
#[derive(Debug, Clone)]
pub struct ClientInfo(pub ClientContext);

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_context(parts)))
    }
}

fn client_context(parts: &Parts) -> ClientContext {
    let user_agent = parts
        .headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let forwarded = parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let ip_address = forwarded.or_else(|| {
        parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    });

    ClientContext::new(user_agent, ip_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let parts = parts(
            Request::builder()
                .header("user-agent", "Mozilla/5.0")
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .body(())
                .unwrap(),
        );

        let client = client_context(&parts);
        assert_eq!(client.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(client.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut parts = parts(Request::builder().body(()).unwrap());
        parts
            .extensions
            .insert(ConnectInfo(SocketAddr::from(([198, 51, 100, 4], 51000))));

        let client = client_context(&parts);
        assert!(client.user_agent.is_none());
        assert_eq!(client.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_no_details() {
        let parts = parts(Request::builder().body(()).unwrap());
        assert!(client_context(&parts).is_empty());
    }
}
