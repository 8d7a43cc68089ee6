//! Client address resolution.
//!
//! The service is meant to sit behind one reverse proxy, so the first
//! `X-Forwarded-For` entry names the client. Without the header the socket
//! peer is used.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// First non-empty `X-Forwarded-For` entry, verbatim.
pub fn forwarded_origin(headers: &HeaderMap) -> Option<String> {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
}

/// Origin address recorded with a claim.
pub fn client_origin(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    forwarded_origin(headers)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting key. Falls back to the peer when the forwarded entry is
/// not an IP, and to localhost when neither is known.
pub fn client_ip<B>(req: &Request<B>) -> IpAddr {
    if let Some(ip) = forwarded_origin(req.headers()).and_then(|s| s.parse::<IpAddr>().ok()) {
        return ip;
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip();
    }

    IpAddr::V4(Ipv4Addr::LOCALHOST)
}
