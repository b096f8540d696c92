//! Outbound fetch guard: refuses user-submitted URLs that point at private,
//! loopback or metadata addresses.

use crate::error::FetchError;
use std::net::IpAddr;
use url::Url;

/// Check whether an IP address is private, loopback, link-local, or metadata.
pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.octets() == [169, 254, 169, 254]
        }
        IpAddr::V6(v6) => {
            let segs = v6.segments();
            v6.is_loopback()
                || v6.is_unspecified()
                || (segs[0] & 0xfe00) == 0xfc00 // unique-local fc00::/7
                || (segs[0] & 0xffc0) == 0xfe80 // link-local fe80::/10
                || v6
                    .to_ipv4_mapped()
                    .is_some_and(|v4| is_private_ip(&IpAddr::V4(v4)))
        }
    }
}

/// Check whether a hostname string is a private/internal host.
pub fn is_private_host(host: &str) -> bool {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if bare == "localhost" || bare.ends_with(".localhost") {
        return true;
    }
    bare.parse::<IpAddr>().is_ok_and(|ip| is_private_ip(&ip))
}

/// Resolve a redirect `Location` against the URL that answered with it.
///
/// Hops that leave http(s), or that name a private host literally while
/// `block_private_hosts` is set, are refused before any request is sent.
pub fn redirect_hop(
    from: &Url,
    location: &str,
    block_private_hosts: bool,
) -> Result<Url, FetchError> {
    let next = from.join(location).map_err(|e| FetchError::InvalidUrl {
        url: location.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(next.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: next.to_string(),
            message: "redirect leaves http(s)".into(),
        });
    }
    let host = next.host_str().ok_or_else(|| FetchError::InvalidUrl {
        url: next.to_string(),
        message: "URL has no host".into(),
    })?;
    if block_private_hosts && is_private_host(host) {
        return Err(FetchError::Blocked { host: host.into() });
    }
    Ok(next)
}

/// Resolve the URL's host and fail if any address is private.
pub async fn ensure_public_host(url: &Url) -> Result<(), FetchError> {
    let host = url.host_str().ok_or_else(|| FetchError::InvalidUrl {
        url: url.to_string(),
        message: "URL has no host".into(),
    })?;
    if is_private_host(host) {
        return Err(FetchError::Blocked { host: host.into() });
    }

    let port = url.port_or_known_default().unwrap_or(443);
    if let Ok(addrs) = tokio::net::lookup_host((host, port)).await {
        for addr in addrs {
            if is_private_ip(&addr.ip()) {
                tracing::debug!(host, ip = %addr.ip(), "host resolves to private address");
                return Err(FetchError::Blocked { host: host.into() });
            }
        }
    }
    Ok(())
}
