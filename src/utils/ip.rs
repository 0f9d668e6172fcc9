//! Client address handling
//!
//! Extraction of the real client IP (trusted-proxy aware, CIDR matching,
//! private-range auto-detection) and the one-way digests stored instead of
//! raw addresses.

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::dev::ConnectionInfo;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::get_config;

/// Stored hash length in hex chars (64 bits of the SHA-256 digest)
const IP_HASH_LEN: usize = 16;

/// One-way digest of a client address: SHA-256, hex, truncated.
pub fn hash_ip(ip: &str) -> String {
    truncated_sha256_hex(ip.as_bytes())
}

/// Fallback visitor digest when no network address is available.
///
/// Built from request signals (user agent, locale). This is best-effort
/// anonymized visitor distinction, not a security control, and is not
/// comparable to an address-derived hash.
pub fn hash_fingerprint(user_agent: Option<&str>, accept_language: Option<&str>) -> Option<String> {
    if user_agent.is_none() && accept_language.is_none() {
        return None;
    }

    let input = format!(
        "fp:{}|{}",
        user_agent.unwrap_or_default(),
        accept_language.unwrap_or_default()
    );
    Some(truncated_sha256_hex(input.as_bytes()))
}

fn truncated_sha256_hex(input: &[u8]) -> String {
    let digest = Sha256::digest(input);
    let mut out = String::with_capacity(IP_HASH_LEN);
    for byte in digest.iter().take(IP_HASH_LEN / 2) {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Check whether an IP is private or localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
        IpAddr::V6(v6) => {
            // ::1, fc00::/7 (ULA), fe80::/10 (link-local)
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}

/// Check whether an IP is in the trusted proxy list
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    // peer_addr may carry a port; try SocketAddr first
    let ip_addr = if let Ok(socket_addr) = ip.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = ip.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    for proxy in trusted_proxies {
        if proxy.contains('/') {
            if ip_in_cidr(&ip_addr, proxy) {
                return true;
            }
        } else if let Ok(proxy_addr) = proxy.parse::<IpAddr>()
            && ip_addr == proxy_addr
        {
            return true;
        }
    }
    false
}

/// CIDR membership check
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false,
    }
}

/// Extract the real client IP from connection info.
///
/// Priority:
/// 1. Explicit trusted_proxies match → honor X-Forwarded-For
/// 2. No trusted_proxies configured and the peer is a private IP → assume a
///    reverse proxy and honor X-Forwarded-For if present
/// 3. Otherwise → the connection IP (forwarded headers from untrusted peers
///    are spoofable and ignored)
pub fn extract_client_ip_from_conn_info<F>(
    conn_info: &ConnectionInfo,
    get_forwarded_ip: F,
) -> Option<String>
where
    F: FnOnce() -> Option<String>,
{
    let peer_ip = conn_info.peer_addr()?;

    let trusted_proxies = &get_config().api.trusted_proxies;
    if !trusted_proxies.is_empty() {
        if is_trusted_proxy(peer_ip, trusted_proxies) {
            let real_ip = get_forwarded_ip().unwrap_or_else(|| peer_ip.to_string());
            debug!("Trusted proxy (explicit): {} -> {}", peer_ip, real_ip);
            return Some(real_ip);
        }
        debug!(
            "Connection from {}, not in trusted_proxies, using peer IP",
            peer_ip
        );
        return Some(peer_ip.to_string());
    }

    if let Ok(ip_addr) = peer_ip.parse::<IpAddr>()
        && is_private_or_local(&ip_addr)
        && let Some(real_ip) = get_forwarded_ip()
    {
        debug!(
            "Auto-detect proxy (private IP {}): using X-Forwarded-For: {}",
            peer_ip, real_ip
        );
        return Some(real_ip);
    }

    Some(peer_ip.to_string())
}

/// Extract the real client IP from an HttpRequest
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    extract_client_ip_from_conn_info(&req.connection_info(), || {
        extract_forwarded_ip_from_headers(req.headers())
    })
}

/// X-Forwarded-For (first entry) with X-Real-IP as fallback
pub fn extract_forwarded_ip_from_headers(
    headers: &actix_web::http::header::HeaderMap,
) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_ip_shape() {
        let hash = hash_ip("203.0.113.7");
        assert_eq!(hash.len(), IP_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        // deterministic, and distinct inputs diverge
        assert_eq!(hash, hash_ip("203.0.113.7"));
        assert_ne!(hash, hash_ip("203.0.113.8"));
    }

    #[test]
    fn test_hash_fingerprint() {
        assert!(hash_fingerprint(None, None).is_none());

        let fp = hash_fingerprint(Some("Mozilla/5.0"), Some("en-US")).unwrap();
        assert_eq!(fp.len(), IP_HASH_LEN);
        assert_eq!(fp, hash_fingerprint(Some("Mozilla/5.0"), Some("en-US")).unwrap());

        // address hashes and fingerprint hashes live in different input
        // spaces even for equal raw strings
        assert_ne!(hash_ip("Mozilla/5.0|en-US"), fp);
    }

    #[test]
    fn test_is_private_or_local_ipv4() {
        assert!(is_private_or_local(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_or_local(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_or_local(&"127.0.0.1".parse().unwrap()));
        assert!(!is_private_or_local(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_or_local(&"1.1.1.1".parse().unwrap()));
    }

    #[test]
    fn test_is_private_or_local_ipv6() {
        assert!(is_private_or_local(&"::1".parse().unwrap()));
        assert!(is_private_or_local(&"fd00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fc00::1".parse().unwrap()));
        assert!(is_private_or_local(&"fe80::1".parse().unwrap()));
        assert!(!is_private_or_local(
            &"2001:4860:4860::8888".parse().unwrap()
        ));
    }

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec![
            "127.0.0.1".to_string(),
            "192.168.1.0/24".to_string(),
            "10.0.0.1".to_string(),
        ];

        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(is_trusted_proxy("10.0.0.1", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("192.168.2.1", &proxies));
    }
}
