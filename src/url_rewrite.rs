//! Host normalization for server-issued upload and download URLs.
//!
//! A grid manager may hand out URLs bound to a node address (IPv4 or
//! bracketed IPv6) rather than the name the caller used, e.g. an HA member
//! IP instead of the VIP. Those are pointed back at the configured host.

use std::net::Ipv4Addr;

use tracing::debug;

/// Point `url` at `grid_mgr` unless it already mentions it.
pub fn rewrite_url(url: &str, grid_mgr: &str) -> String {
    if grid_mgr.is_empty() || url.contains(grid_mgr) {
        return url.to_string();
    }

    if let Some(literal) = bracketed_ipv6(url) {
        return url.replacen(literal, grid_mgr, 1);
    }

    if let Some(quad) = dotted_quad(url) {
        return url.replacen(quad, grid_mgr, 1);
    }

    debug!("Leaving URL {} untouched, host is not an IP literal", url);
    url.to_string()
}

/// The `[...]` host literal, brackets included.
fn bracketed_ipv6(url: &str) -> Option<&str> {
    let authority = authority(url)?;
    let start = authority.find('[')?;
    let end = authority[start..].find(']')? + start;
    Some(&authority[start..=end])
}

fn dotted_quad(url: &str) -> Option<&str> {
    let authority = authority(url)?;
    let host = authority.rsplit('@').next()?;
    let host = host.split(':').next()?;
    host.parse::<Ipv4Addr>().ok().map(|_| host)
}

/// The `user@host:port` part of an absolute URL.
fn authority(url: &str) -> Option<&str> {
    let rest = &url[url.find("://")? + 3..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_host_is_left_alone() {
        let url = "https://gm.example.com/http_direct_file_io/req_id-UPLOAD-1/import_file";
        assert_eq!(rewrite_url(url, "gm.example.com"), url);
    }

    #[test]
    fn test_ipv6_literal_is_replaced() {
        assert_eq!(
            rewrite_url("https://[::1]/path", "gm.example.com"),
            "https://gm.example.com/path"
        );
        assert_eq!(
            rewrite_url("https://[2001:db8::10]:8443/a/b", "gm.example.com"),
            "https://gm.example.com:8443/a/b"
        );
    }

    #[test]
    fn test_ipv4_literal_is_replaced() {
        assert_eq!(
            rewrite_url("https://10.0.0.5/path", "gm.example.com"),
            "https://gm.example.com/path"
        );
        assert_eq!(
            rewrite_url("https://10.0.0.5:443/path/10.0.0.5", "gm.example.com"),
            "https://gm.example.com:443/path/10.0.0.5"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_url("https://192.168.1.2/x", "gm.example.com");
        assert_eq!(rewrite_url(&once, "gm.example.com"), once);
    }

    #[test]
    fn test_other_hostnames_unchanged() {
        let url = "https://node2.example.com/path";
        assert_eq!(rewrite_url(url, "gm.example.com"), url);
    }
}
