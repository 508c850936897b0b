//! Session cookie attribute derivation.
//!
//! The admin UI may be served from a different subdomain than the API, so the
//! session cookie is scoped to the registrable domain when one can be guessed
//! and marked `SameSite=None; Secure` whenever the request arrived over TLS.

use axum::http::{HeaderMap, header::HOST};
use axum_extra::extract::cookie::{Cookie, SameSite};

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Attributes used both to set and to clear the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    /// `None` keeps the cookie host-only.
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
    pub http_only: bool,
    pub path: &'static str,
}

impl CookiePolicy {
    /// Compute the policy from already-extracted request facts.
    ///
    /// `forwarded_proto` holds raw `X-Forwarded-Proto` header values; each may
    /// itself be a comma-separated list. The header is trusted as-is, so the
    /// service must only be reachable through a proxy that sets it.
    pub fn resolve(
        hostname: &str,
        forwarded_proto: &[&str],
        connection_proto: &str,
        override_domain: Option<&str>,
    ) -> Self {
        let secure = is_secure(forwarded_proto, connection_proto);
        Self {
            domain: cookie_domain(hostname, override_domain),
            secure,
            same_site: if secure { SameSite::None } else { SameSite::Lax },
            http_only: true,
            path: "/",
        }
    }

    pub fn from_headers(
        headers: &HeaderMap,
        scheme: Option<&str>,
        override_domain: Option<&str>,
    ) -> Self {
        let authority = headers
            .get(X_FORWARDED_HOST)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .or_else(|| headers.get(HOST).and_then(|v| v.to_str().ok()))
            .unwrap_or_default();
        let forwarded: Vec<&str> = headers
            .get_all(X_FORWARDED_PROTO)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        Self::resolve(
            hostname_from_authority(authority),
            &forwarded,
            scheme.unwrap_or("http"),
            override_domain,
        )
    }

    /// Stamp the policy attributes onto a cookie.
    pub fn apply<'c>(&self, cookie: Cookie<'c>) -> Cookie<'c> {
        let mut builder = Cookie::build(cookie)
            .path(self.path)
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site);
        if let Some(domain) = self.domain.clone() {
            builder = builder.domain(domain);
        }
        builder.build()
    }
}

/// Strip an optional port from a `Host`-style authority.
/// `[::1]:3000` yields `::1`; a bare IPv6 literal is returned unchanged.
pub fn hostname_from_authority(authority: &str) -> &str {
    let authority = authority.trim();
    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or_default();
    }
    match authority.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        }
        _ => authority,
    }
}

fn cookie_domain(hostname: &str, override_domain: Option<&str>) -> Option<String> {
    if let Some(configured) = override_domain.filter(|d| !d.is_empty()) {
        return Some(configured.to_string());
    }
    if hostname.is_empty() || LOCAL_HOSTS.contains(&hostname) || is_ip_address(hostname) {
        return None;
    }

    // eTLD+1 guess; wrong for suffixes like `.co.uk`, which need the override.
    let labels: Vec<&str> = hostname.split('.').filter(|l| !l.is_empty()).collect();
    match labels.as_slice() {
        [.., second_level, tld] => Some(format!(".{second_level}.{tld}")),
        _ => None,
    }
}

/// Dotted-quad IPv4, or anything with a colon (treated as IPv6).
fn is_ip_address(host: &str) -> bool {
    if host.contains(':') {
        return true;
    }
    let octets: Vec<&str> = host.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| (1..=3).contains(&o.len()) && o.bytes().all(|b| b.is_ascii_digit()))
}

fn is_secure(forwarded_proto: &[&str], connection_proto: &str) -> bool {
    if connection_proto.eq_ignore_ascii_case("https") {
        return true;
    }
    forwarded_proto
        .iter()
        .flat_map(|value| value.split(','))
        .any(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn local_and_ip_hosts_stay_host_only() {
        for host in ["", "localhost", "127.0.0.1", "::1", "10.0.0.5", "fe80::1"] {
            let policy = CookiePolicy::resolve(host, &[], "http", None);
            assert_eq!(policy.domain, None, "host {host:?}");
        }
    }

    #[test]
    fn subdomain_collapses_to_registrable_domain() {
        let policy = CookiePolicy::resolve("shop.example.com", &[], "http", None);
        assert_eq!(policy.domain.as_deref(), Some(".example.com"));

        let policy = CookiePolicy::resolve("example.com", &[], "http", None);
        assert_eq!(policy.domain.as_deref(), Some(".example.com"));
    }

    #[test]
    fn multi_part_suffix_is_approximated() {
        let policy = CookiePolicy::resolve("api.shop.co.uk", &[], "http", None);
        assert_eq!(policy.domain.as_deref(), Some(".co.uk"));
    }

    #[test]
    fn single_label_host_has_no_domain() {
        let policy = CookiePolicy::resolve("intranet", &[], "http", None);
        assert_eq!(policy.domain, None);
    }

    #[test]
    fn override_always_wins() {
        for host in ["", "localhost", "10.0.0.5", "fe80::1", "shop.example.com", "a.b.co.uk"] {
            let policy = CookiePolicy::resolve(host, &[], "http", Some(".viyakaptan.com"));
            assert_eq!(policy.domain.as_deref(), Some(".viyakaptan.com"), "host {host:?}");
        }
    }

    #[test]
    fn secure_from_connection_or_forwarded_header() {
        assert!(CookiePolicy::resolve("example.com", &[], "https", None).secure);
        assert!(CookiePolicy::resolve("example.com", &["HTTPS"], "http", None).secure);
        assert!(CookiePolicy::resolve("example.com", &["http, https"], "http", None).secure);
        assert!(CookiePolicy::resolve("example.com", &["http", " Https "], "http", None).secure);
        assert!(!CookiePolicy::resolve("example.com", &["http"], "http", None).secure);
        assert!(!CookiePolicy::resolve("example.com", &["httpsx"], "http", None).secure);
        assert!(!CookiePolicy::resolve("example.com", &[], "http", None).secure);
    }

    #[test]
    fn same_site_follows_secure() {
        let secure = CookiePolicy::resolve("example.com", &["https"], "http", None);
        assert_eq!(secure.same_site, SameSite::None);
        let plain = CookiePolicy::resolve("example.com", &[], "http", None);
        assert_eq!(plain.same_site, SameSite::Lax);
        assert!(secure.http_only && plain.http_only);
        assert_eq!(plain.path, "/");
    }

    #[test]
    fn authority_port_is_stripped() {
        assert_eq!(hostname_from_authority("example.com:8080"), "example.com");
        assert_eq!(hostname_from_authority("example.com"), "example.com");
        assert_eq!(hostname_from_authority("[::1]:3000"), "::1");
        assert_eq!(hostname_from_authority("fe80::1"), "fe80::1");
        assert_eq!(hostname_from_authority(""), "");
    }

    #[test]
    fn headers_prefer_forwarded_host() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("127.0.0.1:3000"));
        headers.insert(X_FORWARDED_HOST, HeaderValue::from_static("api.viyakaptan.com"));
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));

        let policy = CookiePolicy::from_headers(&headers, None, None);
        assert_eq!(policy.domain.as_deref(), Some(".viyakaptan.com"));
        assert!(policy.secure);
    }

    #[test]
    fn apply_sets_all_attributes() {
        let policy = CookiePolicy::resolve("www.example.com", &["https"], "http", None);
        let cookie = policy.apply(Cookie::new("app_session_id", "v"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.path(), Some("/"));
    }
}
