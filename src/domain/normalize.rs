//! Stage B's pure transforms (§4.2), grounded on
//! `original_source/b_certs_filtering/b_certs_filtering.py`.
//!
//! Every function here is a pure string transform with no I/O, which is what
//! makes the property laws in §8 of the spec (idempotence, monotonicity)
//! testable in isolation from the registry commit.

/// The registrable domain (public-suffix-aware "eTLD+1"), e.g.
/// `"a.b.example.co.uk"` -> `Some("example.co.uk")`.
fn registrable_domain(host: &str) -> Option<String> {
    psl::domain(host.as_bytes()).map(|d| String::from_utf8_lossy(d.as_bytes()).into_owned())
}

/// The effective TLD (public suffix), e.g. `"example.co.uk"` -> `Some("co.uk")`.
pub fn effective_tld(host: &str) -> Option<String> {
    psl::suffix(host.as_bytes()).map(|s| String::from_utf8_lossy(s.as_bytes()).into_owned())
}

/// The labels left of the registrable domain, split on `.`. Returns an empty
/// vec for a bare registrable domain (no subdomain).
pub fn subdomain_labels(host: &str) -> Vec<String> {
    let Some(registrable) = registrable_domain(host) else {
        return Vec::new();
    };
    if host.len() <= registrable.len() {
        return Vec::new();
    }
    // host = "<subdomain>.<registrable>"; drop the separating dot too.
    let sub = &host[..host.len() - registrable.len() - 1];
    if sub.is_empty() {
        Vec::new()
    } else {
        sub.split('.').map(|s| s.to_string()).collect()
    }
}

/// §4.2 step 1: drop domains with more than one subdomain label.
pub fn is_deep_subdomain(host: &str) -> bool {
    subdomain_labels(host).len() > 1
}

/// Strips a leading `*.` and then a leading `www.`, in that order (§4.2 step 3).
/// Idempotent: stripping twice is the same as stripping once, because the
/// second pass finds nothing left to strip.
pub fn normalize(host: &str) -> String {
    let host = host.strip_prefix("*.").unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        for d in [
            "example.com",
            "*.example.com",
            "www.example.com",
            "*.www.example.com",
            "plain",
        ] {
            let once = normalize(d);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize({d:?}) was not idempotent");
        }
    }

    #[test]
    fn normalize_strips_wildcard_then_www() {
        assert_eq!(normalize("*.foo.example.com"), "foo.example.com");
        assert_eq!(normalize("www.foo.example.com"), "foo.example.com");
        assert_eq!(normalize("*.www.foo.example.com"), "foo.example.com");
        assert_eq!(normalize("foo.example.com"), "foo.example.com");
    }

    #[test]
    fn subdomain_labels_single_label() {
        assert_eq!(subdomain_labels("x.example.com"), vec!["x".to_string()]);
    }

    #[test]
    fn subdomain_labels_multi_label() {
        assert_eq!(
            subdomain_labels("a.b.example.com"),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn subdomain_labels_bare_registrable_domain() {
        assert!(subdomain_labels("example.com").is_empty());
    }

    #[test]
    fn is_deep_subdomain_detects_multi_label() {
        assert!(is_deep_subdomain("a.b.example.com"));
        assert!(!is_deep_subdomain("x.example.com"));
        assert!(!is_deep_subdomain("example.com"));
    }

    #[test]
    fn effective_tld_is_lowercase_suffix() {
        assert_eq!(effective_tld("example.com").as_deref(), Some("com"));
        assert_eq!(effective_tld("example.co.uk").as_deref(), Some("co.uk"));
    }
}
