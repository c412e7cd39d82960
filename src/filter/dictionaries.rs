//! Static denylists loaded once at startup (§4.2 steps 2 and 4).
//!
//! The spec treats these as "two constant sets loaded at startup" external to
//! the core; the service-subdomain list is carried over verbatim from
//! `original_source/dictionary/skippable_subdomains.py`. The TLD blacklist is
//! a small, defensible default (see DESIGN.md's Open Questions) — free or
//! heavily-abused TLDs that are disproportionately used for throwaway,
//! short-lived infrastructure.

use std::collections::HashSet;

use once_cell::sync::Lazy;

pub static TLD_BLACKLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "zip", "mov", "tk", "ml", "ga", "cf", "gq", "xyz", "top", "click", "work", "link",
        "loan", "men", "date", "faith", "racing", "review", "science", "webcam", "party",
        "download", "stream", "bid", "accountant", "win",
    ]
    .into_iter()
    .collect()
});

pub static SERVICE_SUBDOMAIN_BLACKLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "cpanel",
        "ftp",
        "mail",
        "webmail",
        "smtp",
        "pop",
        "imap",
        "vpn",
        "admin",
        "ns1",
        "ns2",
        "dns",
        "dns1",
        "dns2",
        "dns3",
        "dns4",
        "dns5",
        "dns6",
        "autoconfig",
        "autodiscover",
        "mx",
        "api",
        "test",
        "staging",
        "beta",
        "cdn",
        "static",
        "sandbox",
        "backup",
        "mysql",
        "db",
        "sftp",
        "secure",
        "private",
        "server",
        "dashboard",
        "files",
        "portal",
        "jira",
        "confluence",
        "jenkins",
        "git",
        "ci",
        "monitor",
        "grafana",
        "metrics",
        "ops",
        "reports",
        "log",
        "logs",
        "kibana",
        "elk",
        "zabbix",
        "nagios",
        "sysadmin",
        "remote",
        "root",
        "auth",
        "oauth",
        "api-docs",
        "swagger",
        "proxy",
        "cache",
        "replica",
        "cloud",
        "redis",
        "memcached",
        "elasticsearch",
        "db2",
        "pgadmin",
        "phpmyadmin",
        "node",
        "k8s",
        "kubernetes",
        "prometheus",
        "nexus",
        "artifact",
        "ldap",
        "manager",
        "tools",
        "utils",
        "console",
        "devops",
        "builder",
        "workflow",
        "token",
        "mailserver",
        "extranet",
        "intranet",
        "sharepoint",
        "vpnserver",
        "reseller",
        "partner",
        "pipelines",
        "webmaster",
        "cp",
        "adminpanel",
        "administrator",
        "sql",
        "oracle",
        "billing",
        "customerportal",
        "contracts",
        "assets",
        "cpcalendars",
        "cpcontacts",
        "webdisk",
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_subdomain_blacklist_carries_over_known_entries() {
        for must_have in ["mail", "ns1", "cpanel", "grafana", "admin"] {
            assert!(
                SERVICE_SUBDOMAIN_BLACKLIST.contains(must_have),
                "expected {must_have:?} in the service-subdomain blacklist"
            );
        }
    }

    #[test]
    fn tld_blacklist_is_lowercase() {
        for tld in TLD_BLACKLIST.iter() {
            assert_eq!(*tld, tld.to_lowercase());
        }
    }
}
