use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// Raw certstream envelope: `{"data": {"leaf_cert": {...}}}`.
///
/// Only the fields this pipeline cares about are modeled; unknown fields are
/// ignored rather than rejected (certstream's payload carries a lot more than
/// we need — `cert_index`, `seen`, `source`, ...).
#[derive(Debug, Deserialize)]
pub struct CertstreamMessage {
    pub data: CertstreamData,
}

#[derive(Debug, Deserialize)]
pub struct CertstreamData {
    pub leaf_cert: Option<LeafCert>,
}

#[derive(Debug, Deserialize)]
pub struct LeafCert {
    pub not_before: Option<i64>,
    pub not_after: Option<i64>,
    #[serde(default)]
    pub all_domains: Vec<String>,
}

/// Stage A's decoded certificate notification (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertEvent {
    pub not_before: i64,
    pub not_after: i64,
    pub all_domains: Vec<String>,
}

impl CertEvent {
    /// Validity window in seconds. Certs with a window `>= CERT_MAX_VALIDITY`
    /// are not of interest (§4.1 step 3).
    pub fn validity_secs(&self) -> i64 {
        self.not_after - self.not_before
    }

    /// Extracts a `CertEvent` from a raw certstream message, or `None` if a
    /// required field is missing (a malformed event, per §4.1's failure mode).
    pub fn from_message(msg: &CertstreamMessage) -> Option<Self> {
        let leaf = msg.data.leaf_cert.as_ref()?;
        Some(Self {
            not_before: leaf.not_before?,
            not_after: leaf.not_after?,
            all_domains: leaf.all_domains.clone(),
        })
    }
}

/// AB payload: the raw domains from one `all_domains` list (§3).
pub type DomainBatch = Vec<String>;

/// BC payload: newly-registered `{domain -> registry id}` (§3).
pub type FilteredBatch = HashMap<String, i64>;

/// CD payload: one domain enriched with its A/NS records (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    pub id: i64,
    pub domain: String,
    pub ips: HashSet<String>,
    pub ns: HashSet<String>,
}
