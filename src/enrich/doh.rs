//! The Cloudflare DNS-over-HTTPS client (§4.3), grounded on
//! `original_source/c_dns_multiplexer/c_dns_multiplexer.py`'s
//! `async_dns_resolve`/`extract_nameservers`. The SOA-RNAME regex is carried
//! over byte-for-byte.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

const DOH_URL: &str = "https://cloudflare-dns.com/dns-query";

/// Matches the nameserver embedded in an SOA record's RNAME field.
static SOA_NAMESERVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+\.)").expect("static regex is valid"));

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    rtype: u16,
    data: String,
}

#[derive(Debug, Deserialize, Default)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DohAnswer>,
    #[serde(rename = "Authority", default)]
    authority: Vec<DohAnswer>,
}

/// Thin wrapper over a pooled `reqwest::Client` pointed at Cloudflare's DoH
/// endpoint. One instance is shared across all of Stage C's concurrent
/// lookups.
pub struct DohClient {
    client: Client,
}

impl DohClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build the DoH HTTP client")?;
        Ok(Self { client })
    }

    /// Resolves a domain's A and NS records. A records come from the A
    /// query's Answer section (type 1); NS records come from the NS query's
    /// Answer (type 2), Authority NS (type 2) and Authority SOA (type 6,
    /// RNAME extracted via regex) records, matching the source exactly.
    /// Either query failing yields empty sets for both, same as the source's
    /// `status == 200 and status == 200` guard.
    pub async fn resolve(&self, domain: &str) -> (HashSet<String>, HashSet<String>) {
        match tokio::try_join!(self.query(domain, "A"), self.query(domain, "NS")) {
            Ok((ip_resp, ns_resp)) => {
                let ips = ip_resp
                    .answer
                    .into_iter()
                    .filter(|a| a.rtype == 1)
                    .map(|a| a.data)
                    .collect();
                (ips, extract_nameservers(&ns_resp))
            }
            Err(e) => {
                tracing::debug!(domain, error = %e, "DNS resolution failed");
                (HashSet::new(), HashSet::new())
            }
        }
    }

    async fn query(&self, domain: &str, rtype: &str) -> Result<DohResponse> {
        let resp = self
            .client
            .get(DOH_URL)
            .query(&[("name", domain), ("type", rtype)])
            .header("accept", "application/dns-json")
            .send()
            .await
            .context("DoH request failed")?;
        if !resp.status().is_success() {
            bail!("DoH returned status {}", resp.status());
        }
        resp.json::<DohResponse>()
            .await
            .context("failed to parse DoH JSON response")
    }
}

fn extract_nameservers(resp: &DohResponse) -> HashSet<String> {
    let mut nameservers = HashSet::new();
    for record in &resp.answer {
        if record.rtype == 2 {
            nameservers.insert(record.data.clone());
        }
    }
    for record in &resp.authority {
        match record.rtype {
            2 => {
                nameservers.insert(record.data.clone());
            }
            6 => {
                for m in SOA_NAMESERVER_RE.find_iter(&record.data) {
                    nameservers.insert(m.as_str().to_string());
                }
            }
            _ => {}
        }
    }
    nameservers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_ns_from_answer_and_authority_and_soa() {
        let resp: DohResponse = serde_json::from_str(
            r#"{
                "Answer": [{"type": 2, "data": "ns1.example.com."}],
                "Authority": [
                    {"type": 2, "data": "ns2.example.com."},
                    {"type": 6, "data": "ns3.example.com. hostmaster.example.com. 1 2 3 4 5"}
                ]
            }"#,
        )
        .unwrap();
        let ns = extract_nameservers(&resp);
        assert!(ns.contains("ns1.example.com."));
        assert!(ns.contains("ns2.example.com."));
        assert!(ns.contains("ns3.example.com."));
    }

    #[test]
    fn ignores_non_ns_non_soa_records() {
        let resp: DohResponse = serde_json::from_str(
            r#"{"Answer": [{"type": 1, "data": "1.2.3.4"}], "Authority": []}"#,
        )
        .unwrap();
        assert!(extract_nameservers(&resp).is_empty());
    }
}
