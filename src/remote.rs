//! Accession-to-taxonomy mapping over NCBI E-utilities and EBI dbfetch
//!
//! Synchronous GETs with a fixed retry budget: a non-2xx response is retried
//! up to 5 times with a short pause, then surfaced as a remote error.
//! Response payloads are picked apart by small pure functions so the parsing
//! is testable without the network.

use crate::errors::{EnveomicsError, Result};
use std::thread::sleep;
use std::time::Duration;

const NCBI_EUTILS: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const EBI_DBFETCH: &str = "https://www.ebi.ac.uk/Tools/dbfetch/dbfetch";

/// Taxonomy data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomySource {
    Ncbi,
    Ebi,
}

impl std::str::FromStr for TaxonomySource {
    type Err = EnveomicsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ncbi" => Ok(TaxonomySource::Ncbi),
            "ebi" => Ok(TaxonomySource::Ebi),
            other => Err(EnveomicsError::Option(format!(
                "unsupported taxonomy source '{other}' (use ncbi or ebi)"
            ))),
        }
    }
}

/// One resolved accession.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TaxonomyRecord {
    pub accession: String,
    pub taxid: Option<u64>,
    pub organism: String,
    pub lineage: String,
}

pub struct TaxonomyClient {
    client: reqwest::blocking::Client,
    attempts: usize,
    pause: Duration,
}

impl Default for TaxonomyClient {
    fn default() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            attempts: 5,
            pause: Duration::from_millis(500),
        }
    }
}

impl TaxonomyClient {
    pub fn new(attempts: usize) -> Self {
        Self {
            attempts: attempts.max(1),
            ..Self::default()
        }
    }

    fn get_with_retry(&self, url: &str) -> Result<String> {
        let mut last = String::new();
        for attempt in 1..=self.attempts {
            match self.client.get(url).send() {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .text()
                        .map_err(|e| EnveomicsError::Remote(format!("reading {url}: {e}")));
                }
                Ok(resp) => last = format!("HTTP {}", resp.status()),
                Err(e) => last = e.to_string(),
            }
            if attempt < self.attempts {
                sleep(self.pause);
            }
        }
        Err(EnveomicsError::Remote(format!(
            "{url} failed after {} attempts: {last}",
            self.attempts
        )))
    }

    /// Resolve a sequence accession through NCBI: esummary on nuccore for
    /// the taxid, then efetch on taxonomy for organism and lineage.
    pub fn map_ncbi(&self, accession: &str) -> Result<TaxonomyRecord> {
        let url = format!(
            "{NCBI_EUTILS}/esummary.fcgi?db=nuccore&id={accession}&retmode=json"
        );
        let taxid = parse_esummary_taxid(&self.get_with_retry(&url)?)?;
        let url = format!("{NCBI_EUTILS}/efetch.fcgi?db=taxonomy&id={taxid}&retmode=xml");
        let (organism, lineage) = parse_taxonomy_xml(&self.get_with_retry(&url)?);
        Ok(TaxonomyRecord {
            accession: accession.to_string(),
            taxid: Some(taxid),
            organism,
            lineage,
        })
    }

    /// Resolve a sequence accession through EBI dbfetch (EMBL flat file).
    pub fn map_ebi(&self, accession: &str) -> Result<TaxonomyRecord> {
        let url = format!(
            "{EBI_DBFETCH}?db=ena_sequence&id={accession}&format=embl&style=raw"
        );
        let flat = self.get_with_retry(&url)?;
        let (organism, lineage) = parse_embl_organism(&flat);
        Ok(TaxonomyRecord {
            accession: accession.to_string(),
            taxid: None,
            organism,
            lineage,
        })
    }

    pub fn map(&self, source: TaxonomySource, accession: &str) -> Result<TaxonomyRecord> {
        match source {
            TaxonomySource::Ncbi => self.map_ncbi(accession),
            TaxonomySource::Ebi => self.map_ebi(accession),
        }
    }
}

/// Pull the taxid of the first uid out of an esummary JSON payload.
pub fn parse_esummary_taxid(json: &str) -> Result<u64> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| EnveomicsError::Remote(format!("esummary is not JSON: {e}")))?;
    let result = &value["result"];
    let uid = result["uids"]
        .as_array()
        .and_then(|uids| uids.first())
        .and_then(|u| u.as_str())
        .ok_or_else(|| EnveomicsError::Remote("esummary has no uids".into()))?;
    result[uid]["taxid"]
        .as_u64()
        .ok_or_else(|| EnveomicsError::Remote(format!("no taxid for uid {uid}")))
}

/// Scrape ScientificName and Lineage from an efetch taxonomy XML payload.
/// The first occurrence of each tag is the queried taxon; deeper ones
/// belong to the lineage expansion.
pub fn parse_taxonomy_xml(xml: &str) -> (String, String) {
    let first = |tag: &str| -> String {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        xml.find(&open)
            .and_then(|start| {
                let rest = &xml[start + open.len()..];
                rest.find(&close).map(|end| rest[..end].trim().to_string())
            })
            .unwrap_or_default()
    };
    (first("ScientificName"), first("Lineage"))
}

/// Organism (OS) and semicolon lineage (OC) from an EMBL flat file.
pub fn parse_embl_organism(flat: &str) -> (String, String) {
    let mut organism = String::new();
    let mut lineage_parts: Vec<String> = Vec::new();
    for line in flat.lines() {
        if let Some(rest) = line.strip_prefix("OS   ") {
            if organism.is_empty() {
                organism = rest.trim().to_string();
            }
        } else if let Some(rest) = line.strip_prefix("OC   ") {
            lineage_parts.push(rest.trim().trim_end_matches('.').to_string());
        }
    }
    (organism, lineage_parts.join(" "))
}
