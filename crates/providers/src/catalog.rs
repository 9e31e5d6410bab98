use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use typeahead_protocol::RawRecord;
use typeahead_search::SuggestionProvider;

const DEFAULT_LIMIT: usize = 10;

/// Well-known companies, most popular first.
const POPULAR_COMPANIES: &[(&str, &str)] = &[
    ("Google", "google.com"),
    ("Microsoft", "microsoft.com"),
    ("Amazon", "amazon.com"),
    ("Apple", "apple.com"),
    ("Meta", "meta.com"),
    ("Netflix", "netflix.com"),
    ("Tesla", "tesla.com"),
    ("IBM", "ibm.com"),
    ("Oracle", "oracle.com"),
    ("Salesforce", "salesforce.com"),
    ("Adobe", "adobe.com"),
    ("Intel", "intel.com"),
    ("Cisco", "cisco.com"),
    ("SAP", "sap.com"),
    ("Uber", "uber.com"),
    ("Airbnb", "airbnb.com"),
    ("Twitter", "twitter.com"),
    ("LinkedIn", "linkedin.com"),
    ("Spotify", "spotify.com"),
    ("Zoom", "zoom.us"),
    ("Slack", "slack.com"),
    ("Dropbox", "dropbox.com"),
    ("PayPal", "paypal.com"),
    ("eBay", "ebay.com"),
    ("Shopify", "shopify.com"),
    ("Stripe", "stripe.com"),
    ("Square", "squareup.com"),
    ("Atlassian", "atlassian.com"),
    ("GitHub", "github.com"),
    ("GitLab", "gitlab.com"),
    ("Infosys", "infosys.com"),
    ("TCS", "tcs.com"),
    ("Wipro", "wipro.com"),
    ("HCL", "hcltech.com"),
    ("Tech Mahindra", "techmahindra.com"),
    ("Cognizant", "cognizant.com"),
    ("Accenture", "accenture.com"),
    ("Deloitte", "deloitte.com"),
    ("PwC", "pwc.com"),
    ("EY", "ey.com"),
    ("KPMG", "kpmg.com"),
    ("Zoho", "zoho.com"),
    ("Flipkart", "flipkart.com"),
    ("Paytm", "paytm.com"),
    ("Swiggy", "swiggy.com"),
    ("Zomato", "zomato.com"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub popularity: i64,
}

impl CatalogEntry {
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }

    fn to_record(&self) -> RawRecord {
        let record = RawRecord::named(self.name.clone()).with_popularity(self.popularity);
        match &self.domain {
            Some(domain) => record.with_domain(domain.clone()),
            None => record,
        }
    }
}

/// In-process provider over a fixed company list.
///
/// Matches are case-insensitive substrings of the name, returned in
/// catalog order and capped at `limit`.
#[derive(Debug, Clone)]
pub struct CatalogProvider {
    entries: Vec<CatalogEntry>,
    limit: usize,
}

impl CatalogProvider {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            limit: DEFAULT_LIMIT,
        }
    }

    /// The bundled popular-companies list; earlier entries weigh more.
    pub fn builtin() -> Self {
        let total = POPULAR_COMPANIES.len() as i64;
        let entries = POPULAR_COMPANIES
            .iter()
            .enumerate()
            .map(|(rank, (name, domain))| CatalogEntry {
                name: (*name).to_string(),
                domain: Some((*domain).to_string()),
                popularity: (total - rank as i64) * 10,
            })
            .collect();
        Self::new(entries)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        log::debug!(
            "Loaded {} catalog entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn search(&self, query: &str) -> Vec<RawRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.matches(&needle))
            .take(self.limit)
            .map(CatalogEntry::to_record)
            .collect()
    }
}

#[async_trait]
impl SuggestionProvider for CatalogProvider {
    fn name(&self) -> &str {
        "catalog"
    }

    async fn lookup(&self, query: &str) -> typeahead_search::Result<Vec<RawRecord>> {
        Ok(self.search(query))
    }
}
