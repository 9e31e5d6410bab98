use std::cmp::Ordering;
use std::collections::HashMap;
use typeahead_protocol::{Candidate, RawRecord};

const LOGO_SERVICE: &str = "https://logo.clearbit.com";

/// Turns raw backend records into the ordered candidate list for one query.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanker {
    max_results: usize,
}

impl CandidateRanker {
    pub const fn new(max_results: usize) -> Self {
        Self { max_results }
    }

    pub const fn max_results(&self) -> usize {
        self.max_results
    }

    /// Drop unusable records, collapse duplicate ids (higher popularity wins,
    /// first seen on ties), order by popularity then name, cap the length.
    pub fn rank(&self, records: Vec<RawRecord>) -> Vec<Candidate> {
        let mut ranked: Vec<Candidate> = Vec::with_capacity(records.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for record in records {
            let Some(candidate) = to_candidate(record) else {
                continue;
            };
            match by_id.get(&candidate.id) {
                Some(&slot) => {
                    if candidate.popularity > ranked[slot].popularity {
                        ranked[slot] = candidate;
                    }
                }
                None => {
                    by_id.insert(candidate.id.clone(), ranked.len());
                    ranked.push(candidate);
                }
            }
        }

        ranked.sort_by(compare_candidates);
        ranked.truncate(self.max_results);
        ranked
    }
}

fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.popularity
        .cmp(&a.popularity)
        .then_with(|| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
        })
}

fn to_candidate(record: RawRecord) -> Option<Candidate> {
    let domain = record
        .domain
        .as_deref()
        .and_then(domain_from_website)
        .or_else(|| record.website.as_deref().and_then(domain_from_website));
    let name = record
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let id = identity_key(&record, domain.as_deref(), name)?;
    let display_name = name.map_or_else(|| id.clone(), str::to_string);
    let image_url = record
        .image_ref()
        .map(str::to_string)
        .or_else(|| domain.as_deref().map(logo_url));
    let popularity = record
        .popularity_signal()
        .map_or(0, |score| u64::try_from(score).unwrap_or(0));

    Some(Candidate {
        id,
        display_name,
        image_url,
        domain,
        popularity,
    })
}

/// Explicit id, then document id, then domain, then normalized name.
fn identity_key(record: &RawRecord, domain: Option<&str>, name: Option<&str>) -> Option<String> {
    let explicit = [record.id.as_deref(), record.object_id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty());
    if let Some(id) = explicit {
        return Some(id.to_string());
    }
    if let Some(domain) = domain {
        return Some(format!("domain:{domain}"));
    }
    name.map(|name| {
        let key = name
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        format!("name:{key}")
    })
}

/// `https://www.Acme.io/careers` -> `acme.io`
pub fn domain_from_website(website: &str) -> Option<String> {
    let trimmed = website.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_scheme = ["https://", "http://"]
        .iter()
        .find_map(|scheme| lower.strip_prefix(scheme))
        .unwrap_or(&lower);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    let host = without_www
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('.');

    (!host.is_empty() && !host.contains(char::is_whitespace)).then(|| host.to_string())
}

pub fn logo_url(domain: &str) -> String {
    format!("{LOGO_SERVICE}/{domain}")
}
