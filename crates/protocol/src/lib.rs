use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";

/// A company record exactly as a backend returns it.
///
/// Backends disagree on field names (`id` vs `_id`, `logo` vs `logoUrl`,
/// `followers` vs `openJobs`), so every field is optional and ranking
/// decides which ones to trust.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(
        default,
        deserialize_with = "de_opt_key",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub id: Option<String>,

    #[serde(
        rename = "_id",
        default,
        deserialize_with = "de_opt_key",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub object_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_jobs: Option<i64>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, popularity: i64) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            popularity: Some(popularity),
            ..Default::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_logo(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn with_popularity(mut self, popularity: i64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// First popularity-like signal present: explicit score, followers, open jobs.
    pub fn popularity_signal(&self) -> Option<i64> {
        self.popularity.or(self.followers).or(self.open_jobs)
    }

    /// First explicit image reference present.
    pub fn image_ref(&self) -> Option<&str> {
        [self.logo_url.as_deref(), self.logo.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
    }
}

/// Ids arrive as strings from document stores and as integers from SQL backends.
fn de_opt_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum KeyRepr {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(
        Option::<KeyRepr>::deserialize(deserializer)?.map(|repr| match repr {
            KeyRepr::Text(text) => text,
            KeyRepr::Signed(n) => n.to_string(),
            KeyRepr::Unsigned(n) => n.to_string(),
        }),
    )
}

/// A ranked, deduplicated suggestion ready to render.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub popularity: u64,
}

/// One step of the image fallback chain a renderer walks on load failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ImageSource {
    Url(String),
    Placeholder(String),
}

impl Candidate {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, popularity: u64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            image_url: None,
            domain: None,
            popularity,
        }
    }

    /// Uppercased first character of the display name; `?` for an empty name.
    pub fn placeholder_initial(&self) -> String {
        self.display_name
            .trim()
            .chars()
            .next()
            .map_or_else(|| "?".to_string(), |ch| ch.to_uppercase().collect())
    }

    pub fn favicon_url(&self) -> Option<String> {
        self.domain
            .as_deref()
            .map(|domain| format!("{FAVICON_SERVICE}?domain={domain}&sz=64"))
    }

    /// Primary image, then the domain favicon, then the placeholder initial.
    /// The placeholder is always last, so the chain is never empty.
    pub fn image_fallbacks(&self) -> Vec<ImageSource> {
        let mut chain = Vec::with_capacity(3);
        if let Some(url) = &self.image_url {
            chain.push(ImageSource::Url(url.clone()));
        }
        if let Some(favicon) = self.favicon_url() {
            if self.image_url.as_deref() != Some(favicon.as_str()) {
                chain.push(ImageSource::Url(favicon));
            }
        }
        chain.push(ImageSource::Placeholder(self.placeholder_initial()));
        chain
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Typing,
    Loading,
    Resolved,
    /// Carries the normalized key of the query that failed.
    Error {
        query: String,
    },
    Selected,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Typing => "typing",
            Self::Loading => "loading",
            Self::Resolved => "resolved",
            Self::Error { .. } => "error",
            Self::Selected => "selected",
        }
    }
}

/// Everything a UI shell reads from a session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SessionSnapshot {
    pub schema_version: u32,
    pub text: String,
    pub phase: Phase,
    pub candidates: Vec<Candidate>,
    pub selected: Option<Candidate>,
    pub last_committed_sequence: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            text: String::new(),
            phase: Phase::Idle,
            candidates: Vec::new(),
            selected: None,
            last_committed_sequence: 0,
        }
    }
}

pub fn snapshot_json_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(SessionSnapshot)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn raw_record_accepts_backend_field_variants() {
        let raw = r#"{
            "_id": "65f0c1",
            "name": "Acme Corp",
            "logoUrl": "https://cdn.example/acme.png",
            "website": "https://www.acme.io/careers",
            "followers": 120,
            "openJobs": 4,
            "industry": "Manufacturing"
        }"#;
        let record: RawRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.object_id.as_deref(), Some("65f0c1"));
        assert_eq!(record.id, None);
        assert_eq!(record.popularity_signal(), Some(120));
        assert_eq!(record.image_ref(), Some("https://cdn.example/acme.png"));
    }

    #[test]
    fn numeric_ids_become_strings() {
        let record: RawRecord = serde_json::from_str(r#"{"id": 42, "name": "Initech"}"#).unwrap();
        assert_eq!(record.id.as_deref(), Some("42"));
    }

    #[test]
    fn blank_logo_is_ignored() {
        let mut record = RawRecord::named("Globex");
        record.logo_url = Some("  ".to_string());
        record.logo = Some("https://cdn.example/globex.svg".to_string());
        assert_eq!(record.image_ref(), Some("https://cdn.example/globex.svg"));
    }

    #[test]
    fn placeholder_is_uppercased_first_char() {
        let candidate = Candidate::new("x", "  zoho", 1);
        assert_eq!(candidate.placeholder_initial(), "Z");
        assert_eq!(Candidate::new("y", "", 0).placeholder_initial(), "?");
    }

    #[test]
    fn image_chain_ends_with_placeholder() {
        let mut candidate = Candidate::new("domain:tcs.com", "TCS", 7);
        candidate.domain = Some("tcs.com".to_string());
        candidate.image_url = Some("https://logo.clearbit.com/tcs.com".to_string());

        assert_eq!(
            candidate.image_fallbacks(),
            vec![
                ImageSource::Url("https://logo.clearbit.com/tcs.com".to_string()),
                ImageSource::Url(
                    "https://www.google.com/s2/favicons?domain=tcs.com&sz=64".to_string()
                ),
                ImageSource::Placeholder("T".to_string()),
            ]
        );

        let bare = Candidate::new("name:local", "local shop", 0);
        assert_eq!(
            bare.image_fallbacks(),
            vec![ImageSource::Placeholder("L".to_string())]
        );
    }

    #[test]
    fn snapshot_serializes_phase_with_kind_tag() {
        let snapshot = SessionSnapshot {
            phase: Phase::Error {
                query: "acme".to_string(),
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["phase"]["kind"], "error");
        assert_eq!(value["phase"]["query"], "acme");
        assert_eq!(value["schema_version"], SNAPSHOT_SCHEMA_VERSION);
    }

    #[test]
    fn schema_mentions_snapshot_fields() {
        let schema = snapshot_json_schema();
        let text = schema.to_string();
        assert!(text.contains("last_committed_sequence"));
        assert!(text.contains("candidates"));
    }
}
