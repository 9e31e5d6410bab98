use anyhow::{Context as AnyhowContext, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use typeahead_providers::{CatalogProvider, FallbackProvider, HttpProvider, HttpProviderConfig};
use typeahead_search::SuggestionProvider;

/// Where suggestions come from.
#[derive(Args, Debug, Default)]
pub struct BackendArgs {
    /// Base URL of the company search API (e.g. http://localhost:5000)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Path of the search route on the API
    #[arg(long, global = true, default_value = "/api/companies")]
    endpoint_path: String,

    /// Query-string parameter carrying the typed text
    #[arg(long, global = true, default_value = "search")]
    query_param: String,

    /// HTTP timeout in milliseconds
    #[arg(long, global = true, default_value_t = 5_000)]
    timeout_ms: u64,

    /// JSON company catalog used instead of the bundled one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Answer from the catalog when the API lookup fails
    #[arg(long, global = true, requires = "endpoint")]
    fallback_catalog: bool,
}

impl BackendArgs {
    /// The API when an endpoint is given, otherwise the offline catalog.
    pub fn build(&self) -> Result<Arc<dyn SuggestionProvider>> {
        let Some(base_url) = &self.endpoint else {
            return Ok(Arc::new(self.catalog()?));
        };

        let http = HttpProvider::new(&HttpProviderConfig {
            base_url: base_url.clone(),
            path: self.endpoint_path.clone(),
            query_param: self.query_param.clone(),
            timeout_ms: self.timeout_ms,
        })
        .with_context(|| format!("Invalid endpoint {base_url}"))?;
        log::info!("Using company API at {}", http.endpoint());

        if self.fallback_catalog {
            return Ok(Arc::new(FallbackProvider::new(
                Arc::new(http),
                Arc::new(self.catalog()?),
            )));
        }
        Ok(Arc::new(http))
    }

    fn catalog(&self) -> Result<CatalogProvider> {
        match &self.catalog {
            Some(path) => CatalogProvider::load(path)
                .with_context(|| format!("Failed to load catalog {}", path.display())),
            None => Ok(CatalogProvider::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_the_default_backend() {
        let provider = BackendArgs::default().build().unwrap();
        assert_eq!(provider.name(), "catalog");
    }

    #[test]
    fn endpoint_selects_http_backend() {
        let args = BackendArgs {
            endpoint: Some("http://127.0.0.1:5000".to_string()),
            endpoint_path: "/api/companies".to_string(),
            query_param: "search".to_string(),
            timeout_ms: 1_000,
            ..BackendArgs::default()
        };
        assert_eq!(args.build().unwrap().name(), "http");

        let with_fallback = BackendArgs {
            fallback_catalog: true,
            ..args
        };
        assert_eq!(with_fallback.build().unwrap().name(), "http");
    }

    #[test]
    fn bad_endpoint_is_reported() {
        let args = BackendArgs {
            endpoint: Some("::nope::".to_string()),
            endpoint_path: "/api/companies".to_string(),
            ..BackendArgs::default()
        };
        assert!(args.build().is_err());
    }
}
