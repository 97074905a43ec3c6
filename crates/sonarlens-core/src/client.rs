use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::auth::xsrf_token_from_cookies;
use crate::config::ClientConfig;
use crate::error::{Result, SonarError};
use crate::models::{ComponentSummary, DuplicationGroup, SourceLine};

/// Fixed source-line window per component. Files longer than
/// `SOURCE_LINES_TO` are not fully inspected; this is a known limitation,
/// not configurable.
pub const SOURCE_LINES_FROM: u32 = 1;
pub const SOURCE_LINES_TO: u32 = 1002;

/// Leaf listing page size; one page is requested per run.
pub const COMPONENT_PAGE_SIZE: u32 = 500;

const XSRF_HEADER: HeaderName = HeaderName::from_static("x-xsrf-token");

/// Read operations against the metrics server.
///
/// The seam between the report assembler and HTTP: production uses
/// [`MetricsClient`], tests inject a fixture-backed fake.
pub trait MetricsApi {
    /// Lists up to [`COMPONENT_PAGE_SIZE`] leaf components carrying at least
    /// one of the requested measures, server-sorted by `sort_metric`.
    /// Non-success status is fatal to the run.
    fn list_leaf_components(
        &self,
        project_key: &str,
        metric_keys: &[&str],
        sort_metric: &str,
        ascending: bool,
    ) -> Result<Vec<ComponentSummary>>;

    /// Per-line annotations for one component, lines 1..=1002. Non-success
    /// status is fatal to the run.
    fn fetch_source_lines(&self, component_key: &str) -> Result<Vec<SourceLine>>;

    /// Duplication groups for one component. A non-success status degrades to
    /// an empty result so one file's missing duplications endpoint or
    /// permission cannot abort coverage reporting.
    fn fetch_duplications(&self, component_key: &str) -> Result<Vec<DuplicationGroup>>;
}

#[derive(Debug, Default, Deserialize)]
struct ComponentTreeResponse {
    #[serde(default)]
    components: Vec<ComponentSummary>,
}

#[derive(Debug, Default, Deserialize)]
struct SourceLinesResponse {
    #[serde(default)]
    sources: Vec<SourceLine>,
}

#[derive(Debug, Default, Deserialize)]
struct DuplicationsResponse {
    #[serde(default)]
    duplications: Vec<DuplicationGroup>,
}

#[derive(Clone)]
pub struct MetricsClient {
    config: ClientConfig,
    http: Client,
}

impl std::fmt::Debug for MetricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl MetricsClient {
    /// Builds the blocking client. The ambient session cookie rides along as
    /// a default header and the `XSRF-TOKEN` cookie value is echoed in the
    /// anti-CSRF header.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = &config.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| SonarError::Validation(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
            if let Some(token) = xsrf_token_from_cookies(cookie) {
                let value = HeaderValue::from_str(&token)
                    .map_err(|e| SonarError::Validation(format!("invalid XSRF token: {e}")))?;
                headers.insert(XSRF_HEADER, value);
            }
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, http })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        endpoint_url(&self.config.base_url, path, params)
    }
}

/// Percent-encoding-safe URL construction shared with the copy-text
/// formatter, which reproduces per-file API URLs in its transcripts.
pub(crate) fn endpoint_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    Url::parse_with_params(&format!("{base_url}{path}"), params)
        .map_err(|e| SonarError::InvalidBaseUrl(format!("{base_url}: {e}")))
}

impl MetricsApi for MetricsClient {
    fn list_leaf_components(
        &self,
        project_key: &str,
        metric_keys: &[&str],
        sort_metric: &str,
        ascending: bool,
    ) -> Result<Vec<ComponentSummary>> {
        let metric_keys = metric_keys.join(",");
        let page_size = COMPONENT_PAGE_SIZE.to_string();
        let mut params = vec![
            ("component", project_key),
            ("metricKeys", metric_keys.as_str()),
            ("additionalFields", "metrics"),
            ("strategy", "leaves"),
            ("ps", page_size.as_str()),
            ("metricSort", sort_metric),
            ("s", "metric"),
            ("metricSortFilter", "withMeasuresOnly"),
        ];
        if ascending {
            params.push(("asc", "true"));
        }
        let url = self.endpoint("/api/measures/component_tree", &params)?;
        log::debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        if !resp.status().is_success() {
            return Err(SonarError::Transport {
                status: resp.status().as_u16(),
                context: format!("component listing for {project_key}"),
            });
        }
        let body: ComponentTreeResponse = resp.json()?;
        Ok(body.components)
    }

    fn fetch_source_lines(&self, component_key: &str) -> Result<Vec<SourceLine>> {
        let from = SOURCE_LINES_FROM.to_string();
        let to = SOURCE_LINES_TO.to_string();
        let url = self.endpoint(
            "/api/sources/lines",
            &[("key", component_key), ("from", &from), ("to", &to)],
        )?;
        log::debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        if !resp.status().is_success() {
            return Err(SonarError::Transport {
                status: resp.status().as_u16(),
                context: format!("source lines for {component_key}"),
            });
        }
        let body: SourceLinesResponse = resp.json()?;
        Ok(body.sources)
    }

    fn fetch_duplications(&self, component_key: &str) -> Result<Vec<DuplicationGroup>> {
        let url = self.endpoint("/api/duplications/show", &[("key", component_key)])?;
        log::debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        if !resp.status().is_success() {
            log::warn!(
                "duplications unavailable for {component_key}: HTTP {}",
                resp.status()
            );
            return Ok(Vec::new());
        }
        let body: DuplicationsResponse = resp.json()?;
        Ok(body.duplications)
    }
}
