//! Document sources: where page markup and styles come from.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::error::{DesignGuardError, Result};

/// Default timeout applied to HTTP fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Default user agent sent with HTTP fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("designguard/", env!("CARGO_PKG_VERSION"));

const DATA_URL_PREFIX: &str = "data:";

/// Markup and stylesheet text for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    /// HTML markup.
    pub html: String,
    /// Stylesheet text the rules are matched against.
    pub css: String,
}

impl PageSource {
    /// Build a page from markup and an explicit stylesheet.
    pub fn new(html: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
        }
    }

    /// Build a page from markup, using its inline `<style>` blocks as the stylesheet.
    pub fn from_html(html: impl Into<String>) -> Self {
        let html = html.into();
        let css = extract_inline_styles(&html);
        Self { html, css }
    }
}

/// Concatenate the contents of every `<style>` element in document order.
pub fn extract_inline_styles(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("style") else {
        return String::new();
    };
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Supplies page content for a target.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentSource {
    /// Retrieve the page identified by `target`.
    fn fetch(&self, target: &str) -> Result<PageSource>;
}

/// Kind of target accepted by [`TargetSource`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// An `http://` or `https://` URL.
    Http,
    /// A `data:text/html` URL carrying the document inline.
    Inline,
}

/// Classify a target, rejecting anything that cannot be analyzed.
pub fn validate_target(target: &str) -> Result<TargetKind> {
    let trimmed = target.trim();
    if trimmed
        .get(..DATA_URL_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_URL_PREFIX))
    {
        parse_data_url(trimmed)?;
        return Ok(TargetKind::Inline);
    }
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {
            Ok(TargetKind::Http)
        }
        _ => Err(DesignGuardError::InvalidTarget(trimmed.to_string())),
    }
}

/// Options for fetching pages over HTTP.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Total request timeout.
    pub timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
    /// Optional proxy prefix; the URL-encoded target is appended to it.
    pub proxy: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl FetchOptions {
    /// URL actually requested for `target`.
    pub fn request_url(&self, target: &str) -> String {
        match self.proxy.as_deref().map(str::trim) {
            Some(prefix) if !prefix.is_empty() => {
                format!("{prefix}{}", urlencoding::encode(target))
            }
            _ => target.to_string(),
        }
    }
}

/// Fetches pages over HTTP(S) with a blocking client.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    options: FetchOptions,
}

impl HttpSource {
    /// Create an HTTP source with the given options.
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, target: &str) -> Result<PageSource> {
        let url = self.options.request_url(target);
        debug!("fetching {url}");
        // The client is built per fetch so it never outlives the blocking
        // thread it was created on.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.options.timeout)
            .user_agent(self.options.user_agent.as_str())
            .build()
            .map_err(|err| DesignGuardError::Fetch(err.to_string()))?;
        let response = client
            .get(&url)
            .send()
            .map_err(|err| DesignGuardError::Fetch(format!("{target}: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(DesignGuardError::Fetch(format!(
                "{target}: server responded with {status}"
            )));
        }
        let html = response
            .text()
            .map_err(|err| DesignGuardError::Fetch(format!("{target}: {err}")))?;
        Ok(PageSource::from_html(html))
    }
}

/// Decodes documents carried inline in `data:text/html` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSource;

impl DocumentSource for InlineSource {
    fn fetch(&self, target: &str) -> Result<PageSource> {
        let html = parse_data_url(target.trim())?;
        Ok(PageSource::from_html(html))
    }
}

/// Dispatches a target to the HTTP or inline source by scheme.
#[derive(Debug, Clone, Default)]
pub struct TargetSource {
    http: HttpSource,
    inline: InlineSource,
}

impl TargetSource {
    /// Create a dispatcher whose HTTP fetches use `options`.
    pub fn new(options: FetchOptions) -> Self {
        Self {
            http: HttpSource::new(options),
            inline: InlineSource,
        }
    }
}

impl DocumentSource for TargetSource {
    fn fetch(&self, target: &str) -> Result<PageSource> {
        match validate_target(target)? {
            TargetKind::Http => self.http.fetch(target.trim()),
            TargetKind::Inline => self.inline.fetch(target),
        }
    }
}

fn parse_data_url(url: &str) -> Result<String> {
    let invalid = || DesignGuardError::InvalidTarget(url.to_string());
    let rest = url.get(DATA_URL_PREFIX.len()..).ok_or_else(invalid)?;
    let (meta, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mut parts = meta.split(';').map(str::trim);
    let mime = parts.next().unwrap_or_default();
    if !mime.eq_ignore_ascii_case("text/html") {
        return Err(invalid());
    }
    let is_base64 = parts.any(|part| part.eq_ignore_ascii_case("base64"));

    if is_base64 {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|err| DesignGuardError::Fetch(format!("inline document: {err}")))?;
        String::from_utf8(bytes)
            .map_err(|err| DesignGuardError::Fetch(format!("inline document: {err}")))
    } else {
        urlencoding::decode(payload)
            .map(|decoded| decoded.into_owned())
            .map_err(|err| DesignGuardError::Fetch(format!("inline document: {err}")))
    }
}

/// Wrap pasted markup and styles into a full document.
pub fn wrap_document(body: &str, css: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<style>{css}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

/// Encode pasted markup and styles as a `data:text/html;base64` target.
pub fn inline_document_url(body: &str, css: &str) -> String {
    let document = wrap_document(body, css);
    format!("data:text/html;base64,{}", STANDARD.encode(document))
}

const SAMPLE_BODY: &str = r#"<div class="hero-section">
  <h1 class="main-heading">Welcome to Our Product</h1>
  <p class="description">Experience the future of design systems</p>
  <button class="btn-primary">Get Started</button>
  <button class="btn-secondary">Learn More</button>
</div>

<div class="feature-grid">
  <div class="feature-card">
    <h3>Fast Performance</h3>
    <p>Lightning-fast load times</p>
  </div>
  <div class="feature-card">
    <h3>Secure</h3>
    <p>Enterprise-grade security</p>
  </div>
</div>"#;

const SAMPLE_CSS: &str = r#".hero-section {
  padding: 60px 20px;
  text-align: center;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
}

.main-heading {
  font-size: 3rem;
  font-weight: 700;
  color: white;
  margin-bottom: 20px;
}

.description {
  font-size: 1.2rem;
  color: #f0f0f0;
  margin-bottom: 40px;
}

.btn-primary {
  background-color: #ff6b6b;
  color: white;
  padding: 15px 30px;
  border: none;
  border-radius: 8px;
  font-weight: 600;
  margin: 0 10px;
}

.btn-secondary {
  background-color: transparent;
  color: white;
  padding: 15px 30px;
  border: 2px solid white;
  border-radius: 8px;
  font-weight: 600;
  margin: 0 10px;
}

.feature-grid {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(300px, 1fr));
  gap: 30px;
  padding: 60px 20px;
  max-width: 1200px;
  margin: 0 auto;
}

.feature-card {
  padding: 30px;
  background: white;
  border-radius: 12px;
  box-shadow: 0 4px 20px rgba(0,0,0,0.1);
}

.feature-card h3 {
  font-size: 1.5rem;
  font-weight: 400;
  color: #333;
  margin-bottom: 15px;
}

.feature-card p {
  color: #666;
  line-height: 1.6;
}"#;

/// Built-in sample document used when a target cannot be retrieved.
pub fn sample_page() -> PageSource {
    PageSource::from_html(wrap_document(SAMPLE_BODY, SAMPLE_CSS))
}
