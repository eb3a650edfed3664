//! Content source client configuration

use std::time::Duration;

use super::SiteConfig;

/// Everything needed to construct a content source client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub timeout: Duration,
    /// Explicit preview session
    pub preview: Option<PreviewData>,
    /// Incoming request the client is serving, if any
    pub request: Option<RequestContext>,
}

impl ClientConfig {
    /// Client settings for published content
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_token: None,
            timeout: Duration::from_secs(10),
            preview: None,
            request: None,
        }
    }

    /// Client settings derived from the site configuration
    pub fn from_site(config: &SiteConfig) -> Self {
        Self {
            endpoint: config.api_endpoint.clone(),
            access_token: config.resolve_access_token(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            preview: None,
            request: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_preview(mut self, preview: PreviewData) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_request(mut self, request: RequestContext) -> Self {
        self.request = Some(request);
        self
    }

    /// The preview ref to query instead of the master ref, if any
    ///
    /// Explicit preview data wins over the request's preview cookie.
    pub fn preview_ref(&self) -> Option<String> {
        if let Some(preview) = &self.preview {
            if !preview.reference.is_empty() {
                return Some(preview.reference.clone());
            }
        }
        self.request.as_ref().and_then(RequestContext::preview_ref)
    }
}

/// A preview session started from the CMS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewData {
    pub reference: String,
}

/// The parts of an incoming request relevant to previews
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Raw `Cookie` header
    pub cookie_header: Option<String>,
}

/// Cookie set by the CMS toolbar while previewing
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

impl RequestContext {
    pub fn from_cookie_header(header: impl Into<String>) -> Self {
        Self {
            cookie_header: Some(header.into()),
        }
    }

    /// The preview ref carried by the preview cookie
    ///
    /// The cookie holds either a bare ref or a JSON object mapping repository
    /// hosts to `{ "preview": "<ref>" }`.
    pub fn preview_ref(&self) -> Option<String> {
        let header = self.cookie_header.as_deref()?;
        let raw = header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == PREVIEW_COOKIE).then_some(value)
        })?;

        let decoded = percent_encoding::percent_decode_str(raw)
            .decode_utf8()
            .ok()?
            .into_owned();

        match serde_json::from_str::<serde_json::Value>(&decoded) {
            Ok(serde_json::Value::Object(repos)) => repos.values().find_map(|repo| {
                repo.get("preview")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            }),
            _ if !decoded.is_empty() => Some(decoded),
            _ => None,
        }
    }
}
