//! web_fetch tool: Fetch a URL and return its text or raw HTML

use crate::security::NetworkGuard;
use async_trait::async_trait;
use openlink_domain::tool::{
    entities::{ToolArguments, ToolDefinition, ToolParameter},
    traits::{DefaultToolValidator, Tool, ToolContext},
    value_objects::{ToolError, ToolResult, ToolResultMetadata},
};
use openlink_domain::util::cap_output;
use std::time::Duration;
use tracing::debug;

/// Tool name constant
pub const WEB_FETCH: &str = "web_fetch";

/// Maximum response body read (1 MiB)
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Maximum output text size (50 KiB)
const MAX_TEXT: usize = 50 * 1024;

/// Per-request client timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("openlink/", env!("CARGO_PKG_VERSION"));

/// Get the tool definition for web_fetch
pub fn web_fetch_definition() -> ToolDefinition {
    ToolDefinition::new(
        WEB_FETCH,
        "Fetch a public web page. Returns readable text by default, or raw HTML.",
    )
    .with_parameter(ToolParameter::new("url", "http or https URL to fetch", true))
    .with_parameter(ToolParameter::new(
        "format",
        "'text' strips markup (default), 'html' keeps it",
        false,
    ))
}

pub struct WebFetchTool {
    definition: ToolDefinition,
    guard: NetworkGuard,
    client: reqwest::Client,
}

impl WebFetchTool {
    pub fn new(guard: NetworkGuard) -> Self {
        Self {
            definition: web_fetch_definition(),
            guard,
            client: reqwest::Client::new(),
        }
    }

    async fn fetch(&self, url: &str, raw_html: bool, timeout: Duration) -> Result<ToolResult, ToolError> {
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(timeout)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::io_failure(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // Stop reading at the cap instead of buffering the whole body
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            let room = MAX_BODY_SIZE - body.len();
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= MAX_BODY_SIZE {
                break;
            }
        }
        let text = String::from_utf8_lossy(&body);
        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Fetched");

        let looks_like_html = content_type.contains("html") || text.trim_start().starts_with('<');
        let content = if !raw_html && looks_like_html {
            html_to_text(&text)
        } else {
            text.into_owned()
        };

        Ok(
            ToolResult::success(WEB_FETCH, cap_output(&content, MAX_TEXT)).with_metadata(
                ToolResultMetadata {
                    bytes: Some(body.len()),
                    ..Default::default()
                },
            ),
        )
    }
}

fn request_error(e: reqwest::Error) -> ToolError {
    if e.is_timeout() {
        ToolError::timeout(format!("fetch timed out: {}", e))
    } else {
        ToolError::io_failure(format!("failed to fetch URL: {}", e))
    }
}

#[async_trait]
impl Tool for WebFetchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn validate(&self, args: &ToolArguments) -> Result<(), ToolError> {
        DefaultToolValidator
            .validate(args, &self.definition)
            .map_err(ToolError::validation_failed)?;
        match args.get_string("format") {
            None | Some("text") | Some("html") => {}
            Some(other) => {
                return Err(ToolError::validation_failed(format!(
                    "format must be 'text' or 'html', got '{}'",
                    other
                )));
            }
        }
        let url = args.get_string("url").unwrap_or_default();
        self.guard.validate_fetch_target(url).await?;
        Ok(())
    }

    async fn execute(&self, ctx: &ToolContext) -> ToolResult {
        let url = ctx.arguments.get_string("url").unwrap_or_default();
        let raw_html = ctx.arguments.get_string("format") == Some("html");
        let timeout = CLIENT_TIMEOUT.min(ctx.config.timeout());

        match self.fetch(url, raw_html, timeout).await {
            Ok(result) => result.with_path(url),
            Err(e) => ToolResult::failure(WEB_FETCH, e),
        }
    }
}

/// Extract readable text from HTML, skipping scripts, styles and inline SVG.
pub fn html_to_text(html: &str) -> String {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);
    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    collect_text(root, &mut parts);
    collapse_whitespace(&parts.join(" "))
}

/// Tags whose entire subtree is ignored
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "svg", "head"];

fn collect_text(element: scraper::ElementRef<'_>, parts: &mut Vec<String>) {
    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    parts.push(t.to_string());
                }
            }
            scraper::Node::Element(_) => {
                if let Some(child) = scraper::ElementRef::wrap(child) {
                    collect_text(child, parts);
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of spaces and keep at most one blank line.
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_was_whitespace = false;
    let mut newline_count = 0;

    for ch in text.chars() {
        if ch == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                result.push('\n');
            }
            prev_was_whitespace = true;
        } else if ch.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
            }
            prev_was_whitespace = true;
            newline_count = 0;
        } else {
            result.push(ch);
            prev_was_whitespace = false;
            newline_count = 0;
        }
    }

    result.trim().to_string()
}
