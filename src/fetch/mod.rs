// src/fetch/mod.rs

use anyhow::{Context, Result};
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Upper bound on the whole request, connect through body.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-fetch client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    /// Skip TLS certificate validation for this fetch only.
    ///
    /// The KML links point at a government host whose certificate chain
    /// fails validation, so the job runs with this on. It applies to the
    /// client built in [`fetch_text`] and nothing else.
    pub accept_invalid_certs: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}

fn build_client(opts: &FetchOptions) -> Result<Client> {
    if opts.accept_invalid_certs {
        warn!("TLS certificate verification is DISABLED for the KML fetch");
    }
    Client::builder()
        .timeout(opts.timeout)
        .danger_accept_invalid_certs(opts.accept_invalid_certs)
        .build()
        .context("building HTTP client")
}

/// GET `url` and return the body as text. Non-2xx statuses are errors.
///
/// The body is decoded with the `Content-Type` charset (UTF-8 when absent)
/// and kept verbatim, including any leading byte-order mark.
pub async fn fetch_text(url: &str, opts: &FetchOptions) -> Result<String> {
    let url = Url::parse(url.trim()).with_context(|| format!("parsing URL {:?}", url))?;
    let client = build_client(opts)?;

    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;
    let encoding = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_of)
        .unwrap_or(UTF_8);
    debug!(status = %resp.status(), charset = encoding.name(), "response received");

    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    // No BOM sniffing: a leading BOM is content and must reach the artifact.
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes);
    if had_errors {
        warn!("body of {} had bytes invalid in {}; replaced", url, encoding.name());
    }
    Ok(text.into_owned())
}

/// Encoding named by the `charset` parameter of a Content-Type value.
fn charset_of(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}
