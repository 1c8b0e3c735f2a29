//! Highlight-URL composition for the embedded article viewer.
//!
//! Articles are previewed either through the local rendering proxy
//! (`/api/wiki/<Page>`) or straight from the external site. The proxy takes a
//! `highlight` query parameter; browsers take a `#:~:text=` fragment
//! directive. "Open in new tab" must always point at the external document,
//! with the same highlight, even when the preview went through the proxy.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Path prefix served by the local article rendering proxy.
pub const PROXY_PREFIX: &str = "/api/wiki/";

const EXTERNAL_BASE: &str = "https://en.wikipedia.org/wiki/";

// Mirrors encodeURIComponent: alphanumerics and `-_.!~*'()` pass through.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// True when `url` targets the local rendering proxy, whether given as a
/// bare path or as an absolute URL.
pub fn is_proxy_url(url: &str) -> bool {
    proxy_page(url).is_some()
}

/// The proxied page name, if `url` targets the proxy.
fn proxy_page(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Relative URL: strip query and fragment by hand.
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    };
    let page = path.strip_prefix(PROXY_PREFIX)?;
    if page.is_empty() {
        None
    } else {
        Some(page.to_string())
    }
}

/// Compose a URL that asks the viewer to scroll to and highlight `fragment`.
///
/// Empty or whitespace-only fragments leave the URL untouched. Composition is
/// idempotent: a `highlight` parameter or text-fragment directive left over
/// from an earlier call is replaced, never duplicated.
pub fn compose(url: &str, fragment: &str) -> String {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return url.to_string();
    }
    if is_proxy_url(url) {
        with_highlight_param(url, fragment)
    } else {
        with_text_fragment(url, fragment)
    }
}

/// The canonical external document URL for `url`.
///
/// Proxy URLs map deterministically through their path segment; anything else
/// is already external and passes through.
pub fn external_url(url: &str) -> String {
    match proxy_page(url) {
        Some(page) => format!("{EXTERNAL_BASE}{page}"),
        None => {
            // Drop any viewer-specific directive from the external URL.
            let end = url.find(":~:").unwrap_or(url.len());
            url[..end].trim_end_matches('#').to_string()
        }
    }
}

/// URL for the "open in new tab" affordance: always external, highlighted.
pub fn page_url(url: &str, fragment: Option<&str>) -> String {
    compose(&external_url(url), fragment.unwrap_or(""))
}

/// Scheme/host/port origin of `url`, when it has one. Relative proxy URLs
/// have no origin of their own and yield `None`.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        url::Origin::Tuple(..) => Some(parsed.origin().ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

fn encode(fragment: &str) -> String {
    utf8_percent_encode(fragment, COMPONENT).to_string()
}

fn with_highlight_param(url: &str, fragment: &str) -> String {
    let (without_fragment, trailing_fragment) = match url.split_once('#') {
        Some((head, tail)) => (head, Some(tail)),
        None => (url, None),
    };
    let (base, query) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (without_fragment, None),
    };

    // Keep existing parameters verbatim; only the highlight key is ours.
    let mut pairs: Vec<&str> = query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty() && !pair.starts_with("highlight="))
                .collect()
        })
        .unwrap_or_default();
    let highlight = format!("highlight={}", encode(fragment));
    pairs.push(&highlight);

    let mut out = format!("{base}?{}", pairs.join("&"));
    if let Some(tail) = trailing_fragment {
        out.push('#');
        out.push_str(tail);
    }
    out
}

fn with_text_fragment(url: &str, fragment: &str) -> String {
    // Replace any earlier directive; keep a plain fragment such as a section
    // anchor in front of it.
    let base = match url.find(":~:") {
        Some(idx) => &url[..idx],
        None => url,
    };
    let separator = if base.contains('#') { "" } else { "#" };
    format!("{base}{separator}:~:text={}", encode(fragment))
}
