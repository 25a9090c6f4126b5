//! Host extraction for client error messages.

/// Extracts the hostname from a catalog URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
