//! Request shield: rejects paths and query strings carrying common attack payloads.

/// Lowercase markers, raw and percent-encoded.
const ATTACK_MARKERS: &[&str] = &[
    // path traversal
    "../",
    "..\\",
    "..%2f",
    "%2e%2e",
    "/etc/passwd",
    // script injection
    "<script",
    "%3cscript",
    "javascript:",
    "onerror=",
    // sql injection
    "' or '1'='1",
    "%27%20or%20",
    "union select",
    "union%20select",
    "union+select",
    "; drop table",
    "%3b%20drop%20table",
];

/// Returns true when the path or query contains a known attack marker.
pub fn is_suspicious(path: &str, query: Option<&str>) -> bool {
    let path = path.to_ascii_lowercase();
    let query = query.map(str::to_ascii_lowercase).unwrap_or_default();

    ATTACK_MARKERS
        .iter()
        .any(|m| path.contains(m) || query.contains(m))
}
