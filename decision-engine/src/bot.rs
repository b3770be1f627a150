//! User-agent based bot detection.

/// Crawlers that are let through even though they identify as bots.
const ALLOWED_CRAWLERS: &[&str] = &[
    "googlebot",
    "bingbot",
    "duckduckbot",
    "applebot",
    "yandexbot",
    "slurp",
];

/// Substrings that mark scripted or headless clients.
const AUTOMATION_MARKERS: &[&str] = &[
    "curl/",
    "wget/",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "go-http-client",
    "java/",
    "okhttp",
    "libwww-perl",
    "scrapy",
    "httpclient",
    "headlesschrome",
    "phantomjs",
    "selenium",
    "puppeteer",
    "playwright",
    "bot",
    "spider",
    "crawler",
];

/// Returns true when the user agent looks automated.
///
/// A missing or blank user agent counts as automated.
pub fn is_automated(user_agent: Option<&str>) -> bool {
    let ua = match user_agent.map(str::trim) {
        Some(ua) if !ua.is_empty() => ua.to_ascii_lowercase(),
        _ => return true,
    };

    if ALLOWED_CRAWLERS.iter().any(|c| ua.contains(c)) {
        return false;
    }

    AUTOMATION_MARKERS.iter().any(|m| ua.contains(m))
}
