//! Default User-Agent for probe and download traffic.
//!
//! The publisher's CDN serves browser traffic, so the default looks like a
//! desktop browser and carries the tool name as a trailing product token.

/// Browser product tokens sent in front of the tool identifier.
const BROWSER_TOKENS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Default User-Agent for every request the compiler sends.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("{BROWSER_TOKENS} aip-compiler/{version}")
}
