//! Available Python versions, newest first.
//!
//! The remote feed is best effort: any failure (network, status, JSON, empty
//! result) yields [`FALLBACK_VERSIONS`]. Callers never see an error.

use anyhow::Result;
use std::cmp::Ordering;

/// Used whenever the remote feed is unavailable.
pub const FALLBACK_VERSIONS: &[&str] = &["3.12", "3.11", "3.10", "3.9", "3.8"];

/// A source of release tags (e.g. `v3.12.1-7390451224`).
pub trait VersionSource: Send + Sync {
    fn fetch_tags(&self) -> Result<Vec<String>>;
}

/// Versions from `source`, normalized and sorted descending, or the fallback list.
pub fn available_versions(source: &dyn VersionSource) -> Vec<String> {
    match source.fetch_tags() {
        Ok(tags) => {
            let versions = sort_versions_desc(tags.iter().filter_map(|t| normalize_tag(t)));
            if versions.is_empty() {
                tracing::warn!("Version feed returned no usable tags; using fallback list");
                fallback_versions()
            } else {
                versions
            }
        }
        Err(e) => {
            tracing::warn!("Could not fetch Python versions ({}); using fallback list", e);
            fallback_versions()
        }
    }
}

pub fn fallback_versions() -> Vec<String> {
    FALLBACK_VERSIONS.iter().map(|s| s.to_string()).collect()
}

/// `v3.12.1-7390451224` → `3.12.1`. Non-numeric tags are dropped.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let t = tag.trim();
    let t = t.strip_prefix('v').unwrap_or(t);
    let v = t.split('-').next().unwrap_or("");
    if is_numeric_version(v) {
        Some(v.to_string())
    } else {
        None
    }
}

/// Version selection from a request: cut any `-build` suffix, default when blank.
pub fn normalize_requested(raw: Option<&str>, default: &str) -> String {
    let v = raw
        .map(|s| s.trim().split('-').next().unwrap_or("").trim())
        .unwrap_or("");
    if v.is_empty() {
        default.to_string()
    } else {
        v.to_string()
    }
}

fn is_numeric_version(v: &str) -> bool {
    !v.is_empty()
        && v
            .split('.')
            .all(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()))
}

fn numeric_key(v: &str) -> Vec<u64> {
    v.split('.').map(|s| s.parse::<u64>().unwrap_or(0)).collect()
}

/// Dedupe and sort newest first, comparing components numerically (3.10 > 3.9).
pub fn sort_versions_desc(versions: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut v: Vec<String> = versions.into_iter().collect();
    v.sort_by(|a, b| match numeric_key(b).cmp(&numeric_key(a)) {
        Ordering::Equal => b.cmp(a),
        o => o,
    });
    v.dedup();
    v
}

#[cfg(feature = "remote-versions")]
pub use github::GithubReleases;

#[cfg(feature = "remote-versions")]
mod github {
    use anyhow::{Context, Result};
    use serde::Deserialize;
    use std::time::Duration;

    use super::VersionSource;

    #[derive(Deserialize)]
    struct Release {
        tag_name: String,
    }

    /// GitHub releases of `actions/python-versions`.
    pub struct GithubReleases {
        url: String,
        agent: ureq::Agent,
    }

    impl GithubReleases {
        pub fn new(url: impl Into<String>) -> Self {
            let agent = ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(Duration::from_secs(5))
                .build();
            Self {
                url: url.into(),
                agent,
            }
        }
    }

    impl VersionSource for GithubReleases {
        fn fetch_tags(&self) -> Result<Vec<String>> {
            let response = self
                .agent
                .get(&self.url)
                .set("User-Agent", concat!("scriptlite/", env!("CARGO_PKG_VERSION")))
                .set("Accept", "application/vnd.github+json")
                .call()
                .map_err(|e| match e {
                    ureq::Error::Status(code, _) => {
                        anyhow::anyhow!("version feed returned HTTP {}", code)
                    }
                    ureq::Error::Transport(t) => {
                        anyhow::anyhow!("cannot reach version feed: {}", t)
                    }
                })?;
            let releases: Vec<Release> = response
                .into_json()
                .context("Failed to parse version feed")?;
            Ok(releases.into_iter().map(|r| r.tag_name).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Vec<String>, &'static str>);

    impl VersionSource for Fixed {
        fn fetch_tags(&self) -> Result<Vec<String>> {
            self.0
                .clone()
                .map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("3.12.1-7390451224").as_deref(), Some("3.12.1"));
        assert_eq!(normalize_tag("v3.9.18-1234").as_deref(), Some("3.9.18"));
        assert_eq!(normalize_tag("3.13.0-rc.2-999").as_deref(), Some("3.13.0"));
        assert_eq!(normalize_tag("pypy-latest"), None);
        assert_eq!(normalize_tag(""), None);
    }

    #[test]
    fn test_sort_is_numeric_and_deduped() {
        let sorted = sort_versions_desc(tags(&["3.9.1", "3.10.0", "3.12.1", "3.10.0", "3.8"]));
        assert_eq!(sorted, tags(&["3.12.1", "3.10.0", "3.9.1", "3.8"]));
    }

    #[test]
    fn test_available_versions_from_source() {
        let src = Fixed(Ok(tags(&["3.11.7-1", "3.12.1-2", "3.11.7-3", "nightly"])));
        assert_eq!(available_versions(&src), tags(&["3.12.1", "3.11.7"]));
    }

    #[test]
    fn test_fallback_on_error_or_empty() {
        let fallback = tags(FALLBACK_VERSIONS);
        assert_eq!(available_versions(&Fixed(Err("offline"))), fallback);
        assert_eq!(available_versions(&Fixed(Ok(vec![]))), fallback);
        assert_eq!(available_versions(&Fixed(Ok(tags(&["junk"])))), fallback);
    }

    #[test]
    fn test_normalize_requested() {
        assert_eq!(normalize_requested(Some("3.11.4-123"), "3.12"), "3.11.4");
        assert_eq!(normalize_requested(Some("  "), "3.12"), "3.12");
        assert_eq!(normalize_requested(None, "3.12"), "3.12");
    }

    #[cfg(feature = "remote-versions")]
    #[test]
    fn test_unreachable_feed_falls_back() {
        // Port 9 (discard) on localhost: refused immediately, no external traffic.
        let src = GithubReleases::new("http://127.0.0.1:9/releases");
        assert_eq!(available_versions(&src), tags(FALLBACK_VERSIONS));
    }
}
