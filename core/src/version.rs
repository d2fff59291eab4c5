use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

/// PEP 440 version pattern, anchored and case-insensitive.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*
        v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre>
            [-_.]?
            (?P<pre_l>alpha|beta|preview|pre|a|b|c|rc)
            [-_.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?P<post>
            -(?P<post_n1>[0-9]+)
            |
            [-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?
        )?
        (?P<dev>
            [-_.]?dev[-_.]?(?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("PEP 440 version pattern is valid")
});

/// Pre-release phase, normalized to its canonical spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            // c, pre and preview are all spellings of a release candidate
            _ => PreRelease::Rc,
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Alpha => write!(f, "a"),
            PreRelease::Beta => write!(f, "b"),
            PreRelease::Rc => write!(f, "rc"),
        }
    }
}

/// A parsed PEP 440 version
///
/// Numeric segments are kept as digit strings, so any length is accepted;
/// versions are never compared or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub epoch: Option<String>,
    pub release: Vec<String>,
    pub pre: Option<(PreRelease, String)>,
    pub post: Option<String>,
    pub dev: Option<String>,
    /// Local version label (after `+`)
    pub local: Option<String>,
    /// Original string representation
    pub original: String,
}

impl Version {
    /// Check if this is a pre-release (or dev) version
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// True when only epoch and release segments are present
    pub fn is_release_only(&self) -> bool {
        self.pre.is_none() && self.post.is_none() && self.dev.is_none() && self.local.is_none()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| VersionError::InvalidVersion(s.to_string()))?;

        let number = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        // An implicit number means 0: "1.0rc" is "1.0rc0"
        let zero = || "0".to_string();

        let release = caps["release"].split('.').map(str::to_string).collect();

        let pre = caps.name("pre_l").map(|label| {
            (
                PreRelease::from_label(label.as_str()),
                number("pre_n").unwrap_or_else(zero),
            )
        });

        let post = caps.name("post").map(|_| {
            number("post_n1")
                .or_else(|| number("post_n2"))
                .unwrap_or_else(zero)
        });

        let dev = caps.name("dev").map(|_| number("dev_n").unwrap_or_else(zero));

        Ok(Version {
            epoch: number("epoch"),
            release,
            pre,
            post,
            dev,
            local: number("local"),
            original: s.trim().to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_version() {
        let v = Version::from_str("1.2.3").unwrap();
        assert_eq!(v.epoch, None);
        assert_eq!(v.release, vec!["1", "2", "3"]);
        assert!(v.is_release_only());

        let v = Version::from_str("2!2.0").unwrap();
        assert_eq!(v.epoch.as_deref(), Some("2"));
        assert_eq!(v.release, vec!["2", "0"]);
    }

    #[test]
    fn test_parse_full_version() {
        let v = Version::from_str("1.0.0rc1.post2.dev3+ubuntu.1").unwrap();
        assert_eq!(v.pre, Some((PreRelease::Rc, "1".to_string())));
        assert_eq!(v.post.as_deref(), Some("2"));
        assert_eq!(v.dev.as_deref(), Some("3"));
        assert_eq!(v.local.as_deref(), Some("ubuntu.1"));
        assert!(v.is_prerelease());
        assert_eq!(v.to_string(), "1.0.0rc1.post2.dev3+ubuntu.1");
    }

    #[test]
    fn test_implicit_numbers() {
        let v = Version::from_str("1.0-1").unwrap();
        assert_eq!(v.post.as_deref(), Some("1"));

        let v = Version::from_str("1.0.alpha").unwrap();
        assert_eq!(v.pre, Some((PreRelease::Alpha, "0".to_string())));

        let v = Version::from_str("1.0preview2").unwrap();
        assert_eq!(v.pre, Some((PreRelease::Rc, "2".to_string())));

        let v = Version::from_str("1.0.dev").unwrap();
        assert_eq!(v.dev.as_deref(), Some("0"));
    }

    #[rstest]
    #[case("v1.0")]
    #[case("V1.0")]
    #[case(" 1.0 ")]
    #[case("1.0.DEV1")]
    #[case("1.0-rev3")]
    #[case("1.0b2")]
    fn test_accepts(#[case] input: &str) {
        assert!(Version::from_str(input).is_ok(), "{input} should parse");
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("1.")]
    #[case("1.0+")]
    #[case("1.0+foo_")]
    #[case("1.*")]
    #[case("1.0 beta")]
    fn test_rejects(#[case] input: &str) {
        assert_eq!(
            Version::from_str(input),
            Err(VersionError::InvalidVersion(input.to_string()))
        );
    }

    #[test]
    fn test_long_numbers_are_accepted() {
        let v = Version::from_str("99999999999999999999999!1.0.99999999999999999999999").unwrap();
        assert_eq!(v.epoch.as_deref(), Some("99999999999999999999999"));
        assert_eq!(v.release[2], "99999999999999999999999");

        let v = Version::from_str("1.0rc184467440737095516160").unwrap();
        assert_eq!(v.pre, Some((PreRelease::Rc, "184467440737095516160".to_string())));
    }
}
