use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TypeError;

/// An absolute URI identifying anything addressable in a research object:
/// the object itself, its aggregated resources, proxies, folder entries and
/// resource maps.
///
/// Ordering and equality are those of the normalized string form, so a `Uri`
/// can key ordered maps deterministically.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(Url);

impl Uri {
    /// Parse an absolute URI.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        Url::parse(input).map(Self).map_err(|e| TypeError::InvalidUri {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Resolve a reference (absolute, or relative to `self`).
    pub fn resolve(&self, reference: &str) -> Result<Self, TypeError> {
        self.0.join(reference).map(Self).map_err(|e| TypeError::InvalidUri {
            input: reference.to_string(),
            reason: e.to_string(),
        })
    }

    /// The path of `other` relative to `self` treated as a container, or
    /// `None` if `other` does not live under `self`.
    ///
    /// `http://ex/ro/`.relativize(`http://ex/ro/a/b.txt`) is `a/b.txt`;
    /// relativizing the container against itself gives the empty string.
    pub fn relativize(&self, other: &Uri) -> Option<String> {
        let base = self.as_str();
        let target = other.as_str();
        if base.ends_with('/') {
            if target.len() + 1 == base.len() && base.starts_with(target) {
                return Some(String::new());
            }
            target.strip_prefix(base).map(str::to_string)
        } else if target == base {
            Some(String::new())
        } else {
            target
                .strip_prefix(base)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(str::to_string)
        }
    }

    /// Returns `true` if `self` is `base` or lives under it.
    pub fn is_within(&self, base: &Uri) -> bool {
        base.relativize(self).is_some()
    }

    /// Re-address `self` from one container to another.
    ///
    /// URIs outside `from` are returned unchanged.
    pub fn rebase(&self, from: &Uri, to: &Uri) -> Uri {
        match from.relativize(self) {
            Some(relative) => to
                .with_trailing_slash()
                .resolve(&relative)
                .unwrap_or_else(|_| self.clone()),
            None => self.clone(),
        }
    }

    /// The same URI with a trailing `/` on its path, so that relative
    /// references resolve inside it.
    pub fn with_trailing_slash(&self) -> Uri {
        if self.0.path().ends_with('/') {
            return self.clone();
        }
        let mut url = self.0.clone();
        let path = format!("{}/", url.path());
        url.set_path(&path);
        Self(url)
    }

    /// The last non-empty path segment, if any.
    pub fn last_segment(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
    }

    /// Host component, if any.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Path component.
    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl FromStr for Uri {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Url> for Uri {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uri({})", self.as_str())
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn parse_rejects_relative_references() {
        let err = Uri::parse("data.txt").unwrap_err();
        assert!(matches!(err, TypeError::InvalidUri { .. }));
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let base = uri("http://ex/ro1/");
        assert_eq!(base.resolve("data.txt").unwrap().as_str(), "http://ex/ro1/data.txt");
        assert_eq!(
            base.resolve(".ro/manifest.rdf").unwrap().as_str(),
            "http://ex/ro1/.ro/manifest.rdf"
        );
        assert_eq!(base.resolve("http://other/x").unwrap().as_str(), "http://other/x");
    }

    #[test]
    fn relativize_inside_and_outside() {
        let base = uri("http://ex/ro1/");
        assert_eq!(base.relativize(&uri("http://ex/ro1/a/b.txt")).as_deref(), Some("a/b.txt"));
        assert_eq!(base.relativize(&uri("http://ex/ro1/")).as_deref(), Some(""));
        assert_eq!(base.relativize(&uri("http://ex/ro1")).as_deref(), Some(""));
        assert_eq!(base.relativize(&uri("http://ex/ro10/a.txt")), None);
        assert_eq!(base.relativize(&uri("http://other/ro1/a.txt")), None);
    }

    #[test]
    fn relativize_without_trailing_slash() {
        let base = uri("http://ex/ro1");
        assert_eq!(base.relativize(&uri("http://ex/ro1/x")).as_deref(), Some("x"));
        assert_eq!(base.relativize(&uri("http://ex/ro10")), None);
    }

    #[test]
    fn rebase_moves_internal_uris_only() {
        let from = uri("http://ex/ro1/");
        let to = uri("http://ex/ro2/");
        assert_eq!(
            uri("http://ex/ro1/dir/a.txt").rebase(&from, &to).as_str(),
            "http://ex/ro2/dir/a.txt"
        );
        assert_eq!(uri("http://ex/ro1/").rebase(&from, &to).as_str(), "http://ex/ro2/");
        assert_eq!(
            uri("http://elsewhere/a.txt").rebase(&from, &to).as_str(),
            "http://elsewhere/a.txt"
        );
    }

    #[test]
    fn rebase_to_container_without_slash() {
        let from = uri("http://ex/ro1/");
        let to = uri("http://ex/ro2");
        assert_eq!(uri("http://ex/ro1/a").rebase(&from, &to).as_str(), "http://ex/ro2/a");
    }

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(uri("http://ex/ro1/dir/").last_segment(), Some("dir"));
        assert_eq!(uri("http://ex/ro1/a.txt").last_segment(), Some("a.txt"));
        assert_eq!(uri("http://ex/").last_segment(), None);
        assert_eq!(uri("http://ex/").host(), Some("ex"));
    }

    #[test]
    fn with_trailing_slash_is_idempotent() {
        let a = uri("http://ex/ro1");
        let b = a.with_trailing_slash();
        assert_eq!(b.as_str(), "http://ex/ro1/");
        assert_eq!(b.with_trailing_slash(), b);
    }

    #[test]
    fn serde_is_transparent() {
        let u = uri("http://ex/ro1/");
        let json = serde_json::to_string(&u).unwrap();
        assert_eq!(json, "\"http://ex/ro1/\"");
        let back: Uri = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
    }

    proptest! {
        #[test]
        fn resolve_then_relativize_roundtrips(segments in proptest::collection::vec("[a-z0-9_.-]{1,8}", 1..5)) {
            prop_assume!(segments.iter().all(|s| s != "." && s != ".."));
            let base = uri("http://example.org/ro/");
            let relative = segments.join("/");
            let resolved = base.resolve(&relative).unwrap();
            prop_assert_eq!(base.relativize(&resolved), Some(relative));
        }

        #[test]
        fn rebase_there_and_back(segments in proptest::collection::vec("[a-z0-9]{1,8}", 0..4)) {
            let from = uri("http://example.org/ro1/");
            let to = uri("http://example.org/ro2/");
            let original = from.resolve(&segments.join("/")).unwrap();
            let moved = original.rebase(&from, &to);
            prop_assert!(moved.is_within(&to));
            prop_assert_eq!(moved.rebase(&to, &from), original);
        }
    }
}
