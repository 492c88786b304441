//! Container image identifiers.
//!
//! An identifier is the structured form of a free-form image reference
//! such as `gcr.io/jannfis/test-image:0.1`.  The accepted grammar is
//!
//! ```text
//! [alias=][registry/]name[:tag | @digest]
//! ```
//!
//! Parsing is total: any string yields an identifier, and the raw input
//! is kept so callers can log whatever they were handed.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The version component of an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageTag {
    /// A mutable, human readable tag such as `0.1` or `latest`.
    Name(String),
    /// An immutable content digest such as `sha256:abcde`.
    Digest(String),
}

impl ImageTag {
    pub fn name(name: impl Into<String>) -> Self {
        ImageTag::Name(name.into())
    }

    pub fn digest(digest: impl Into<String>) -> Self {
        ImageTag::Digest(digest.into())
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            ImageTag::Name(name) => Some(name),
            ImageTag::Digest(_) => None,
        }
    }

    pub fn tag_digest(&self) -> Option<&str> {
        match self {
            ImageTag::Name(_) => None,
            ImageTag::Digest(digest) => Some(digest),
        }
    }
}

impl fmt::Display for ImageTag {
    /// Writes the tag with its separator, `:name` or `@digest`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageTag::Name(name) => write!(f, ":{}", name),
            ImageTag::Digest(digest) => write!(f, "@{}", digest),
        }
    }
}

/// A parsed container image reference.
///
/// Identifiers never change after construction; [`ImageIdentifier::with_tag`]
/// derives a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ImageIdentifier {
    registry_url: Option<String>,
    alias: Option<String>,
    name: String,
    tag: Option<ImageTag>,
    original: String,
}

impl ImageIdentifier {
    /// Parses a raw image reference. Never fails.
    pub fn parse(raw: &str) -> Self {
        // Only the first '=' separates the alias; further ones stay in the
        // remainder and end up in the name.
        let (alias, rest) = match raw.split_once('=') {
            Some((alias, rest)) => (non_empty(alias), rest),
            None => (None, raw),
        };

        let (registry_url, path) = split_registry(rest);
        let (name, tag) = split_tag(path);

        Self {
            registry_url: registry_url.map(str::to_string),
            alias: alias.map(str::to_string),
            name: name.to_string(),
            tag,
            original: raw.to_string(),
        }
    }

    pub fn registry_url(&self) -> Option<&str> {
        self.registry_url.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&ImageTag> {
        self.tag.as_ref()
    }

    /// The raw string this identifier was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// `registry/name`, or just `name` when no registry was given.
    pub fn full_name_without_tag(&self) -> String {
        match &self.registry_url {
            Some(registry) => format!("{}/{}", registry, self.name),
            None => self.name.clone(),
        }
    }

    /// The full name followed by `:tag` or `@digest`, if any.
    pub fn full_name_with_tag(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}{}", self.full_name_without_tag(), tag),
            None => self.full_name_without_tag(),
        }
    }

    /// Returns a copy of this identifier carrying `tag` instead of the
    /// current one. Passing `None` yields an untagged identifier.
    pub fn with_tag(&self, tag: impl Into<Option<ImageTag>>) -> Self {
        Self {
            tag: tag.into(),
            ..self.clone()
        }
    }

    /// Whether `other` refers to a different image.
    ///
    /// Registries are only compared when both sides name one. With
    /// `check_version` the tags must match as well.
    pub fn differs_from(&self, other: &ImageIdentifier, check_version: bool) -> bool {
        if self.name != other.name {
            return true;
        }
        if let (Some(a), Some(b)) = (&self.registry_url, &other.registry_url) {
            if a != b {
                return true;
            }
        }
        check_version && self.tag != other.tag
    }
}

/// Splits off a leading registry host when the first path segment looks
/// like one and something follows it.
fn split_registry(s: &str) -> (Option<&str>, &str) {
    match s.split_once('/') {
        Some((first, rest)) if !rest.is_empty() && looks_like_host(first) => {
            (Some(first), rest)
        }
        _ => (None, s),
    }
}

fn looks_like_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

fn split_tag(path: &str) -> (&str, Option<ImageTag>) {
    if let Some((name, digest)) = path.split_once('@') {
        return (name, non_empty(digest).map(ImageTag::digest));
    }

    // A ':' in an earlier path segment is not a tag separator.
    let last_slash = path.rfind('/').map(|pos| pos + 1).unwrap_or(0);
    match path[last_slash..].rfind(':') {
        Some(pos) => {
            let pos = last_slash + pos;
            (&path[..pos], non_empty(&path[pos + 1..]).map(ImageTag::name))
        }
        None => (path, None),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl fmt::Display for ImageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{}={}", alias, self.full_name_with_tag()),
            None => f.write_str(&self.full_name_with_tag()),
        }
    }
}

impl From<&str> for ImageIdentifier {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for ImageIdentifier {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ImageIdentifier> for String {
    fn from(image: ImageIdentifier) -> Self {
        image.to_string()
    }
}

impl FromStr for ImageIdentifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
