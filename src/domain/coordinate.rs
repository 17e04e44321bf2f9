//! Package coordinates and ecosystem identity
//!
//! A coordinate is (ecosystem, namespace, name, version). Namespace semantics
//! are ecosystem specific: npm scopes, Maven group ids, Go module path
//! prefixes. Validation happens here, before anything touches the network.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._@\-/]+$").unwrap());

/// Errors produced while constructing or validating a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("empty name")]
    EmptyName,

    #[error("invalid characters in name")]
    InvalidName,

    #[error("invalid package url: {0}")]
    InvalidPurl(String),

    #[error("unsupported purl type: {0}")]
    UnsupportedPurlType(String),
}

/// A package-hosting system we can resolve dependencies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    PyPi,
    Go,
    Maven,
    Cargo,
    RubyGems,
    NuGet,
    Composer,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 8] = [
        Ecosystem::Npm,
        Ecosystem::PyPi,
        Ecosystem::Go,
        Ecosystem::Maven,
        Ecosystem::Cargo,
        Ecosystem::RubyGems,
        Ecosystem::NuGet,
        Ecosystem::Composer,
    ];

    /// Lowercase identifier used in routes, cache keys and the metadata
    /// provider's system parameter.
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::PyPi => "pypi",
            Ecosystem::Go => "go",
            Ecosystem::Maven => "maven",
            Ecosystem::Cargo => "cargo",
            Ecosystem::RubyGems => "rubygems",
            Ecosystem::NuGet => "nuget",
            Ecosystem::Composer => "composer",
        }
    }

    /// Ecosystem name as spelled by the OSV vulnerability feed.
    pub fn osv_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::PyPi => "PyPI",
            Ecosystem::Go => "Go",
            Ecosystem::Maven => "Maven",
            Ecosystem::Cargo => "crates.io",
            Ecosystem::RubyGems => "RubyGems",
            Ecosystem::NuGet => "NuGet",
            Ecosystem::Composer => "Packagist",
        }
    }

    /// Map a package-url type to an ecosystem, if we support it.
    pub fn from_purl_type(purl_type: &str) -> Option<Ecosystem> {
        match purl_type {
            "npm" => Some(Ecosystem::Npm),
            "pypi" => Some(Ecosystem::PyPi),
            "golang" => Some(Ecosystem::Go),
            "maven" => Some(Ecosystem::Maven),
            "cargo" => Some(Ecosystem::Cargo),
            "gem" => Some(Ecosystem::RubyGems),
            "nuget" => Some(Ecosystem::NuGet),
            "composer" => Some(Ecosystem::Composer),
            _ => None,
        }
    }

    /// Whether package names in this ecosystem are module paths that may
    /// themselves contain `/` separators.
    pub fn is_module_path(&self) -> bool {
        matches!(self, Ecosystem::Go)
    }

    /// Join namespace and name into the ecosystem's package identifier.
    pub fn format_package(&self, namespace: Option<&str>, name: &str) -> String {
        match namespace {
            Some(ns) if !ns.is_empty() => match self {
                Ecosystem::Maven => format!("{}:{}", ns, name),
                _ => format!("{}/{}", ns, name),
            },
            _ => name.to_string(),
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for Ecosystem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npm" => Ok(Ecosystem::Npm),
            "pypi" => Ok(Ecosystem::PyPi),
            "go" => Ok(Ecosystem::Go),
            "maven" => Ok(Ecosystem::Maven),
            "cargo" => Ok(Ecosystem::Cargo),
            "rubygems" => Ok(Ecosystem::RubyGems),
            "nuget" => Ok(Ecosystem::NuGet),
            "composer" => Ok(Ecosystem::Composer),
            _ => Err(()),
        }
    }
}

/// One package release: (ecosystem, namespace, name, version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCoordinate {
    pub ecosystem: Ecosystem,
    pub namespace: Option<String>,
    pub name: String,
    pub version: String,
}

impl PackageCoordinate {
    pub fn new(
        ecosystem: Ecosystem,
        namespace: Option<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        Self {
            ecosystem,
            namespace,
            name: name.into(),
            version: version.into(),
        }
    }

    /// The formatted package identifier (`@scope/pkg`, `group:artifact`,
    /// `github.com/pkg/errors`, or the bare name).
    pub fn identifier(&self) -> String {
        self.ecosystem
            .format_package(self.namespace.as_deref(), &self.name)
    }

    /// Validate name and namespace against the restricted character class.
    /// Must be called before any network or cache access.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        validate_name(&self.name)?;
        if let Some(ns) = &self.namespace {
            validate_name(ns)?;
        }
        Ok(())
    }

    /// Parse a canonical package URL (`pkg:type/namespace/name@version`).
    /// Qualifiers and subpaths are ignored.
    pub fn from_purl(purl: &str) -> Result<Self, CoordinateError> {
        let rest = purl
            .strip_prefix("pkg:")
            .ok_or_else(|| CoordinateError::InvalidPurl("missing pkg: prefix".into()))?;

        // Strip qualifiers and subpath before looking at the path.
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let (purl_type, path) = rest
            .split_once('/')
            .ok_or_else(|| CoordinateError::InvalidPurl("missing name component".into()))?;
        let ecosystem = Ecosystem::from_purl_type(purl_type)
            .ok_or_else(|| CoordinateError::UnsupportedPurlType(purl_type.to_string()))?;

        let (path, version) = match path.rsplit_once('@') {
            // A leading '@' belongs to an un-encoded npm scope, not a version.
            Some((before, after)) if !before.is_empty() => (before, after.to_string()),
            _ => (path, String::new()),
        };

        let mut segments: Vec<String> = path
            .split('/')
            .map(|s| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .map_err(|e| CoordinateError::InvalidPurl(e.to_string()))
            })
            .collect::<Result<_, _>>()?;
        if segments.iter().any(|s| s.is_empty()) {
            return Err(CoordinateError::InvalidPurl("empty path segment".into()));
        }

        let name = segments
            .pop()
            .ok_or_else(|| CoordinateError::InvalidPurl("missing name component".into()))?;
        let namespace = if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        };

        let coordinate = Self::new(ecosystem, namespace, name, version);
        coordinate.validate()?;
        Ok(coordinate)
    }
}

/// Reject empty names and names containing characters outside
/// `[A-Za-z0-9._@-/]`.
pub fn validate_name(name: &str) -> Result<(), CoordinateError> {
    if name.is_empty() {
        return Err(CoordinateError::EmptyName);
    }
    if !NAME_RE.is_match(name) {
        return Err(CoordinateError::InvalidName);
    }
    Ok(())
}

/// Split a dependency key reported by an adapter into (namespace, name).
///
/// `@scope/pkg` splits at the first slash, `group:artifact` at the colon, and
/// module paths with more than one slash at the first slash. Anything else is
/// a bare name.
pub fn split_dependency_key(key: &str) -> (Option<&str>, &str) {
    if key.starts_with('@') {
        if let Some(i) = key.find('/') {
            if i > 0 {
                return (Some(&key[..i]), &key[i + 1..]);
            }
        }
    }
    if let Some((ns, name)) = key.split_once(':') {
        return (Some(ns), name);
    }
    if key.matches('/').count() > 1 {
        let i = key.find('/').unwrap();
        return (Some(&key[..i]), &key[i + 1..]);
    }
    (None, key)
}

/// Heuristic source-repository guess for a formatted package identifier.
///
/// Module-path ecosystems use the identifier itself; elsewhere an identifier
/// already shaped like a GitHub path is taken at face value.
pub fn repository_hint(ecosystem: Ecosystem, identifier: &str) -> Option<String> {
    if ecosystem.is_module_path() {
        return Some(identifier.to_string());
    }
    if identifier.starts_with("github.com/") {
        return Some(identifier.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_allowed_characters() {
        for name in ["express", "pkg", "@scope", "a.b_c-d", "github.com/pkg/errors"] {
            assert!(validate_name(name).is_ok(), "{name} should validate");
        }
    }

    #[test]
    fn validate_rejects_empty_and_bad_characters() {
        assert_eq!(validate_name(""), Err(CoordinateError::EmptyName));
        assert_eq!(validate_name("bad name"), Err(CoordinateError::InvalidName));
        assert_eq!(validate_name("name%"), Err(CoordinateError::InvalidName));
    }

    #[test]
    fn split_scoped_grouped_and_module_keys() {
        assert_eq!(split_dependency_key("@scope/pkg"), (Some("@scope"), "pkg"));
        assert_eq!(
            split_dependency_key("group:artifact"),
            (Some("group"), "artifact")
        );
        assert_eq!(
            split_dependency_key("github.com/pkg/errors"),
            (Some("github.com"), "pkg/errors")
        );
        assert_eq!(split_dependency_key("left"), (None, "left"));
    }

    #[test]
    fn format_package_per_ecosystem() {
        assert_eq!(Ecosystem::Npm.format_package(Some("@s"), "pkg"), "@s/pkg");
        assert_eq!(Ecosystem::Maven.format_package(Some("g"), "a"), "g:a");
        assert_eq!(
            Ecosystem::Go.format_package(Some("github.com"), "mux"),
            "github.com/mux"
        );
        assert_eq!(Ecosystem::Npm.format_package(None, "pkg"), "pkg");
    }

    #[test]
    fn purl_parses_scoped_and_module_paths() {
        let c = PackageCoordinate::from_purl("pkg:npm/%40babel/core@7.20.0").unwrap();
        assert_eq!(c.ecosystem, Ecosystem::Npm);
        assert_eq!(c.namespace.as_deref(), Some("@babel"));
        assert_eq!(c.name, "core");
        assert_eq!(c.version, "7.20.0");

        let c = PackageCoordinate::from_purl("pkg:golang/github.com/pkg/errors@0.9.1").unwrap();
        assert_eq!(c.ecosystem, Ecosystem::Go);
        assert_eq!(c.identifier(), "github.com/pkg/errors");
    }

    #[test]
    fn purl_rejects_garbage() {
        assert!(PackageCoordinate::from_purl("npm/pkg@1.0.0").is_err());
        assert!(PackageCoordinate::from_purl("pkg:frobnicator/pkg@1.0.0").is_err());
        assert!(PackageCoordinate::from_purl("pkg:npm/bad%20name@1.0.0").is_err());
    }

    #[test]
    fn repository_hint_heuristics() {
        assert_eq!(
            repository_hint(Ecosystem::Go, "golang.org/x/sys"),
            Some("golang.org/x/sys".to_string())
        );
        assert_eq!(
            repository_hint(Ecosystem::Npm, "github.com/expressjs/express"),
            Some("github.com/expressjs/express".to_string())
        );
        assert_eq!(repository_hint(Ecosystem::Npm, "express"), None);
    }
}
