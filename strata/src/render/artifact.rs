//! Artifacts: the deterministic outputs of a render pass.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// The identity of an artifact, namespaced by kind.
///
/// Identifiers look like `recipe/samba`, `text/files`, or
/// `unit/smbd.service`, and stay stable across passes so digests can be
/// compared between the previous and current system state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// The identifier of a build recipe artifact.
    #[must_use]
    pub fn recipe(name: &str) -> Self {
        Self(format!("recipe/{name}"))
    }

    /// The identifier of a service's rendered configuration text.
    #[must_use]
    pub fn text(service: &str) -> Self {
        Self(format!("text/{service}"))
    }

    /// The identifier of a rendered unit file.
    #[must_use]
    pub fn unit(unit_name: &str) -> Self {
        Self(format!("unit/{unit_name}"))
    }

    /// The identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of output an artifact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// A build recipe consumed by the build backend.
    Recipe,
    /// Rendered configuration text for one service.
    Text,
    /// A rendered service unit file.
    Unit,
}

/// One rendered output: content plus the artifacts it depends on.
///
/// Artifacts are plain values. Writing them anywhere, handing them to a
/// backend, and remembering their digests are all the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// The artifact's identity.
    pub id: ArtifactId,
    /// What kind of output this is.
    pub kind: ArtifactKind,
    /// The full rendered content.
    pub content: String,
    /// Artifacts this one is derived from or requires.
    pub depends_on: BTreeSet<ArtifactId>,
}

impl Artifact {
    /// Create an artifact with no dependencies.
    #[must_use]
    pub fn new(id: ArtifactId, kind: ArtifactKind, content: String) -> Self {
        Self {
            id,
            kind,
            content,
            depends_on: BTreeSet::new(),
        }
    }

    /// Record a dependency on another artifact.
    #[must_use]
    pub fn with_dependency(mut self, id: ArtifactId) -> Self {
        self.depends_on.insert(id);
        self
    }

    /// The SHA-256 digest of the content, hex encoded.
    ///
    /// Digests are what activation planning compares to decide whether a
    /// changed artifact must restart the units that watch it.
    #[must_use]
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.content.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_constructors() {
        assert_eq!(ArtifactId::recipe("samba").as_str(), "recipe/samba");
        assert_eq!(ArtifactId::text("files").as_str(), "text/files");
        assert_eq!(
            ArtifactId::unit("smbd.service").as_str(),
            "unit/smbd.service"
        );
        assert_eq!(ArtifactId::text("files").to_string(), "text/files");
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let a = Artifact::new(
            ArtifactId::text("files"),
            ArtifactKind::Text,
            "workgroup = HOME\n".to_string(),
        );
        let b = Artifact::new(
            ArtifactId::text("files"),
            ArtifactKind::Text,
            "workgroup = HOME\n".to_string(),
        );
        let c = Artifact::new(
            ArtifactId::text("files"),
            ArtifactKind::Text,
            "workgroup = OFFICE\n".to_string(),
        );

        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_with_dependency() {
        let artifact = Artifact::new(
            ArtifactId::unit("smbd.service"),
            ArtifactKind::Unit,
            String::new(),
        )
        .with_dependency(ArtifactId::text("files"))
        .with_dependency(ArtifactId::unit("files-setup.service"));

        assert_eq!(artifact.depends_on.len(), 2);
        assert!(artifact.depends_on.contains(&ArtifactId::text("files")));
    }
}
