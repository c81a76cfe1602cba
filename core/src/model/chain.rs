//! Library versioning: versions, library metadata and version chains.

use std::fmt;

use super::node::NodeId;

/// Identifier of a [`VersionChain`] within a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub(crate) u32);

/// Semantic version of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Versioning data attached to library nodes.
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub(crate) namespace: String,
    pub(crate) version: Version,
    pub(crate) editable: bool,
    pub(crate) chain: Option<ChainId>,
}

impl LibraryInfo {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Whether the library is locked for editing by this user.
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn chain(&self) -> Option<ChainId> {
        self.chain
    }
}

/// The versions of one artifact, ordered oldest to latest.
#[derive(Debug, Clone)]
pub struct VersionChain {
    pub(crate) id: ChainId,
    pub(crate) name: String,
    pub(crate) versions: Vec<NodeId>,
}

impl VersionChain {
    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn versions(&self) -> &[NodeId] {
        &self.versions
    }

    /// The most recent version, which is the only one that may gain new members.
    pub fn latest(&self) -> Option<NodeId> {
        self.versions.last().copied()
    }

    pub fn position(&self, library: NodeId) -> Option<usize> {
        self.versions.iter().position(|&v| v == library)
    }

    /// Versions strictly later than `library`.
    pub fn later_than(&self, library: NodeId) -> &[NodeId] {
        match self.position(library) {
            Some(index) => &self.versions[index + 1..],
            None => &[],
        }
    }
}
