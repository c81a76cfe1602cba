//! Model graph edited by the action managers.
//!
//! The graph is an arena of [`Node`]s addressed by [`NodeId`]. Libraries are
//! nodes too; their versioning data lives in [`LibraryInfo`], and libraries
//! that are versions of the same artifact are grouped in a [`VersionChain`].
//!
//! Ownership runs downwards: a library owns members, a member owns
//! properties and aliases, a resource owns resource children. Deleting a
//! node detaches it from its owner but keeps it in the arena so the deletion
//! can be undone.

mod chain;
mod graph;
mod node;

pub use chain::{ChainId, LibraryInfo, Version, VersionChain};
pub use graph::Model;
pub use node::{
    FlagField, MemberKind, Node, NodeId, NodeKind, PropertyKind, ResourceChildKind, TextField,
    Validity,
};

/// Errors raised by structural model operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("node {0} not found")]
    NotFound(NodeId),
    #[error("version chain not found")]
    ChainNotFound,
    #[error("node {0} is not a library")]
    NotALibrary(NodeId),
    #[error("node {0} is not a library member")]
    NotAMember(NodeId),
    #[error("{owner} cannot own a {kind}")]
    IllegalOwner { owner: NodeId, kind: NodeKind },
    #[error("node {0} has been removed")]
    Removed(NodeId),
}

pub type ModelResult<T = ()> = Result<T, ModelError>;
