use std::collections::HashMap;

use super::chain::{ChainId, LibraryInfo, Version, VersionChain};
use super::node::{
    FlagField, MemberKind, Node, NodeId, NodeKind, PropertyKind, ResourceChildKind, TextField,
    Validity,
};
use super::{ModelError, ModelResult};

/// Arena of model nodes plus library and chain metadata.
///
/// `Model` is `Clone` so that enablement rules can try a change on a
/// scratch copy without touching the edited model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    nodes: Vec<Node>,
    libraries: HashMap<NodeId, LibraryInfo>,
    chains: Vec<VersionChain>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    fn push_node(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        owner: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let mut node = Node::new(id, kind, name);
        node.owner = owner;
        self.nodes.push(node);
        if let Some(owner) = owner {
            self.nodes[owner.index()].children.push(id);
        }
        id
    }

    pub fn add_library(
        &mut self,
        name: impl Into<String>,
        namespace: impl Into<String>,
        version: Version,
        editable: bool,
    ) -> NodeId {
        let id = self.push_node(NodeKind::Library, name, None);
        self.libraries.insert(
            id,
            LibraryInfo {
                namespace: namespace.into(),
                version,
                editable,
                chain: None,
            },
        );
        id
    }

    pub fn add_chain(&mut self, name: impl Into<String>) -> ChainId {
        let id = ChainId(self.chains.len() as u32);
        self.chains.push(VersionChain {
            id,
            name: name.into(),
            versions: Vec::new(),
        });
        id
    }

    /// Adds `library` to `chain`, keeping the chain ordered by version. A
    /// library moves out of the chain it belonged to before.
    pub fn add_to_chain(&mut self, chain: ChainId, library: NodeId) -> ModelResult {
        let info = self
            .library(library)
            .ok_or(ModelError::NotALibrary(library))?;
        let version = info.version;
        let previous = info.chain;
        let target = self
            .chains
            .get(chain.0 as usize)
            .ok_or(ModelError::ChainNotFound)?;
        if target.versions.contains(&library) {
            return Ok(());
        }
        if let Some(previous) = previous.and_then(|p| self.chains.get_mut(p.0 as usize)) {
            previous.versions.retain(|&v| v != library);
        }
        let target = &self.chains[chain.0 as usize];
        let position = target
            .versions
            .iter()
            .position(|v| {
                self.libraries
                    .get(v)
                    .is_some_and(|info| info.version > version)
            })
            .unwrap_or(target.versions.len());

        self.chains[chain.0 as usize]
            .versions
            .insert(position, library);
        if let Some(info) = self.libraries.get_mut(&library) {
            info.chain = Some(chain);
        }
        Ok(())
    }

    pub fn add_member(
        &mut self,
        library: NodeId,
        kind: MemberKind,
        name: impl Into<String>,
    ) -> ModelResult<NodeId> {
        self.require_library(library)?;
        Ok(self.push_node(NodeKind::Member(kind), name, Some(library)))
    }

    /// Creates a member that is not yet assigned to any library.
    pub fn new_member(&mut self, kind: MemberKind, name: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Member(kind), name, None)
    }

    pub fn add_property(
        &mut self,
        owner: NodeId,
        kind: PropertyKind,
        name: impl Into<String>,
    ) -> ModelResult<NodeId> {
        self.add_child(owner, NodeKind::Property(kind), name)
    }

    pub fn add_alias(&mut self, owner: NodeId, name: impl Into<String>) -> ModelResult<NodeId> {
        self.add_child(owner, NodeKind::Alias, name)
    }

    pub fn add_resource_child(
        &mut self,
        resource: NodeId,
        kind: ResourceChildKind,
        name: impl Into<String>,
    ) -> ModelResult<NodeId> {
        self.add_child(resource, NodeKind::ResourceChild(kind), name)
    }

    /// Adds a node of `kind` under `owner`, checking that the owner may hold it.
    pub fn add_child(
        &mut self,
        owner: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
    ) -> ModelResult<NodeId> {
        let owner_kind = self.live_kind(owner)?;
        if !Self::may_own(owner_kind, kind) {
            return Err(ModelError::IllegalOwner { owner, kind });
        }
        Ok(self.push_node(kind, name, Some(owner)))
    }

    /// Whether a node of kind `owner` may directly own a node of kind `child`.
    pub fn may_own(owner: NodeKind, child: NodeKind) -> bool {
        match child {
            NodeKind::Library => false,
            NodeKind::Member(_) => owner.is_library(),
            NodeKind::Property(_) | NodeKind::Alias => owner.has_properties(),
            NodeKind::ResourceChild(_) => owner.is_resource(),
        }
    }

    pub fn set_inherited(&mut self, id: NodeId, inherited: bool) -> ModelResult {
        self.node_mut(id)?.inherited = inherited;
        Ok(())
    }

    pub fn set_library_editable(&mut self, library: NodeId, editable: bool) -> ModelResult {
        self.libraries
            .get_mut(&library)
            .ok_or(ModelError::NotALibrary(library))?
            .editable = editable;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_mut(&mut self, id: NodeId) -> ModelResult<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(ModelError::NotFound(id))
    }

    fn live_kind(&self, id: NodeId) -> ModelResult<NodeKind> {
        let kind = self.node(id).ok_or(ModelError::NotFound(id))?.kind;
        if self.is_live(id) {
            Ok(kind)
        } else {
            Err(ModelError::Removed(id))
        }
    }

    fn require_library(&self, id: NodeId) -> ModelResult {
        match self.live_kind(id)? {
            NodeKind::Library => Ok(()),
            _ => Err(ModelError::NotALibrary(id)),
        }
    }

    /// Number of nodes in the arena, including removed ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    /// Name of the node, or `""` for unknown ids.
    pub fn name(&self, id: NodeId) -> &str {
        self.node(id).map_or("", Node::name)
    }

    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::owner)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], Node::children)
    }

    pub fn library(&self, id: NodeId) -> Option<&LibraryInfo> {
        self.libraries.get(&id)
    }

    pub fn chain(&self, chain: ChainId) -> Option<&VersionChain> {
        self.chains.get(chain.0 as usize)
    }

    pub fn chain_of(&self, library: NodeId) -> Option<&VersionChain> {
        self.library(library)?.chain.and_then(|c| self.chain(c))
    }

    /// Whether the node exists and neither it nor any of its owners was removed.
    pub fn is_live(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let Some(node) = self.node(cursor) else {
                return false;
            };
            if node.removed {
                return false;
            }
            current = node.owner;
        }
        true
    }

    /// The library owning `id`. A library is its own container.
    pub fn owning_library(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = self.node(cursor)?;
            if node.kind.is_library() {
                return Some(cursor);
            }
            current = node.owner;
        }
        None
    }

    /// The nearest library member at or above `id`.
    pub fn owning_member(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(cursor) = current {
            let node = self.node(cursor)?;
            if node.kind.is_member() {
                return Some(cursor);
            }
            current = node.owner;
        }
        None
    }

    pub fn is_inherited(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_inherited)
    }

    /// A live node is editable when it has no library yet, when its library
    /// is editable, or when its library's chain is editable.
    pub fn is_editable(&self, id: NodeId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        let Some(library) = self.owning_library(id) else {
            return true;
        };
        self.library(library).is_some_and(|info| {
            info.editable || info.chain.is_some_and(|c| self.is_chain_editable(c))
        })
    }

    /// A chain is editable when its latest version is.
    pub fn is_chain_editable(&self, chain: ChainId) -> bool {
        self.chain(chain)
            .and_then(VersionChain::latest)
            .and_then(|latest| self.library(latest))
            .is_some_and(LibraryInfo::is_editable)
    }

    /// Whether the chain of the library owning `id` is editable. A library
    /// outside any chain counts as a chain of one.
    pub fn is_owning_chain_editable(&self, id: NodeId) -> bool {
        let Some(info) = self.owning_library(id).and_then(|l| self.library(l)) else {
            return false;
        };
        match info.chain {
            Some(chain) => self.is_chain_editable(chain),
            None => info.editable,
        }
    }

    /// Whether `id` first appears in the latest version of its chain.
    pub fn is_new_to_chain(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        match node.kind {
            NodeKind::Library => self
                .chain_of(id)
                .is_none_or(|chain| chain.latest() == Some(id)),
            NodeKind::Member(_) => self
                .owning_library(id)
                .is_none_or(|library| self.is_new_to_chain(library)),
            NodeKind::Alias | NodeKind::Property(_) | NodeKind::ResourceChild(_) => {
                !node.inherited
            }
        }
    }

    /// Members with the same name and kind as `member` in strictly later
    /// versions of its chain.
    pub fn later_versions(&self, member: NodeId) -> Vec<NodeId> {
        let Some(node) = self.node(member) else {
            return Vec::new();
        };
        let Some(library) = self.owning_library(member) else {
            return Vec::new();
        };
        let Some(chain) = self.chain_of(library) else {
            return Vec::new();
        };
        chain
            .later_than(library)
            .iter()
            .filter_map(|&later| self.find_member(later, &node.name))
            .filter(|&candidate| self.kind(candidate) == Some(node.kind))
            .collect()
    }

    /// Whether the type assigned to `user` has a strictly later version.
    pub fn can_assign_later_version(&self, user: NodeId) -> bool {
        self.node(user)
            .and_then(Node::assigned_type)
            .is_some_and(|assigned| !self.later_versions(assigned).is_empty())
    }

    pub fn find_member(&self, library: NodeId, name: &str) -> Option<NodeId> {
        self.children(library).iter().copied().find(|&child| {
            self.node(child)
                .is_some_and(|n| n.kind.is_member() && n.name == name)
        })
    }

    /// Live nodes whose assigned type is `target`.
    pub fn type_users(&self, target: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.assigned_type == Some(target) && self.is_live(n.id))
            .map(Node::id)
            .collect()
    }

    /// `id` followed by every node it transitively owns, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Sets a text attribute, returning the previous value.
    pub fn set_text(
        &mut self,
        id: NodeId,
        field: TextField,
        value: impl Into<String>,
    ) -> ModelResult<String> {
        self.live_kind(id)?;
        Ok(std::mem::replace(
            self.node_mut(id)?.text_mut(field),
            value.into(),
        ))
    }

    /// Sets a boolean attribute, returning the previous value.
    pub fn set_flag(&mut self, id: NodeId, field: FlagField, value: bool) -> ModelResult<bool> {
        self.live_kind(id)?;
        Ok(std::mem::replace(self.node_mut(id)?.flag_mut(field), value))
    }

    /// Sets the assigned type (or resource subject), returning the previous one.
    pub fn set_assigned_type(
        &mut self,
        id: NodeId,
        target: Option<NodeId>,
    ) -> ModelResult<Option<NodeId>> {
        self.live_kind(id)?;
        if let Some(target) = target
            && self.node(target).is_none()
        {
            return Err(ModelError::NotFound(target));
        }
        Ok(std::mem::replace(
            &mut self.node_mut(id)?.assigned_type,
            target,
        ))
    }

    pub fn set_validity(&mut self, id: NodeId, validity: Validity) -> ModelResult {
        self.node_mut(id)?.validity = validity;
        Ok(())
    }

    /// Detaches `id` from its owner and marks it removed.
    ///
    /// Returns the former owner and position so that [`attach`](Self::attach)
    /// can put the node back where it was.
    pub fn detach(&mut self, id: NodeId) -> ModelResult<Option<(NodeId, usize)>> {
        self.live_kind(id)?;
        let slot = match self.owner(id) {
            Some(owner) => {
                let children = &mut self.nodes[owner.index()].children;
                children.iter().position(|&c| c == id).map(|index| {
                    children.remove(index);
                    (owner, index)
                })
            }
            None => None,
        };
        self.node_mut(id)?.removed = true;
        Ok(slot)
    }

    /// Re-inserts a node under `owner` at `index` (clamped to the child count).
    pub fn attach(&mut self, id: NodeId, owner: NodeId, index: usize) -> ModelResult {
        let kind = self.node(id).ok_or(ModelError::NotFound(id))?.kind;
        let owner_kind = self.live_kind(owner)?;
        if !Self::may_own(owner_kind, kind) {
            return Err(ModelError::IllegalOwner { owner, kind });
        }
        let children = &mut self.nodes[owner.index()].children;
        if !children.contains(&id) {
            let at = index.min(children.len());
            children.insert(at, id);
        }
        let node = self.node_mut(id)?;
        node.owner = Some(owner);
        node.removed = false;
        Ok(())
    }

    /// Clears the removed mark of a node that had no owner when detached.
    pub fn revive(&mut self, id: NodeId) -> ModelResult {
        self.node_mut(id)?.removed = false;
        Ok(())
    }

    /// Moves a member to the end of `library`, or out of every library for
    /// `None`. Returns the previous library and the member's position in it.
    pub fn assign_library(
        &mut self,
        member: NodeId,
        library: Option<NodeId>,
    ) -> ModelResult<Option<(NodeId, usize)>> {
        if library.is_some() && self.owner(member) == library {
            let slot = library.and_then(|owner| {
                self.children(owner)
                    .iter()
                    .position(|&c| c == member)
                    .map(|index| (owner, index))
            });
            return Ok(slot);
        }
        self.place_member(member, library.map(|library| (library, usize::MAX)))
    }

    /// Moves a member to `index` of a library (clamped to the child count),
    /// or out of every library for `None`. Returns the previous slot, so
    /// passing it back restores the original sibling order.
    pub fn place_member(
        &mut self,
        member: NodeId,
        slot: Option<(NodeId, usize)>,
    ) -> ModelResult<Option<(NodeId, usize)>> {
        if !self.live_kind(member)?.is_member() {
            return Err(ModelError::NotAMember(member));
        }
        if let Some((library, _)) = slot {
            self.require_library(library)?;
        }
        let previous = self.owner(member).and_then(|owner| {
            let children = &self.nodes[owner.index()].children;
            children
                .iter()
                .position(|&c| c == member)
                .map(|index| (owner, index))
        });
        if let Some((owner, index)) = previous {
            self.nodes[owner.index()].children.remove(index);
        }
        if let Some((library, index)) = slot {
            let children = &mut self.nodes[library.index()].children;
            let at = index.min(children.len());
            children.insert(at, member);
        }
        self.node_mut(member)?.owner = slot.map(|(library, _)| library);
        Ok(previous)
    }

    /// Deep-copies `member` into `library` under a new name. Every copied
    /// node is owned locally, so nothing in the copy is inherited.
    pub fn copy_member(
        &mut self,
        member: NodeId,
        library: NodeId,
        name: impl Into<String>,
    ) -> ModelResult<NodeId> {
        if !self.live_kind(member)?.is_member() {
            return Err(ModelError::NotAMember(member));
        }
        self.require_library(library)?;
        let copy = self.copy_subtree(member, library);
        self.node_mut(copy)?.name = name.into();
        Ok(copy)
    }

    fn copy_subtree(&mut self, source: NodeId, owner: NodeId) -> NodeId {
        let template = self.nodes[source.index()].clone();
        let id = NodeId::from_index(self.nodes.len());
        let mut node = template.clone();
        node.id = id;
        node.owner = Some(owner);
        node.children = Vec::new();
        node.inherited = false;
        node.validity = Validity::Unknown;
        self.nodes.push(node);
        self.nodes[owner.index()].children.push(id);
        for child in template.children {
            self.copy_subtree(child, id);
        }
        id
    }
}
