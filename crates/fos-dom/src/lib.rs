//! fOS DOM - Document Object Model
//!
//! Arena DOM tree plus the pieces a host needs to drive observers:
//! selectors, geometry, mutation records and the native
//! mutation / resize / intersection observers.

mod classlist;
mod geometry;
mod mutation;
mod node;
mod selector;
mod tree;
pub mod observer;

pub use classlist::DOMTokenList;
pub use geometry::{DOMRect, LayoutSnapshot};
pub use mutation::{MutationRecord, MutationType};
pub use node::{Attribute, ElementData, Node, NodeData};
pub use selector::Selector;
pub use tree::DomTree;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an ID from its raw arena index
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

/// DOM errors
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node is not an element: {0:?}")]
    NotAnElement(NodeId),

    #[error("Cannot insert {child:?} under {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}
