//! DOM Tree (arena-based allocation)
//!
//! Attribute and child-list writes queue `MutationRecord`s; the host drains
//! them with [`DomTree::take_mutations`] and hands them to observers.

use crate::{DomError, ElementData, MutationRecord, Node, NodeId, Selector};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    mutations: Vec<MutationRecord>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            focused: None,
            mutations: Vec::new(),
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::element(tag_name));
        id
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.get(parent).is_none() {
            return Err(DomError::NodeNotFound(parent));
        }
        let old_parent = self.get(child).ok_or(DomError::NodeNotFound(child))?.parent;
        if child == parent || self.is_descendant_of(parent, child) || child == NodeId::ROOT {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if old_parent.is_valid() {
            self.detach(child);
        }

        let last = self.nodes[parent.0 as usize].last_child;
        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;

        self.mutations
            .push(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Create an element and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag_name: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(tag_name);
        self.append_child(parent, id)?;
        Ok(id)
    }

    fn detach(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.0 as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }
        let node = &mut self.nodes[child.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;

        self.mutations
            .push(MutationRecord::child_list(parent, Vec::new(), vec![child]));
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        std::iter::successors(Some(first).filter(|c| c.is_valid()), move |&c| {
            self.get(c).map(|n| n.next_sibling).filter(|n| n.is_valid())
        })
    }

    /// Ancestors of a node, nearest first, excluding the node itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Whether `id` lies strictly inside the subtree rooted at `ancestor`
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| n.as_element())
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.get_mut(id)
            .ok_or(DomError::NodeNotFound(id))?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag_name.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute and queue an attribute mutation record
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let old_value = self.element_mut(id)?.set_attr(name, value);
        self.mutations
            .push(MutationRecord::attribute(id, name, old_value));
        Ok(())
    }

    /// Remove an attribute; only queues a record if the attribute existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let old_value = self.element_mut(id)?.remove_attr(name);
        if old_value.is_some() {
            self.mutations
                .push(MutationRecord::attribute(id, name, old_value.clone()));
        }
        Ok(old_value)
    }

    /// Move focus; `None` blurs
    pub fn set_focus(&mut self, id: Option<NodeId>) -> Result<(), DomError> {
        if let Some(id) = id {
            self.element_mut(id)?;
        }
        self.focused = id;
        Ok(())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn is_focused(&self, id: NodeId) -> bool {
        self.focused == Some(id)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), DomError> {
        self.element_mut(id)?.checked = checked;
        Ok(())
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| e.checked)
    }

    /// Reflects the `disabled` attribute
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attribute(id, "disabled")
    }

    /// Check an element against a parsed selector
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    /// Drain queued mutation records, oldest first
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MutationType;

    #[test]
    fn test_append_and_walk() {
        let mut tree = DomTree::new();
        let body = tree.append_element(tree.root(), "body").unwrap();
        let a = tree.append_element(body, "div").unwrap();
        let b = tree.append_element(body, "span").unwrap();
        let inner = tree.append_element(a, "p").unwrap();

        assert_eq!(tree.children(body).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![a, body, NodeId::ROOT]);
        assert!(tree.is_descendant_of(inner, body));
        assert!(!tree.is_descendant_of(body, inner));
    }

    #[test]
    fn test_reparent_unlinks_old_siblings() {
        let mut tree = DomTree::new();
        let a = tree.append_element(tree.root(), "div").unwrap();
        let b = tree.append_element(tree.root(), "div").unwrap();
        let c = tree.append_element(tree.root(), "div").unwrap();

        tree.append_child(a, b).unwrap();
        assert_eq!(tree.children(tree.root()).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(tree.parent(b), Some(a));
    }

    #[test]
    fn test_attribute_mutations_are_queued() {
        let mut tree = DomTree::new();
        let div = tree.append_element(tree.root(), "div").unwrap();
        tree.take_mutations();

        tree.set_attribute(div, "data-x", "1").unwrap();
        tree.set_attribute(div, "data-x", "2").unwrap();
        assert_eq!(tree.remove_attribute(div, "data-x").unwrap(), Some("2".to_string()));
        assert_eq!(tree.remove_attribute(div, "data-x").unwrap(), None);

        let records = tree.take_mutations();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.mutation_type == MutationType::Attributes));
        assert_eq!(records[0].old_value, None);
        assert_eq!(records[1].old_value, Some("1".to_string()));
        assert_eq!(records[2].old_value, Some("2".to_string()));
        assert!(tree.take_mutations().is_empty());
    }

    #[test]
    fn test_element_state() {
        let mut tree = DomTree::new();
        let input = tree.append_element(tree.root(), "input").unwrap();
        assert_eq!(tree.tag_name(input), Some("input"));
        assert_eq!(tree.tag_name(NodeId::ROOT), None);

        assert!(tree.set_focus(Some(NodeId::ROOT)).is_err());
        assert_eq!(tree.focused(), None);
        tree.set_focus(Some(input)).unwrap();
        assert!(tree.is_focused(input));
        assert_eq!(tree.focused(), Some(input));

        tree.set_checked(input, true).unwrap();
        assert!(tree.is_checked(input));

        assert!(!tree.is_disabled(input));
        tree.set_attribute(input, "disabled", "").unwrap();
        assert!(tree.is_disabled(input));
    }
}
