//! Threaded replies stored as an id arena.
//!
//! Each reply lives in a slot keyed by id, holding its parent id and ordered
//! child ids. Insert, update and delete are O(1) lookups plus child-list edits
//! instead of rebuilding nested vectors along the path to the target.
//!
//! Operations on a missing target report [`ReplyApplied::NotFound`] rather than
//! silently returning the collection unchanged. Ownership is *not* enforced
//! here; callers check [`ReplyThread::is_mine`] before mutating.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{RejectReason, Result};
use crate::tree::build_tree;
use crate::types::CommentNode;

/// Whether an arena operation found its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyApplied {
    /// The operation changed the thread
    Applied,
    /// The referenced reply does not exist; nothing changed
    NotFound(String),
}

impl ReplyApplied {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: CommentNode,
    /// Parent inside this arena; `None` for roots, even when the node's own
    /// `parent_id` names a row that was promoted away (orphans, cycles)
    parent: Option<String>,
    children: Vec<String>,
}

/// Reply collection rooted at a comment (or a post's top-level comments).
#[derive(Debug, Clone, Default)]
pub struct ReplyThread {
    slots: HashMap<String, Slot>,
    roots: Vec<String>,
}

impl ReplyThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import nested replies. Children get `parent_id` set to their container.
    pub fn from_nested(replies: Vec<CommentNode>) -> Result<Self> {
        let mut ids = HashSet::new();
        collect_ids(&replies, &mut ids)?;

        let mut thread = Self::new();
        for reply in replies {
            let id = reply.id.clone();
            thread.insert_subtree(reply, None);
            thread.roots.push(id);
        }
        Ok(thread)
    }

    /// Import flat rows linked by `parent_id`.
    pub fn from_flat(flat: &[CommentNode]) -> Result<Self> {
        Self::from_nested(build_tree(flat))
    }

    fn insert_subtree(&mut self, node: CommentNode, parent: Option<&str>) {
        let mut stack = vec![(node, parent.map(str::to_string))];
        while let Some((mut node, parent)) = stack.pop() {
            if let Some(parent) = &parent {
                node.parent_id = Some(parent.clone());
            }
            let children = std::mem::take(&mut node.children);
            let id = node.id.clone();
            let child_ids = children.iter().map(|c| c.id.clone()).collect();
            stack.extend(children.into_iter().map(|c| (c, Some(id.clone()))));
            self.slots.insert(
                id,
                Slot {
                    node,
                    parent,
                    children: child_ids,
                },
            );
        }
    }

    /// Append `reply` under `parent`, or at the top level when `parent` is `None`.
    pub fn add_reply(&mut self, parent: Option<&str>, reply: CommentNode) -> Result<ReplyApplied> {
        let mut incoming = HashSet::new();
        collect_ids(std::slice::from_ref(&reply), &mut incoming)?;
        if incoming.iter().any(|id| self.slots.contains_key(id)) {
            return Err(RejectReason::DuplicateId.into());
        }

        let id = reply.id.clone();
        match parent {
            None => {
                self.insert_subtree(reply, None);
                self.roots.push(id.clone());
            }
            Some(parent) => {
                let Some(slot) = self.slots.get_mut(parent) else {
                    debug!(parent = %parent, reply = %id, "Parent reply not found");
                    return Ok(ReplyApplied::NotFound(parent.to_string()));
                };
                slot.children.push(id.clone());
                self.insert_subtree(reply, Some(parent));
            }
        }

        debug!(reply = %id, parent = ?parent, "Added reply");
        Ok(ReplyApplied::Applied)
    }

    /// Replace a reply with `updater(reply)`. Id and parent link are kept.
    pub fn update_reply<F>(&mut self, id: &str, updater: F) -> ReplyApplied
    where
        F: FnOnce(CommentNode) -> CommentNode,
    {
        let Some(slot) = self.slots.get_mut(id) else {
            return ReplyApplied::NotFound(id.to_string());
        };
        let mut next = updater(slot.node.clone());
        next.id = slot.node.id.clone();
        next.parent_id = slot.node.parent_id.clone();
        next.children.clear();
        slot.node = next;
        ReplyApplied::Applied
    }

    /// Remove a reply together with everything beneath it.
    pub fn remove_reply(&mut self, id: &str) -> ReplyApplied {
        let Some(slot) = self.slots.get(id) else {
            return ReplyApplied::NotFound(id.to_string());
        };

        match slot.parent.clone() {
            Some(parent) => {
                if let Some(parent_slot) = self.slots.get_mut(&parent) {
                    parent_slot.children.retain(|c| c != id);
                }
            }
            None => self.roots.retain(|r| r != id),
        }

        let mut stack = vec![id.to_string()];
        let mut removed = 0usize;
        while let Some(next) = stack.pop() {
            if let Some(slot) = self.slots.remove(&next) {
                removed += 1;
                stack.extend(slot.children);
            }
        }

        debug!(reply = %id, removed, "Removed reply subtree");
        ReplyApplied::Applied
    }

    pub fn find(&self, id: &str) -> Option<&CommentNode> {
        self.slots.get(id).map(|s| &s.node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Ownership predicate for edit/delete rights.
    pub fn is_mine(&self, id: &str, viewer_id: &str) -> bool {
        self.find(id).is_some_and(|n| n.is_mine(viewer_id))
    }

    /// Top-level replies sit at depth 0.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.ancestors(id).map(|chain| chain.len() - 1)
    }

    /// `id` followed by its parents up to the top level.
    fn ancestors(&self, id: &str) -> Option<Vec<String>> {
        let mut chain = vec![id.to_string()];
        let mut current = self.slots.get(id)?;
        while let Some(parent) = current.parent.as_deref() {
            let Some(slot) = self.slots.get(parent) else {
                break;
            };
            chain.push(parent.to_string());
            current = slot;
        }
        Some(chain)
    }

    /// Effective parent for a new reply aimed at `target`.
    ///
    /// Below the cap the target itself is returned; at or beyond it the reply
    /// attaches to the target's ancestor at depth `max_depth - 1`, keeping every
    /// stored node at depth `<= max_depth`.
    pub fn reply_parent_for(&self, target: &str, max_depth: usize) -> Option<String> {
        let chain = self.ancestors(target)?;
        let depth = chain.len() - 1;
        let max_depth = max_depth.max(1);
        if depth < max_depth {
            return Some(target.to_string());
        }
        // chain[k] sits at depth (depth - k)
        chain.get(depth - (max_depth - 1)).cloned()
    }

    /// Export as nested nodes.
    pub fn to_nested(&self) -> Vec<CommentNode> {
        self.roots.iter().filter_map(|id| self.assemble(id)).collect()
    }

    /// Post-order rebuild of the subtree under `root`.
    fn assemble(&self, root: &str) -> Option<CommentNode> {
        let mut built: HashMap<&str, CommentNode> = HashMap::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let Some(slot) = self.slots.get(id) else {
                continue;
            };
            if expanded {
                let mut node = slot.node.detached();
                node.children = slot
                    .children
                    .iter()
                    .filter_map(|c| built.remove(c.as_str()))
                    .collect();
                built.insert(id, node);
            } else {
                stack.push((id, true));
                stack.extend(slot.children.iter().rev().map(|c| (c.as_str(), false)));
            }
        }
        built.remove(root)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn collect_ids(nodes: &[CommentNode], seen: &mut HashSet<String>) -> Result<()> {
    let mut stack: Vec<&CommentNode> = nodes.iter().collect();
    while let Some(node) = stack.pop() {
        if !seen.insert(node.id.clone()) {
            return Err(RejectReason::DuplicateId.into());
        }
        stack.extend(node.children.iter());
    }
    Ok(())
}

/// Nested-collection form of [`ReplyThread::add_reply`].
pub fn add_reply(
    replies: Vec<CommentNode>,
    parent: Option<&str>,
    reply: CommentNode,
) -> Result<(Vec<CommentNode>, ReplyApplied)> {
    let mut thread = ReplyThread::from_nested(replies)?;
    let applied = thread.add_reply(parent, reply)?;
    Ok((thread.to_nested(), applied))
}

/// Nested-collection form of [`ReplyThread::update_reply`].
pub fn update_reply<F>(
    replies: Vec<CommentNode>,
    id: &str,
    updater: F,
) -> Result<(Vec<CommentNode>, ReplyApplied)>
where
    F: FnOnce(CommentNode) -> CommentNode,
{
    let mut thread = ReplyThread::from_nested(replies)?;
    let applied = thread.update_reply(id, updater);
    Ok((thread.to_nested(), applied))
}

/// Nested-collection form of [`ReplyThread::remove_reply`].
pub fn remove_reply(
    replies: Vec<CommentNode>,
    id: &str,
) -> Result<(Vec<CommentNode>, ReplyApplied)> {
    let mut thread = ReplyThread::from_nested(replies)?;
    let applied = thread.remove_reply(id);
    Ok((thread.to_nested(), applied))
}
