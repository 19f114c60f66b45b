//! Comment tree construction from flat rows.
//!
//! Rows reference their parent by id. Building is pure and stable: children
//! keep the relative order they had in the input, and no row is ever dropped.
//! Rows whose parent is missing, themselves, or part of a parent cycle are
//! promoted to roots.

use std::collections::HashMap;
use tracing::debug;

use crate::types::CommentNode;

/// Build a forest from flat comment rows.
///
/// Pre-sort with [`sort_chronologically`] for oldest-first threads. Assembly
/// uses an explicit stack, so chain depth is bounded by memory only.
pub fn build_tree(flat: &[CommentNode]) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(flat.len());
    for (i, node) in flat.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    let mut orphans = 0usize;

    for (i, node) in flat.iter().enumerate() {
        match node.parent_id.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) if parent != i => children[parent].push(i),
            _ => {
                if node.parent_id.is_some() {
                    orphans += 1;
                }
                roots.push(i);
            }
        }
    }

    let mut placed = vec![false; flat.len()];
    let mut built: Vec<Option<CommentNode>> = vec![None; flat.len()];
    let mut forest: Vec<CommentNode> = roots
        .iter()
        .filter_map(|&root| assemble(root, flat, &children, &mut placed, &mut built))
        .collect();

    // Anything still unplaced sits on a parent cycle.
    for i in 0..flat.len() {
        if !placed[i] {
            orphans += 1;
            forest.extend(assemble(i, flat, &children, &mut placed, &mut built));
        }
    }

    debug!(rows = flat.len(), roots = forest.len(), promoted = orphans, "Built comment tree");
    forest
}

/// Post-order assembly of the subtree under `root`. A child is attached once
/// all of its own children are built.
fn assemble(
    root: usize,
    flat: &[CommentNode],
    children: &[Vec<usize>],
    placed: &mut [bool],
    built: &mut [Option<CommentNode>],
) -> Option<CommentNode> {
    placed[root] = true;
    let mut stack = vec![(root, false)];
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            let mut node = flat[i].detached();
            node.children = children[i].iter().filter_map(|&c| built[c].take()).collect();
            built[i] = Some(node);
            continue;
        }
        stack.push((i, true));
        for &child in children[i].iter().rev() {
            if !placed[child] {
                placed[child] = true;
                stack.push((child, false));
            }
        }
    }
    built[root].take()
}

/// Copy a tree through `f`, one node at a time and without recursion.
///
/// `f` sees each source node; whatever children its result carries are
/// replaced by the mapped copies of the source children.
pub fn map_tree<F>(root: &CommentNode, mut f: F) -> CommentNode
where
    F: FnMut(&CommentNode) -> CommentNode,
{
    let mut out = f(root);
    out.children.clear();

    // Pre-order descendants with the position of their parent (None = root)
    let mut order: Vec<(&CommentNode, Option<usize>)> = Vec::new();
    let mut stack: Vec<(&CommentNode, Option<usize>)> =
        root.children.iter().rev().map(|c| (c, None)).collect();
    while let Some((node, parent)) = stack.pop() {
        let pos = order.len();
        order.push((node, parent));
        stack.extend(node.children.iter().rev().map(|c| (c, Some(pos))));
    }

    let mut copies: Vec<Option<CommentNode>> = order
        .iter()
        .map(|(node, _)| {
            let mut copy = f(node);
            copy.children.clear();
            Some(copy)
        })
        .collect();

    // Reverse pre-order finishes every descendant before its parent; siblings
    // arrive last-first and are flipped once complete.
    for pos in (0..order.len()).rev() {
        let Some(mut copy) = copies[pos].take() else {
            continue;
        };
        copy.children.reverse();
        match order[pos].1 {
            Some(parent) => {
                if let Some(parent) = copies[parent].as_mut() {
                    parent.children.push(copy);
                }
            }
            None => out.children.push(copy),
        }
    }
    out.children.reverse();
    out
}

/// Stable sort by `created_at`, oldest first.
pub fn sort_chronologically(flat: &mut [CommentNode]) {
    flat.sort_by(|a, b| a.created_at.cmp(&b.created_at));
}

/// Total number of nodes in a forest.
pub fn count_nodes(forest: &[CommentNode]) -> usize {
    let mut stack: Vec<&CommentNode> = forest.iter().collect();
    let mut count = 0;
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}

/// Pre-order flattening; returned nodes have no children.
pub fn flatten(forest: &[CommentNode]) -> Vec<CommentNode> {
    let mut out = Vec::with_capacity(count_nodes(forest));
    let mut stack: Vec<&CommentNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node.detached());
        stack.extend(node.children.iter().rev());
    }
    out
}
