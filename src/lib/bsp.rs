use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

use crate::{magicnum, rect::Rect};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BspError {
    #[error("{0:?} has no area")]
    EmptyRect(Rect),
    #[error("no node {0:?} in the tree")]
    UnknownNode(NodeId),
    #[error("node {0:?} is already split")]
    AlreadySplit(NodeId),
    #[error("split at {position} would leave an empty side of {rect:?}")]
    InvalidSplit { rect: Rect, position: i32 },
    #[error("invalid bsp settings: {0}")]
    InvalidSettings(&'static str),
    #[error("node {id:?} is malformed: {reason}")]
    MalformedNode { id: NodeId, reason: &'static str },
}

/// Index of a node in its [BspTree].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct NodeId(usize);

/// Where a node was cut in two.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct Split {
    /// A horizontal split cuts along a row, giving a top and bottom child; otherwise the cut is
    /// along a column, giving a left and right child.
    pub horizontal: bool,
    /// First row or column of the second child.
    pub position: i32,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct BspNode {
    rect: Rect,
    depth: u32,
    parent: Option<NodeId>,
    split: Option<(Split, NodeId, NodeId)>,
}

impl BspNode {
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Number of splits between the root and this node.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn split(&self) -> Option<Split> {
        self.split.map(|(split, _, _)| split)
    }

    /// The top and bottom, or left and right, children.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.split.map(|(_, first, second)| (first, second))
    }

    pub fn is_leaf(&self) -> bool {
        self.split.is_none()
    }
}

/// Options for [BspTree::split_recursive].
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BspSettings {
    /// Nodes at this depth are never split.
    pub max_depth: u32,
    /// Narrowest a leaf may be.
    pub min_width: i32,
    /// Shortest a leaf may be.
    pub min_height: i32,
    /// Nodes wider than this many times their height are always split by a column.
    pub max_h_ratio: f32,
    /// Nodes taller than this many times their width are always split by a row.
    pub max_v_ratio: f32,
    /// Splits land within this fraction of the middle of a node, from 0 (always the middle) to
    /// 0.5 (anywhere the minimum sizes allow).
    pub split_band: f32,
}

impl Default for BspSettings {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_width: 4,
            min_height: 4,
            max_h_ratio: 1.5,
            max_v_ratio: 1.5,
            split_band: 0.2,
        }
    }
}

impl BspSettings {
    pub fn validate(&self) -> Result<(), BspError> {
        if self.max_depth > 64 {
            Err(BspError::InvalidSettings("max_depth must be at most 64"))
        } else if self.min_width < 1 || self.min_height < 1 {
            Err(BspError::InvalidSettings("minimum leaf size must be positive"))
        } else if !(self.max_h_ratio >= 1. && self.max_v_ratio >= 1.) {
            Err(BspError::InvalidSettings("aspect ratios must be at least 1"))
        } else if !(0. ..=0.5).contains(&self.split_band) {
            Err(BspError::InvalidSettings("split_band must be between 0 and 0.5"))
        } else {
            Ok(())
        }
    }
}

/// Binary space partition of a rectangle.
///
/// Nodes live in an arena and refer to each other by [NodeId].  The two children of a split
/// node exactly tile its rectangle.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawBspTree")]
pub struct BspTree {
    nodes: Vec<Option<BspNode>>,
}

/// A [BspTree] as decoded, before its links are checked.
#[derive(Deserialize)]
struct RawBspTree {
    nodes: Vec<Option<BspNode>>,
}

impl TryFrom<RawBspTree> for BspTree {
    type Error = BspError;

    fn try_from(raw: RawBspTree) -> Result<Self, Self::Error> {
        let tree = BspTree { nodes: raw.nodes };

        tree.check_links()?;
        Ok(tree)
    }
}

/// Cut `rect` in two, with the second half starting at row or column `position`.
fn split_rect(rect: Rect, horizontal: bool, position: i32) -> Result<(Rect, Rect), BspError> {
    if horizontal {
        if position <= rect.y1 || position > rect.y2 {
            return Err(BspError::InvalidSplit { rect, position });
        }
        Ok((
            Rect {
                y2: position - 1,
                ..rect
            },
            Rect {
                y1: position,
                ..rect
            },
        ))
    } else {
        if position <= rect.x1 || position > rect.x2 {
            return Err(BspError::InvalidSplit { rect, position });
        }
        Ok((
            Rect {
                x2: position - 1,
                ..rect
            },
            Rect {
                x1: position,
                ..rect
            },
        ))
    }
}

impl BspTree {
    /// Create a tree with a single leaf covering `rect`.
    pub fn new(rect: Rect) -> Result<Self, BspError> {
        if rect.x2 < rect.x1 || rect.y2 < rect.y1 {
            return Err(BspError::EmptyRect(rect));
        }

        Ok(Self {
            nodes: vec![Some(BspNode {
                rect,
                depth: 0,
                parent: None,
                split: None,
            })],
        })
    }

    /// Create a tree covering `rect` and split it with an RNG derived from `seed`.
    pub fn generate(rect: Rect, seed: u64, settings: &BspSettings) -> Result<Self, BspError> {
        let mut tree = Self::new(rect)?;
        let mut rng = magicnum::seeded_rng(seed, magicnum::BSP_SPLIT);

        tree.split_recursive(&mut rng, settings)?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Result<&BspNode, BspError> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(BspError::UnknownNode(id))
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that the nodes form a single tree under the root whose children tile their
    /// parents.  Depth grows by one along every child link, so there can be no cycles.
    fn check_links(&self) -> Result<(), BspError> {
        let malformed = |id: usize, reason| {
            Err(BspError::MalformedNode {
                id: NodeId(id),
                reason,
            })
        };

        match self.nodes.first() {
            Some(Some(root)) if root.parent.is_none() && root.depth == 0 => {}
            _ => return malformed(0, "root must be a parentless node at depth 0"),
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let node = match node {
                Some(node) => node,
                None => continue,
            };

            if node.rect.x2 < node.rect.x1 || node.rect.y2 < node.rect.y1 {
                return malformed(i, "rectangle has no area");
            }

            if i > 0 {
                let listed = node
                    .parent
                    .and_then(|p| self.node(p).ok())
                    .map_or(false, |parent| {
                        parent.depth.checked_add(1) == Some(node.depth)
                            && parent
                                .children()
                                .map_or(false, |(a, b)| a.0 == i || b.0 == i)
                    });

                if !listed {
                    return malformed(i, "not a child of its parent");
                }
            }

            if let Some((split, first, second)) = node.split {
                let (a, b) = match (self.node(first), self.node(second)) {
                    (Ok(a), Ok(b)) if first != second => (a, b),
                    _ => return malformed(i, "missing child"),
                };

                if a.parent != Some(NodeId(i)) || b.parent != Some(NodeId(i)) {
                    return malformed(i, "child does not point back");
                }

                let tiles = split_rect(node.rect, split.horizontal, split.position)
                    .map_or(false, |(ra, rb)| a.rect == ra && b.rect == rb);

                if !tiles {
                    return malformed(i, "children do not tile the node");
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, node: BspNode) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    /// Split a leaf in two, with the second child starting at `position`.
    pub fn split_once(
        &mut self,
        id: NodeId,
        horizontal: bool,
        position: i32,
    ) -> Result<(NodeId, NodeId), BspError> {
        let node = self.node(id)?;
        let rect = node.rect;
        let depth = node.depth + 1;

        if !node.is_leaf() {
            return Err(BspError::AlreadySplit(id));
        }

        let (first, second) = split_rect(rect, horizontal, position)?;

        let child = |rect| BspNode {
            rect,
            depth,
            parent: Some(id),
            split: None,
        };
        let first = self.push(child(first));
        let second = self.push(child(second));

        if let Some(Some(node)) = self.nodes.get_mut(id.0) {
            node.split = Some((
                Split {
                    horizontal,
                    position,
                },
                first,
                second,
            ));
        }

        log::trace!(
            "split {:?} {} at {}",
            rect,
            if horizontal { "horizontally" } else { "vertically" },
            position
        );

        Ok((first, second))
    }

    /// Keep splitting every leaf at random until the settings forbid it.
    pub fn split_recursive<R: Rng>(
        &mut self,
        rng: &mut R,
        settings: &BspSettings,
    ) -> Result<(), BspError> {
        settings.validate()?;

        let mut pending: Vec<NodeId> = self.leaves().collect();

        while let Some(id) = pending.pop() {
            let node = self.node(id)?;

            if node.depth >= settings.max_depth {
                continue;
            }

            if let Some((horizontal, position)) = choose_split(node.rect, rng, settings) {
                let (first, second) = self.split_once(id, horizontal, position)?;

                pending.push(second);
                pending.push(first);
            }
        }

        log::debug!("bsp tree has {} leaves", self.leaves().count());

        Ok(())
    }

    /// Remove every descendant of a node, making it a leaf again.
    pub fn remove_children(&mut self, id: NodeId) -> Result<(), BspError> {
        let children = self.node(id)?.children();

        if let Some((first, second)) = children {
            let mut doomed = vec![first, second];

            while let Some(child) = doomed.pop() {
                if let Some(node) = self.nodes.get_mut(child.0).and_then(Option::take) {
                    if let Some((first, second)) = node.children() {
                        doomed.push(first);
                        doomed.push(second);
                    }
                }
            }

            if let Some(Some(node)) = self.nodes.get_mut(id.0) {
                node.split = None;
            }
        }

        Ok(())
    }

    /// The deepest node containing the given position.
    pub fn find_node(&self, x: i32, y: i32) -> Option<NodeId> {
        let mut id = self.root();
        let mut node = self.node(id).ok()?;

        if !node.rect.contains(x, y) {
            return None;
        }

        while let Some((split, first, second)) = node.split {
            let along = if split.horizontal { y } else { x };

            id = if along < split.position { first } else { second };
            node = self.node(id).ok()?;
        }

        Some(id)
    }

    pub fn leaves(&self) -> BspWalk<'_> {
        self.walk(Order::Leaves)
    }

    /// Traverse the tree in the given order.  Each call starts a fresh walk.
    pub fn walk(&self, order: Order) -> BspWalk<'_> {
        let mut walk = BspWalk {
            tree: self,
            order,
            stack: Vec::new(),
            queue: VecDeque::new(),
        };
        let root = self.root();

        match order {
            Order::PreOrder | Order::InOrder | Order::PostOrder | Order::Leaves => {
                walk.stack.push((root, false))
            }
            Order::LevelOrder => walk.queue.push_back(root),
            Order::InvertedLevelOrder => {
                let level_order: Vec<NodeId> = self.walk(Order::LevelOrder).collect();
                walk.queue.extend(level_order.into_iter().rev());
            }
        }

        walk
    }
}

/// Pick an axis and position to split `rect` at, or `None` if it's too small.
fn choose_split<R: Rng>(rect: Rect, rng: &mut R, settings: &BspSettings) -> Option<(bool, i32)> {
    let (w, h) = (rect.width(), rect.height());
    let horizontal = if w as f32 / h as f32 > settings.max_h_ratio {
        false
    } else if h as f32 / w as f32 > settings.max_v_ratio {
        true
    } else {
        rng.gen_bool(0.5)
    };
    let (start, size, min) = if horizontal {
        (rect.y1, h, settings.min_height)
    } else {
        (rect.x1, w, settings.min_width)
    };

    if size < min * 2 {
        return None;
    }

    let band = settings.split_band;
    let low = ((size as f32 * (0.5 - band)).ceil() as i32).max(min);
    let high = ((size as f32 * (0.5 + band)).floor() as i32).min(size - min);
    let offset = if low <= high {
        rng.gen_range(low..=high)
    } else {
        (size / 2).clamp(min, size - min)
    };

    Some((horizontal, start + offset))
}

/// Traversal order for [BspTree::walk].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum Order {
    /// Node before its children.
    PreOrder,
    /// First child, node, second child.
    InOrder,
    /// Children before their node.
    PostOrder,
    /// Breadth first, shallowest nodes first.
    LevelOrder,
    /// Exact reverse of [Order::LevelOrder], deepest nodes first.
    InvertedLevelOrder,
    /// Only leaves, in pre-order.
    Leaves,
}

/// Iterator over the [NodeId]s of a [BspTree] in some [Order].
#[derive(Clone, Debug)]
pub struct BspWalk<'a> {
    tree: &'a BspTree,
    order: Order,
    // (node, children already pushed)
    stack: Vec<(NodeId, bool)>,
    queue: VecDeque<NodeId>,
}

impl Iterator for BspWalk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        match self.order {
            Order::LevelOrder => {
                let id = self.queue.pop_front()?;

                if let Some((first, second)) = self.tree.node(id).ok()?.children() {
                    self.queue.push_back(first);
                    self.queue.push_back(second);
                }
                Some(id)
            }
            Order::InvertedLevelOrder => self.queue.pop_front(),
            Order::PreOrder | Order::Leaves => loop {
                let (id, _) = self.stack.pop()?;

                match self.tree.node(id).ok()?.children() {
                    Some((first, second)) => {
                        self.stack.push((second, false));
                        self.stack.push((first, false));

                        if self.order == Order::PreOrder {
                            return Some(id);
                        }
                    }
                    None => return Some(id),
                }
            },
            Order::InOrder | Order::PostOrder => loop {
                let (id, expanded) = self.stack.pop()?;

                match self.tree.node(id).ok()?.children() {
                    Some((first, second)) if !expanded => {
                        if self.order == Order::InOrder {
                            self.stack.push((second, false));
                            self.stack.push((id, true));
                        } else {
                            self.stack.push((id, true));
                            self.stack.push((second, false));
                        }
                        self.stack.push((first, false));
                    }
                    _ => return Some(id),
                }
            },
        }
    }
}
