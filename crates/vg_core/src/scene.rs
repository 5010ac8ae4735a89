//! Path node tree
//!
//! A [`Scene`] is an arena of nodes. Path nodes own a [`Path`], may own a
//! renderer, and otherwise inherit the renderer of the nearest path node
//! above them. Each path node caches:
//!
//! - its mesh/texture representation, rebuilt when the node is dirty
//! - the composed [`Graphics`] of its subtree, dropped whenever anything
//!   below it changes
//!
//! Structural changes (parenting, unparenting, transform changes) run the
//! same invalidation rules a host engine would trigger through notifications.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::error::{Result, VgError};
use crate::geometry::{Affine2D, Point, Rect};
use crate::graphics::Graphics;
use crate::mesh::{RenderedMesh, Texture};
use crate::paint::Paint;
use crate::path::{FillRule, Path};
use crate::renderer::{RenderContext, SharedRenderer};

new_key_type! {
    pub struct NodeId;
}

// ─────────────────────────────────────────────────────────────────────────────
// Node types
// ─────────────────────────────────────────────────────────────────────────────

/// Per-node state of a path node
#[derive(Debug, Default)]
pub struct PathNode {
    pub(crate) path: Path,
    pub(crate) vg_transform: Affine2D,
    pub(crate) renderer: Option<SharedRenderer>,
    pub(crate) dirty: bool,
    pub(crate) subtree_graphics: Option<Graphics>,
    pub(crate) mesh: Option<RenderedMesh>,
    pub(crate) texture: Option<Texture>,
}

impl PathNode {
    fn new(path: Path) -> Self {
        Self {
            path,
            dirty: true,
            ..Default::default()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extra transform applied to the path inside the node
    pub fn vg_transform(&self) -> Affine2D {
        self.vg_transform
    }

    pub fn renderer(&self) -> Option<&SharedRenderer> {
        self.renderer.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mesh(&self) -> Option<&RenderedMesh> {
        self.mesh.as_ref()
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }
}

/// What a node is
#[derive(Debug)]
pub enum NodeKind {
    /// Plain node without a transform of its own
    Node,
    /// 2D node with a transform
    Node2D,
    /// Vector path node
    Path(Box<PathNode>),
}

impl NodeKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            NodeKind::Node => "Node",
            NodeKind::Node2D => "Node2D",
            NodeKind::Path(_) => "VGPath",
        }
    }

    /// Whether the node carries a 2D transform
    pub fn is_canvas_item(&self) -> bool {
        !matches!(self, NodeKind::Node)
    }
}

/// A node in the scene arena
#[derive(Debug)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    transform: Affine2D,
    visible: bool,
    kind: NodeKind,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> Affine2D {
        self.transform
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn as_path(&self) -> Option<&PathNode> {
        match &self.kind {
            NodeKind::Path(p) => Some(p),
            _ => None,
        }
    }

    fn as_path_mut(&mut self) -> Option<&mut PathNode> {
        match &mut self.kind {
            NodeKind::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self.kind, NodeKind::Path(_))
    }
}

/// Events the tree reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    Parented,
    Unparented,
    TransformChanged,
}

/// A node materialized for the host: either a textured sprite or a mesh
#[derive(Debug)]
pub enum MeshNode {
    Sprite {
        name: String,
        texture: Texture,
        /// Places texture pixel (0, 0) at the texture origin in parent space
        transform: Affine2D,
    },
    MeshInstance {
        name: String,
        mesh: RenderedMesh,
        transform: Affine2D,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Value of a path node property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Str(String),
    Float(f32),
    Bool(bool),
    Points(Vec<Point>),
}

/// Kind of a listed property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    Str,
    Float,
    Bool,
    Points,
}

/// Entry of [`Scene::property_list`]
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyInfo {
    pub name: String,
    pub kind: PropertyKind,
    pub hint: Option<&'static str>,
}

impl PropertyInfo {
    fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            hint: None,
        }
    }
}

/// Parses `subpaths/<index>/<field>`
fn parse_subpath_property(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("subpaths/")?;
    let (index, field) = rest.split_once('/')?;
    Some((index.parse().ok()?, field))
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable description of one node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub class: String,
    /// Index of the parent entry, `None` for the snapshot root
    pub parent: Option<usize>,
    pub transform: Affine2D,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vg_transform: Option<Affine2D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererSnapshot>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

/// Renderer owned by a snapshot node: its class and settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RendererSnapshot {
    pub class: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, f32>,
}

impl RendererSnapshot {
    pub fn property(&self, name: &str) -> Option<f32> {
        self.properties.get(name).copied()
    }
}

/// Serializable description of a subtree, parents before children
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub nodes: Vec<NodeSnapshot>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene
// ─────────────────────────────────────────────────────────────────────────────

/// Arena of nodes with a fixed root
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            name: "root".to_string(),
            parent: None,
            children: Vec::new(),
            transform: Affine2D::IDENTITY,
            visible: true,
            kind: NodeKind::Node,
        });
        Self { nodes, root }
    }

    /// The tree root; nodes attached below it are inside the tree
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(VgError::UnknownNode)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(VgError::UnknownNode)
    }

    pub fn path_node(&self, id: NodeId) -> Result<&PathNode> {
        let node = self.node(id)?;
        node.as_path()
            .ok_or_else(|| VgError::NotAPath(node.name.clone()))
    }

    fn path_node_mut(&mut self, id: NodeId) -> Result<&mut PathNode> {
        let node = self.node_mut(id)?;
        match &mut node.kind {
            NodeKind::Path(p) => Ok(p),
            _ => Err(VgError::NotAPath(node.name.clone())),
        }
    }

    pub fn is_path(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_path)
    }

    // ── creation ────────────────────────────────────────────────────────────

    fn insert(&mut self, name: String, kind: NodeKind) -> NodeId {
        self.nodes.insert(Node {
            name,
            parent: None,
            children: Vec::new(),
            transform: Affine2D::IDENTITY,
            visible: true,
            kind,
        })
    }

    /// Create a detached plain node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), NodeKind::Node)
    }

    /// Create a detached 2D node
    pub fn create_node_2d(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(name.into(), NodeKind::Node2D)
    }

    /// Create a detached path node for `path`
    pub fn create_path(&mut self, path: Path) -> NodeId {
        let name = if path.name.is_empty() {
            "VGPath".to_string()
        } else {
            path.name.clone()
        };
        self.insert(name, NodeKind::Path(Box::new(PathNode::new(path))))
    }

    /// Create a path node with the default ellipse content
    pub fn create_default_path(&mut self) -> NodeId {
        self.create_path(Path::default_shape())
    }

    // ── hierarchy ──────────────────────────────────────────────────────────

    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(self.node(id)?.name.as_str())
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).is_some_and(|n| n.name == name))
    }

    /// Ancestors from the parent up to the topmost node
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, id: NodeId) -> bool {
        candidate == id || self.ancestors(id).any(|a| a == candidate)
    }

    /// Whether the node is attached below the scene root
    pub fn is_inside_tree(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Attach `child` below `parent`.
    ///
    /// With `legible_unique_name` a colliding name gets a numeric suffix
    /// ("Path" becomes "Path2", "Path3", ...).
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        legible_unique_name: bool,
    ) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(VgError::Cycle);
        }
        if let Some(old) = self.parent(child) {
            self.remove_child(old, child)?;
        }

        if legible_unique_name {
            let unique = self.unique_child_name(parent, &self.node(child)?.name);
            self.node_mut(child)?.name = unique;
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.notification(child, Notification::Parented)
    }

    /// Detach `child` from `parent`, keeping it alive
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(VgError::UnknownNode);
        }
        // ancestors lose the child's contribution before it leaves
        self.bubble_change(child);
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        self.notification(child, Notification::Unparented)
    }

    /// Detach and drop a node and its subtree
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(VgError::Cycle);
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id)?;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.remove(n) {
                stack.extend(node.children);
            }
        }
        Ok(())
    }

    fn unique_child_name(&self, parent: NodeId, name: &str) -> String {
        let taken: FxHashSet<&str> = self
            .children(parent)
            .iter()
            .filter_map(|&c| self.nodes.get(c))
            .map(|n| n.name.as_str())
            .collect();
        if !taken.contains(name) {
            return name.to_string();
        }

        let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut number: u64 = name[base.len()..].parse().unwrap_or(1);
        let mut candidate = String::with_capacity(base.len() + 4);
        loop {
            number += 1;
            candidate.clear();
            candidate.push_str(base);
            let _ = write!(candidate, "{number}");
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    // ── transforms ─────────────────────────────────────────────────────────

    pub fn transform(&self, id: NodeId) -> Result<Affine2D> {
        Ok(self.node(id)?.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Affine2D) -> Result<()> {
        let node = self.node_mut(id)?;
        if !node.kind.is_canvas_item() {
            return Err(VgError::InvalidValue {
                property: "transform".into(),
                value: node.name.clone(),
            });
        }
        node.transform = transform;
        self.notification(id, Notification::TransformChanged)
    }

    pub fn position(&self, id: NodeId) -> Result<Point> {
        Ok(self.node(id)?.transform.origin())
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<()> {
        let t = self.node(id)?.transform.with_origin(position);
        self.set_transform(id, t)
    }

    /// Transform from node space to the space of the topmost ancestor
    pub fn global_transform(&self, id: NodeId) -> Result<Affine2D> {
        let mut t = self.node(id)?.transform;
        for ancestor in self.ancestors(id) {
            let node = self.node(ancestor)?;
            if node.kind.is_canvas_item() {
                t = node.transform.then(&t);
            }
        }
        Ok(t)
    }

    pub fn is_visible(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.visible)
    }

    /// Show or hide a node; hidden path nodes are skipped by click tests
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.node_mut(id)?.visible = visible;
        Ok(())
    }

    // ── notifications ──────────────────────────────────────────────────────

    /// Apply the invalidation rules for `what` on `id`
    pub fn notification(&mut self, id: NodeId, what: Notification) -> Result<()> {
        let is_path = self.node(id)?.is_path();
        match what {
            Notification::Parented => {
                self.bubble_change(id);
                if is_path {
                    if self.inherits_renderer(id)? {
                        self.set_dirty(id, false)?;
                        self.set_inherited_dirty(id);
                    }
                } else {
                    self.set_inherited_dirty(id);
                }
            }
            Notification::Unparented => {
                if is_path {
                    self.set_dirty(id, false)?;
                }
                self.bubble_change(id);
            }
            Notification::TransformChanged => {
                if self.is_inside_tree(id) {
                    self.bubble_change(id);
                    self.transform_changed(id)?;
                }
            }
        }
        Ok(())
    }

    /// Drop cached subtree graphics of every path ancestor
    fn bubble_change(&mut self, id: NodeId) {
        let ancestors: Vec<NodeId> = self.ancestors(id).collect();
        for ancestor in ancestors {
            if let Some(p) = self.nodes.get_mut(ancestor).and_then(Node::as_path_mut) {
                p.subtree_graphics = None;
            }
        }
    }

    /// Dirty the node and its descendants whose renderer output depends on
    /// the transform
    fn transform_changed(&mut self, id: NodeId) -> Result<()> {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if self.is_path(n) {
                let sensitive = self
                    .inherited_renderer(n)?
                    .is_some_and(|r| r.is_dirty_on_transform_change());
                if sensitive {
                    self.set_dirty(n, false)?;
                }
            }
            stack.extend_from_slice(self.children(n));
        }
        Ok(())
    }

    // ── dirtiness ──────────────────────────────────────────────────────────

    /// Mark a path node for re-rendering.
    ///
    /// With `children` the inheriting descendants are marked instead.
    pub fn set_dirty(&mut self, id: NodeId, children: bool) -> Result<()> {
        if children {
            self.set_inherited_dirty(id);
            return Ok(());
        }

        let mut cursor = Some(id);
        while let Some(n) = cursor {
            if let Some(p) = self.nodes.get_mut(n).and_then(Node::as_path_mut) {
                p.subtree_graphics = None;
            }
            cursor = self.parent(n);
        }

        let node = self.node_mut(id)?;
        trace!(node = %node.name, "path marked dirty");
        if let Some(p) = node.as_path_mut() {
            p.dirty = true;
        }
        Ok(())
    }

    /// Dirty descendants that inherit their renderer through `id`
    fn set_inherited_dirty(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            match self.nodes.get(child).and_then(Node::as_path) {
                Some(p) => {
                    if p.renderer.is_none() {
                        let _ = self.set_dirty(child, false);
                        self.set_inherited_dirty(child);
                    }
                }
                None => self.set_inherited_dirty(child),
            }
        }
    }

    pub fn is_dirty(&self, id: NodeId) -> Result<bool> {
        Ok(self.path_node(id)?.dirty)
    }

    // ── renderer ───────────────────────────────────────────────────────────

    pub fn renderer(&self, id: NodeId) -> Result<Option<SharedRenderer>> {
        Ok(self.path_node(id)?.renderer.clone())
    }

    /// Assign (or clear) the node's own renderer
    pub fn set_renderer(&mut self, id: NodeId, renderer: Option<SharedRenderer>) -> Result<()> {
        self.path_node_mut(id)?.renderer = renderer;
        self.set_dirty(id, false)?;
        self.set_inherited_dirty(id);
        Ok(())
    }

    /// True when the node has no renderer of its own
    pub fn inherits_renderer(&self, id: NodeId) -> Result<bool> {
        Ok(self.path_node(id)?.renderer.is_none())
    }

    /// The node's renderer, or the one of the nearest path ancestor
    pub fn inherited_renderer(&self, id: NodeId) -> Result<Option<SharedRenderer>> {
        if let Some(r) = &self.path_node(id)?.renderer {
            return Ok(Some(r.clone()));
        }
        Ok(self
            .ancestors(id)
            .filter_map(|a| self.nodes.get(a).and_then(Node::as_path))
            .find_map(|p| p.renderer.clone()))
    }

    /// Topmost path node on the way to the root (the node itself if none)
    pub fn root_path(&self, id: NodeId) -> NodeId {
        self.ancestors(id)
            .filter(|&a| self.is_path(a))
            .last()
            .unwrap_or(id)
    }

    // ── path content ───────────────────────────────────────────────────────

    pub fn path(&self, id: NodeId) -> Result<&Path> {
        Ok(&self.path_node(id)?.path)
    }

    /// Replace the node's path
    pub fn set_path(&mut self, id: NodeId, path: Path) -> Result<()> {
        self.path_node_mut(id)?.path = path;
        self.set_dirty(id, false)
    }

    pub fn is_path_empty(&self, id: NodeId) -> Result<bool> {
        Ok(self.path_node(id)?.path.is_empty())
    }

    pub fn num_subpaths(&self, id: NodeId) -> Result<usize> {
        Ok(self.path_node(id)?.path.num_subpaths())
    }

    pub fn fill_paint(&self, id: NodeId) -> Result<Option<&Paint>> {
        Ok(self.path_node(id)?.path.fill.as_ref())
    }

    pub fn set_fill_paint(&mut self, id: NodeId, paint: Option<Paint>) -> Result<()> {
        self.path_node_mut(id)?.path.fill = paint;
        self.set_dirty(id, false)
    }

    pub fn line_paint(&self, id: NodeId) -> Result<Option<&Paint>> {
        Ok(self.path_node(id)?.path.line.as_ref())
    }

    pub fn set_line_paint(&mut self, id: NodeId, paint: Option<Paint>) -> Result<()> {
        self.path_node_mut(id)?.path.line = paint;
        self.set_dirty(id, false)
    }

    pub fn line_width(&self, id: NodeId) -> Result<f32> {
        Ok(self.path_node(id)?.path.line_width)
    }

    pub fn set_line_width(&mut self, id: NodeId, width: f32) -> Result<()> {
        self.path_node_mut(id)?.path.line_width = width;
        self.set_dirty(id, false)
    }

    pub fn set_points(&mut self, id: NodeId, subpath: usize, points: &[Point]) -> Result<()> {
        self.path_node_mut(id)?
            .path
            .subpath_mut(subpath)?
            .set_points(points);
        self.set_dirty(id, false)
    }

    /// Split a curve of `subpath` at global parameter `t`
    pub fn insert_curve(&mut self, id: NodeId, subpath: usize, t: f32) -> Result<bool> {
        let inserted = self
            .path_node_mut(id)?
            .path
            .subpath_mut(subpath)?
            .insert_curve_at(t);
        self.set_dirty(id, false)?;
        Ok(inserted)
    }

    pub fn remove_curve(&mut self, id: NodeId, subpath: usize, curve: usize) -> Result<()> {
        self.path_node_mut(id)?
            .path
            .subpath_mut(subpath)?
            .remove_curve(curve)?;
        self.set_dirty(id, false)
    }

    pub fn vg_transform(&self, id: NodeId) -> Result<Affine2D> {
        Ok(self.path_node(id)?.vg_transform)
    }

    /// Move the path so its bounds center sits at the node origin; the node
    /// moves by the same amount so nothing shifts on screen.
    pub fn recenter(&mut self, id: NodeId) -> Result<()> {
        let node_transform = self.node(id)?.transform;
        let p = self.path_node_mut(id)?;
        let center = p.path.center();
        p.path
            .transform(&Affine2D::translation(-center.x, -center.y), false);
        p.vg_transform = p.vg_transform.translated(center);

        let shift = node_transform
            .untranslated()
            .transform_point(p.vg_transform.origin());
        p.vg_transform = p.vg_transform.untranslated();

        let position = node_transform.origin() + shift;
        self.set_position(id, position)?;
        self.set_dirty(id, false)
    }

    // ── graphics ───────────────────────────────────────────────────────────

    /// The node's own path in node space
    pub fn local_graphics(&self, id: NodeId) -> Result<Graphics> {
        let p = self.path_node(id)?;
        let mut graphics = Graphics::new();
        graphics.add_path(p.path.transformed(&p.vg_transform, false));
        Ok(graphics)
    }

    /// Composed graphics of the node and everything below it, in node space
    pub fn subtree_graphics(&mut self, id: NodeId) -> Result<&Graphics> {
        let composed = if self.path_node(id)?.subtree_graphics.is_none() {
            let mut graphics = Graphics::new();
            self.compose_graphics(&mut graphics, &Affine2D::IDENTITY, id);
            Some(graphics)
        } else {
            None
        };

        let p = self.path_node_mut(id)?;
        if let Some(graphics) = composed {
            p.subtree_graphics = Some(graphics);
        }
        Ok(p.subtree_graphics.get_or_insert_with(Graphics::new))
    }

    /// Children first, then the node's own path, all mapped by `transform`
    fn compose_graphics(&self, graphics: &mut Graphics, transform: &Affine2D, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        for &child in &node.children {
            let Some(child_node) = self.nodes.get(child) else {
                continue;
            };
            let t = if child_node.kind.is_canvas_item() {
                transform.then(&child_node.transform)
            } else {
                *transform
            };
            self.compose_graphics(graphics, &t, child);
        }

        if let Some(p) = node.as_path() {
            let t = transform.then(&p.vg_transform);
            graphics.add_path(p.path.transformed(&t, true));
        }
    }

    fn render_context(&self, id: NodeId, high_quality: bool) -> Result<RenderContext> {
        let scale = self.global_transform(id)?.scale_factors().max_dimension();
        let scale = if scale > 0.0 { scale } else { 1.0 };
        Ok(RenderContext::new(scale).high_quality(high_quality))
    }

    /// Rebuild the cached mesh (and sprite texture) when the node is dirty
    pub fn update_mesh_representation(&mut self, id: NodeId) -> Result<()> {
        if !self.path_node(id)?.dirty {
            return Ok(());
        }

        let renderer = match self.inherited_renderer(id)? {
            Some(renderer) if !self.is_path_empty(id)? => renderer,
            _ => {
                self.path_node_mut(id)?.dirty = false;
                return Ok(());
            }
        };

        let graphics = self.local_graphics(id)?;
        let ctx = self.render_context(id, false)?;
        let mesh = renderer.render_mesh(&graphics, &ctx)?;
        let texture = if renderer.prefer_sprite() {
            Some(renderer.render_texture(&graphics, &ctx)?)
        } else {
            None
        };
        debug!(
            node = %self.node(id)?.name,
            triangles = mesh.mesh.triangle_count(),
            "updated mesh representation"
        );

        // a failed render leaves the node dirty so the next draw retries
        let p = self.path_node_mut(id)?;
        p.mesh = Some(mesh);
        p.texture = texture;
        p.dirty = false;
        Ok(())
    }

    /// Mesh to draw for the node, rebuilding it first if needed
    pub fn draw(&mut self, id: NodeId) -> Result<Option<&RenderedMesh>> {
        self.update_mesh_representation(id)?;
        let p = self.path_node(id)?;
        if p.path.is_empty() {
            return Ok(None);
        }
        Ok(p.mesh.as_ref())
    }

    /// Materialize the node as a standalone sprite or mesh instance.
    ///
    /// Returns `None` when no renderer applies.
    pub fn create_mesh_node(&self, id: NodeId) -> Result<Option<MeshNode>> {
        let Some(renderer) = self.inherited_renderer(id)? else {
            return Ok(None);
        };
        let node = self.node(id)?;
        let graphics = self.local_graphics(id)?;

        if renderer.prefer_sprite() {
            let current_scale = node.transform.scale_factors().max_dimension();
            let current_scale = if current_scale > 0.0 { current_scale } else { 1.0 };
            let ctx = RenderContext::new(current_scale).high_quality(true);
            let texture = renderer.render_texture(&graphics, &ctx)?;

            let texel = 1.0 / texture.scale;
            let transform = node
                .transform
                .then(&Affine2D::translation(texture.origin.x, texture.origin.y))
                .then(&Affine2D::scale(texel, texel));
            return Ok(Some(MeshNode::Sprite {
                name: node.name.clone(),
                texture,
                transform,
            }));
        }

        let ctx = RenderContext::new(1.0).high_quality(true);
        let mesh = renderer.render_mesh(&graphics, &ctx)?;
        Ok(Some(MeshNode::MeshInstance {
            name: node.name.clone(),
            mesh,
            transform: node.transform,
        }))
    }

    // ── hit testing ────────────────────────────────────────────────────────

    /// Whether `point`, in path space, lies inside the node's own path
    pub fn is_inside(&self, id: NodeId, point: Point) -> Result<bool> {
        Ok(self.path_node(id)?.path.is_inside(point))
    }

    /// First visible path child whose path contains `point` (node space)
    pub fn find_clicked_child(&self, id: NodeId, point: Point) -> Result<Option<NodeId>> {
        let vg_transform = self.path_node(id)?.vg_transform;
        for &child in self.children(id) {
            let Some(node) = self.nodes.get(child) else {
                continue;
            };
            let Some(p) = node.as_path() else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let Some(inverse) = node.transform.then(&vg_transform).inverse() else {
                continue;
            };
            if p.path.is_inside(inverse.transform_point(point)) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Editor selection rectangle: bounds of the subtree graphics
    pub fn edit_rect(&mut self, id: NodeId) -> Result<Rect> {
        Ok(self.subtree_graphics(id)?.bounds())
    }

    /// Whether a click at `point` (node space) selects the node
    pub fn is_selected_on_click(&mut self, id: NodeId, point: Point) -> Result<bool> {
        Ok(self.subtree_graphics(id)?.hit(point).is_some())
    }

    // ── properties ─────────────────────────────────────────────────────────

    /// Set a path property by name. Returns `Ok(false)` for unknown names.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: PropertyValue) -> Result<bool> {
        self.set_dirty(id, false)?;
        let invalid = |value: &PropertyValue| VgError::InvalidValue {
            property: name.to_string(),
            value: format!("{value:?}"),
        };

        let p = self.path_node_mut(id)?;
        match name {
            "name" => match value {
                PropertyValue::Str(s) => p.path.name = s,
                other => return Err(invalid(&other)),
            },
            "line_width" => match value {
                PropertyValue::Float(w) => p.path.line_width = w,
                other => return Err(invalid(&other)),
            },
            "fill_rule" => match &value {
                PropertyValue::Str(s) => match s.parse::<FillRule>() {
                    Ok(rule) => p.path.fill_rule = rule,
                    Err(_) => return Ok(false),
                },
                other => return Err(invalid(other)),
            },
            _ => {
                let Some((index, field)) = parse_subpath_property(name) else {
                    return Ok(false);
                };
                if index == p.path.num_subpaths() {
                    p.path.add_subpath(Default::default());
                }
                let Ok(subpath) = p.path.subpath_mut(index) else {
                    return Ok(false);
                };
                match (field, value) {
                    ("closed", PropertyValue::Bool(closed)) => subpath.set_closed(closed),
                    ("points", PropertyValue::Points(points)) => {
                        if !points.is_empty() {
                            subpath.set_points(&points);
                        }
                    }
                    ("closed" | "points", other) => return Err(invalid(&other)),
                    _ => return Ok(false),
                }
            }
        }
        Ok(true)
    }

    /// Read a path property by name, `None` for unknown names
    pub fn get_property(&self, id: NodeId, name: &str) -> Result<Option<PropertyValue>> {
        let path = &self.path_node(id)?.path;
        let value = match name {
            "name" => PropertyValue::Str(path.name.clone()),
            "line_width" => PropertyValue::Float(path.line_width),
            "fill_rule" => PropertyValue::Str(path.fill_rule.as_str().to_string()),
            _ => {
                let Some((index, field)) = parse_subpath_property(name) else {
                    return Ok(None);
                };
                let Ok(subpath) = path.subpath(index) else {
                    return Ok(None);
                };
                match field {
                    "closed" => PropertyValue::Bool(subpath.is_closed()),
                    "points" => PropertyValue::Points(subpath.points().to_vec()),
                    _ => return Ok(None),
                }
            }
        };
        Ok(Some(value))
    }

    /// All readable properties of a path node
    pub fn property_list(&self, id: NodeId) -> Result<Vec<PropertyInfo>> {
        let path = &self.path_node(id)?.path;
        let mut list = vec![
            PropertyInfo::new("name", PropertyKind::Str),
            PropertyInfo::new("line_width", PropertyKind::Float),
            PropertyInfo {
                hint: Some("nonzero,evenodd"),
                ..PropertyInfo::new("fill_rule", PropertyKind::Str)
            },
        ];
        for i in 0..path.num_subpaths() {
            list.push(PropertyInfo::new(format!("subpaths/{i}/closed"), PropertyKind::Bool));
            list.push(PropertyInfo::new(format!("subpaths/{i}/points"), PropertyKind::Points));
        }
        Ok(list)
    }

    // ── snapshots ──────────────────────────────────────────────────────────

    /// Describe the subtree at `id`, parents before children
    pub fn snapshot(&self, id: NodeId) -> Result<SceneSnapshot> {
        self.node(id)?;
        let mut snapshot = SceneSnapshot::default();
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(id, None)];
        while let Some((n, parent)) = stack.pop() {
            let node = self.node(n)?;
            let index = snapshot.nodes.len();
            let path = node.as_path();
            snapshot.nodes.push(NodeSnapshot {
                name: node.name.clone(),
                class: node.kind.class_name().to_string(),
                parent,
                transform: node.transform,
                path: path.map(|p| p.path.clone()),
                vg_transform: path.map(|p| p.vg_transform),
                renderer: path
                    .and_then(|p| p.renderer.as_ref())
                    .map(|r| RendererSnapshot {
                        class: r.class_name().to_string(),
                        properties: r
                            .properties()
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v))
                            .collect(),
                    }),
                hidden: !node.visible,
            });
            // reversed so children keep their order when popped
            for &child in node.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }
        Ok(snapshot)
    }

    /// Rebuild a detached subtree from a snapshot and return its top node.
    ///
    /// `renderers` turns saved renderer descriptions back into instances.
    pub fn instantiate(
        &mut self,
        snapshot: &SceneSnapshot,
        renderers: impl Fn(&RendererSnapshot) -> Option<SharedRenderer>,
    ) -> Result<NodeId> {
        let mut ids: Vec<NodeId> = Vec::with_capacity(snapshot.nodes.len());
        for entry in &snapshot.nodes {
            let id = match (entry.class.as_str(), &entry.path) {
                ("VGPath", Some(path)) => {
                    let id = self.create_path(path.clone());
                    let p = self.path_node_mut(id)?;
                    p.vg_transform = entry.vg_transform.unwrap_or_default();
                    p.renderer = entry.renderer.as_ref().and_then(&renderers);
                    id
                }
                ("Node", _) => self.create_node(entry.name.clone()),
                _ => self.create_node_2d(entry.name.clone()),
            };
            {
                let node = self.node_mut(id)?;
                node.name = entry.name.clone();
                node.transform = entry.transform;
                node.visible = !entry.hidden;
            }
            if let Some(parent) = entry.parent {
                let parent_id = *ids.get(parent).ok_or(VgError::IndexOutOfRange {
                    what: "snapshot parent",
                    index: parent,
                    len: ids.len(),
                })?;
                self.add_child(parent_id, id, false)?;
            }
            ids.push(id);
        }
        ids.first().copied().ok_or(VgError::IndexOutOfRange {
            what: "snapshot node",
            index: 0,
            len: 0,
        })
    }
}
