use ahash::HashMap;
use generational_arena::Arena;
use glam::Vec3;
use tracing::warn;

use crate::{
    Channel, Node, SceneError, Track, Transform,
    undo::{UndoGroup, UndoOp, UndoState},
};

pub struct NodeId(generational_arena::Index);

impl Clone for NodeId {
    fn clone(&self) -> Self {
        *self
    }
}

impl Copy for NodeId {}

impl std::hash::Hash for NodeId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq for NodeId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for NodeId {}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NodeId").field(&self.0.into_raw_parts().0).finish()
    }
}

/// A keyable attribute on a specific node: the unit of keying and undo
/// journaling.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttrRef {
    pub node: NodeId,
    pub channel: Channel,
}

impl AttrRef {
    pub fn new(node: NodeId, channel: Channel) -> Self {
        Self { node, channel }
    }
}

/// The scene: nodes, animation curves, selection, playhead and undo.
pub struct Scene {
    nodes: Arena<Node>,
    by_name: HashMap<String, NodeId>,
    curves: HashMap<AttrRef, Track>,
    selection: Vec<NodeId>,
    current_frame: i32,
    playback: (i32, i32),
    undo: UndoState,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            by_name: HashMap::default(),
            curves: HashMap::default(),
            selection: Vec::new(),
            current_frame: 1,
            playback: (1, 100),
            undo: UndoState::default(),
        }
    }

    pub fn create_node(&mut self, name: impl Into<String>) -> Result<NodeId, SceneError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SceneError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.insert(Node::new(name.clone())));
        self.by_name.insert(name, id);
        Ok(id)
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId, SceneError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::NodeNotFound(name.to_string()))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// Declare a custom scalar attribute on a node. Not journaled; attrs are
    /// part of rig construction, not animation edits.
    pub fn add_attr(&mut self, id: NodeId, name: impl Into<String>, value: f32) {
        self.nodes[id.0].add_attr(name, value);
    }

    pub fn transform(&self, id: NodeId) -> Transform {
        self.nodes[id.0].transform()
    }

    pub fn set_transform(&mut self, id: NodeId, transform: &Transform) {
        let node = &self.nodes[id.0];
        let prev_t = node.translate;
        let prev_r = node.rotate;
        self.journal_vec3(id, &Channel::TRANSLATE, prev_t);
        self.journal_vec3(id, &Channel::ROTATE, prev_r);
        self.nodes[id.0].set_transform(transform);
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        let prev = self.nodes[id.0].translate;
        self.journal_vec3(id, &Channel::TRANSLATE, prev);
        self.nodes[id.0].translate = translation;
    }

    pub fn channel(&self, id: NodeId, channel: &Channel) -> Result<f32, SceneError> {
        self.nodes[id.0].channel(channel)
    }

    pub fn set_channel(&mut self, id: NodeId, channel: &Channel, value: f32) -> Result<(), SceneError> {
        let prev = self.nodes[id.0].channel(channel)?;
        self.journal(UndoOp::SetChannel {
            attr: AttrRef::new(id, channel.clone()),
            prev,
        });
        self.nodes[id.0].set_channel(channel, value)
    }

    pub fn attr(&self, attr: &AttrRef) -> Result<f32, SceneError> {
        self.channel(attr.node, &attr.channel)
    }

    pub fn set_attr(&mut self, attr: &AttrRef, value: f32) -> Result<(), SceneError> {
        self.set_channel(attr.node, &attr.channel, value)
    }

    // Selection

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn select(&mut self, ids: &[NodeId]) {
        self.selection.clear();
        for &id in ids {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    // Playhead

    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Move the playhead and evaluate animation curves into their channels.
    /// Evaluation is derived state and is not journaled.
    pub fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
        self.evaluate();
    }

    pub fn playback_range(&self) -> (i32, i32) {
        self.playback
    }

    pub fn set_playback_range(&mut self, start: i32, end: i32) {
        self.playback = (start, end);
    }

    fn evaluate(&mut self) {
        let updates: Vec<(AttrRef, f32)> = self
            .curves
            .iter()
            .filter(|(_, track)| !track.is_empty())
            .map(|(attr, track)| (attr.clone(), track.sample(self.current_frame)))
            .collect();
        for (attr, value) in updates {
            if let Err(err) = self.nodes[attr.node.0].set_channel(&attr.channel, value) {
                warn!("Skipping evaluation of missing attr: {err}");
            }
        }
    }

    // Keyframing

    /// Key the attr's current value at the current frame.
    pub fn set_key(&mut self, attr: &AttrRef) -> Result<(), SceneError> {
        let value = self.channel(attr.node, &attr.channel)?;
        let frame = self.current_frame;
        let track = self.curves.entry(attr.clone()).or_default();
        let prev = track.value_at(frame);
        track.insert(frame, value);
        self.journal(UndoOp::SetKey {
            attr: attr.clone(),
            frame,
            prev,
        });
        Ok(())
    }

    pub fn set_keys(&mut self, attrs: &[AttrRef]) -> Result<(), SceneError> {
        for attr in attrs {
            self.set_key(attr)?;
        }
        Ok(())
    }

    pub fn curve(&self, attr: &AttrRef) -> Option<&Track> {
        self.curves.get(attr)
    }

    pub fn key_count(&self, attr: &AttrRef) -> usize {
        self.curves.get(attr).map_or(0, Track::len)
    }

    /// Keyed frames strictly inside the open range (start, end).
    pub fn keyed_frames_between(&self, attr: &AttrRef, start: i32, end: i32) -> Vec<i32> {
        self.curves
            .get(attr)
            .map_or_else(Vec::new, |track| track.frames_between(start, end))
    }

    // Undo

    /// Open an undo group; every journaled mutation until the matching
    /// `end_undo_group` lands in one user-level undo step. Nested groups are
    /// flattened into the outermost.
    pub fn begin_undo_group(&mut self, label: &str) {
        match self.undo.open {
            None => {
                self.undo.open = Some(UndoGroup {
                    label: label.to_string(),
                    ops: Vec::new(),
                });
                self.undo.markers.push(0);
            }
            Some(ref group) => self.undo.markers.push(group.ops.len()),
        }
    }

    pub fn end_undo_group(&mut self) {
        self.undo.markers.pop();
        if self.undo.markers.is_empty()
            && let Some(group) = self.undo.open.take()
            && !group.ops.is_empty()
        {
            self.undo.stack.push(group);
        }
    }

    /// Run `f` inside an undo group. On error the partial group is rolled
    /// back before the error is returned, so no half-applied state survives.
    pub fn with_undo_group<T, E>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut Scene) -> Result<T, E>,
    ) -> Result<T, E> {
        self.begin_undo_group(label);
        match f(self) {
            Ok(value) => {
                self.end_undo_group();
                Ok(value)
            }
            Err(err) => {
                self.abort_undo_group();
                Err(err)
            }
        }
    }

    fn abort_undo_group(&mut self) {
        let Some(marker) = self.undo.markers.pop() else {
            return;
        };
        let ops = match self.undo.open.as_mut() {
            Some(group) => group.ops.split_off(marker),
            None => return,
        };
        for op in ops.iter().rev() {
            self.revert_op(op);
        }
        if self.undo.markers.is_empty() {
            self.undo.open = None;
        }
    }

    /// Revert the most recent undo group. Returns its label.
    pub fn undo(&mut self) -> Option<String> {
        let group = self.undo.stack.pop()?;
        for op in group.ops.iter().rev() {
            self.revert_op(op);
        }
        Some(group.label)
    }

    pub fn undo_steps(&self) -> usize {
        self.undo.stack.len()
    }

    fn journal(&mut self, op: UndoOp) {
        if let Some(group) = self.undo.open.as_mut() {
            group.ops.push(op);
        }
    }

    fn journal_vec3(&mut self, id: NodeId, channels: &[Channel; 3], prev: Vec3) {
        if self.undo.open.is_some() {
            for (channel, value) in channels.iter().zip([prev.x, prev.y, prev.z]) {
                self.journal(UndoOp::SetChannel {
                    attr: AttrRef::new(id, channel.clone()),
                    prev: value,
                });
            }
        }
    }

    fn revert_op(&mut self, op: &UndoOp) {
        match op {
            UndoOp::SetChannel { attr, prev } => {
                if let Err(err) = self.nodes[attr.node.0].set_channel(&attr.channel, *prev) {
                    warn!("Skipping undo of missing attr: {err}");
                }
            }
            UndoOp::SetKey { attr, frame, prev } => {
                if let Some(track) = self.curves.get_mut(attr) {
                    match prev {
                        Some(value) => track.insert(*frame, *value),
                        None => {
                            track.remove(*frame);
                        }
                    }
                }
            }
        }
    }
}
