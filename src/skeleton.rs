use cgmath::Rotation;

use crate::rotation::{identity, RotationOrder};
use crate::types::*;

/////////////////////////////////////////////////////////////////////////////////////////////////

/// A node of the hierarchy. End Sites are nodes too, but carry no channels and no frames.
#[derive(Debug, Clone)]
pub struct Bone {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) index: Index,
    pub(crate) parent: Option<Index>,
    pub(crate) children: Vec<Index>,
    pub(crate) depth: Depth,
    pub(crate) offset: Position,
    pub(crate) channels: Vec<ChannelKind>,
    pub(crate) frames: Vec<Keyframe>,
}

impl Bone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_end_site(&self) -> bool {
        self.kind == NodeKind::EndSite
    }

    /// Position of this node in pre-order, i.e. its index in [`Skeleton::nodes`].
    pub fn index(&self) -> Index {
        self.index
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn children(&self) -> &[Index] {
        &self.children
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// Rest offset from the parent joint.
    pub fn offset(&self) -> Position {
        self.offset
    }

    pub fn channels(&self) -> &[ChannelKind] {
        &self.channels
    }

    pub fn frames(&self) -> &[Keyframe] {
        &self.frames
    }

    pub fn keyframe_at(&self, index: usize) -> Option<&Keyframe> {
        self.frames.get(index)
    }

    /// Euler order of this bone's rotation channels, if it has exactly one of each axis.
    pub fn rotation_order(&self) -> Option<RotationOrder> {
        let axes: Vec<Axis> = self
            .channels
            .iter()
            .filter(|c| c.is_rotation())
            .map(|c| c.axis())
            .collect();
        match axes.as_slice() {
            &[a, b, c] => RotationOrder::from_axes([a, b, c]),
            _ => None,
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////////////////////

/// What the playback cursor does after the last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapPolicy {
    /// loop back to frame 0
    #[default]
    ToFirst,
    /// loop back to frame 1, for clips whose frame 0 is a rest pose
    SkipFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackOptions {
    pub wrap: WrapPolicy,
}

/// A parsed clip plus its playback cursor.
#[derive(Debug, Clone)]
pub struct Skeleton {
    nodes: Vec<Bone>,
    animated: Vec<Index>,
    frame_count: usize,
    frame_time: f64,

    playback: PlaybackOptions,
    current_frame: usize,
    last_advance_time: f64,
}

impl Skeleton {
    pub(crate) fn new(nodes: Vec<Bone>, frame_count: usize, frame_time: f64) -> Self {
        let animated = nodes
            .iter()
            .filter(|node| !node.is_end_site())
            .map(|node| node.index)
            .collect();
        Skeleton {
            nodes,
            animated,
            frame_count,
            frame_time,
            playback: PlaybackOptions::default(),
            current_frame: 0,
            last_advance_time: 0.0,
        }
    }

    pub fn with_playback(mut self, options: PlaybackOptions) -> Self {
        self.playback = options;
        self
    }

    pub fn playback_options(&self) -> PlaybackOptions {
        self.playback
    }

    ////////////////////////////////////////////// clip ///////////////////////////////////////////

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Seconds per frame as declared in the file.
    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn fps(&self) -> f64 {
        1.0 / self.frame_time
    }

    pub fn duration(&self) -> f64 {
        self.frame_count as f64 * self.frame_time
    }

    pub fn root(&self) -> &Bone {
        &self.nodes[0]
    }

    /// Every node of the hierarchy in pre-order, End Sites included.
    pub fn nodes(&self) -> &[Bone] {
        &self.nodes
    }

    /// ROOT and JOINT nodes in pre-order; each has exactly `frame_count` keyframes.
    pub fn bones(&self) -> impl ExactSizeIterator<Item = &Bone> + '_ {
        self.animated.iter().map(|&index| &self.nodes[index])
    }

    pub fn bone(&self, index: Index) -> Option<&Bone> {
        self.nodes.get(index)
    }

    pub fn find_bone(&self, name: &str) -> Option<&Bone> {
        self.bones().find(|bone| bone.name == name)
    }

    //////////////////////////////////////////// playback /////////////////////////////////////////

    pub fn current_frame_index(&self) -> usize {
        self.current_frame
    }

    /// Step the cursor by one frame if more than `frame_time` has passed since the last step.
    ///
    /// `now` is seconds since playback started. At most one frame is advanced per call no
    /// matter how much time has elapsed.
    pub fn advance(&mut self, now: f64) {
        if self.frame_count == 0 || !(now > self.last_advance_time + self.frame_time) {
            return;
        }
        let last = self.frame_count - 1;
        self.current_frame = if self.current_frame < last {
            self.current_frame + 1
        } else {
            match self.playback.wrap {
                WrapPolicy::ToFirst => 0,
                WrapPolicy::SkipFirst => last.min(1),
            }
        };
        self.last_advance_time = now;
        log::trace!("advanced to frame {} at {:.4}s", self.current_frame, now);
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.last_advance_time = 0.0;
    }

    /// Keyframe at the cursor for every animated bone, in [`bones`](Self::bones) order.
    pub fn current_keyframes(&self) -> impl Iterator<Item = (&Bone, &Keyframe)> + '_ {
        let frame = self.current_frame;
        self.bones()
            .filter_map(move |bone| bone.keyframe_at(frame).map(|key| (bone, key)))
    }

    ///////////////////////////////////////////// posing //////////////////////////////////////////

    /// Model-space transform of every node at `frame` (forward kinematics), indexed like
    /// [`nodes`](Self::nodes).
    pub fn global_pose(&self, frame: usize) -> Option<Vec<Transform>> {
        if frame >= self.frame_count {
            return None;
        }
        let mut globals: Vec<Transform> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = match node.keyframe_at(frame) {
                Some(key) => Transform {
                    scale: 1.0,
                    rot: key.rotation,
                    disp: node.offset + key.position,
                },
                None => Transform {
                    scale: 1.0,
                    rot: identity(),
                    disp: node.offset,
                },
            };
            // parents always precede their children in pre-order
            let global = match node.parent {
                Some(parent) => concat(&globals[parent], &local),
                None => local,
            };
            globals.push(global);
        }
        Some(globals)
    }

    /// Runs of connected nodes, suitable for drawing as line strips. A new chain starts
    /// whenever a node is not a child of the previous one; such chains begin with the parent
    /// they hang from.
    pub fn kinematic_chains(&self) -> Vec<Vec<Index>> {
        let mut chains: Vec<Vec<Index>> = Vec::new();
        let mut chain: Vec<Index> = Vec::new();
        for node in &self.nodes {
            let continues = match (chain.last(), node.parent) {
                (Some(&previous), Some(parent)) => previous == parent,
                _ => false,
            };
            if !continues && !chain.is_empty() {
                chains.push(std::mem::take(&mut chain));
            }
            if chain.is_empty() {
                if let Some(parent) = node.parent {
                    chain.push(parent);
                }
            }
            chain.push(node.index);
        }
        if !chain.is_empty() {
            chains.push(chain);
        }
        chains
    }
}

fn concat(parent: &Transform, local: &Transform) -> Transform {
    Transform {
        scale: 1.0,
        rot: parent.rot * local.rot,
        disp: parent.disp + parent.rot.rotate_vector(local.disp),
    }
}
