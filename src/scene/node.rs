//! Scene nodes
//!
//! A node carries a relative (parent-space) transform and a derived absolute
//! (world-space) transform. The absolute transform is only trustworthy while
//! `dirty` is false; all transform reads go through [`Scene`](super::Scene),
//! which resolves stale nodes before answering.

use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use super::handle::{NodeHandle, NodeId};
use super::model::Model;
use crate::math::{self, Aabb};

/// Decomposed local transform; rotation is YXZ Euler degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    /// Translation relative to the parent
    pub position: Vec3,
    /// Euler rotation in degrees
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Who currently owns a node. Exactly one owner at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Waiting in the scene's pending-add queue
    PendingAdd,
    /// Top-level entry of the scene's live list
    Live,
    /// Held in the children list of another node
    Parent(NodeHandle),
}

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraLens {
    /// Vertical field of view in degrees
    pub fov_y: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl CameraLens {
    /// Right-handed perspective projection for an aspect ratio
    #[must_use]
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), aspect.max(f32::EPSILON), self.near, self.far)
    }
}

impl Default for CameraLens {
    fn default() -> Self {
        Self {
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Light emitted from the node's world position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// Light color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Particle spawn bookkeeping. The particle simulation itself lives elsewhere;
/// the node only tracks how many particles are due.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterState {
    /// Particles per second
    pub spawn_rate: f32,
    /// Whether the emitter accumulates
    pub active: bool,
    accumulator: f32,
}

impl EmitterState {
    /// Create an active emitter
    #[must_use]
    pub const fn new(spawn_rate: f32) -> Self {
        Self {
            spawn_rate,
            active: true,
            accumulator: 0.0,
        }
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        if self.active {
            self.accumulator += self.spawn_rate * dt;
        }
    }

    /// Drain whole particles that are due
    pub fn take(&mut self) -> u32 {
        let whole = self.accumulator.floor().max(0.0);
        self.accumulator -= whole;
        whole as u32
    }

    /// Fractional particles carried into the next frame
    #[must_use]
    pub const fn pending(&self) -> f32 {
        self.accumulator
    }
}

impl Default for EmitterState {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain transform group
    Group,
    /// Renderable meshes and materials
    Model(Model),
    /// Viewpoint
    Camera(CameraLens),
    /// Light source
    Light(LightSource),
    /// Particle emitter
    Emitter(EmitterState),
}

impl NodeKind {
    /// Short name for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Model(_) => "model",
            Self::Camera(_) => "camera",
            Self::Light(_) => "light",
            Self::Emitter(_) => "emitter",
        }
    }

    /// Per-frame hook. Only emitters do anything at this layer.
    pub(crate) fn update(&mut self, dt: f32) {
        if let Self::Emitter(emitter) = self {
            emitter.advance(dt);
        }
    }
}

/// A scene graph node
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) attachment: String,
    pub(crate) sort_key: f32,
    pub(crate) kind: NodeKind,

    pub(crate) rel: Mat4,
    pub(crate) abs: Mat4,
    pub(crate) dirty: bool,
    pub(crate) transformed: bool,

    pub(crate) cache: Trs,
    pub(crate) cache_valid: bool,

    pub(crate) bounds: Aabb,
    pub(crate) owner: Owner,
    pub(crate) children: SmallVec<[NodeHandle; 8]>,
}

impl Node {
    /// Create a group node at the origin
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_transform(name, Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }

    /// Create a group node from translation, Euler degrees and scale
    #[must_use]
    pub fn with_transform(name: impl Into<String>, translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            attachment: String::new(),
            sort_key: 0.0,
            kind: NodeKind::Group,
            rel: math::compose(translation, rotation, scale),
            abs: Mat4::IDENTITY,
            dirty: true,
            transformed: true,
            cache: Trs::default(),
            cache_valid: false,
            bounds: Aabb::empty(),
            owner: Owner::PendingAdd,
            children: SmallVec::new(),
        }
    }

    /// Create a group node from translation and scale
    #[must_use]
    pub fn with_translation_scale(name: impl Into<String>, translation: Vec3, scale: Vec3) -> Self {
        Self::with_transform(name, translation, Vec3::ZERO, scale)
    }

    /// Replace the node kind
    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Create an empty model node
    #[must_use]
    pub fn model(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(NodeKind::Model(Model::new()))
    }

    /// Create a camera node
    #[must_use]
    pub fn camera(name: impl Into<String>, lens: CameraLens) -> Self {
        Self::new(name).with_kind(NodeKind::Camera(lens))
    }

    /// Create a light node
    #[must_use]
    pub fn light(name: impl Into<String>, light: LightSource) -> Self {
        Self::new(name).with_kind(NodeKind::Light(light))
    }

    /// Create a particle emitter node
    #[must_use]
    pub fn emitter(name: impl Into<String>, spawn_rate: f32) -> Self {
        Self::new(name).with_kind(NodeKind::Emitter(EmitterState::new(spawn_rate)))
    }

    /// Process-unique identifier
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Node name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Free-form user data
    #[must_use]
    pub fn attachment(&self) -> &str {
        &self.attachment
    }

    /// Replace the user data
    pub fn set_attachment(&mut self, attachment: impl Into<String>) {
        self.attachment = attachment.into();
    }

    /// Render sort key
    #[must_use]
    pub const fn sort_key(&self) -> f32 {
        self.sort_key
    }

    /// Set the render sort key
    pub fn set_sort_key(&mut self, key: f32) {
        self.sort_key = key;
    }

    /// Node kind and its payload
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Mutable node kind payload
    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Model payload, if this is a model node
    #[must_use]
    pub const fn as_model(&self) -> Option<&Model> {
        match &self.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Mutable model payload, if this is a model node
    pub fn as_model_mut(&mut self) -> Option<&mut Model> {
        match &mut self.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Whether the absolute transform may be stale
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the transform changed since the flag was last taken
    #[must_use]
    pub const fn is_transformed(&self) -> bool {
        self.transformed
    }

    /// Relative transform as last written
    #[must_use]
    pub const fn rel_transform(&self) -> &Mat4 {
        &self.rel
    }

    /// Absolute transform as last resolved. Stale while [`is_dirty`](Self::is_dirty).
    #[must_use]
    pub const fn abs_transform(&self) -> &Mat4 {
        &self.abs
    }

    /// World-space bounds, maintained for model nodes
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Current owner
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Parent node, if owned by another node
    #[must_use]
    pub const fn parent(&self) -> Option<NodeHandle> {
        match self.owner {
            Owner::Parent(parent) => Some(parent),
            Owner::PendingAdd | Owner::Live => None,
        }
    }

    /// Owned children in insertion order
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}
