//! Scene data model.
//!
//! Entities come out of the parser with accessor *indices* in their payload
//! fields ([`AccessorRef::Pending`]) and leave the resolution pass carrying
//! offset-resolved [`ByteSpan`]s into the bundle's buffers
//! ([`AccessorRef::Resolved`]). Opaque GL enum values are preserved as
//! rebased passthrough tags rather than decoded.

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::arena::{IntSlice, NameRef};

/// Accessor component tags are stored as `raw - 0x1400` (GL_BYTE becomes 0).
pub const COMPONENT_BASE: i32 = 0x1400;

/// Sampler filter tags are stored as `raw - 0x2600` (GL_NEAREST becomes 0).
pub const FILTER_BASE: i32 = 0x2600;

/// Byte width of one component for a rebased component tag.
#[inline]
pub const fn component_size(component: i32) -> usize {
    match component {
        0 | 1 => 1, // byte, unsigned byte
        2 | 3 => 2, // short, unsigned short
        4 | 5 => 4, // int, unsigned int
        6 => 4,     // float
        _ => 0,
    }
}

/// A contiguous byte payload: an external sidecar file slurped whole, or an
/// inline base64 data URL decoded into a fresh allocation.
#[derive(Debug, Default)]
pub struct Buffer {
    pub data: Vec<u8>,
    pub byte_length: usize,
}

/// Offset-and-length window inside a [`Buffer`]. Dereference table only;
/// views are consumed by resolution and not retained in the bundle.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferView {
    pub buffer: i32,
    pub byte_offset: i32,
    pub byte_length: i32,
    pub byte_stride: i32,
    pub target: i32,
}

/// Typed, offset-bounded view into a [`BufferView`]. Dereference table only.
#[derive(Clone, Copy, Debug, Default)]
pub struct Accessor {
    pub buffer_view: i32,
    pub byte_offset: i32,
    /// Component tag, `raw - 0x1400`.
    pub component_type: i32,
    pub count: i32,
    /// Component-count class: 1, 2, 3, 4 (scalar..vec4) or 16 (mat4).
    pub type_class: i32,
}

/// Resolved span inside one buffer: base offset plus element count, stride
/// and component tags, everything a consumer needs to walk the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteSpan {
    pub buffer: u32,
    pub offset: usize,
    pub len: usize,
    /// Raw view stride; 0 means tightly packed.
    pub stride: usize,
    /// Component tag, `raw - 0x1400`.
    pub component: i32,
    /// Component-count class of each element (1, 2, 3, 4 or 16).
    pub components: i32,
    pub count: u32,
}

/// Payload reference: an accessor index until resolution rewrites it into a
/// span. The dual use is the invariant of the resolution phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessorRef {
    Pending(u32),
    Resolved(ByteSpan),
}

impl Default for AccessorRef {
    fn default() -> Self {
        Self::Pending(0)
    }
}

impl AccessorRef {
    /// The resolved span, if resolution has run.
    #[inline]
    pub fn span(&self) -> Option<&ByteSpan> {
        match self {
            Self::Resolved(s) => Some(s),
            Self::Pending(_) => None,
        }
    }
}

/// Image locator: workdir-joined path into the string arena. Pixels are
/// never decoded here.
#[derive(Clone, Copy, Debug)]
pub struct Image {
    pub path: NameRef,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Texture {
    pub sampler: i32,
    pub source: i32,
    pub name: Option<NameRef>,
}

/// Texture wrap mode, compacted from the GL tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Wrap {
    #[default]
    Repeat = 0,
    ClampToEdge = 1,
    ClampToBorder = 2,
    MirroredRepeat = 3,
}

impl Wrap {
    /// Map a raw GL wrap tag to the compact enum.
    pub const fn from_gl(raw: i32) -> Option<Self> {
        match raw {
            0x2901 => Some(Self::Repeat),
            0x812F => Some(Self::ClampToEdge),
            0x812D => Some(Self::ClampToBorder),
            0x8370 => Some(Self::MirroredRepeat),
            _ => None,
        }
    }
}

/// Texture sampler. Filters keep their GL value rebased by -0x2600, so
/// GL_NEAREST is 0, GL_LINEAR is 1 and the mipmap minification variants land
/// at 256..259.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sampler {
    pub mag_filter: i16,
    pub min_filter: i16,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

/// Texture slot on a material: image index, texcoord set, and fixed-point
/// scale/strength.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialTexture {
    pub scale: i16,
    pub index: i8,
    pub texcoord: i8,
    pub strength: i16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AlphaMode {
    #[default]
    Opaque = 0,
    Mask = 1,
    Blend = 2,
}

/// Material with the PBR metallic-roughness block inline. Scalar factors are
/// 16-bit fixed point (x400); the base-color factor packs to RGBA8.
#[derive(Clone, Copy, Debug, Default)]
pub struct Material {
    pub name: Option<NameRef>,
    pub base_color_texture: MaterialTexture,
    pub metallic_roughness_texture: MaterialTexture,
    /// Little-endian RGBA8.
    pub base_color_factor: u32,
    pub metallic_factor: i16,
    pub roughness_factor: i16,
    /// Fixed-indexed slots: normal, occlusion, emissive.
    pub textures: [MaterialTexture; 3],
    pub emissive_factor: [i16; 3],
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Material {
    pub const NORMAL: usize = 0;
    pub const OCCLUSION: usize = 1;
    pub const EMISSIVE: usize = 2;
}

/// Vertex attribute, in mask-bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Attrib {
    Position = 0,
    Normal = 1,
    TexCoord0 = 2,
    Tangent = 3,
    TexCoord1 = 4,
    Joints = 5,
    Weights = 6,
}

impl Attrib {
    pub const COUNT: usize = 7;

    /// Mask bit for this attribute.
    #[inline]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    pub const fn from_index(i: u32) -> Option<Self> {
        match i {
            0 => Some(Self::Position),
            1 => Some(Self::Normal),
            2 => Some(Self::TexCoord0),
            3 => Some(Self::Tangent),
            4 => Some(Self::TexCoord1),
            5 => Some(Self::Joints),
            6 => Some(Self::Weights),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::TexCoord0 => "TEXCOORD_0",
            Self::Tangent => "TANGENT",
            Self::TexCoord1 => "TEXCOORD_1",
            Self::Joints => "JOINTS_0",
            Self::Weights => "WEIGHTS_0",
        }
    }
}

/// One attribute slot of a primitive: which attribute, and where its data
/// lives (accessor index before resolution, byte span after).
#[derive(Clone, Copy, Debug)]
pub struct AttribSlot {
    pub attrib: Attrib,
    pub data: AccessorRef,
}

/// One drawable submesh: indices plus an ordered set of vertex attributes.
#[derive(Clone, Debug)]
pub struct Primitive {
    /// Present-attribute bitmask (Position=1, Normal=2, TexCoord0=4, ...).
    pub attributes: u32,
    /// Slots ordered by increasing attribute bit, regardless of source order.
    pub slots: SmallVec<[AttribSlot; Attrib::COUNT]>,
    /// Index payload; absent for non-indexed primitives.
    pub indices: Option<AccessorRef>,
    /// Index component tag (`raw - 0x1400`), set by resolution.
    pub index_type: i32,
    /// Primitive topology mode, opaque passthrough.
    pub mode: i32,
    /// Material index, -1 if absent.
    pub material: i32,
    pub num_vertices: u32,
    pub num_indices: u32,
    pub joint_type: i16,
    pub joint_count: i16,
    pub joint_stride: i16,
    pub weight_type: i16,
    pub weight_stride: i16,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            attributes: 0,
            slots: SmallVec::new(),
            indices: None,
            index_type: 0,
            mode: 0,
            material: -1,
            num_vertices: 0,
            num_indices: 0,
            joint_type: 0,
            joint_count: 0,
            joint_stride: 0,
            weight_type: 0,
            weight_stride: 0,
        }
    }
}

impl Primitive {
    /// Dense slot position for an attribute bit: the number of lower mask
    /// bits already present.
    #[inline]
    pub fn slot_index(mask: u32, bit: u32) -> usize {
        (mask & (bit - 1)).count_ones() as usize
    }

    /// Record an attribute's accessor index, keeping slots in bit order even
    /// when the source lists attributes arbitrarily. A repeated attribute
    /// overwrites its slot.
    pub fn set_attrib(&mut self, attrib: Attrib, accessor: u32) {
        let bit = attrib.bit();
        let idx = Self::slot_index(self.attributes, bit);
        let slot = AttribSlot { attrib, data: AccessorRef::Pending(accessor) };
        if self.attributes & bit == 0 {
            self.attributes |= bit;
            self.slots.insert(idx, slot);
        } else {
            self.slots[idx] = slot;
        }
    }

    /// Slot for an attribute, if present.
    pub fn slot(&self, attrib: Attrib) -> Option<&AttribSlot> {
        let bit = attrib.bit();
        if self.attributes & bit == 0 {
            return None;
        }
        self.slots.get(Self::slot_index(self.attributes, bit))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: Option<NameRef>,
    pub primitives: Vec<Primitive>,
}

/// What a node points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeKind {
    #[default]
    Mesh = 0,
    Camera = 1,
}

/// Scene-graph node. `entity` indexes the mesh or camera table per `kind`,
/// -1 when the node carries neither.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    pub name: Option<NameRef>,
    pub kind: NodeKind,
    pub entity: i32,
    pub children: IntSlice,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub skin: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CameraKind {
    #[default]
    Orthographic = 0,
    Perspective = 1,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Camera {
    pub name: Option<NameRef>,
    pub kind: CameraKind,
    pub aspect_ratio: f32,
    pub yfov: f32,
    pub xmag: f32,
    pub ymag: f32,
    pub znear: f32,
    pub zfar: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Scene {
    pub name: Option<NameRef>,
    pub nodes: IntSlice,
}

/// Skin: joint node list plus the inverse-bind-matrix payload (mat4 per
/// joint once resolved).
#[derive(Clone, Copy, Debug)]
pub struct Skin {
    pub name: Option<NameRef>,
    /// Skeleton root node index, -1 if absent.
    pub skeleton: i32,
    pub inverse_bind_matrices: Option<AccessorRef>,
    pub joints: IntSlice,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum TargetPath {
    #[default]
    Translation = 0,
    Rotation = 1,
    Scale = 2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Interpolation {
    #[default]
    Linear = 0,
    Step = 1,
    CubicSpline = 2,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnimChannel {
    pub sampler: i32,
    pub target_node: i32,
    pub target_path: TargetPath,
}

/// Keyframe sampler. After resolution `input` spans `count` float
/// timestamps and `output` spans `count x num_components` floats.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimSampler {
    pub input: AccessorRef,
    pub output: AccessorRef,
    pub interpolation: Interpolation,
    pub count: u32,
    pub num_components: i32,
}

#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub name: Option<NameRef>,
    /// Max over samplers of the last input timestamp.
    pub duration: f32,
    pub channels: Vec<AnimChannel>,
    pub samplers: Vec<AnimSampler>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attrib_bits() {
        assert_eq!(Attrib::Position.bit(), 1);
        assert_eq!(Attrib::Normal.bit(), 2);
        assert_eq!(Attrib::TexCoord0.bit(), 4);
        assert_eq!(Attrib::Tangent.bit(), 8);
        assert_eq!(Attrib::TexCoord1.bit(), 16);
        assert_eq!(Attrib::Joints.bit(), 32);
        assert_eq!(Attrib::Weights.bit(), 64);
    }

    #[test]
    fn test_slot_insertion_orders_by_bit() {
        let mut p = Primitive::default();
        p.set_attrib(Attrib::TexCoord0, 2);
        p.set_attrib(Attrib::Position, 0);
        p.set_attrib(Attrib::Normal, 1);

        let order: Vec<Attrib> = p.slots.iter().map(|s| s.attrib).collect();
        assert_eq!(order, [Attrib::Position, Attrib::Normal, Attrib::TexCoord0]);
        assert_eq!(p.attributes, 0b111);
        assert_eq!(p.slot(Attrib::Normal).unwrap().data, AccessorRef::Pending(1));
    }

    #[test]
    fn test_wrap_table() {
        assert_eq!(Wrap::from_gl(0x2901), Some(Wrap::Repeat));
        assert_eq!(Wrap::from_gl(0x812F), Some(Wrap::ClampToEdge));
        assert_eq!(Wrap::from_gl(0x812D), Some(Wrap::ClampToBorder));
        assert_eq!(Wrap::from_gl(0x8370), Some(Wrap::MirroredRepeat));
        assert_eq!(Wrap::from_gl(0x1234), None);
    }

    #[test]
    fn test_component_sizes() {
        assert_eq!(component_size(0x1403 - COMPONENT_BASE), 2); // unsigned short
        assert_eq!(component_size(0x1406 - COMPONENT_BASE), 4); // float
        assert_eq!(component_size(0x1401 - COMPONENT_BASE), 1); // unsigned byte
        assert_eq!(component_size(99), 0);
    }
}
