//! The resolved output aggregate.

use crate::arena::{IntArena, IntSlice, NameRef, StrArena};
use crate::types::{
    Animation, Buffer, ByteSpan, Camera, Image, Material, Mesh, Node, Sampler, Scene, Skin,
    Texture,
};

/// Everything a document parses into, owned in one place: entity tables, the
/// payload buffers the resolved spans point into, and the two arenas backing
/// names and integer lists. Dropping the bundle releases all of it.
#[derive(Debug)]
pub struct SceneBundle {
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<Image>,
    pub samplers: Vec<Sampler>,
    pub cameras: Vec<Camera>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
    pub buffers: Vec<Buffer>,

    /// Index of the document's default scene.
    pub default_scene: i32,
    pub total_vertices: u32,
    pub total_indices: u32,
    /// Scale factor the document was parsed with.
    pub scale: f32,

    pub(crate) strings: StrArena,
    pub(crate) ints: IntArena,
}

impl SceneBundle {
    /// Resolve an optional interned name, empty string when absent.
    pub fn name(&self, r: Option<NameRef>) -> &str {
        r.map(|r| self.strings.get(r)).unwrap_or("")
    }

    /// Resolve an image's interned filesystem path.
    pub fn image_path(&self, image: &Image) -> &str {
        self.strings.get(image.path)
    }

    /// Resolve an arena-backed integer list (node children, scene roots,
    /// skin joints).
    pub fn ints(&self, s: IntSlice) -> &[i32] {
        self.ints.get(s)
    }

    /// The bytes a resolved span covers. Empty if the payload buffers have
    /// been released.
    pub fn span_bytes(&self, span: &ByteSpan) -> &[u8] {
        self.buffers
            .get(span.buffer as usize)
            .and_then(|b| b.data.get(span.offset..span.offset + span.len))
            .unwrap_or(&[])
    }

    /// Little-endian float at scalar element `i` of a tightly packed span.
    pub fn span_f32(&self, span: &ByteSpan, i: u32) -> f32 {
        let bytes = self.span_bytes(span);
        let start = i as usize * 4;
        bytes
            .get(start..start + 4)
            .map_or(0.0, |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read one plain-old-data value at a byte offset inside a span, without
    /// alignment requirements. Payloads are little-endian per the format.
    pub fn span_read<T: bytemuck::AnyBitPattern>(
        &self,
        span: &ByteSpan,
        byte_offset: usize,
    ) -> Option<T> {
        let bytes = self.span_bytes(span);
        bytes
            .get(byte_offset..byte_offset + std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }

    /// Release the payload byte blobs while keeping the parsed entity
    /// tables, for callers that have copied every referenced payload into
    /// their own vertex storage.
    pub fn release_buffers(&mut self) {
        self.buffers.clear();
    }
}
