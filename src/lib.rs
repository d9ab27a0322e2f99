//! # gltf-scene
//!
//! Single-pass parser for textual glTF scene descriptions. A parse produces
//! a [`SceneBundle`] whose mesh primitives, skins and animation samplers
//! carry offset-resolved spans into the payload buffers instead of opaque
//! accessor indices, so consumers can walk vertex and keyframe data without
//! touching the accessor/bufferView indirection themselves.
//!
//! The tokenizer is handwritten against the glTF schema rather than a
//! general JSON parser: keys dispatch on short prefix windows, strings
//! intern into a bump arena owned by the bundle, and unknown keys inside
//! recognized sections are fatal.
//!
//! ## Modules
//!
//! - [`util`] - Errors, fixed-point scalars, base64
//! - [`lex`] - Cursor primitives over the document text
//! - [`arena`] - Bump arenas for names and integer lists
//! - [`types`] - The resolved scene data model
//!
//! ## Example
//!
//! ```ignore
//! use gltf_scene::parse_gltf;
//!
//! let bundle = parse_gltf("model.gltf", 1.0)?;
//! println!("meshes: {}", bundle.meshes.len());
//! println!("vertices: {}", bundle.total_vertices);
//!
//! for mesh in &bundle.meshes {
//!     for prim in &mesh.primitives {
//!         if let Some(span) = prim.indices.as_ref().and_then(|i| i.span()) {
//!             let raw = bundle.span_bytes(span);
//!             // raw index payload, component type in prim.index_type
//!         }
//!     }
//! }
//! ```

pub mod arena;
mod bundle;
pub mod lex;
mod parse;
mod resolve;
pub mod types;
pub mod util;

pub use bundle::SceneBundle;
pub use types::*;
pub use util::{Error, Result};

use std::path::Path;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bundle::SceneBundle;
    pub use crate::types::*;
    pub use crate::util::{Error, Result};
    pub use crate::{parse_gltf, parse_gltf_source};
}

/// Parse a glTF document from a file.
///
/// Buffer and image URIs resolve against the document's directory; sidecar
/// payloads load eagerly. `scale` multiplies every node scale (and the
/// default scale of nodes without transforms).
///
/// On failure no partial bundle is returned; the error carries the specific
/// kind from the closed taxonomy in [`util::Error`].
pub fn parse_gltf(path: impl AsRef<Path>, scale: f32) -> Result<SceneBundle> {
    let path = path.as_ref();
    let source =
        std::fs::read(path).map_err(|_| Error::FileNotFound(path.to_path_buf()))?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    parse::parse_document(&source, dir, scale)
}

/// Parse a glTF document already in memory. Relative buffer and image URIs
/// resolve against `dir`.
pub fn parse_gltf_source(source: &[u8], dir: impl AsRef<Path>, scale: f32) -> Result<SceneBundle> {
    parse::parse_document(source, dir.as_ref(), scale)
}
