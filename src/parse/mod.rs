//! Top-level document walk.
//!
//! The entry loop scans for top-level keys and hands each recognized section
//! to its parser; the machine is ScanningTopKey -> DispatchingSection and
//! back, ending at end-of-document or on the first section error. `asset`
//! and the extension lists are skipped wholesale; any other unrecognized
//! top-level key is fatal.

mod anim;
mod appearance;
mod geometry;
mod mesh;
mod scene;

use std::path::Path;

use crate::arena::{IntArena, IntSlice, StrArena};
use crate::bundle::SceneBundle;
use crate::lex::Cursor;
use crate::resolve;
use crate::util::{Error, Result};

/// Read a flat integer array (`[1, 2, 3]`) into the integer arena.
///
/// Two passes: the first counts elements up to the closing bracket (a
/// digit-free array has zero), the second fills the reserved slice. The
/// cursor ends past the closing bracket.
pub(crate) fn parse_int_array(cur: &mut Cursor, ints: &mut IntArena) -> IntSlice {
    cur.skip_after(b'[');

    let mut probe = *cur;
    let mut commas = 0usize;
    let mut any_digit = false;
    loop {
        if probe.at_end() || probe.peek() == b']' {
            break;
        }
        match probe.peek() {
            b',' => commas += 1,
            c if c.is_ascii_digit() => any_digit = true,
            _ => {}
        }
        probe.bump();
    }
    let count = if any_digit { commas + 1 } else { 0 };

    let slice = ints.alloc(count);
    for v in ints.get_mut(slice).iter_mut() {
        *v = cur.parse_uint();
    }
    cur.skip_after(b']');
    slice
}

/// Walk a whole document and produce a resolved bundle.
///
/// `dir` is the directory buffer and image URIs resolve against; `scale` is
/// the document-wide scale factor applied to node transforms.
pub(crate) fn parse_document(source: &[u8], dir: &Path, scale: f32) -> Result<SceneBundle> {
    if std::str::from_utf8(source).is_err() {
        return Err(Error::NonUtf8);
    }

    let mut strings = StrArena::new(2048);
    let mut ints = IntArena::new(512);
    let mut tables = resolve::Tables::default();

    let mut buffers = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();
    let mut images = Vec::new();
    let mut samplers = Vec::new();
    let mut cameras = Vec::new();
    let mut scenes = Vec::new();
    let mut skins = Vec::new();
    let mut animations = Vec::new();
    let mut default_scene = 0;

    let mut cur = Cursor::new(source);
    loop {
        cur.skip_until(b'"');
        if cur.at_end() {
            break;
        }
        cur.bump();

        if cur.key_is(b"accessors") {
            geometry::parse_accessors(&mut cur, &mut tables.accessors)?;
        } else if cur.key_is(b"scenes") {
            scene::parse_scenes(&mut cur, &mut strings, &mut ints, &mut scenes)?;
        } else if cur.key_is(b"scene") {
            default_scene = cur.parse_uint();
        } else if cur.key_is(b"bufferViews") {
            geometry::parse_buffer_views(&mut cur, &mut tables.buffer_views)?;
        } else if cur.key_is(b"buffers") {
            geometry::parse_buffers(&mut cur, dir, &mut buffers)?;
        } else if cur.key_is(b"images") {
            appearance::parse_images(&mut cur, dir, &mut strings, &mut images)?;
        } else if cur.key_is(b"textures") {
            appearance::parse_textures(&mut cur, &mut strings, &mut textures)?;
        } else if cur.key_is(b"meshes") {
            mesh::parse_meshes(&mut cur, &mut strings, &mut meshes)?;
        } else if cur.key_is(b"materials") {
            appearance::parse_materials(&mut cur, &mut strings, &mut materials)?;
        } else if cur.key_is(b"nodes") {
            scene::parse_nodes(&mut cur, &mut strings, &mut ints, scale, &mut nodes)?;
        } else if cur.key_is(b"samplers") {
            appearance::parse_samplers(&mut cur, &mut samplers)?;
        } else if cur.key_is(b"cameras") {
            scene::parse_cameras(&mut cur, &mut strings, &mut cameras)?;
        } else if cur.key_is(b"skins") {
            anim::parse_skins(&mut cur, &mut strings, &mut ints, &mut skins)?;
        } else if cur.key_is(b"animations") {
            anim::parse_animations(&mut cur, &mut strings, &mut animations)?;
        } else if cur.key_is(b"asset") {
            // generator metadata, nothing the bundle needs
            cur.skip_balanced(b'{', b'}');
        } else if cur.key_is(b"extensionsUsed") || cur.key_is(b"extensionsRequ") {
            cur.skip_balanced(b'[', b']');
        } else {
            return Err(Error::UnknownDescriptor);
        }
    }

    resolve::resolve(&mut meshes, &mut skins, &mut animations, &buffers, &tables)?;
    let (total_vertices, total_indices) = resolve::totals(&meshes);

    Ok(SceneBundle {
        meshes,
        nodes,
        materials,
        textures,
        images,
        samplers,
        cameras,
        scenes,
        skins,
        animations,
        buffers,
        default_scene,
        total_vertices,
        total_indices,
        scale,
        strings,
        ints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_array_counts() {
        let mut ints = IntArena::new(16);

        let mut cur = Cursor::new(b": [3, 1, 4, 1, 5], tail");
        let s = parse_int_array(&mut cur, &mut ints);
        assert_eq!(ints.get(s), &[3, 1, 4, 1, 5]);
        assert!(cur.starts_with(b", tail"));

        let mut cur = Cursor::new(b": [42]");
        let s = parse_int_array(&mut cur, &mut ints);
        assert_eq!(ints.get(s), &[42]);
    }

    #[test]
    fn test_parse_int_array_empty() {
        let mut ints = IntArena::new(16);
        let mut cur = Cursor::new(b": [], tail");
        let s = parse_int_array(&mut cur, &mut ints);
        assert!(s.is_empty());
        assert!(cur.starts_with(b", tail"));
    }

    #[test]
    fn test_unknown_descriptor() {
        let err = parse_document(br#"{"frobnicate": []}"#, Path::new(""), 1.0).unwrap_err();
        assert!(matches!(err, Error::UnknownDescriptor));
    }

    #[test]
    fn test_skipped_sections() {
        let doc = br#"{
            "asset": {"generator": "test", "version": "2.0"},
            "extensionsUsed": ["KHR_lights"],
            "scene": 0,
            "scenes": [{"nodes": []}]
        }"#;
        let bundle = parse_document(doc, Path::new(""), 1.0).unwrap();
        assert_eq!(bundle.default_scene, 0);
        assert_eq!(bundle.scenes.len(), 1);
    }
}
