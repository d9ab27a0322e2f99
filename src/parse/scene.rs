//! Section parsers for the scene graph: nodes, cameras and scenes.

use glam::{Mat4, Quat, Vec3};

use crate::arena::{IntArena, IntSlice, StrArena};
use crate::lex::Cursor;
use crate::types::{Camera, CameraKind, Node, NodeKind, Scene};
use crate::util::{Error, Result};

use super::parse_int_array;

fn fresh_node(scale: f32) -> Node {
    Node {
        name: None,
        kind: NodeKind::Mesh,
        entity: -1,
        children: IntSlice::EMPTY,
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(scale),
        skin: -1,
    }
}

/// Parse the `nodes` array. The document-wide scale multiplies every node
/// scale, including the default when no transform key is present.
pub(crate) fn parse_nodes(
    cur: &mut Cursor,
    strings: &mut StrArena,
    ints: &mut IntArena,
    scale: f32,
    nodes: &mut Vec<Node>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut node = fresh_node(scale);
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    nodes.push(node);
                    node = fresh_node(scale);
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        if cur.key_is(b"mesh") {
            node.kind = NodeKind::Mesh;
            node.entity = cur.parse_uint();
        } else if cur.key_is(b"camera") {
            node.kind = NodeKind::Camera;
            node.entity = cur.parse_uint();
        } else if cur.key_is(b"children") {
            node.children = parse_int_array(cur, ints);
        } else if cur.key_is(b"matrix") {
            let mut m = [0.0f32; 16];
            for v in m.iter_mut() {
                *v = cur.parse_float();
            }
            cur.skip_after(b']');
            let (s, r, t) = Mat4::from_cols_array(&m).to_scale_rotation_translation();
            node.translation = t;
            node.rotation = r;
            node.scale = s * scale;
        } else if cur.key_is(b"translation") {
            node.translation = Vec3::new(cur.parse_float(), cur.parse_float(), cur.parse_float());
            cur.skip_after(b']');
        } else if cur.key_is(b"rotation") {
            node.rotation = Quat::from_xyzw(
                cur.parse_float(),
                cur.parse_float(),
                cur.parse_float(),
                cur.parse_float(),
            );
            cur.skip_after(b']');
        } else if cur.key_is(b"scale") {
            node.scale = Vec3::new(cur.parse_float(), cur.parse_float(), cur.parse_float()) * scale;
            cur.skip_after(b']');
        } else if cur.key_is(b"name") {
            cur.skip_after(b'"');
            node.name = Some(strings.intern(cur.quoted()));
        } else if cur.key_is(b"skin") {
            node.skin = cur.parse_uint();
        } else {
            return Err(Error::UnknownNodeField);
        }
    }
}

/// Parse the `cameras` array: name, type, and the embedded projection block.
pub(crate) fn parse_cameras(
    cur: &mut Cursor,
    strings: &mut StrArena,
    cameras: &mut Vec<Camera>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut cam = Camera::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    cameras.push(cam);
                    cam = Camera::default();
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }

        let key = cur.quoted();
        if key == b"name" {
            cam.name = Some(strings.intern(cur.quoted()));
            continue;
        }
        if key == b"type" {
            cam.kind = if cur.quoted().first() == Some(&b'p') {
                CameraKind::Perspective
            } else {
                CameraKind::Orthographic
            };
            continue;
        }
        if key != b"orthographic" && key != b"perspective" {
            return Err(Error::UnknownCameraField);
        }

        // projection properties
        'projection: loop {
            loop {
                if cur.at_end() {
                    return Ok(());
                }
                match cur.peek() {
                    b'"' => break,
                    b'}' => {
                        cur.bump();
                        break 'projection;
                    }
                    _ => cur.bump(),
                }
            }
            cur.bump();

            if cur.key_is(b"zfar") {
                cam.zfar = cur.parse_float();
            } else if cur.key_is(b"znear") {
                cam.znear = cur.parse_float();
            } else if cur.key_is(b"aspectRatio") {
                cam.aspect_ratio = cur.parse_float();
            } else if cur.key_is(b"yfov") {
                cam.yfov = cur.parse_float();
            } else if cur.key_is(b"xmag") {
                cam.xmag = cur.parse_float();
            } else if cur.key_is(b"ymag") {
                cam.ymag = cur.parse_float();
            } else {
                return Err(Error::UnknownCameraField);
            }
        }
    }
}

/// Parse the `scenes` array: each scene is a name plus root node indices.
/// Unrecognized keys are skipped over by the key scan.
pub(crate) fn parse_scenes(
    cur: &mut Cursor,
    strings: &mut StrArena,
    ints: &mut IntArena,
    scenes: &mut Vec<Scene>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut scene = Scene::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    scenes.push(scene);
                    scene = Scene::default();
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        if cur.key_is(b"nodes") {
            scene.nodes = parse_int_array(cur, ints);
        } else if cur.key_is(b"name") {
            cur.skip_after(b'"');
            scene.name = Some(strings.intern(cur.quoted()));
        }
    }
}
