//! Section parser for meshes: the primitive list and its attribute sets.

use crate::arena::StrArena;
use crate::lex::Cursor;
use crate::types::{AccessorRef, Attrib, Mesh, Primitive};
use crate::util::{Error, Result};

/// Parse one `attributes` object, setting mask bits and filling slots in
/// attribute-bit order.
fn parse_attributes(cur: &mut Cursor, prim: &mut Primitive) -> Result<()> {
    cur.skip_after(b'"'); // rest of the "attributes" key
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        let attrib = if cur.key_is(b"POSITION") {
            Attrib::Position
        } else if cur.key_is(b"NORMAL") {
            Attrib::Normal
        } else if cur.key_is(b"TEXCOORD_0") {
            Attrib::TexCoord0
        } else if cur.key_is(b"TANGENT") {
            Attrib::Tangent
        } else if cur.key_is(b"TEXCOORD_1") {
            Attrib::TexCoord1
        } else if cur.key_is(b"JOINTS_0") {
            Attrib::Joints
        } else if cur.key_is(b"WEIGHTS_0") {
            Attrib::Weights
        } else if cur.key_is(b"TEXCOORD_") {
            // no more than two texture coordinate sets
            cur.skip_after(b'"');
            continue;
        } else {
            return Err(Error::UnknownAttrib);
        };

        cur.skip_after(b'"');
        let accessor = cur.parse_uint();
        prim.set_attrib(attrib, accessor.max(0) as u32);
    }
}

/// Parse the `meshes` array: each mesh is a name plus a primitive list.
pub(crate) fn parse_meshes(
    cur: &mut Cursor,
    strings: &mut StrArena,
    meshes: &mut Vec<Mesh>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut mesh = Mesh::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    meshes.push(std::mem::take(&mut mesh));
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
            mesh.name = Some(strings.intern(cur.quoted()));
            continue;
        } else if key != b"primitives" {
            return Err(Error::UnknownMeshField);
        }

        let mut prim = Primitive::default();
        'primitives: loop {
            loop {
                if cur.at_end() {
                    return Ok(());
                }
                match cur.peek() {
                    b'"' => break,
                    b'}' => {
                        mesh.primitives.push(std::mem::take(&mut prim));
                        cur.bump();
                    }
                    b']' => {
                        cur.bump();
                        break 'primitives;
                    }
                    _ => cur.bump(),
                }
            }
            cur.bump();

            if cur.key_is(b"attributes") {
                parse_attributes(cur, &mut prim)?;
            } else if cur.key_is(b"indices") {
                prim.indices = Some(AccessorRef::Pending(cur.parse_uint().max(0) as u32));
            } else if cur.key_is(b"mode") {
                prim.mode = cur.parse_uint();
            } else if cur.key_is(b"material") {
                prim.material = cur.parse_uint();
            } else {
                return Err(Error::UnknownPrimitiveField);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mesh_basic() {
        let doc = br#"meshes": [
            {"name": "quad",
             "primitives": [
                {"attributes": {"POSITION": 0, "NORMAL": 1},
                 "indices": 2, "mode": 4, "material": 0}
             ]}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        parse_meshes(&mut cur, &mut strings, &mut meshes).unwrap();

        assert_eq!(meshes.len(), 1);
        assert_eq!(strings.get(meshes[0].name.unwrap()), "quad");
        assert_eq!(meshes[0].primitives.len(), 1);

        let p = &meshes[0].primitives[0];
        assert_eq!(p.attributes, Attrib::Position.bit() | Attrib::Normal.bit());
        assert_eq!(p.indices, Some(AccessorRef::Pending(2)));
        assert_eq!(p.mode, 4);
        assert_eq!(p.material, 0);
    }

    #[test]
    fn test_parse_mesh_name_after_primitives() {
        let doc = br#"meshes": [
            {"primitives": [{"attributes": {"POSITION": 0}}], "name": "late"}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        parse_meshes(&mut cur, &mut strings, &mut meshes).unwrap();

        assert_eq!(meshes.len(), 1);
        assert_eq!(strings.get(meshes[0].name.unwrap()), "late");
    }

    #[test]
    fn test_attributes_scrambled_order() {
        let doc = br#"meshes": [
            {"primitives": [
                {"attributes": {"TEXCOORD_0": 5, "WEIGHTS_0": 9, "POSITION": 3, "JOINTS_0": 8, "NORMAL": 4}}
            ]}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        parse_meshes(&mut cur, &mut strings, &mut meshes).unwrap();

        let p = &meshes[0].primitives[0];
        let order: Vec<(Attrib, AccessorRef)> =
            p.slots.iter().map(|s| (s.attrib, s.data)).collect();
        assert_eq!(
            order,
            [
                (Attrib::Position, AccessorRef::Pending(3)),
                (Attrib::Normal, AccessorRef::Pending(4)),
                (Attrib::TexCoord0, AccessorRef::Pending(5)),
                (Attrib::Joints, AccessorRef::Pending(8)),
                (Attrib::Weights, AccessorRef::Pending(9)),
            ]
        );
    }

    #[test]
    fn test_attributes_extra_texcoord_ignored() {
        let doc = br#"meshes": [
            {"primitives": [{"attributes": {"POSITION": 0, "TEXCOORD_2": 7}}]}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        parse_meshes(&mut cur, &mut strings, &mut meshes).unwrap();

        let p = &meshes[0].primitives[0];
        assert_eq!(p.attributes, Attrib::Position.bit());
        assert_eq!(p.slots.len(), 1);
    }

    #[test]
    fn test_unknown_attribute_is_fatal() {
        let doc = br#"meshes": [{"primitives": [{"attributes": {"COLOR_0": 1}}]}]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        assert!(matches!(
            parse_meshes(&mut cur, &mut strings, &mut meshes),
            Err(Error::UnknownAttrib)
        ));
    }

    #[test]
    fn test_non_indexed_primitive() {
        let doc = br#"meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "mode": 4}]}]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut meshes = Vec::new();
        parse_meshes(&mut cur, &mut strings, &mut meshes).unwrap();

        let p = &meshes[0].primitives[0];
        assert_eq!(p.indices, None);
        assert_eq!(p.material, -1);
    }
}
