//! Section parsers for the appearance tables: images, textures, samplers
//! and materials.

use std::path::Path;

use crate::arena::StrArena;
use crate::lex::Cursor;
use crate::types::{AlphaMode, Image, Material, MaterialTexture, Sampler, Texture, Wrap, FILTER_BASE};
use crate::util::{fixed, Error, Result};

/// Parse the `images` array. A record is produced only when a `uri` key is
/// seen; the stored path is the document directory joined with the URI.
/// Other keys (`mimeType`, `name`, `bufferView`) cause no state change.
pub(crate) fn parse_images(
    cur: &mut Cursor,
    dir: &Path,
    strings: &mut StrArena,
    images: &mut Vec<Image>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump();

        if cur.key_is(b"uri") {
            cur.skip_after(b'"');
            let uri = cur.quoted();
            let joined = dir.join(std::str::from_utf8(uri).map_err(|_| Error::NonUtf8)?);
            let path = strings.intern(joined.to_string_lossy().as_bytes());
            images.push(Image { path });
        }
    }
}

/// Parse the `textures` array.
pub(crate) fn parse_textures(
    cur: &mut Cursor,
    strings: &mut StrArena,
    textures: &mut Vec<Texture>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut tex = Texture::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    textures.push(tex);
                    tex = Texture::default();
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

        if cur.key_is(b"sampler") {
            tex.sampler = cur.parse_uint();
        } else if cur.key_is(b"source") {
            tex.source = cur.parse_uint();
        } else if cur.key_is(b"name") {
            cur.skip_after(b'"');
            tex.name = Some(strings.intern(cur.quoted()));
        } else {
            return Err(Error::UnknownTextureField);
        }
    }
}

/// Parse the `samplers` array. Filters are stored rebased by -0x2600; wrap
/// modes map through the fixed GL table.
pub(crate) fn parse_samplers(cur: &mut Cursor, samplers: &mut Vec<Sampler>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut sampler = Sampler::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    samplers.push(sampler);
                    sampler = Sampler::default();
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

        if cur.key_is(b"magFilter") {
            sampler.mag_filter = (cur.parse_uint() - FILTER_BASE) as i16;
        } else if cur.key_is(b"minFilter") {
            sampler.min_filter = (cur.parse_uint() - FILTER_BASE) as i16;
        } else if cur.key_is(b"wrapS") {
            sampler.wrap_s = Wrap::from_gl(cur.parse_uint()).ok_or(Error::Unknown)?;
        } else if cur.key_is(b"wrapT") {
            sampler.wrap_t = Wrap::from_gl(cur.parse_uint()).ok_or(Error::Unknown)?;
        } else {
            return Err(Error::Unknown);
        }
    }
}

/// Parse one material-texture descriptor object.
fn parse_material_texture(cur: &mut Cursor, tex: &mut MaterialTexture) -> Result<()> {
    cur.skip_after(b'{');
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

        if cur.key_is(b"scale") {
            tex.scale = cur.parse_fixed16();
        } else if cur.key_is(b"index") {
            tex.index = cur.parse_uint() as i8;
        } else if cur.key_is(b"texCoord") {
            tex.texcoord = cur.parse_uint() as i8;
        } else if cur.key_is(b"strength") {
            tex.strength = cur.parse_fixed16();
        } else if cur.key_is(b"extensions") {
            cur.skip_balanced(b'{', b'}');
        } else {
            return Err(Error::UnknownMaterialField);
        }
    }
}

fn fresh_material() -> Material {
    let mut mat = Material::default();
    mat.base_color_texture.index = -1;
    mat
}

/// Parse the `materials` array, including the nested
/// `pbrMetallicRoughness` block and the fixed normal/occlusion/emissive
/// texture slots.
pub(crate) fn parse_materials(
    cur: &mut Cursor,
    strings: &mut StrArena,
    materials: &mut Vec<Material>,
) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut mat = fresh_material();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    materials.push(mat);
                    mat = fresh_material();
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

        let mut slot = -1i32;
        if cur.key_is(b"name") {
            cur.skip_after(b'"');
            mat.name = Some(strings.intern(cur.quoted()));
        } else if cur.key_is(b"doubleSided") {
            cur.skip_after(b'"');
            while !cur.at_end() && !cur.peek().is_ascii_lowercase() {
                cur.bump();
            }
            mat.double_sided = cur.peek() == b't';
        } else if cur.key_is(b"pbrMetallicRoug") {
            cur.skip_until(b'{');
            parse_pbr_block(cur, &mut mat)?;
        } else if cur.key_is(b"normalTexture") {
            slot = Material::NORMAL as i32;
        } else if cur.key_is(b"occlusionTextur") {
            slot = Material::OCCLUSION as i32;
        } else if cur.key_is(b"emissiveTexture") {
            slot = Material::EMISSIVE as i32;
        } else if cur.key_is(b"emissiveFactor") {
            mat.emissive_factor[0] = cur.parse_fixed16();
            mat.emissive_factor[1] = cur.parse_fixed16();
            mat.emissive_factor[2] = cur.parse_fixed16();
            cur.skip_after(b']');
        } else if cur.key_is(b"extensions") {
            cur.skip_balanced(b'{', b'}');
        } else if cur.key_is(b"alphaMode") {
            cur.skip_after(b'"');
            mat.alpha_mode = match cur.quoted() {
                b"OPAQUE" => AlphaMode::Opaque,
                b"MASK" => AlphaMode::Mask,
                b"BLEND" => AlphaMode::Blend,
                _ => mat.alpha_mode,
            };
        } else if cur.key_is(b"alphaCutoff") {
            mat.alpha_cutoff = cur.parse_float();
        } else {
            return Err(Error::UnknownMaterialField);
        }

        if slot >= 0 {
            parse_material_texture(cur, &mut mat.textures[slot as usize])?;
        }
    }
}

/// Inner loop of `pbrMetallicRoughness`. Entered at the opening `{`.
fn parse_pbr_block(cur: &mut Cursor, mat: &mut Material) -> Result<()> {
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

        if cur.key_is(b"baseColorTex") {
            parse_material_texture(cur, &mut mat.base_color_texture)?;
        } else if cur.key_is(b"metallicRough") {
            parse_material_texture(cur, &mut mat.metallic_roughness_texture)?;
        } else if cur.key_is(b"baseColorFact") {
            let c = [
                cur.parse_float(),
                cur.parse_float(),
                cur.parse_float(),
                cur.parse_float(),
            ];
            mat.base_color_factor = fixed::pack_rgba8(c);
            cur.skip_after(b']');
        } else if cur.key_is(b"metallicFact") {
            mat.metallic_factor = cur.parse_fixed16();
        } else if cur.key_is(b"roughnessFact") {
            mat.roughness_factor = cur.parse_fixed16();
        } else {
            return Err(Error::UnknownPbrField);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_samplers_section() {
        let doc = br#"samplers": [
            {"magFilter": 9729, "minFilter": 9987, "wrapS": 33071, "wrapT": 10497}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut samplers = Vec::new();
        parse_samplers(&mut cur, &mut samplers).unwrap();

        assert_eq!(samplers.len(), 1);
        assert_eq!(samplers[0].mag_filter, 1); // GL_LINEAR
        assert_eq!(samplers[0].min_filter, (9987 - FILTER_BASE) as i16);
        assert_eq!(samplers[0].wrap_s, Wrap::ClampToEdge);
        assert_eq!(samplers[0].wrap_t, Wrap::Repeat);
    }

    #[test]
    fn test_parse_samplers_bad_wrap() {
        let doc = br#"samplers": [{"wrapS": 1234}]"#;
        let mut cur = Cursor::new(doc);
        let mut samplers = Vec::new();
        assert!(matches!(
            parse_samplers(&mut cur, &mut samplers),
            Err(Error::Unknown)
        ));
    }

    #[test]
    fn test_parse_materials_pbr() {
        let doc = br#"materials": [
            {"name": "gold",
             "doubleSided": true,
             "pbrMetallicRoughness": {
                "baseColorTexture": {"index": 2, "texCoord": 1},
                "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
                "metallicFactor": 0.5,
                "roughnessFactor": 0.25},
             "emissiveFactor": [0.1, 0.2, 0.3],
             "alphaMode": "MASK",
             "alphaCutoff": 0.5}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut materials = Vec::new();
        parse_materials(&mut cur, &mut strings, &mut materials).unwrap();

        assert_eq!(materials.len(), 1);
        let m = &materials[0];
        assert_eq!(strings.get(m.name.unwrap()), "gold");
        assert!(m.double_sided);
        assert_eq!(m.base_color_texture.index, 2);
        assert_eq!(m.base_color_texture.texcoord, 1);
        assert_eq!(m.metallic_factor, 200);
        assert_eq!(m.roughness_factor, 100);
        assert_eq!(m.emissive_factor, [40, 80, 120]);
        assert_eq!(m.alpha_mode, AlphaMode::Mask);
        assert!((m.alpha_cutoff - 0.5).abs() < 1e-6);

        let c = fixed::unpack_rgba8(m.base_color_factor);
        assert!((c[0] - 1.0).abs() <= 1.0 / 255.0);
        assert!((c[1] - 0.5).abs() <= 1.0 / 255.0);
    }

    #[test]
    fn test_parse_material_fixed_texture_slots() {
        let doc = br#"materials": [
            {"normalTexture": {"index": 3, "scale": 0.75},
             "occlusionTexture": {"index": 4, "strength": 0.5},
             "emissiveTexture": {"index": 5}}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut materials = Vec::new();
        parse_materials(&mut cur, &mut strings, &mut materials).unwrap();

        let m = &materials[0];
        assert_eq!(m.textures[Material::NORMAL].index, 3);
        assert_eq!(m.textures[Material::NORMAL].scale, 300);
        assert_eq!(m.textures[Material::OCCLUSION].index, 4);
        assert_eq!(m.textures[Material::OCCLUSION].strength, 200);
        assert_eq!(m.textures[Material::EMISSIVE].index, 5);
        // base color slot untouched keeps its absent marker
        assert_eq!(m.base_color_texture.index, -1);
    }

    #[test]
    fn test_parse_images_joins_dir() {
        let doc = br#"images": [
            {"mimeType": "image/png", "uri": "tex/albedo.png"},
            {"bufferView": 3}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut images = Vec::new();
        parse_images(&mut cur, Path::new("assets/model"), &mut strings, &mut images).unwrap();

        // only the uri record produces an image
        assert_eq!(images.len(), 1);
        let path = strings.get(images[0].path);
        assert!(path.ends_with("albedo.png"));
        assert!(path.starts_with("assets"));
    }

    #[test]
    fn test_parse_textures_section() {
        let doc = br#"textures": [{"sampler": 0, "source": 1, "name": "skin"}]"#;
        let mut cur = Cursor::new(doc);
        let mut strings = StrArena::new(64);
        let mut textures = Vec::new();
        parse_textures(&mut cur, &mut strings, &mut textures).unwrap();

        assert_eq!(textures.len(), 1);
        assert_eq!(textures[0].sampler, 0);
        assert_eq!(textures[0].source, 1);
        assert_eq!(strings.get(textures[0].name.unwrap()), "skin");
    }
}
