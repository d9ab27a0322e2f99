//! Post-parse resolution: accessor-index chains become byte spans.
//!
//! After every section is parsed, mesh primitives, skins and animation
//! samplers still carry accessor indices ([`AccessorRef::Pending`]). This
//! pass dereferences accessor -> bufferView -> buffer for each of them and
//! rewrites the field into an offset-resolved [`ByteSpan`], checking that
//! every span stays inside its buffer's owned byte range.

use crate::types::{
    component_size, Accessor, AccessorRef, Animation, Attrib, Buffer, BufferView, ByteSpan, Mesh,
    Skin,
};
use crate::util::{Error, Result};

/// Parse-time dereference tables. Consumed by resolution; not part of the
/// output bundle.
#[derive(Default)]
pub(crate) struct Tables {
    pub accessors: Vec<Accessor>,
    pub buffer_views: Vec<BufferView>,
}

/// Dereference one accessor index into a bounds-checked span.
fn resolve_accessor(index: u32, tables: &Tables, buffers: &[Buffer]) -> Result<ByteSpan> {
    let oor = Error::AccessorOutOfRange { accessor: index };

    let Some(acc) = tables.accessors.get(index as usize) else {
        return Err(oor);
    };
    let Some(view) = tables.buffer_views.get(acc.buffer_view.max(0) as usize) else {
        return Err(oor);
    };
    let Some(buffer) = buffers.get(view.buffer.max(0) as usize) else {
        return Err(oor);
    };

    let offset = view.byte_offset.max(0) as usize + acc.byte_offset.max(0) as usize;
    let elem = component_size(acc.component_type) * acc.type_class.max(0) as usize;
    let count = acc.count.max(0) as usize;
    let stride = view.byte_stride.max(0) as usize;
    let len = if count == 0 {
        0
    } else if stride > elem {
        stride * (count - 1) + elem
    } else {
        elem * count
    };

    if offset + len > buffer.data.len() {
        return Err(oor);
    }

    Ok(ByteSpan {
        buffer: view.buffer as u32,
        offset,
        len,
        stride,
        component: acc.component_type,
        components: acc.type_class,
        count: count as u32,
    })
}

/// Rewrite a pending reference in place and hand back the span.
fn resolve_ref(r: &mut AccessorRef, tables: &Tables, buffers: &[Buffer]) -> Result<ByteSpan> {
    let span = match *r {
        AccessorRef::Pending(index) => resolve_accessor(index, tables, buffers)?,
        AccessorRef::Resolved(span) => span,
    };
    *r = AccessorRef::Resolved(span);
    Ok(span)
}

/// Little-endian float at element `i` of a tightly packed scalar span.
fn span_f32(buffers: &[Buffer], span: &ByteSpan, i: u32) -> f32 {
    let start = span.offset + i as usize * 4;
    buffers
        .get(span.buffer as usize)
        .and_then(|b| b.data.get(start..start + 4))
        .map_or(0.0, |bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Resolve every pending reference in the parsed entities.
pub(crate) fn resolve(
    meshes: &mut [Mesh],
    skins: &mut [Skin],
    animations: &mut [Animation],
    buffers: &[Buffer],
    tables: &Tables,
) -> Result<()> {
    for mesh in meshes.iter_mut() {
        for prim in &mut mesh.primitives {
            if let Some(indices) = prim.indices.as_mut() {
                let span = resolve_ref(indices, tables, buffers)?;
                prim.num_indices = span.count;
                prim.index_type = span.component;
            }

            // slots are stored in increasing bit order already
            for slot in prim.slots.iter_mut() {
                resolve_ref(&mut slot.data, tables, buffers)?;
            }

            // every attribute of a primitive covers the same vertex count
            prim.num_vertices = prim
                .slots
                .first()
                .and_then(|s| s.data.span())
                .map_or(0, |s| s.count);

            if let Some((component, components, stride)) = prim
                .slot(Attrib::Joints)
                .and_then(|s| s.data.span())
                .map(|span| (span.component, span.components, span.stride))
            {
                prim.joint_type = component as i16;
                prim.joint_count = components as i16;
                prim.joint_stride = stride as i16;
            }
            if let Some((component, stride)) = prim
                .slot(Attrib::Weights)
                .and_then(|s| s.data.span())
                .map(|span| (span.component, span.stride))
            {
                prim.weight_type = component as i16;
                prim.weight_stride = stride as i16;
            }
        }
    }

    for skin in skins.iter_mut() {
        if let Some(ibm) = skin.inverse_bind_matrices.as_mut() {
            resolve_ref(ibm, tables, buffers)?;
        }
    }

    for anim in animations.iter_mut() {
        anim.duration = 0.0;
        for sampler in &mut anim.samplers {
            let input = resolve_ref(&mut sampler.input, tables, buffers)?;
            sampler.count = input.count;

            let output = resolve_ref(&mut sampler.output, tables, buffers)?;
            sampler.count = sampler.count.min(output.count);
            sampler.num_components = output.components;

            if sampler.count > 0 {
                let last = span_f32(buffers, &input, sampler.count - 1);
                anim.duration = anim.duration.max(last);
            }
        }
    }

    Ok(())
}

/// Sum vertex and index counts over all primitives.
pub(crate) fn totals(meshes: &[Mesh]) -> (u32, u32) {
    let mut vertices = 0u32;
    let mut indices = 0u32;
    for mesh in meshes {
        for prim in &mesh.primitives {
            vertices += prim.num_vertices;
            indices += prim.num_indices;
        }
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::COMPONENT_BASE;

    fn one_buffer(len: usize) -> Vec<Buffer> {
        vec![Buffer { data: vec![0u8; len], byte_length: len }]
    }

    fn tables_with(accessor: Accessor, view: BufferView) -> Tables {
        Tables { accessors: vec![accessor], buffer_views: vec![view] }
    }

    #[test]
    fn test_resolve_tightly_packed() {
        let tables = tables_with(
            Accessor {
                buffer_view: 0,
                byte_offset: 4,
                component_type: 0x1406 - COMPONENT_BASE,
                count: 3,
                type_class: 3,
            },
            BufferView { buffer: 0, byte_offset: 16, ..Default::default() },
        );
        let buffers = one_buffer(64);

        let span = resolve_accessor(0, &tables, &buffers).unwrap();
        assert_eq!(span.offset, 20);
        assert_eq!(span.len, 36); // 3 * vec3 * f32
        assert_eq!(span.count, 3);
        assert_eq!(span.components, 3);
        assert_eq!(span.stride, 0);
    }

    #[test]
    fn test_resolve_strided() {
        let tables = tables_with(
            Accessor {
                buffer_view: 0,
                byte_offset: 0,
                component_type: 0x1406 - COMPONENT_BASE,
                count: 2,
                type_class: 3,
            },
            BufferView { buffer: 0, byte_stride: 20, ..Default::default() },
        );
        let buffers = one_buffer(32);

        let span = resolve_accessor(0, &tables, &buffers).unwrap();
        assert_eq!(span.len, 32); // 20 * 1 + 12
        assert_eq!(span.stride, 20);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let tables = tables_with(
            Accessor {
                buffer_view: 0,
                byte_offset: 0,
                component_type: 0x1406 - COMPONENT_BASE,
                count: 100,
                type_class: 3,
            },
            BufferView::default(),
        );
        let buffers = one_buffer(64);

        assert!(matches!(
            resolve_accessor(0, &tables, &buffers),
            Err(Error::AccessorOutOfRange { accessor: 0 })
        ));
        assert!(matches!(
            resolve_accessor(9, &tables, &buffers),
            Err(Error::AccessorOutOfRange { accessor: 9 })
        ));
    }

    #[test]
    fn test_resolve_zero_count() {
        let tables = tables_with(
            Accessor {
                buffer_view: 0,
                byte_offset: 0,
                component_type: 0x1406 - COMPONENT_BASE,
                count: 0,
                type_class: 1,
            },
            BufferView::default(),
        );
        let buffers = one_buffer(0);

        let span = resolve_accessor(0, &tables, &buffers).unwrap();
        assert_eq!(span.len, 0);
    }
}
