//! Section parsers for the geometry payload tables: accessors, bufferViews
//! and buffers.

use std::path::Path;

use crate::lex::{key8, Cursor};
use crate::types::{Accessor, Buffer, BufferView, COMPONENT_BASE};
use crate::util::{base64, Error, Result};

/// Parse the `accessors` array into the dereference table.
pub(crate) fn parse_accessors(cur: &mut Cursor, accessors: &mut Vec<Accessor>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut acc = Accessor::default();
    loop {
        // outer: find the next key, close records on '}', end on ']'
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    accessors.push(acc);
                    acc = Accessor::default();
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        cur.bump(); // opening quote of the key

        if cur.key_is(b"bufferView") {
            acc.buffer_view = cur.parse_uint();
        } else if cur.key_is(b"byteOffset") {
            acc.byte_offset = cur.parse_uint();
        } else if cur.key_is(b"componentType") {
            acc.component_type = cur.parse_uint() - COMPONENT_BASE;
        } else if cur.key_is(b"count") {
            acc.count = cur.parse_uint();
        } else if cur.key_is(b"name") {
            cur.skip_after(b'"');
            let _ = cur.quoted();
        } else if cur.key_is(b"type") {
            cur.skip_after(b'"');
            acc.type_class = match cur.hash_quoted() {
                h if h == key8(b"SCALAR") => 1,
                h if h == key8(b"VEC2") => 2,
                h if h == key8(b"VEC3") => 3,
                h if h == key8(b"VEC4") => 4,
                h if h == key8(b"MAT4") => 16,
                _ => return Err(Error::Unknown),
            };
        } else if cur.key_is(b"min") || cur.key_is(b"max") {
            cur.skip_balanced(b'[', b']');
        } else if cur.key_is(b"normalized") {
            cur.skip_after(b'"');
        } else {
            return Err(Error::UnknownAccessorField);
        }
    }
}

const BUFFER: u64 = key8(b"buffer");
const BYTE_OFFS: u64 = key8(b"byteOffs");
const BYTE_LENG: u64 = key8(b"byteLeng");
const BYTE_STRI: u64 = key8(b"byteStri");
const TARGET: u64 = key8(b"target");
const NAME: u64 = key8(b"name");

/// Parse the `bufferViews` array. Keys dispatch on their first eight bytes.
pub(crate) fn parse_buffer_views(cur: &mut Cursor, views: &mut Vec<BufferView>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut view = BufferView::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    views.push(view);
                    view = BufferView::default();
                    cur.bump();
                }
                b']' => {
                    cur.bump();
                    return Ok(());
                }
                _ => cur.bump(),
            }
        }
        match cur.hash_quoted() {
            BUFFER => view.buffer = cur.parse_uint(),
            BYTE_OFFS => view.byte_offset = cur.parse_uint(),
            BYTE_LENG => view.byte_length = cur.parse_uint(),
            BYTE_STRI => view.byte_stride = cur.parse_uint(),
            TARGET => view.target = cur.parse_uint(),
            NAME => {
                let _ = cur.quoted();
            }
            _ => return Err(Error::UnknownBufferViewField),
        }
    }
}

/// Parse the `buffers` array, materializing each payload: inline base64 data
/// URLs decode into fresh allocations, relative URIs load eagerly from the
/// document's directory.
pub(crate) fn parse_buffers(cur: &mut Cursor, dir: &Path, buffers: &mut Vec<Buffer>) -> Result<()> {
    cur.skip_after(b'"'); // rest of the section key
    let mut buf = Buffer::default();
    loop {
        loop {
            if cur.at_end() {
                return Ok(());
            }
            match cur.peek() {
                b'"' => break,
                b'}' => {
                    buffers.push(std::mem::take(&mut buf));
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

        if cur.key_is(b"uri") {
            cur.skip_after(b'"');
            cur.skip_until(b'"');
            if cur.starts_with(b"\"data:") {
                cur.skip_after(b',');
                let payload = cur.take_until(b'"');
                buf.data = base64::decode(payload);
                cur.bump();
            } else {
                let uri = cur.quoted();
                let path = dir.join(std::str::from_utf8(uri).map_err(|_| Error::NonUtf8)?);
                buf.data = std::fs::read(&path).map_err(|_| Error::BinNotExist(path))?;
            }
        } else if cur.key_is(b"byteLength") {
            buf.byte_length = cur.parse_uint().max(0) as usize;
        } else {
            return Err(Error::BufferParseFail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accessors_section() {
        let doc = br#"accessors": [
            {"bufferView": 0, "byteOffset": 8, "componentType": 5126,
             "count": 24, "type": "VEC3", "min": [0, 0, 0], "max": [1, 1, 1]},
            {"bufferView": 1, "componentType": 5123, "count": 36, "type": "SCALAR"}
        ], "next"#;
        let mut cur = Cursor::new(doc);
        let mut accessors = Vec::new();
        parse_accessors(&mut cur, &mut accessors).unwrap();

        assert_eq!(accessors.len(), 2);
        assert_eq!(accessors[0].buffer_view, 0);
        assert_eq!(accessors[0].byte_offset, 8);
        assert_eq!(accessors[0].component_type, 5126 - COMPONENT_BASE);
        assert_eq!(accessors[0].count, 24);
        assert_eq!(accessors[0].type_class, 3);
        assert_eq!(accessors[1].component_type, 5123 - COMPONENT_BASE);
        assert_eq!(accessors[1].type_class, 1);
    }

    #[test]
    fn test_parse_accessors_unknown_key() {
        let doc = br#"accessors": [{"bogus": 1}]"#;
        let mut cur = Cursor::new(doc);
        let mut accessors = Vec::new();
        let err = parse_accessors(&mut cur, &mut accessors).unwrap_err();
        assert!(matches!(err, Error::UnknownAccessorField));
    }

    #[test]
    fn test_parse_buffer_views_section() {
        let doc = br#"bufferViews": [
            {"buffer": 0, "byteOffset": 4, "byteLength": 288, "byteStride": 12,
             "target": 34962, "name": "verts"}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut views = Vec::new();
        parse_buffer_views(&mut cur, &mut views).unwrap();

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].buffer, 0);
        assert_eq!(views[0].byte_offset, 4);
        assert_eq!(views[0].byte_length, 288);
        assert_eq!(views[0].byte_stride, 12);
        assert_eq!(views[0].target, 34962);
    }

    #[test]
    fn test_parse_buffers_data_uri() {
        let doc = br#"buffers": [
            {"uri": "data:application/octet-stream;base64,AAECAwQFBgc=", "byteLength": 8}
        ]"#;
        let mut cur = Cursor::new(doc);
        let mut buffers = Vec::new();
        parse_buffers(&mut cur, Path::new(""), &mut buffers).unwrap();

        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers[0].byte_length, 8);
        assert_eq!(&buffers[0].data[..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_parse_buffers_missing_sidecar() {
        let doc = br#"buffers": [{"uri": "not_there.bin", "byteLength": 16}]"#;
        let mut cur = Cursor::new(doc);
        let mut buffers = Vec::new();
        let err = parse_buffers(&mut cur, Path::new("/nonexistent"), &mut buffers).unwrap_err();
        assert!(matches!(err, Error::BinNotExist(_)));
    }
}
