//! Base64 decoding for inline `data:` buffer URIs.

/// Value table: A-Z a-z 0-9 + / map to 0..63, everything else (including
/// `=` padding) maps to 0.
const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut c = b'A';
    while c <= b'Z' {
        table[c as usize] = c - b'A';
        c += 1;
    }
    let mut c = b'a';
    while c <= b'z' {
        table[c as usize] = 26 + (c - b'a');
        c += 1;
    }
    let mut c = b'0';
    while c <= b'9' {
        table[c as usize] = 52 + (c - b'0');
        c += 1;
    }
    table[b'+' as usize] = 62;
    table[b'/' as usize] = 63;
    table
}

static TABLE: [u8; 256] = build_table();

/// Decode a base64 payload.
///
/// Only complete 4-character groups are decoded; a trailing partial group is
/// dropped. Padding characters decode as zero bytes, so callers that know the
/// real payload length (glTF buffers declare `byteLength`) simply ignore the
/// tail.
pub fn decode(src: &[u8]) -> Vec<u8> {
    let groups = src.len() / 4;
    let mut dst = Vec::with_capacity(groups * 3);

    for g in src.chunks_exact(4) {
        let a = TABLE[g[0] as usize] as u32;
        let b = TABLE[g[1] as usize] as u32;
        let c = TABLE[g[2] as usize] as u32;
        let d = TABLE[g[3] as usize] as u32;

        dst.push((a << 2 | b >> 4) as u8);
        dst.push((b << 4 | c >> 2) as u8);
        dst.push((c << 6 | d) as u8);
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic() {
        assert_eq!(decode(b"SGVsbG8gV29ybGQh"), b"Hello World!");
    }

    #[test]
    fn test_decode_padded() {
        // padding decodes as zero bytes; the real length is known externally
        let out = decode(b"SGVsbG8gV29ybGQ=");
        assert_eq!(&out[..11], b"Hello World");
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_decode_binary() {
        assert_eq!(decode(b"AAECAwQFBgc="), &[0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn test_decode_partial_group_dropped() {
        assert_eq!(decode(b"AQID"), &[1, 2, 3]);
        assert_eq!(decode(b"AQIDBA"), &[1, 2, 3]);
        assert_eq!(decode(b""), Vec::<u8>::new());
    }
}
