//! Error types for the glTF scene parser.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for parse and resolution failures.
///
/// The taxonomy is closed: every failure a parse can hit maps onto one of
/// these kinds, and each kind renders through a fixed all-caps tag (see
/// [`Error::as_str`]) for terse CLI output.
#[derive(Error, Debug)]
pub enum Error {
    /// Unclassified parse failure (bad wrap mode, bad enum string, ...)
    #[error("Unclassified parse failure")]
    Unknown,

    /// Unrecognized vertex attribute name inside `attributes`
    #[error("Unknown vertex attribute name")]
    UnknownAttrib,

    /// Unrecognized key inside a material record
    #[error("Unknown material field")]
    UnknownMaterialField,

    /// Unrecognized key inside `pbrMetallicRoughness`
    #[error("Unknown pbrMetallicRoughness field")]
    UnknownPbrField,

    /// Unrecognized key inside a node record
    #[error("Unknown node field")]
    UnknownNodeField,

    /// Unrecognized key inside a texture record
    #[error("Unknown texture field")]
    UnknownTextureField,

    /// Unrecognized key inside an accessor record
    #[error("Unknown accessor field")]
    UnknownAccessorField,

    /// Unrecognized key inside a bufferView record
    #[error("Unknown bufferView field")]
    UnknownBufferViewField,

    /// Unrecognized key inside a mesh record
    #[error("Unknown mesh field")]
    UnknownMeshField,

    /// Unrecognized key inside a camera record
    #[error("Unknown camera field")]
    UnknownCameraField,

    /// Unrecognized key inside a mesh primitive record
    #[error("Unknown mesh primitive field")]
    UnknownPrimitiveField,

    /// Buffer record carries a key other than `uri` / `byteLength`
    #[error("Buffer record parse failed")]
    BufferParseFail,

    /// A sidecar payload file referenced by a buffer URI is missing
    #[error("Buffer payload not found: {0}")]
    BinNotExist(PathBuf),

    /// The document itself does not exist or cannot be read
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Unrecognized top-level key in the document
    #[error("Unknown top-level descriptor")]
    UnknownDescriptor,

    /// Two schema keys alias under the prefix comparison window
    #[error("Key prefix collision")]
    HashCollision,

    /// Document is not valid UTF-8
    #[error("Document is not valid UTF-8")]
    NonUtf8,

    /// A resolved accessor span falls outside its buffer's byte range
    #[error("Accessor {accessor} resolves outside buffer bounds")]
    AccessorOutOfRange { accessor: u32 },
}

impl Error {
    /// Fixed tag for each error kind, for one-line CLI rendering.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::UnknownAttrib => "UNKNOWN_ATTRIB",
            Self::UnknownMaterialField => "UNKNOWN_MATERIAL_VAR",
            Self::UnknownPbrField => "UNKNOWN_PBR_VAR",
            Self::UnknownNodeField => "UNKNOWN_NODE_VAR",
            Self::UnknownTextureField => "UNKNOWN_TEXTURE_VAR",
            Self::UnknownAccessorField => "UNKNOWN_ACCESSOR_VAR",
            Self::UnknownBufferViewField => "UNKNOWN_BUFFER_VIEW_VAR",
            Self::UnknownMeshField => "UNKNOWN_MESH_VAR",
            Self::UnknownCameraField => "UNKNOWN_CAMERA_VAR",
            Self::UnknownPrimitiveField => "UNKNOWN_MESH_PRIMITIVE_VAR",
            Self::BufferParseFail => "BUFFER_PARSE_FAIL",
            Self::BinNotExist(_) => "BIN_NOT_EXIST",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnknownDescriptor => "UNKNOWN_DESCRIPTOR",
            Self::HashCollision => "HASH_COLLISION",
            Self::NonUtf8 => "NON_UTF8",
            Self::AccessorOutOfRange { .. } => "ACCESSOR_OUT_OF_RANGE",
        }
    }

    /// All tags in taxonomy order, for `gltf-scene errors`.
    pub const TAGS: &'static [&'static str] = &[
        "UNKNOWN",
        "UNKNOWN_ATTRIB",
        "UNKNOWN_MATERIAL_VAR",
        "UNKNOWN_PBR_VAR",
        "UNKNOWN_NODE_VAR",
        "UNKNOWN_TEXTURE_VAR",
        "UNKNOWN_ACCESSOR_VAR",
        "UNKNOWN_BUFFER_VIEW_VAR",
        "UNKNOWN_MESH_VAR",
        "UNKNOWN_CAMERA_VAR",
        "UNKNOWN_MESH_PRIMITIVE_VAR",
        "BUFFER_PARSE_FAIL",
        "BIN_NOT_EXIST",
        "FILE_NOT_FOUND",
        "UNKNOWN_DESCRIPTOR",
        "HASH_COLLISION",
        "NON_UTF8",
        "ACCESSOR_OUT_OF_RANGE",
    ];
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::FileNotFound(PathBuf::from("missing.gltf"));
        assert!(e.to_string().contains("missing.gltf"));

        let e = Error::AccessorOutOfRange { accessor: 7 };
        assert!(e.to_string().contains('7'));
    }

    #[test]
    fn test_error_tags() {
        assert_eq!(Error::Unknown.as_str(), "UNKNOWN");
        assert_eq!(Error::UnknownBufferViewField.as_str(), "UNKNOWN_BUFFER_VIEW_VAR");
        assert!(Error::TAGS.contains(&Error::BinNotExist(PathBuf::new()).as_str()));
    }
}
