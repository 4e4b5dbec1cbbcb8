use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{self, Encoded};
use crate::error::{CodecError, CodecResult};
use crate::id::ObjectId;

/// The git object type carried in the header of every object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// Raw file contents.
    Blob,
    Commit,
    Tree,
    Tag,
}

impl ObjectType {
    /// All object types, in git's numbering order.
    pub const ALL: [ObjectType; 4] = [Self::Commit, Self::Tree, Self::Blob, Self::Tag];

    /// The ASCII name written into the object header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Tag => "tag",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "tag" => Ok(Self::Tag),
            other => Err(CodecError::UnknownType(other.to_string())),
        }
    }
}

/// An object: type tag plus raw, uncompressed data.
///
/// Objects are transient. Stores never retain them; they retain only the
/// compressed canonical bytes produced by [`Object::encode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Object {
    pub kind: ObjectType,
    pub data: Vec<u8>,
}

impl Object {
    pub fn new(kind: ObjectType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Shorthand for a blob object.
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        Self::new(ObjectType::Blob, data)
    }

    /// Content address of this object. Does not compress.
    pub fn id(&self) -> ObjectId {
        codec::hash_object(self.kind, &self.data)
    }

    /// Compress this object and compute its address.
    pub fn encode(&self) -> CodecResult<Encoded> {
        codec::encode(self.kind, &self.data)
    }

    /// Size of the raw data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
