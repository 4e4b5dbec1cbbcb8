use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha1::{Digest, Sha1};

use crate::error::{CodecError, CodecResult};
use crate::id::ObjectId;
use crate::object::{Object, ObjectType};

/// An encoded object: the deflated canonical bytes and their address.
///
/// `id` is computed over the canonical bytes *before* compression, so it does
/// not depend on the compressor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    pub id: ObjectId,
    pub compressed: Vec<u8>,
}

fn header(kind: ObjectType, len: usize) -> String {
    format!("{kind} {len}\0")
}

/// Build the canonical byte sequence `type SP length NUL data`.
pub fn canonical_bytes(kind: ObjectType, data: &[u8]) -> Vec<u8> {
    let header = header(kind, data.len());
    let mut content = Vec::with_capacity(header.len() + data.len());
    content.extend_from_slice(header.as_bytes());
    content.extend_from_slice(data);
    content
}

/// Compute the content address of `(kind, data)` without compressing.
///
/// Equivalent to `git hash-object -t <kind>`.
pub fn hash_object(kind: ObjectType, data: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(header(kind, data.len()).as_bytes());
    hasher.update(data);
    digest_to_id(hasher)
}

fn digest_to_id(hasher: Sha1) -> ObjectId {
    let digest = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest);
    ObjectId::from_hash(hash)
}

/// Encode an object: hash its canonical form and deflate it.
///
/// Compression uses zlib's default level, which is deterministic, so equal
/// inputs produce byte-identical output.
pub fn encode(kind: ObjectType, data: &[u8]) -> CodecResult<Encoded> {
    let content = canonical_bytes(kind, data);

    let mut hasher = Sha1::new();
    hasher.update(&content);
    let id = digest_to_id(hasher);

    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(content.len() / 2 + 16),
        Compression::default(),
    );
    encoder.write_all(&content).map_err(CodecError::Compress)?;
    let compressed = encoder.finish().map_err(CodecError::Compress)?;

    Ok(Encoded { id, compressed })
}

/// Decode a deflated object back into its type and data.
///
/// The header is validated against the payload; the hash is not recomputed.
pub fn decode(compressed: &[u8]) -> CodecResult<Object> {
    let mut content = Vec::with_capacity(compressed.len() * 2);
    ZlibDecoder::new(compressed)
        .read_to_end(&mut content)
        .map_err(CodecError::Decompress)?;
    parse(content)
}

fn parse(mut content: Vec<u8>) -> CodecResult<Object> {
    let nul = content
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::MissingNul)?;

    let data = content.split_off(nul + 1);
    content.truncate(nul);
    let header = String::from_utf8(content).map_err(|e| {
        CodecError::InvalidHeader(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })?;

    let (kind, len) = header
        .split_once(' ')
        .ok_or_else(|| CodecError::InvalidHeader(header.clone()))?;
    let kind: ObjectType = kind.parse()?;
    let len: usize = len
        .parse()
        .map_err(|_| CodecError::InvalidLength(len.to_string()))?;

    if len != data.len() {
        return Err(CodecError::SizeMismatch {
            expected: len,
            actual: data.len(),
        });
    }

    Ok(Object { kind, data })
}
