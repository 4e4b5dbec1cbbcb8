//! Object codec for the content-addressed store.
//!
//! Objects use git's loose-object framing. The canonical form of an object is
//!
//! ```text
//! <type> SP <decimal length> NUL <data>
//! ```
//!
//! Its SHA-1 digest is the object's [`ObjectId`], and its zlib-deflated bytes
//! are what every storage backend persists. Because the framing and hash match
//! `git hash-object`, ids produced here are interchangeable with git's.
//!
//! # Key Types
//!
//! - [`ObjectType`] -- `blob`, `commit`, `tree` or `tag`
//! - [`Object`] -- a type tag plus raw data
//! - [`ObjectId`] -- 20-byte SHA-1 content address, rendered as 40 hex chars
//! - [`Encoded`] -- compressed bytes paired with their address

pub mod codec;
pub mod error;
pub mod id;
pub mod object;

pub use codec::{canonical_bytes, decode, encode, hash_object, Encoded};
pub use error::{CodecError, CodecResult};
pub use id::ObjectId;
pub use object::{Object, ObjectType};
