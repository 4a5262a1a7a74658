use std::io;
use thiserror::Error;

/// Errors surfaced by frame decode, encode and rebuild.
///
/// All of these are unrecoverable for the current call: the operation
/// aborts at the first failure and nothing is retried. Callers should
/// treat any of them as "file is not usable".
#[derive(Error, Debug)]
pub enum FrameError {
    /// The stream ended inside a fixed-size field.
    #[error("stream truncated at byte {offset}")]
    TruncatedInput { offset: u64 },

    /// An object type tag outside the known set. Tags are frozen; an
    /// unknown value means a corrupt file or a future format revision,
    /// and either way decoding must not continue.
    #[error("unknown object type tag {tag:#010x} at record {index}")]
    UnknownObjectType { index: usize, tag: u32 },

    /// A stored reference index does not fit the decoded combined space.
    #[error("reference index {index} on object {object} does not fit the combined space (length {len})")]
    IndexOutOfRange { index: i32, len: usize, object: i32 },

    /// A block reference slot landed on a record of the wrong kind.
    #[error("reference at position {position} on object {object} is not a {expected} block")]
    WrongReferenceKind {
        expected: &'static str,
        position: i32,
        object: i32,
    },

    /// A rebuild could not relocate a reference because the referenced
    /// identity no longer exists in its mapping.
    #[error("dangling reference: {slot} slot of object {object} points at missing record {ref_id}")]
    DanglingReference {
        slot: &'static str,
        object: i32,
        ref_id: i32,
    },

    /// Two records in the same mapping share an identifier.
    #[error("duplicate identifier {ref_id} in the {kind} table")]
    DuplicateRefId { kind: &'static str, ref_id: i32 },

    /// `duplicate_object` was pointed at an identifier that is not in
    /// the object table.
    #[error("no object with identifier {ref_id}")]
    MissingObject { ref_id: i32 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
