//! Normalization of heterogeneous call inputs into canonical turns.
//!
//! ```rust
//! use gcontent::{ContentArg, Role, normalize_contents};
//!
//! let turns = normalize_contents(vec![
//!     ContentArg::from("what is in this image?"),
//!     ContentArg::blob("image/png", vec![1, 2, 3]),
//! ])
//! .expect("normalization should succeed");
//!
//! assert_eq!(turns.len(), 1);
//! assert_eq!(turns[0].role, Role::User);
//! assert_eq!(turns[0].parts.len(), 2);
//! ```

use crate::error::ContentError;
use crate::part::{Blob, FileRef, Part};
use crate::turn::Turn;

/// One caller-supplied content argument, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentArg {
    Text(String),
    Blob(Blob),
    FileRef(FileRef),
    Part(Part),
    Turn(Turn),
}

impl ContentArg {
    pub fn blob(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::Blob(Blob::new(mime_type, data))
    }

    pub fn file_ref(uri: impl Into<String>) -> Self {
        Self::FileRef(FileRef::new(uri))
    }
}

impl From<&str> for ContentArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContentArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Part> for ContentArg {
    fn from(value: Part) -> Self {
        Self::Part(value)
    }
}

impl From<Turn> for ContentArg {
    fn from(value: Turn) -> Self {
        Self::Turn(value)
    }
}

impl From<Blob> for ContentArg {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}

impl From<FileRef> for ContentArg {
    fn from(value: FileRef) -> Self {
        Self::FileRef(value)
    }
}

/// Turns a mixed input sequence into ordered canonical turns.
///
/// Bare scalars (text, blobs, file references, loose parts) are grouped, in
/// order, into a single user turn. A pre-built turn flushes the pending group
/// and passes through unchanged.
pub fn normalize_contents(args: Vec<ContentArg>) -> Result<Vec<Turn>, ContentError> {
    if args.is_empty() {
        return Err(ContentError::empty("content input must not be empty"));
    }

    let mut turns = Vec::new();
    let mut pending: Vec<Part> = Vec::new();

    for arg in args {
        match arg {
            ContentArg::Text(value) => pending.push(Part::Text(value)),
            ContentArg::Blob(blob) => {
                validate_blob(&blob)?;
                pending.push(Part::InlineData(blob));
            }
            ContentArg::FileRef(file_ref) => {
                validate_file_ref(&file_ref)?;
                pending.push(Part::FileData(file_ref));
            }
            ContentArg::Part(part) => {
                validate_part(&part)?;
                pending.push(part);
            }
            ContentArg::Turn(turn) => {
                if !pending.is_empty() {
                    turns.push(Turn::user(std::mem::take(&mut pending)));
                }
                turns.push(turn);
            }
        }
    }

    if !pending.is_empty() {
        turns.push(Turn::user(pending));
    }

    Ok(turns)
}

fn validate_part(part: &Part) -> Result<(), ContentError> {
    match part {
        Part::InlineData(blob) => validate_blob(blob),
        Part::FileData(file_ref) => validate_file_ref(file_ref),
        _ => Ok(()),
    }
}

fn validate_blob(blob: &Blob) -> Result<(), ContentError> {
    if blob.mime_type.trim().is_empty() {
        return Err(ContentError::missing_mime_type(
            "inline data requires a resolvable mime type",
        ));
    }

    Ok(())
}

fn validate_file_ref(file_ref: &FileRef) -> Result<(), ContentError> {
    if file_ref.uri.trim().is_empty() {
        return Err(ContentError::invalid_reference(
            "file reference requires a non-empty uri",
        ));
    }

    Ok(())
}
