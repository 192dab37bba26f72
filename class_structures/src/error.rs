//! The error type of this crate.
//!
//! Every error has an [`ErrorKind`] and a logical path into the class file, like
//! `attributes[0].bootstrap_methods[2].method_ref`. The path is built up while the error
//! travels outward through the decoder, so the innermost segment is pushed first.

use std::fmt::{Display, Formatter};
use crate::pool::CpTag;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
	#[error("truncated input at byte offset {offset}: needed {needed} bytes, but only {available} are left")]
	Truncated { offset: usize, needed: usize, available: usize },
	#[error("wrong magic: got {found:#x}, expected 0xcafebabe")]
	BadMagic { found: u32 },
	#[error("invalid {what} tag {tag}")]
	InvalidTag { what: &'static str, tag: u8 },
	#[error("invalid {what} count {count}")]
	InvalidCount { what: &'static str, count: usize },
	#[error("{what} index {index} is out of range for length {len}")]
	IndexOutOfRange { what: &'static str, index: usize, len: usize },
	#[error("constant pool index {index} is the unusable upper slot of a `Long` or `Double`")]
	UnusableSlot { index: u16 },
	#[error("constant pool entry {index} is `{found}`, expected `{expected}`")]
	TypeMismatch { index: u16, expected: &'static str, found: CpTag },
	#[error("cannot resolve constant pool entry {index}")]
	Unresolvable {
		index: u16,
		#[source]
		source: Box<Error>,
	},
	#[error("attribute declares a length of {declared} bytes, but its contents take {consumed} bytes")]
	LengthMismatch { declared: u32, consumed: usize },
	#[error("{what} ({len}) doesn't fit into its field")]
	TooLarge { what: &'static str, len: usize },
	#[error("{count} unexpected bytes after the end of the class file at byte offset {offset}")]
	TrailingBytes { offset: usize, count: usize },
	#[error("nesting deeper than {limit} levels")]
	TooDeep { limit: usize },
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Field(&'static str),
	Index(usize),
}

#[derive(Debug)]
pub struct Error {
	kind: ErrorKind,
	/// Innermost segment first.
	path: Vec<Segment>,
}

impl Error {
	pub fn new(kind: ErrorKind) -> Error {
		Error { kind, path: Vec::new() }
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Looks through [`ErrorKind::Unresolvable`] to the kind of error that stopped the resolution.
	pub fn root_kind(&self) -> &ErrorKind {
		match &self.kind {
			ErrorKind::Unresolvable { source, .. } => source.root_kind(),
			kind => kind,
		}
	}

	/// The logical path of the record and field that caused this error, e.g. `methods[1].attributes[0].code`.
	pub fn path(&self) -> String {
		let mut path = String::new();
		for segment in self.path.iter().rev() {
			match segment {
				Segment::Field(name) => {
					if !path.is_empty() {
						path.push('.');
					}
					path.push_str(name);
				},
				Segment::Index(index) => {
					path.push('[');
					path.push_str(&index.to_string());
					path.push(']');
				},
			}
		}
		path
	}

	fn push(mut self, segment: Segment) -> Error {
		self.path.push(segment);
		self
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if self.path.is_empty() {
			write!(f, "{}", self.kind)
		} else {
			write!(f, "{}: {}", self.path(), self.kind)
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		std::error::Error::source(&self.kind)
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Error {
		Error::new(kind)
	}
}

impl From<std::io::Error> for Error {
	fn from(error: std::io::Error) -> Error {
		Error::new(ErrorKind::Io(error))
	}
}

/// Adds path segments to errors, similar to what `anyhow::Context` does for messages.
pub(crate) trait PathContext<T> {
	fn at(self, field: &'static str) -> Result<T>;
	fn at_index(self, index: usize) -> Result<T>;
}

impl<T, E: Into<Error>> PathContext<T> for std::result::Result<T, E> {
	fn at(self, field: &'static str) -> Result<T> {
		self.map_err(|e| e.into().push(Segment::Field(field)))
	}

	fn at_index(self, index: usize) -> Result<T> {
		self.map_err(|e| e.into().push(Segment::Index(index)))
	}
}
