//! Receivers for the diagnostic messages emitted while reading and writing.
//!
//! A sink is passed explicitly to [`ClassFile::read_with`](crate::ClassFile::read_with) and
//! [`ClassFile::write_with`](crate::ClassFile::write_with). The plain [`ClassFile::read`](crate::ClassFile::read)
//! and friends use `()`, which drops everything.

use std::fmt::Arguments;

pub trait DiagnosticSink {
	/// Called after a record was decoded. `offset` is the position of its first byte in the input.
	fn read(&mut self, offset: usize, what: Arguments<'_>) {
		let _ = (offset, what);
	}

	/// Called after a record was encoded. `offset` is the number of bytes written before it.
	fn wrote(&mut self, offset: usize, what: Arguments<'_>) {
		let _ = (offset, what);
	}

	/// Called for problems that don't stop decoding, like a bootstrap method whose name can't be resolved.
	fn warn(&mut self, message: Arguments<'_>) {
		let _ = message;
	}
}

impl DiagnosticSink for () {}

/// Forwards everything to the [`log`] crate: reads and writes at trace level, warnings at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
	fn read(&mut self, offset: usize, what: Arguments<'_>) {
		log::trace!("{offset:#08x}: read {what}");
	}

	fn wrote(&mut self, offset: usize, what: Arguments<'_>) {
		log::trace!("{offset:#08x}: wrote {what}");
	}

	fn warn(&mut self, message: Arguments<'_>) {
		log::warn!("{message}");
	}
}

/// Collects every message as a line of text.
impl DiagnosticSink for Vec<String> {
	fn read(&mut self, offset: usize, what: Arguments<'_>) {
		self.push(format!("{offset}: read {what}"));
	}

	fn wrote(&mut self, offset: usize, what: Arguments<'_>) {
		self.push(format!("{offset}: wrote {what}"));
	}

	fn warn(&mut self, message: Arguments<'_>) {
		self.push(format!("warning: {message}"));
	}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
	fn read(&mut self, offset: usize, what: Arguments<'_>) {
		(**self).read(offset, what)
	}

	fn wrote(&mut self, offset: usize, what: Arguments<'_>) {
		(**self).wrote(offset, what)
	}

	fn warn(&mut self, message: Arguments<'_>) {
		(**self).warn(message)
	}
}
