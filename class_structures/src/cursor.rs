//! Sequential big-endian reading and writing.
//!
//! Nothing in the class file format needs seeking: every item either has a fixed size or is
//! prefixed by its length or element count. So [`ByteReader`] only ever moves forward.

use std::io::Write;
use crate::error::{ErrorKind, PathContext, Result};

/// A forward-only reader over a byte slice that tracks its absolute offset in the input.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
	data: &'a [u8],
	pos: usize,
	/// The absolute offset of `data[0]`, so that errors of sub-readers report file offsets.
	base: usize,
}

impl<'a> ByteReader<'a> {
	pub fn new(data: &'a [u8]) -> ByteReader<'a> {
		ByteReader { data, pos: 0, base: 0 }
	}

	/// The absolute offset of the next byte to be read.
	pub fn offset(&self) -> usize {
		self.base + self.pos
	}

	pub fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
		let available = self.remaining();
		if len > available {
			return Err(ErrorKind::Truncated { offset: self.offset(), needed: len, available }.into());
		}
		let slice = &self.data[self.pos..self.pos + len];
		self.pos += len;
		Ok(slice)
	}

	/// Splits off the next `len` bytes into their own reader.
	///
	/// The returned reader reports offsets relative to the start of the whole input.
	pub fn take(&mut self, len: usize) -> Result<ByteReader<'a>> {
		let base = self.offset();
		let data = self.read_slice(len)?;
		Ok(ByteReader { data, pos: 0, base })
	}

	fn read_n<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut buf = [0u8; N];
		buf.copy_from_slice(self.read_slice(N)?);
		Ok(buf)
	}

	pub fn read_u8(&mut self) -> Result<u8> {
		Ok(u8::from_be_bytes(self.read_n()?))
	}
	pub fn read_u16(&mut self) -> Result<u16> {
		Ok(u16::from_be_bytes(self.read_n()?))
	}
	pub fn read_u32(&mut self) -> Result<u32> {
		Ok(u32::from_be_bytes(self.read_n()?))
	}
	pub fn read_u64(&mut self) -> Result<u64> {
		Ok(u64::from_be_bytes(self.read_n()?))
	}

	pub fn read_u8_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u8()? as usize)
	}
	pub fn read_u16_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u16()? as usize)
	}
	pub fn read_u32_as_usize(&mut self) -> Result<usize> {
		Ok(self.read_u32()? as usize)
	}

	pub fn read_u8_vec(&mut self, size: usize) -> Result<Vec<u8>> {
		Ok(self.read_slice(size)?.to_vec())
	}

	/// Reads a count with `get_size` and then that many elements with `get_element`.
	///
	/// Errors of an element get its index added to their path.
	pub fn read_vec<T, S, E>(&mut self, get_size: S, mut get_element: E) -> Result<Vec<T>>
	where
		S: FnOnce(&mut Self) -> Result<usize>,
		E: FnMut(&mut Self) -> Result<T>,
	{
		let size = get_size(self)?;
		// don't trust the count for the allocation, every element takes at least one byte
		let mut vec = Vec::with_capacity(size.min(self.remaining()));
		for i in 0..size {
			vec.push(get_element(self).at_index(i)?);
		}
		Ok(vec)
	}
}

/// A writer that counts the bytes written.
#[derive(Debug)]
pub struct ByteWriter<W> {
	inner: W,
	written: usize,
}

impl ByteWriter<Vec<u8>> {
	/// A buffer for contents whose length must be written before them.
	///
	/// `offset` is where the buffer will end up in the output, so that [`ByteWriter::written`] stays absolute.
	pub fn buffer(offset: usize) -> ByteWriter<Vec<u8>> {
		ByteWriter { inner: Vec::new(), written: offset }
	}
}

impl<W: Write> ByteWriter<W> {
	pub fn new(inner: W) -> ByteWriter<W> {
		ByteWriter { inner, written: 0 }
	}

	pub fn written(&self) -> usize {
		self.written
	}

	pub fn into_inner(self) -> W {
		self.inner
	}

	pub fn write_u8_slice(&mut self, buf: &[u8]) -> Result<()> {
		self.inner.write_all(buf)?;
		self.written += buf.len();
		Ok(())
	}

	pub fn write_u8(&mut self, value: u8) -> Result<()> {
		self.write_u8_slice(&[value])
	}
	pub fn write_u16(&mut self, value: u16) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	pub fn write_u32(&mut self, value: u32) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}
	pub fn write_u64(&mut self, value: u64) -> Result<()> {
		self.write_u8_slice(&value.to_be_bytes())
	}

	pub fn write_usize_as_u8(&mut self, value: usize, what: &'static str) -> Result<()> {
		let value = u8::try_from(value).map_err(|_| ErrorKind::TooLarge { what, len: value })?;
		self.write_u8(value)
	}
	pub fn write_usize_as_u16(&mut self, value: usize, what: &'static str) -> Result<()> {
		let value = u16::try_from(value).map_err(|_| ErrorKind::TooLarge { what, len: value })?;
		self.write_u16(value)
	}
	pub fn write_usize_as_u32(&mut self, value: usize, what: &'static str) -> Result<()> {
		let value = u32::try_from(value).map_err(|_| ErrorKind::TooLarge { what, len: value })?;
		self.write_u32(value)
	}

	pub fn write_slice<T, S, E>(&mut self, slice: &[T], put_size: S, mut put_element: E) -> Result<()>
	where
		S: FnOnce(&mut Self, usize) -> Result<()>,
		E: FnMut(&mut Self, &T) -> Result<()>,
	{
		put_size(self, slice.len())?;
		for (i, value) in slice.iter().enumerate() {
			put_element(self, value).at_index(i)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::cursor::{ByteReader, ByteWriter};
	use crate::error::{ErrorKind, Result};

	#[test]
	fn big_endian() -> Result<()> {
		let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x2a];
		let mut reader = ByteReader::new(&data);
		assert_eq!(reader.read_u8()?, 0x01);
		assert_eq!(reader.read_u16()?, 0x0203);
		assert_eq!(reader.read_u32()?, 0x0405_0607);
		assert_eq!(reader.read_u32()?, 0xcafe_babe);
		assert_eq!(reader.read_u32()?, 42);
		assert!(reader.is_empty());

		let mut writer = ByteWriter::new(Vec::new());
		writer.write_u8(0x01)?;
		writer.write_u16(0x0203)?;
		writer.write_u32(0x0405_0607)?;
		writer.write_u64(0xcafe_babe_0000_002a)?;
		assert_eq!(writer.written(), data.len());
		assert_eq!(writer.into_inner(), data);
		Ok(())
	}

	#[test]
	fn truncated_reports_offset() {
		let data = [0x00, 0x01, 0x02];
		let mut reader = ByteReader::new(&data);
		let _ = reader.read_u16();
		let error = reader.read_u32().unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::Truncated { offset: 2, needed: 4, available: 1 }));
	}

	#[test]
	fn sub_reader_keeps_absolute_offsets() -> Result<()> {
		let data = [0xaa, 0xbb, 0x00, 0x07, 0xcc];
		let mut reader = ByteReader::new(&data);
		reader.read_u16()?;
		let mut sub = reader.take(2)?;
		assert_eq!(reader.offset(), 4);
		assert_eq!(sub.read_u8()?, 0x00);
		let error = sub.read_u16().unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::Truncated { offset: 3, needed: 2, available: 1 }));
		Ok(())
	}

	#[test]
	fn element_index_in_path() {
		let data = [0x00, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00];
		let mut reader = ByteReader::new(&data);
		let error = reader.read_vec(|r| r.read_u16_as_usize(), |r| r.read_u16()).unwrap_err();
		assert_eq!(error.path(), "[2]");
	}

	#[test]
	fn too_large() {
		let mut writer = ByteWriter::new(Vec::new());
		let error = writer.write_usize_as_u16(70_000, "interfaces").unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::TooLarge { what: "interfaces", len: 70_000 }));
		assert_eq!(writer.written(), 0);
	}

	#[test]
	fn buffer_counts_from_offset() -> Result<()> {
		let mut buffer = ByteWriter::buffer(10);
		buffer.write_u32(0)?;
		assert_eq!(buffer.written(), 14);
		assert_eq!(buffer.into_inner().len(), 4);
		Ok(())
	}
}
