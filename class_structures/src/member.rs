use std::io::Write;
use crate::attribute::{AttributeInfo, Decoder};
use crate::cursor::{ByteReader, ByteWriter};
use crate::diagnostics::DiagnosticSink;
use crate::error::{PathContext, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

/// Fields and methods share the same layout.
fn read_member(reader: &mut ByteReader, decoder: &mut Decoder, what: &str) -> Result<(u16, u16, u16, Vec<AttributeInfo>)> {
	let offset = reader.offset();
	let access_flags = reader.read_u16().at("access_flags")?;
	let name_index = reader.read_u16().at("name_index")?;
	let descriptor_index = reader.read_u16().at("descriptor_index")?;
	let attributes = AttributeInfo::read_all(reader, decoder)?;

	let name = decoder.pool().utf8_text(name_index).unwrap_or_else(|_| format!("#{name_index}"));
	decoder.sink().read(offset, format_args!("{what} {name}, {} attributes", attributes.len()));
	Ok((access_flags, name_index, descriptor_index, attributes))
}

fn write_member<W: Write>(
	writer: &mut ByteWriter<W>,
	sink: &mut dyn DiagnosticSink,
	access_flags: u16,
	name_index: u16,
	descriptor_index: u16,
	attributes: &[AttributeInfo],
) -> Result<()> {
	writer.write_u16(access_flags)?;
	writer.write_u16(name_index)?;
	writer.write_u16(descriptor_index)?;
	AttributeInfo::write_all(attributes, writer, sink)
}

impl FieldInfo {
	pub(crate) fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<FieldInfo> {
		let (access_flags, name_index, descriptor_index, attributes) = read_member(reader, decoder, "field")?;
		Ok(FieldInfo { access_flags, name_index, descriptor_index, attributes })
	}

	pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		write_member(writer, sink, self.access_flags, self.name_index, self.descriptor_index, &self.attributes)
	}
}

impl MethodInfo {
	pub(crate) fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<MethodInfo> {
		let (access_flags, name_index, descriptor_index, attributes) = read_member(reader, decoder, "method")?;
		Ok(MethodInfo { access_flags, name_index, descriptor_index, attributes })
	}

	pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		write_member(writer, sink, self.access_flags, self.name_index, self.descriptor_index, &self.attributes)
	}
}
