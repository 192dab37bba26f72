//! The constant pool.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4>.
//!
//! Everything else in a class file refers to pool entries by their raw `u16` index. Those indices are
//! only checked when they're dereferenced with [`ConstantPool::get`] or one of the typed getters.

use std::fmt::{Display, Formatter};
use std::io::Write;
use crate::cursor::{ByteReader, ByteWriter};
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, ErrorKind, PathContext, Result};

/// The tag bytes of the constant pool entries.
pub mod tag {
	pub const UTF8: u8 = 1;
	pub const INTEGER: u8 = 3;
	pub const FLOAT: u8 = 4;
	pub const LONG: u8 = 5;
	pub const DOUBLE: u8 = 6;
	pub const CLASS: u8 = 7;
	pub const STRING: u8 = 8;
	pub const FIELDREF: u8 = 9;
	pub const METHODREF: u8 = 10;
	pub const INTERFACE_METHODREF: u8 = 11;
	pub const NAME_AND_TYPE: u8 = 12;
	pub const METHOD_HANDLE: u8 = 15;
	pub const METHOD_TYPE: u8 = 16;
	pub const DYNAMIC: u8 = 17;
	pub const INVOKE_DYNAMIC: u8 = 18;
	pub const MODULE: u8 = 19;
	pub const PACKAGE: u8 = 20;
}

/// The kind of a [`CpInfo`], without its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpTag {
	Utf8,
	Integer,
	Float,
	Long,
	Double,
	Class,
	String,
	Fieldref,
	Methodref,
	InterfaceMethodref,
	NameAndType,
	MethodHandle,
	MethodType,
	Dynamic,
	InvokeDynamic,
	Module,
	Package,
}

impl CpTag {
	pub fn name(self) -> &'static str {
		match self {
			CpTag::Utf8 => "Utf8",
			CpTag::Integer => "Integer",
			CpTag::Float => "Float",
			CpTag::Long => "Long",
			CpTag::Double => "Double",
			CpTag::Class => "Class",
			CpTag::String => "String",
			CpTag::Fieldref => "Fieldref",
			CpTag::Methodref => "Methodref",
			CpTag::InterfaceMethodref => "InterfaceMethodref",
			CpTag::NameAndType => "NameAndType",
			CpTag::MethodHandle => "MethodHandle",
			CpTag::MethodType => "MethodType",
			CpTag::Dynamic => "Dynamic",
			CpTag::InvokeDynamic => "InvokeDynamic",
			CpTag::Module => "Module",
			CpTag::Package => "Package",
		}
	}

	pub fn byte(self) -> u8 {
		match self {
			CpTag::Utf8 => tag::UTF8,
			CpTag::Integer => tag::INTEGER,
			CpTag::Float => tag::FLOAT,
			CpTag::Long => tag::LONG,
			CpTag::Double => tag::DOUBLE,
			CpTag::Class => tag::CLASS,
			CpTag::String => tag::STRING,
			CpTag::Fieldref => tag::FIELDREF,
			CpTag::Methodref => tag::METHODREF,
			CpTag::InterfaceMethodref => tag::INTERFACE_METHODREF,
			CpTag::NameAndType => tag::NAME_AND_TYPE,
			CpTag::MethodHandle => tag::METHOD_HANDLE,
			CpTag::MethodType => tag::METHOD_TYPE,
			CpTag::Dynamic => tag::DYNAMIC,
			CpTag::InvokeDynamic => tag::INVOKE_DYNAMIC,
			CpTag::Module => tag::MODULE,
			CpTag::Package => tag::PACKAGE,
		}
	}
}

impl Display for CpTag {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// The contents of a `Fieldref`, `Methodref` or `InterfaceMethodref`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberRef {
	pub class_index: u16,
	pub name_and_type_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameAndType {
	pub name_index: u16,
	pub descriptor_index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle {
	/// One of the codes of [`ReferenceKind`](crate::resolve::ReferenceKind), stored raw so that invalid codes survive a round trip.
	pub reference_kind: u8,
	pub reference_index: u16,
}

/// The contents of a `Dynamic` or `InvokeDynamic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DynamicRef {
	/// An index into the `bootstrap_methods` of the `BootstrapMethods` attribute, not into the pool.
	pub bootstrap_method_attr_index: u16,
	pub name_and_type_index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CpInfo {
	/// Raw modified UTF-8, kept as bytes so that even invalid data is written back unchanged.
	Utf8 { bytes: Vec<u8> },
	Integer { bytes: u32 },
	Float { bytes: u32 },
	Long { bytes: u64 },
	Double { bytes: u64 },
	Class { name_index: u16 },
	String { string_index: u16 },
	Fieldref(MemberRef),
	Methodref(MemberRef),
	InterfaceMethodref(MemberRef),
	NameAndType(NameAndType),
	MethodHandle(MethodHandle),
	MethodType { descriptor_index: u16 },
	Dynamic(DynamicRef),
	InvokeDynamic(DynamicRef),
	Module { name_index: u16 },
	Package { name_index: u16 },
}

impl CpInfo {
	pub fn tag(&self) -> CpTag {
		match self {
			CpInfo::Utf8 { .. } => CpTag::Utf8,
			CpInfo::Integer { .. } => CpTag::Integer,
			CpInfo::Float { .. } => CpTag::Float,
			CpInfo::Long { .. } => CpTag::Long,
			CpInfo::Double { .. } => CpTag::Double,
			CpInfo::Class { .. } => CpTag::Class,
			CpInfo::String { .. } => CpTag::String,
			CpInfo::Fieldref(_) => CpTag::Fieldref,
			CpInfo::Methodref(_) => CpTag::Methodref,
			CpInfo::InterfaceMethodref(_) => CpTag::InterfaceMethodref,
			CpInfo::NameAndType(_) => CpTag::NameAndType,
			CpInfo::MethodHandle(_) => CpTag::MethodHandle,
			CpInfo::MethodType { .. } => CpTag::MethodType,
			CpInfo::Dynamic(_) => CpTag::Dynamic,
			CpInfo::InvokeDynamic(_) => CpTag::InvokeDynamic,
			CpInfo::Module { .. } => CpTag::Module,
			CpInfo::Package { .. } => CpTag::Package,
		}
	}

	/// The number of pool slots this entry takes: `Long` and `Double` take two.
	pub fn slots(&self) -> usize {
		match self {
			CpInfo::Long { .. } | CpInfo::Double { .. } => 2,
			_ => 1,
		}
	}

	fn read(reader: &mut ByteReader) -> Result<CpInfo> {
		let entry = match reader.read_u8()? {
			tag::UTF8 => {
				let length = reader.read_u16_as_usize()?;
				CpInfo::Utf8 { bytes: reader.read_u8_vec(length)? }
			},
			tag::INTEGER => CpInfo::Integer { bytes: reader.read_u32()? },
			tag::FLOAT => CpInfo::Float { bytes: reader.read_u32()? },
			tag::LONG => CpInfo::Long { bytes: reader.read_u64()? },
			tag::DOUBLE => CpInfo::Double { bytes: reader.read_u64()? },
			tag::CLASS => CpInfo::Class { name_index: reader.read_u16()? },
			tag::STRING => CpInfo::String { string_index: reader.read_u16()? },
			tag::FIELDREF => CpInfo::Fieldref(MemberRef::read(reader)?),
			tag::METHODREF => CpInfo::Methodref(MemberRef::read(reader)?),
			tag::INTERFACE_METHODREF => CpInfo::InterfaceMethodref(MemberRef::read(reader)?),
			tag::NAME_AND_TYPE => CpInfo::NameAndType(NameAndType {
				name_index: reader.read_u16()?,
				descriptor_index: reader.read_u16()?,
			}),
			tag::METHOD_HANDLE => CpInfo::MethodHandle(MethodHandle {
				reference_kind: reader.read_u8()?,
				reference_index: reader.read_u16()?,
			}),
			tag::METHOD_TYPE => CpInfo::MethodType { descriptor_index: reader.read_u16()? },
			tag::DYNAMIC => CpInfo::Dynamic(DynamicRef::read(reader)?),
			tag::INVOKE_DYNAMIC => CpInfo::InvokeDynamic(DynamicRef::read(reader)?),
			tag::MODULE => CpInfo::Module { name_index: reader.read_u16()? },
			tag::PACKAGE => CpInfo::Package { name_index: reader.read_u16()? },
			tag => return Err(ErrorKind::InvalidTag { what: "constant pool", tag }.into()),
		};
		Ok(entry)
	}

	fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
		writer.write_u8(self.tag().byte())?;
		match self {
			CpInfo::Utf8 { bytes } => {
				writer.write_usize_as_u16(bytes.len(), "Utf8 constant")?;
				writer.write_u8_slice(bytes)
			},
			CpInfo::Integer { bytes } | CpInfo::Float { bytes } => writer.write_u32(*bytes),
			CpInfo::Long { bytes } | CpInfo::Double { bytes } => writer.write_u64(*bytes),
			CpInfo::Class { name_index } => writer.write_u16(*name_index),
			CpInfo::String { string_index } => writer.write_u16(*string_index),
			CpInfo::Fieldref(member) | CpInfo::Methodref(member) | CpInfo::InterfaceMethodref(member) => {
				writer.write_u16(member.class_index)?;
				writer.write_u16(member.name_and_type_index)
			},
			CpInfo::NameAndType(name_and_type) => {
				writer.write_u16(name_and_type.name_index)?;
				writer.write_u16(name_and_type.descriptor_index)
			},
			CpInfo::MethodHandle(handle) => {
				writer.write_u8(handle.reference_kind)?;
				writer.write_u16(handle.reference_index)
			},
			CpInfo::MethodType { descriptor_index } => writer.write_u16(*descriptor_index),
			CpInfo::Dynamic(dynamic) | CpInfo::InvokeDynamic(dynamic) => {
				writer.write_u16(dynamic.bootstrap_method_attr_index)?;
				writer.write_u16(dynamic.name_and_type_index)
			},
			CpInfo::Module { name_index } | CpInfo::Package { name_index } => writer.write_u16(*name_index),
		}
	}
}

impl MemberRef {
	fn read(reader: &mut ByteReader) -> Result<MemberRef> {
		Ok(MemberRef {
			class_index: reader.read_u16()?,
			name_and_type_index: reader.read_u16()?,
		})
	}
}

impl DynamicRef {
	fn read(reader: &mut ByteReader) -> Result<DynamicRef> {
		Ok(DynamicRef {
			bootstrap_method_attr_index: reader.read_u16()?,
			name_and_type_index: reader.read_u16()?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Slot {
	/// Index zero, and the upper half of a `Long` or `Double`.
	Unusable,
	Entry(CpInfo),
}

/// The constant pool of a class file.
///
/// Slot zero is never used, and neither is the slot after a `Long` or `Double`, so
/// [`ConstantPool::count`] is the `constant_pool_count` item of the class file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstantPool {
	slots: Vec<Slot>,
}

impl Default for ConstantPool {
	fn default() -> Self {
		ConstantPool::new()
	}
}

pub(crate) fn mismatch(index: u16, expected: &'static str, found: &CpInfo) -> Error {
	ErrorKind::TypeMismatch { index, expected, found: found.tag() }.into()
}

impl ConstantPool {
	pub fn new() -> ConstantPool {
		ConstantPool { slots: vec![Slot::Unusable] }
	}

	/// The number of slots, including slot zero. This is what gets written as `constant_pool_count`.
	pub fn count(&self) -> usize {
		self.slots.len()
	}

	/// The number of entries, not counting unusable slots.
	pub fn len(&self) -> usize {
		self.iter().count()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.len() == 1
	}

	/// Appends an entry, returning its index. `Long` and `Double` also take up the slot after it.
	pub fn push(&mut self, entry: CpInfo) -> Result<u16> {
		let index = self.slots.len();
		let new_count = index + entry.slots();
		if new_count > u16::MAX as usize {
			return Err(ErrorKind::TooLarge { what: "constant pool", len: new_count }.into());
		}
		let wide = entry.slots() == 2;
		self.slots.push(Slot::Entry(entry));
		if wide {
			self.slots.push(Slot::Unusable);
		}
		// checked above
		Ok(index as u16)
	}

	/// Iterates over all entries with their indices, skipping unusable slots.
	pub fn iter(&self) -> impl Iterator<Item = (u16, &CpInfo)> + '_ {
		self.slots.iter()
			.enumerate()
			.filter_map(|(index, slot)| match slot {
				// the pool never has more than u16::MAX slots
				Slot::Entry(entry) => Some((index as u16, entry)),
				Slot::Unusable => None,
			})
	}

	pub fn get(&self, index: u16) -> Result<&CpInfo> {
		match self.slots.get(index as usize) {
			Some(Slot::Entry(entry)) => Ok(entry),
			Some(Slot::Unusable) if index != 0 => Err(ErrorKind::UnusableSlot { index }.into()),
			_ => Err(ErrorKind::IndexOutOfRange { what: "constant pool", index: index as usize, len: self.slots.len() }.into()),
		}
	}

	/// Like [`ConstantPool::get`], but index zero gives `None`. Used for items like `super_class` where zero means "absent".
	pub fn get_optional(&self, index: u16) -> Result<Option<&CpInfo>> {
		if index == 0 {
			Ok(None)
		} else {
			self.get(index).map(Some)
		}
	}

	pub fn get_utf8(&self, index: u16) -> Result<&[u8]> {
		match self.get(index)? {
			CpInfo::Utf8 { bytes } => Ok(bytes),
			entry => Err(mismatch(index, "Utf8", entry)),
		}
	}

	/// Returns the `name_index` of a `Class` entry.
	pub fn get_class(&self, index: u16) -> Result<u16> {
		match self.get(index)? {
			CpInfo::Class { name_index } => Ok(*name_index),
			entry => Err(mismatch(index, "Class", entry)),
		}
	}

	/// Returns the `string_index` of a `String` entry.
	pub fn get_string(&self, index: u16) -> Result<u16> {
		match self.get(index)? {
			CpInfo::String { string_index } => Ok(*string_index),
			entry => Err(mismatch(index, "String", entry)),
		}
	}

	pub fn get_name_and_type(&self, index: u16) -> Result<&NameAndType> {
		match self.get(index)? {
			CpInfo::NameAndType(name_and_type) => Ok(name_and_type),
			entry => Err(mismatch(index, "NameAndType", entry)),
		}
	}

	pub fn get_field_ref(&self, index: u16) -> Result<&MemberRef> {
		match self.get(index)? {
			CpInfo::Fieldref(member) => Ok(member),
			entry => Err(mismatch(index, "Fieldref", entry)),
		}
	}

	pub fn get_method_ref(&self, index: u16) -> Result<&MemberRef> {
		match self.get(index)? {
			CpInfo::Methodref(member) => Ok(member),
			entry => Err(mismatch(index, "Methodref", entry)),
		}
	}

	pub fn get_interface_method_ref(&self, index: u16) -> Result<&MemberRef> {
		match self.get(index)? {
			CpInfo::InterfaceMethodref(member) => Ok(member),
			entry => Err(mismatch(index, "InterfaceMethodref", entry)),
		}
	}

	/// `true` indicates it was an `InterfaceMethodref`, `false` that it was a `Methodref`.
	pub fn get_method_ref_or_interface_method_ref(&self, index: u16) -> Result<(&MemberRef, bool)> {
		match self.get(index)? {
			CpInfo::Methodref(member) => Ok((member, false)),
			CpInfo::InterfaceMethodref(member) => Ok((member, true)),
			entry => Err(mismatch(index, "Methodref or InterfaceMethodref", entry)),
		}
	}

	pub fn get_method_handle(&self, index: u16) -> Result<&MethodHandle> {
		match self.get(index)? {
			CpInfo::MethodHandle(handle) => Ok(handle),
			entry => Err(mismatch(index, "MethodHandle", entry)),
		}
	}

	/// Returns the `descriptor_index` of a `MethodType` entry.
	pub fn get_method_type(&self, index: u16) -> Result<u16> {
		match self.get(index)? {
			CpInfo::MethodType { descriptor_index } => Ok(*descriptor_index),
			entry => Err(mismatch(index, "MethodType", entry)),
		}
	}

	pub fn get_invoke_dynamic(&self, index: u16) -> Result<&DynamicRef> {
		match self.get(index)? {
			CpInfo::InvokeDynamic(dynamic) => Ok(dynamic),
			entry => Err(mismatch(index, "InvokeDynamic", entry)),
		}
	}

	/// Reads the `constant_pool_count` and `constant_pool` items.
	///
	/// On error nothing of the pool read so far is returned.
	pub(crate) fn read(reader: &mut ByteReader, sink: &mut dyn DiagnosticSink) -> Result<ConstantPool> {
		let count = reader.read_u16_as_usize().at("constant_pool_count")?;
		if count == 0 {
			return Err(ErrorKind::InvalidCount { what: "constant pool", count }).at("constant_pool_count");
		}

		let mut slots = Vec::with_capacity(count);
		slots.push(Slot::Unusable);
		while slots.len() < count {
			let index = slots.len();
			let offset = reader.offset();
			let entry = CpInfo::read(reader).at_index(index).at("constant_pool")?;
			sink.read(offset, format_args!("constant pool entry {index}: {entry:?}"));

			let wide = entry.slots() == 2;
			slots.push(Slot::Entry(entry));
			if wide {
				// the upper slot of a long or double must still be inside the pool
				if slots.len() >= count {
					return Err(ErrorKind::IndexOutOfRange { what: "constant pool", index: slots.len(), len: count })
						.at_index(index)
						.at("constant_pool");
				}
				slots.push(Slot::Unusable);
			}
		}

		Ok(ConstantPool { slots })
	}

	pub(crate) fn write<W: Write>(&self, writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		writer.write_usize_as_u16(self.slots.len(), "constant pool").at("constant_pool_count")?;
		for (index, entry) in self.iter() {
			let offset = writer.written();
			entry.write(writer).at_index(index as usize).at("constant_pool")?;
			sink.wrote(offset, format_args!("constant pool entry {index}: {entry:?}"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::cursor::{ByteReader, ByteWriter};
	use crate::error::{ErrorKind, Result};
	use crate::pool::{ConstantPool, CpInfo, CpTag, MemberRef, NameAndType};

	fn read(bytes: &[u8]) -> Result<ConstantPool> {
		ConstantPool::read(&mut ByteReader::new(bytes), &mut ())
	}

	fn write(pool: &ConstantPool) -> Result<Vec<u8>> {
		let mut writer = ByteWriter::new(Vec::new());
		pool.write(&mut writer, &mut ())?;
		Ok(writer.into_inner())
	}

	#[test]
	fn long_and_double_take_two_slots() -> Result<()> {
		let bytes = [
			0x00, 0x08, // count: 7 addressable slots
			0x01, 0x00, 0x01, b'a', // 1: Utf8 "a"
			0x05, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, // 2 (and 3): Long
			0x06, 0x3f, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 4 (and 5): Double 1.0
			0x03, 0x00, 0x00, 0x00, 0x2a, // 6: Integer 42
			0x07, 0x00, 0x01, // 7: Class "a"
		];

		let pool = read(&bytes)?;
		assert_eq!(pool.count(), 8);
		assert_eq!(pool.len(), 5);

		assert_eq!(pool.get_utf8(1)?, b"a");
		assert_eq!(pool.get(2)?, &CpInfo::Long { bytes: 0x0000_0001_0000_0002 });
		assert_eq!(pool.get(4)?, &CpInfo::Double { bytes: 1.0f64.to_bits() });
		assert_eq!(pool.get(6)?, &CpInfo::Integer { bytes: 42 });
		assert_eq!(pool.get_class(7)?, 1);

		assert!(matches!(pool.get(3).unwrap_err().kind(), ErrorKind::UnusableSlot { index: 3 }));
		assert!(matches!(pool.get(5).unwrap_err().kind(), ErrorKind::UnusableSlot { index: 5 }));
		assert!(matches!(pool.get(0).unwrap_err().kind(), ErrorKind::IndexOutOfRange { index: 0, .. }));
		assert!(matches!(pool.get(8).unwrap_err().kind(), ErrorKind::IndexOutOfRange { index: 8, len: 8, .. }));

		let indices: Vec<u16> = pool.iter().map(|(index, _)| index).collect();
		assert_eq!(indices, vec![1, 2, 4, 6, 7]);

		assert_eq!(write(&pool)?, bytes);
		Ok(())
	}

	#[test]
	fn invalid_tag() {
		let bytes = [
			0x00, 0x04,
			0x01, 0x00, 0x01, b'a',
			0xff, 0x00, 0x01,
			0x07, 0x00, 0x01,
		];

		let error = read(&bytes).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::InvalidTag { what: "constant pool", tag: 0xff }));
		assert_eq!(error.path(), "constant_pool[2]");
	}

	#[test]
	fn long_in_last_slot() {
		let bytes = [
			0x00, 0x02,
			0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
		];

		let error = read(&bytes).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::IndexOutOfRange { index: 2, len: 2, .. }));
	}

	#[test]
	fn zero_count() {
		let error = read(&[0x00, 0x00]).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::InvalidCount { count: 0, .. }));
	}

	#[test]
	fn type_mismatch() -> Result<()> {
		let mut pool = ConstantPool::new();
		let name = pool.push(CpInfo::Utf8 { bytes: b"foo".to_vec() })?;
		let descriptor = pool.push(CpInfo::Utf8 { bytes: b"I".to_vec() })?;
		let name_and_type = pool.push(CpInfo::NameAndType(NameAndType { name_index: name, descriptor_index: descriptor }))?;
		let field = pool.push(CpInfo::Fieldref(MemberRef { class_index: 0, name_and_type_index: name_and_type }))?;

		assert_eq!(pool.get_field_ref(field)?.name_and_type_index, name_and_type);

		let error = pool.get_method_ref(field).unwrap_err();
		assert!(matches!(
			error.kind(),
			ErrorKind::TypeMismatch { index: 4, expected: "Methodref", found: CpTag::Fieldref }
		));

		let error = pool.get_utf8(name_and_type).unwrap_err();
		assert_eq!(error.to_string(), "constant pool entry 3 is `NameAndType`, expected `Utf8`");
		Ok(())
	}

	#[test]
	fn push_wide() -> Result<()> {
		let mut pool = ConstantPool::new();
		assert!(pool.is_empty());
		assert_eq!(pool.push(CpInfo::Double { bytes: 0 })?, 1);
		assert_eq!(pool.push(CpInfo::Integer { bytes: 0 })?, 3);
		assert_eq!(pool.count(), 4);
		assert!(matches!(pool.get(2).unwrap_err().kind(), ErrorKind::UnusableSlot { index: 2 }));
		Ok(())
	}
}
