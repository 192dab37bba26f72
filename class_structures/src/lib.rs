//! This crate contains a direct binary representation of a java class file.
//!
//! Use the [Java Virtual Machine Specification, Chapter 4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html)
//! as the reference for all the structures here.
//!
//! Reading a class file and writing it again gives the same bytes. Indices into the constant pool are kept
//! as raw `u16`, and are only checked when they're looked up, with [`ConstantPool::get`] and friends.
//! The only exceptions are the names of attributes (these are needed to know how to read one) and the
//! `method_ref` of bootstrap methods, which must point to a `MethodHandle`.
//!
//! This creates the same class as `javac` version `1.8_402` would, if ran on the class
//! ```java,ignore
//! package org.example;
//!
//! class Main {}
//! ```
//!
//! ```
//! # use pretty_assertions::assert_eq;
//! use class_structures::{flags, AttributeInfo, ClassFile, ConstantPool, CpInfo, LineNumberTableEntry, MethodInfo};
//! use class_structures::pool::{MemberRef, NameAndType};
//! # fn main() -> class_structures::Result<()> {
//! let mut pool = ConstantPool::new();
//! let init = pool.push(CpInfo::Utf8 { bytes: b"<init>".to_vec() })?;
//! let void = pool.push(CpInfo::Utf8 { bytes: b"()V".to_vec() })?;
//! let code = pool.push(CpInfo::Utf8 { bytes: b"Code".to_vec() })?;
//! let line_numbers = pool.push(CpInfo::Utf8 { bytes: b"LineNumberTable".to_vec() })?;
//! let source_file = pool.push(CpInfo::Utf8 { bytes: b"SourceFile".to_vec() })?;
//! let main_java = pool.push(CpInfo::Utf8 { bytes: b"Main.java".to_vec() })?;
//! let main_name = pool.push(CpInfo::Utf8 { bytes: b"org/example/Main".to_vec() })?;
//! let object_name = pool.push(CpInfo::Utf8 { bytes: b"java/lang/Object".to_vec() })?;
//! let main = pool.push(CpInfo::Class { name_index: main_name })?;
//! let object = pool.push(CpInfo::Class { name_index: object_name })?;
//! let init_void = pool.push(CpInfo::NameAndType(NameAndType { name_index: init, descriptor_index: void }))?;
//! let super_init = pool.push(CpInfo::Methodref(MemberRef { class_index: object, name_and_type_index: init_void }))?;
//! let [high, low] = super_init.to_be_bytes();
//!
//! let class = ClassFile {
//!     minor_version: 0,
//!     major_version: 52,
//!     constant_pool: pool,
//!     access_flags: flags::ACC_SUPER,
//!     this_class: main,
//!     super_class: object,
//!     interfaces: vec![],
//!     fields: vec![],
//!     methods: vec![
//!         MethodInfo {
//!             access_flags: 0,
//!             name_index: init,
//!             descriptor_index: void,
//!             attributes: vec![
//!                 AttributeInfo::Code {
//!                     attribute_name_index: code,
//!                     max_stack: 1,
//!                     max_locals: 1,
//!                     // aload_0, invokespecial, return
//!                     code: vec![0x2a, 0xb7, high, low, 0xb1],
//!                     exception_table: vec![],
//!                     attributes: vec![
//!                         AttributeInfo::LineNumberTable {
//!                             attribute_name_index: line_numbers,
//!                             line_number_table: vec![
//!                                 LineNumberTableEntry { start_pc: 0, line_number: 3 },
//!                             ],
//!                         },
//!                     ],
//!                 },
//!             ],
//!         },
//!     ],
//!     attributes: vec![
//!         AttributeInfo::SourceFile {
//!             attribute_name_index: source_file,
//!             sourcefile_index: main_java,
//!         },
//!     ],
//! };
//!
//! let bytes = class.to_bytes()?;
//! let class_2 = ClassFile::from_bytes(&bytes)?;
//! assert_eq!(class, class_2);
//! assert_eq!(class_2.this_class_name()?, "org/example/Main");
//! assert_eq!(class_2.to_bytes()?, bytes);
//! # Ok(())
//! # }
//! ```
//!
//! Reading and writing can report what they do to a [`DiagnosticSink`], see [`ClassFile::read_with`] and
//! [`ClassFile::write_with`].

use std::io::{Read, Write};
use crate::attribute::Decoder;
use crate::cursor::{ByteReader, ByteWriter};
use crate::error::PathContext;

pub mod attribute;
mod cursor;
pub mod diagnostics;
pub mod error;
pub mod flags;
mod jstring;
pub mod member;
pub mod pool;
pub mod resolve;
pub mod version;

pub use attribute::{
	find_attribute, Annotation, AttributeInfo, AttributeKind, BootstrapMethodEntry, ElementValue, ElementValuePair,
	ExceptionTableEntry, InnerClassesEntry, LineNumberTableEntry, LocalVariableTableEntry, LocalVariableTypeTableEntry,
	MethodParametersEntry, Node, RecordComponentInfo, StackMapFrame, VerificationTypeInfo,
};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use error::{Error, ErrorKind, Result};
pub use member::{FieldInfo, MethodInfo};
pub use pool::{ConstantPool, CpInfo, CpTag};
pub use resolve::ReferenceKind;
pub use version::Release;

pub const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassFile {
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: u16,
	pub this_class: u16,
	/// Zero for `java/lang/Object`, and for `module-info`.
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<FieldInfo>,
	pub methods: Vec<MethodInfo>,
	pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
	/// Reads everything from `reader` and decodes it as a class file.
	pub fn read(reader: &mut impl Read) -> Result<ClassFile> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		ClassFile::from_bytes(&bytes)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile> {
		ClassFile::read_with(bytes, &mut ())
	}

	/// Decodes a class file, reporting every record read to `sink`.
	///
	/// The whole input must be used up by the class file.
	pub fn read_with(bytes: &[u8], sink: &mut dyn DiagnosticSink) -> Result<ClassFile> {
		let mut reader = ByteReader::new(bytes);

		let magic = reader.read_u32().at("magic")?;
		if magic != MAGIC {
			return Err(ErrorKind::BadMagic { found: magic }).at("magic");
		}
		let minor_version = reader.read_u16().at("minor_version")?;
		let major_version = reader.read_u16().at("major_version")?;
		sink.read(0, format_args!("header, version {major_version}.{minor_version}"));

		let constant_pool = ConstantPool::read(&mut reader, sink)?;

		let offset = reader.offset();
		let access_flags = reader.read_u16().at("access_flags")?;
		let this_class = reader.read_u16().at("this_class")?;
		let super_class = reader.read_u16().at("super_class")?;
		let interfaces = reader.read_vec(|r| r.read_u16_as_usize(), |r| r.read_u16()).at("interfaces")?;
		sink.read(offset, format_args!("access flags {access_flags:#06x}, this class #{this_class}, super class #{super_class}, {} interfaces", interfaces.len()));

		let mut decoder = Decoder::new(&constant_pool, sink);
		let fields = reader.read_vec(|r| r.read_u16_as_usize(), |r| FieldInfo::read(r, &mut decoder)).at("fields")?;
		let methods = reader.read_vec(|r| r.read_u16_as_usize(), |r| MethodInfo::read(r, &mut decoder)).at("methods")?;
		let attributes = AttributeInfo::read_all(&mut reader, &mut decoder)?;

		if !reader.is_empty() {
			return Err(ErrorKind::TrailingBytes { offset: reader.offset(), count: reader.remaining() }.into());
		}

		Ok(ClassFile {
			minor_version,
			major_version,
			constant_pool,
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		})
	}

	pub fn write(&self, writer: &mut impl Write) -> Result<()> {
		self.write_with(writer, &mut ())
	}

	/// Encodes the class file, reporting every record written to `sink`.
	///
	/// All counts and lengths are computed from the contents.
	pub fn write_with(&self, writer: &mut impl Write, sink: &mut dyn DiagnosticSink) -> Result<()> {
		let mut writer = ByteWriter::new(writer);

		writer.write_u32(MAGIC)?;
		writer.write_u16(self.minor_version)?;
		writer.write_u16(self.major_version)?;
		sink.wrote(0, format_args!("header, version {}.{}", self.major_version, self.minor_version));

		self.constant_pool.write(&mut writer, sink)?;

		let offset = writer.written();
		writer.write_u16(self.access_flags)?;
		writer.write_u16(self.this_class)?;
		writer.write_u16(self.super_class)?;
		writer.write_slice(&self.interfaces, |w, len| w.write_usize_as_u16(len, "interfaces"), |w, &interface| w.write_u16(interface))
			.at("interfaces")?;
		sink.wrote(offset, format_args!("access flags, this and super class, {} interfaces", self.interfaces.len()));

		writer.write_slice(&self.fields, |w, len| w.write_usize_as_u16(len, "fields"), |w, field| field.write(w, sink))
			.at("fields")?;
		writer.write_slice(&self.methods, |w, len| w.write_usize_as_u16(len, "methods"), |w, method| method.write(w, sink))
			.at("methods")?;
		AttributeInfo::write_all(&self.attributes, &mut writer, sink)?;

		Ok(())
	}

	/// Converts the class file to binary representation.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut vec = Vec::new();
		self.write(&mut vec)?;
		Ok(vec)
	}

	/// The release that introduced the major version of this class file, if it's a known one.
	pub fn release(&self) -> Option<Release> {
		Release::from_major(self.major_version)
	}

	pub fn this_class_name(&self) -> Result<String> {
		let name_index = self.constant_pool.get_class(self.this_class).at("this_class")?;
		self.constant_pool.utf8_text(name_index).at("this_class")
	}

	/// `None` if there's no super class.
	pub fn super_class_name(&self) -> Result<Option<String>> {
		if self.super_class == 0 {
			return Ok(None);
		}
		let name_index = self.constant_pool.get_class(self.super_class).at("super_class")?;
		self.constant_pool.utf8_text(name_index).map(Some).at("super_class")
	}

	/// The entries of the `BootstrapMethods` attribute of the class, if it has one.
	pub fn bootstrap_methods(&self) -> Option<&[BootstrapMethodEntry]> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::BootstrapMethods { bootstrap_methods, .. } => Some(bootstrap_methods.as_slice()),
			_ => None,
		})
	}

	/// The name index for the bootstrap method at `index`, as used by `Dynamic` and `InvokeDynamic` entries.
	///
	/// See [`BootstrapMethodEntry::defining_name_index`].
	pub fn bootstrap_method_name_index(&self, index: usize) -> Result<u16> {
		let bootstrap_methods = self.bootstrap_methods().unwrap_or_default();
		let entry = bootstrap_methods.get(index)
			.ok_or(ErrorKind::IndexOutOfRange { what: "bootstrap methods", index, len: bootstrap_methods.len() })?;
		entry.defining_name_index(&self.constant_pool)
	}
}
