//! Following indices through the constant pool.
//!
//! Method handles are resolved by their reference kind: see
//! <https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4.8> for which pool entries each kind
//! may point to.

use std::fmt::{Display, Formatter};
use crate::attribute::BootstrapMethodEntry;
use crate::error::{ErrorKind, PathContext, Result};
use crate::jstring::to_display_string;
use crate::pool::{mismatch, ConstantPool, CpInfo, MemberRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReferenceKind {
	GetField = 1,
	GetStatic = 2,
	PutField = 3,
	PutStatic = 4,
	InvokeVirtual = 5,
	InvokeStatic = 6,
	InvokeSpecial = 7,
	NewInvokeSpecial = 8,
	InvokeInterface = 9,
}

impl ReferenceKind {
	pub fn from_u8(code: u8) -> Result<ReferenceKind> {
		let kind = match code {
			1 => ReferenceKind::GetField,
			2 => ReferenceKind::GetStatic,
			3 => ReferenceKind::PutField,
			4 => ReferenceKind::PutStatic,
			5 => ReferenceKind::InvokeVirtual,
			6 => ReferenceKind::InvokeStatic,
			7 => ReferenceKind::InvokeSpecial,
			8 => ReferenceKind::NewInvokeSpecial,
			9 => ReferenceKind::InvokeInterface,
			tag => return Err(ErrorKind::InvalidTag { what: "method handle reference kind", tag }.into()),
		};
		Ok(kind)
	}

	pub fn code(self) -> u8 {
		self as u8
	}

	pub fn name(self) -> &'static str {
		match self {
			ReferenceKind::GetField => "REF_getField",
			ReferenceKind::GetStatic => "REF_getStatic",
			ReferenceKind::PutField => "REF_putField",
			ReferenceKind::PutStatic => "REF_putStatic",
			ReferenceKind::InvokeVirtual => "REF_invokeVirtual",
			ReferenceKind::InvokeStatic => "REF_invokeStatic",
			ReferenceKind::InvokeSpecial => "REF_invokeSpecial",
			ReferenceKind::NewInvokeSpecial => "REF_newInvokeSpecial",
			ReferenceKind::InvokeInterface => "REF_invokeInterface",
		}
	}

	/// The bytecode behaviour of a method handle of this kind, for a class `C`, field `f` or method `m`,
	/// argument types `A*` and type `T`.
	pub fn interpretation(self) -> &'static str {
		match self {
			ReferenceKind::GetField => "getfield C.f:T",
			ReferenceKind::GetStatic => "getstatic C.f:T",
			ReferenceKind::PutField => "putfield C.f:T",
			ReferenceKind::PutStatic => "putstatic C.f:T",
			ReferenceKind::InvokeVirtual => "invokevirtual C.m:(A*)T",
			ReferenceKind::InvokeStatic => "invokestatic C.m:(A*)T",
			ReferenceKind::InvokeSpecial => "invokespecial C.m:(A*)T",
			ReferenceKind::NewInvokeSpecial => "new C; dup; invokespecial C.<init>:(A*)V",
			ReferenceKind::InvokeInterface => "invokeinterface C.m:(A*)T",
		}
	}

	pub fn is_field(self) -> bool {
		matches!(self, ReferenceKind::GetField | ReferenceKind::GetStatic | ReferenceKind::PutField | ReferenceKind::PutStatic)
	}
}

impl Display for ReferenceKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

impl ConstantPool {
	/// Gets the `Fieldref`, `Methodref` or `InterfaceMethodref` a method handle of the given kind may point to.
	pub fn get_handle_member(&self, kind: ReferenceKind, index: u16) -> Result<&MemberRef> {
		match kind {
			ReferenceKind::GetField | ReferenceKind::GetStatic | ReferenceKind::PutField | ReferenceKind::PutStatic => {
				self.get_field_ref(index)
			},
			// since class files of version 52
			ReferenceKind::InvokeStatic | ReferenceKind::InvokeSpecial => {
				self.get_method_ref_or_interface_method_ref(index).map(|(member, _)| member)
			},
			ReferenceKind::InvokeVirtual | ReferenceKind::NewInvokeSpecial => self.get_method_ref(index),
			ReferenceKind::InvokeInterface => self.get_interface_method_ref(index),
		}
	}

	/// Follows a `MethodHandle` entry to the `name_index` of the member it refers to.
	pub fn method_handle_name_index(&self, index: u16) -> Result<u16> {
		let handle = self.get_method_handle(index)?;
		let kind = ReferenceKind::from_u8(handle.reference_kind).at("reference_kind")?;
		let member = self.get_handle_member(kind, handle.reference_index).at("reference_index")?;
		let name_and_type = self.get_name_and_type(member.name_and_type_index).at("name_and_type_index")?;
		Ok(name_and_type.name_index)
	}

	/// The contents of a `Utf8` entry, decoded for display.
	pub fn utf8_text(&self, index: u16) -> Result<String> {
		self.get_utf8(index).map(to_display_string)
	}

	/// A short human readable text for any entry.
	///
	/// Entries pointing to a `Utf8` entry give its text, member references give `class.name`, and
	/// numeric entries give their value.
	pub fn display_name(&self, index: u16) -> Result<String> {
		match self.get(index)? {
			CpInfo::Utf8 { bytes } => Ok(to_display_string(bytes)),
			CpInfo::Integer { bytes } => Ok((*bytes as i32).to_string()),
			CpInfo::Float { bytes } => Ok(f32::from_bits(*bytes).to_string()),
			CpInfo::Long { bytes } => Ok((*bytes as i64).to_string()),
			CpInfo::Double { bytes } => Ok(f64::from_bits(*bytes).to_string()),
			CpInfo::Class { name_index }
			| CpInfo::Module { name_index }
			| CpInfo::Package { name_index } => self.utf8_text(*name_index).at("name_index"),
			CpInfo::String { string_index } => self.utf8_text(*string_index).at("string_index"),
			CpInfo::MethodType { descriptor_index } => self.utf8_text(*descriptor_index).at("descriptor_index"),
			CpInfo::NameAndType(name_and_type) => self.utf8_text(name_and_type.name_index).at("name_index"),
			CpInfo::Fieldref(member) | CpInfo::Methodref(member) | CpInfo::InterfaceMethodref(member) => {
				let class_name = self.get_class(member.class_index)
					.and_then(|name_index| self.utf8_text(name_index))
					.at("class_index")?;
				let name_and_type = self.get_name_and_type(member.name_and_type_index).at("name_and_type_index")?;
				let name = self.utf8_text(name_and_type.name_index).at("name_and_type_index")?;
				Ok(format!("{class_name}.{name}"))
			},
			CpInfo::MethodHandle(handle) => self.display_name(handle.reference_index).at("reference_index"),
			CpInfo::Dynamic(dynamic) | CpInfo::InvokeDynamic(dynamic) => {
				let name_and_type = self.get_name_and_type(dynamic.name_and_type_index).at("name_and_type_index")?;
				self.utf8_text(name_and_type.name_index).at("name_and_type_index")
			},
		}
	}

	/// The descriptor of an entry that has one: `NameAndType`, member references, `MethodType`,
	/// `MethodHandle`, `Dynamic` and `InvokeDynamic`.
	pub fn descriptor(&self, index: u16) -> Result<String> {
		let entry = self.get(index)?;
		let name_and_type_index = match entry {
			CpInfo::NameAndType(name_and_type) => {
				return self.utf8_text(name_and_type.descriptor_index).at("descriptor_index");
			},
			CpInfo::MethodType { descriptor_index } => {
				return self.utf8_text(*descriptor_index).at("descriptor_index");
			},
			CpInfo::MethodHandle(handle) => {
				return self.descriptor(handle.reference_index).at("reference_index");
			},
			CpInfo::Fieldref(member) | CpInfo::Methodref(member) | CpInfo::InterfaceMethodref(member) => {
				member.name_and_type_index
			},
			CpInfo::Dynamic(dynamic) | CpInfo::InvokeDynamic(dynamic) => dynamic.name_and_type_index,
			entry => return Err(mismatch(index, "entry with a descriptor", entry)),
		};
		let name_and_type = self.get_name_and_type(name_and_type_index).at("name_and_type_index")?;
		self.utf8_text(name_and_type.descriptor_index).at("name_and_type_index")
	}
}

impl BootstrapMethodEntry {
	/// The `name_index` of the member the method handle of this entry refers to.
	///
	/// Any failure along the way is returned as [`ErrorKind::Unresolvable`] for the `method_ref`.
	pub fn defining_name_index(&self, pool: &ConstantPool) -> Result<u16> {
		pool.method_handle_name_index(self.method_ref)
			.map_err(|source| ErrorKind::Unresolvable { index: self.method_ref, source: Box::new(source) }.into())
	}

	/// The text of [`BootstrapMethodEntry::defining_name_index`].
	pub fn defining_name(&self, pool: &ConstantPool) -> Result<String> {
		let name_index = self.defining_name_index(pool)?;
		pool.utf8_text(name_index)
			.map_err(|source| ErrorKind::Unresolvable { index: self.method_ref, source: Box::new(source) }.into())
	}
}
