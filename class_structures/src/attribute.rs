//! Attributes, and the structures nested inside of them.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7>.
//!
//! An attribute is dispatched on the `Utf8` pool entry its `attribute_name_index` points to. Attributes with
//! names not known here are kept as [`AttributeInfo::Other`], with their contents untouched.
//!
//! The `attribute_length` item is never stored. It's computed from the contents when writing, so
//! editing an attribute can't leave a stale length behind.

use std::io::Write;
use crate::cursor::{ByteReader, ByteWriter};
use crate::diagnostics::DiagnosticSink;
use crate::error::{ErrorKind, PathContext, Result};
use crate::jstring::to_display_string;
use crate::pool::ConstantPool;

/// How deep attributes and element values may be nested inside each other when reading.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
	ConstantValue,
	Code,
	StackMapTable,
	Exceptions,
	InnerClasses,
	EnclosingMethod,
	Synthetic,
	Signature,
	SourceFile,
	SourceDebugExtension,
	LineNumberTable,
	LocalVariableTable,
	LocalVariableTypeTable,
	Deprecated,
	RuntimeVisibleAnnotations,
	RuntimeInvisibleAnnotations,
	RuntimeVisibleParameterAnnotations,
	RuntimeInvisibleParameterAnnotations,
	AnnotationDefault,
	BootstrapMethods,
	MethodParameters,
	NestHost,
	NestMembers,
	PermittedSubclasses,
	ModulePackages,
	ModuleMainClass,
	Record,
	/// Any attribute with a name not in this list.
	Other,
}

const KNOWN_ATTRIBUTES: [(&str, AttributeKind); 27] = [
	("ConstantValue", AttributeKind::ConstantValue),
	("Code", AttributeKind::Code),
	("StackMapTable", AttributeKind::StackMapTable),
	("Exceptions", AttributeKind::Exceptions),
	("InnerClasses", AttributeKind::InnerClasses),
	("EnclosingMethod", AttributeKind::EnclosingMethod),
	("Synthetic", AttributeKind::Synthetic),
	("Signature", AttributeKind::Signature),
	("SourceFile", AttributeKind::SourceFile),
	("SourceDebugExtension", AttributeKind::SourceDebugExtension),
	("LineNumberTable", AttributeKind::LineNumberTable),
	("LocalVariableTable", AttributeKind::LocalVariableTable),
	("LocalVariableTypeTable", AttributeKind::LocalVariableTypeTable),
	("Deprecated", AttributeKind::Deprecated),
	("RuntimeVisibleAnnotations", AttributeKind::RuntimeVisibleAnnotations),
	("RuntimeInvisibleAnnotations", AttributeKind::RuntimeInvisibleAnnotations),
	("RuntimeVisibleParameterAnnotations", AttributeKind::RuntimeVisibleParameterAnnotations),
	("RuntimeInvisibleParameterAnnotations", AttributeKind::RuntimeInvisibleParameterAnnotations),
	("AnnotationDefault", AttributeKind::AnnotationDefault),
	("BootstrapMethods", AttributeKind::BootstrapMethods),
	("MethodParameters", AttributeKind::MethodParameters),
	("NestHost", AttributeKind::NestHost),
	("NestMembers", AttributeKind::NestMembers),
	("PermittedSubclasses", AttributeKind::PermittedSubclasses),
	("ModulePackages", AttributeKind::ModulePackages),
	("ModuleMainClass", AttributeKind::ModuleMainClass),
	("Record", AttributeKind::Record),
];

impl AttributeKind {
	/// Looks up the kind for the raw contents of the `Utf8` entry naming an attribute.
	pub fn from_name(name: &[u8]) -> AttributeKind {
		KNOWN_ATTRIBUTES.iter()
			.find(|(known, _)| known.as_bytes() == name)
			.map_or(AttributeKind::Other, |&(_, kind)| kind)
	}

	/// The attribute name, or `None` for [`AttributeKind::Other`].
	pub fn name(self) -> Option<&'static str> {
		KNOWN_ATTRIBUTES.iter()
			.find(|(_, kind)| *kind == self)
			.map(|&(name, _)| name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeInfo {
	ConstantValue {
		attribute_name_index: u16,
		constantvalue_index: u16,
	},
	Code {
		attribute_name_index: u16,
		max_stack: u16,
		max_locals: u16,
		code: Vec<u8>,
		exception_table: Vec<ExceptionTableEntry>,
		attributes: Vec<AttributeInfo>,
	},
	StackMapTable {
		attribute_name_index: u16,
		entries: Vec<StackMapFrame>,
	},
	Exceptions {
		attribute_name_index: u16,
		exception_index_table: Vec<u16>,
	},
	InnerClasses {
		attribute_name_index: u16,
		classes: Vec<InnerClassesEntry>,
	},
	EnclosingMethod {
		attribute_name_index: u16,
		class_index: u16,
		/// Zero if the class isn't enclosed by a method.
		method_index: u16,
	},
	Synthetic {
		attribute_name_index: u16,
	},
	Signature {
		attribute_name_index: u16,
		signature_index: u16,
	},
	SourceFile {
		attribute_name_index: u16,
		sourcefile_index: u16,
	},
	SourceDebugExtension {
		attribute_name_index: u16,
		debug_extension: Vec<u8>,
	},
	LineNumberTable {
		attribute_name_index: u16,
		line_number_table: Vec<LineNumberTableEntry>,
	},
	LocalVariableTable {
		attribute_name_index: u16,
		local_variable_table: Vec<LocalVariableTableEntry>,
	},
	LocalVariableTypeTable {
		attribute_name_index: u16,
		local_variable_type_table: Vec<LocalVariableTypeTableEntry>,
	},
	Deprecated {
		attribute_name_index: u16,
	},
	RuntimeVisibleAnnotations {
		attribute_name_index: u16,
		annotations: Vec<Annotation>,
	},
	RuntimeInvisibleAnnotations {
		attribute_name_index: u16,
		annotations: Vec<Annotation>,
	},
	RuntimeVisibleParameterAnnotations {
		attribute_name_index: u16,
		/// One list of annotations per parameter. At most 255 parameters.
		parameter_annotations: Vec<Vec<Annotation>>,
	},
	RuntimeInvisibleParameterAnnotations {
		attribute_name_index: u16,
		parameter_annotations: Vec<Vec<Annotation>>,
	},
	AnnotationDefault {
		attribute_name_index: u16,
		default_value: ElementValue,
	},
	BootstrapMethods {
		attribute_name_index: u16,
		bootstrap_methods: Vec<BootstrapMethodEntry>,
	},
	MethodParameters {
		attribute_name_index: u16,
		/// At most 255 parameters.
		parameters: Vec<MethodParametersEntry>,
	},
	NestHost {
		attribute_name_index: u16,
		host_class_index: u16,
	},
	NestMembers {
		attribute_name_index: u16,
		classes: Vec<u16>,
	},
	PermittedSubclasses {
		attribute_name_index: u16,
		classes: Vec<u16>,
	},
	ModulePackages {
		attribute_name_index: u16,
		package_index: Vec<u16>,
	},
	ModuleMainClass {
		attribute_name_index: u16,
		main_class_index: u16,
	},
	Record {
		attribute_name_index: u16,
		components: Vec<RecordComponentInfo>,
	},
	Other {
		attribute_name_index: u16,
		info: Vec<u8>,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionTableEntry {
	pub start_pc: u16,
	pub end_pc: u16,
	pub handler_pc: u16,
	/// Zero for a handler that catches everything, like the ones for `finally`.
	pub catch_type: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationTypeInfo {
	Top,
	Integer,
	Float,
	Double,
	Long,
	Null,
	UninitializedThis,
	Object { cpool_index: u16 },
	Uninitialized { offset: u16 },
}

/// A frame of the `StackMapTable` attribute.
///
/// The frame type byte isn't stored, it's derived from the variant and, for the short forms, from
/// `offset_delta`, `k` or the number of locals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StackMapFrame {
	/// Frame types `0..=63`, the `offset_delta` is the frame type.
	SameFrame { offset_delta: u8 },
	/// Frame types `64..=127`, the `offset_delta` is the frame type minus 64.
	SameLocals1StackItemFrame { offset_delta: u8, stack: VerificationTypeInfo },
	SameLocals1StackItemFrameExtended { offset_delta: u16, stack: VerificationTypeInfo },
	/// Removes the last `k` locals, `k` is in `1..=3`.
	ChopFrame { k: u8, offset_delta: u16 },
	SameFrameExtended { offset_delta: u16 },
	/// Adds one to three locals.
	AppendFrame { offset_delta: u16, locals: Vec<VerificationTypeInfo> },
	FullFrame { offset_delta: u16, locals: Vec<VerificationTypeInfo>, stack: Vec<VerificationTypeInfo> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InnerClassesEntry {
	pub inner_class_info_index: u16,
	pub outer_class_info_index: u16,
	pub inner_name_index: u16,
	pub inner_class_access_flags: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineNumberTableEntry {
	pub start_pc: u16,
	pub line_number: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalVariableTableEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub index: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalVariableTypeTableEntry {
	pub start_pc: u16,
	pub length: u16,
	pub name_index: u16,
	pub signature_index: u16,
	pub index: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
	pub type_index: u16,
	pub element_value_pairs: Vec<ElementValuePair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementValuePair {
	pub element_name_index: u16,
	pub value: ElementValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementValue {
	/// One of the tags `B`, `C`, `D`, `F`, `I`, `J`, `S`, `Z` and `s`.
	Const { tag: u8, const_value_index: u16 },
	Enum { type_name_index: u16, const_name_index: u16 },
	Class { class_info_index: u16 },
	Annotation(Annotation),
	Array { values: Vec<ElementValue> },
}

/// An entry of the `BootstrapMethods` attribute.
///
/// Unlike attributes, these don't have a name or length of their own. For display purposes they're named
/// after the member their method handle refers to, see [`BootstrapMethodEntry::defining_name_index`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootstrapMethodEntry {
	/// Must point to a `MethodHandle` entry, this is checked when reading.
	pub method_ref: u16,
	pub arguments: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodParametersEntry {
	/// Zero for a parameter without a name.
	pub name_index: u16,
	pub access_flags: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordComponentInfo {
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

/// The state needed while reading attributes.
pub(crate) struct Decoder<'p, 's> {
	pool: &'p ConstantPool,
	sink: &'s mut dyn DiagnosticSink,
	depth: usize,
}

impl<'p, 's> Decoder<'p, 's> {
	pub(crate) fn new(pool: &'p ConstantPool, sink: &'s mut dyn DiagnosticSink) -> Decoder<'p, 's> {
		Decoder { pool, sink, depth: 0 }
	}

	pub(crate) fn pool(&self) -> &'p ConstantPool {
		self.pool
	}

	pub(crate) fn sink(&mut self) -> &mut dyn DiagnosticSink {
		&mut *self.sink
	}

	fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
		if self.depth >= MAX_NESTING {
			return Err(ErrorKind::TooDeep { limit: MAX_NESTING }.into());
		}
		self.depth += 1;
		let result = f(self);
		self.depth -= 1;
		result
	}
}

fn read_u16_vec(reader: &mut ByteReader) -> Result<Vec<u16>> {
	reader.read_vec(|r| r.read_u16_as_usize(), |r| r.read_u16())
}

fn write_u16_slice<W: Write>(writer: &mut ByteWriter<W>, slice: &[u16], what: &'static str) -> Result<()> {
	writer.write_slice(slice, |w, len| w.write_usize_as_u16(len, what), |w, &value| w.write_u16(value))
}

impl AttributeInfo {
	pub fn kind(&self) -> AttributeKind {
		match self {
			AttributeInfo::ConstantValue { .. } => AttributeKind::ConstantValue,
			AttributeInfo::Code { .. } => AttributeKind::Code,
			AttributeInfo::StackMapTable { .. } => AttributeKind::StackMapTable,
			AttributeInfo::Exceptions { .. } => AttributeKind::Exceptions,
			AttributeInfo::InnerClasses { .. } => AttributeKind::InnerClasses,
			AttributeInfo::EnclosingMethod { .. } => AttributeKind::EnclosingMethod,
			AttributeInfo::Synthetic { .. } => AttributeKind::Synthetic,
			AttributeInfo::Signature { .. } => AttributeKind::Signature,
			AttributeInfo::SourceFile { .. } => AttributeKind::SourceFile,
			AttributeInfo::SourceDebugExtension { .. } => AttributeKind::SourceDebugExtension,
			AttributeInfo::LineNumberTable { .. } => AttributeKind::LineNumberTable,
			AttributeInfo::LocalVariableTable { .. } => AttributeKind::LocalVariableTable,
			AttributeInfo::LocalVariableTypeTable { .. } => AttributeKind::LocalVariableTypeTable,
			AttributeInfo::Deprecated { .. } => AttributeKind::Deprecated,
			AttributeInfo::RuntimeVisibleAnnotations { .. } => AttributeKind::RuntimeVisibleAnnotations,
			AttributeInfo::RuntimeInvisibleAnnotations { .. } => AttributeKind::RuntimeInvisibleAnnotations,
			AttributeInfo::RuntimeVisibleParameterAnnotations { .. } => AttributeKind::RuntimeVisibleParameterAnnotations,
			AttributeInfo::RuntimeInvisibleParameterAnnotations { .. } => AttributeKind::RuntimeInvisibleParameterAnnotations,
			AttributeInfo::AnnotationDefault { .. } => AttributeKind::AnnotationDefault,
			AttributeInfo::BootstrapMethods { .. } => AttributeKind::BootstrapMethods,
			AttributeInfo::MethodParameters { .. } => AttributeKind::MethodParameters,
			AttributeInfo::NestHost { .. } => AttributeKind::NestHost,
			AttributeInfo::NestMembers { .. } => AttributeKind::NestMembers,
			AttributeInfo::PermittedSubclasses { .. } => AttributeKind::PermittedSubclasses,
			AttributeInfo::ModulePackages { .. } => AttributeKind::ModulePackages,
			AttributeInfo::ModuleMainClass { .. } => AttributeKind::ModuleMainClass,
			AttributeInfo::Record { .. } => AttributeKind::Record,
			AttributeInfo::Other { .. } => AttributeKind::Other,
		}
	}

	/// The `attribute_name_index`, pointing to the `Utf8` entry with the name of this attribute.
	pub fn name_index(&self) -> u16 {
		match self {
			AttributeInfo::ConstantValue { attribute_name_index, .. }
			| AttributeInfo::Code { attribute_name_index, .. }
			| AttributeInfo::StackMapTable { attribute_name_index, .. }
			| AttributeInfo::Exceptions { attribute_name_index, .. }
			| AttributeInfo::InnerClasses { attribute_name_index, .. }
			| AttributeInfo::EnclosingMethod { attribute_name_index, .. }
			| AttributeInfo::Synthetic { attribute_name_index }
			| AttributeInfo::Signature { attribute_name_index, .. }
			| AttributeInfo::SourceFile { attribute_name_index, .. }
			| AttributeInfo::SourceDebugExtension { attribute_name_index, .. }
			| AttributeInfo::LineNumberTable { attribute_name_index, .. }
			| AttributeInfo::LocalVariableTable { attribute_name_index, .. }
			| AttributeInfo::LocalVariableTypeTable { attribute_name_index, .. }
			| AttributeInfo::Deprecated { attribute_name_index }
			| AttributeInfo::RuntimeVisibleAnnotations { attribute_name_index, .. }
			| AttributeInfo::RuntimeInvisibleAnnotations { attribute_name_index, .. }
			| AttributeInfo::RuntimeVisibleParameterAnnotations { attribute_name_index, .. }
			| AttributeInfo::RuntimeInvisibleParameterAnnotations { attribute_name_index, .. }
			| AttributeInfo::AnnotationDefault { attribute_name_index, .. }
			| AttributeInfo::BootstrapMethods { attribute_name_index, .. }
			| AttributeInfo::MethodParameters { attribute_name_index, .. }
			| AttributeInfo::NestHost { attribute_name_index, .. }
			| AttributeInfo::NestMembers { attribute_name_index, .. }
			| AttributeInfo::PermittedSubclasses { attribute_name_index, .. }
			| AttributeInfo::ModulePackages { attribute_name_index, .. }
			| AttributeInfo::ModuleMainClass { attribute_name_index, .. }
			| AttributeInfo::Record { attribute_name_index, .. }
			| AttributeInfo::Other { attribute_name_index, .. } => *attribute_name_index,
		}
	}

	/// The attributes directly nested in this one: those of a `Code` attribute, and those of all `Record` components.
	pub fn nested_attributes(&self) -> Vec<&AttributeInfo> {
		match self {
			AttributeInfo::Code { attributes, .. } => attributes.iter().collect(),
			AttributeInfo::Record { components, .. } => components.iter()
				.flat_map(|component| component.attributes.iter())
				.collect(),
			_ => Vec::new(),
		}
	}

	/// The value of the `attribute_length` item this attribute will be written with.
	pub fn attribute_length(&self) -> Result<u32> {
		let mut body = ByteWriter::buffer(0);
		self.write_body(&mut body, &mut ())?;
		let len = body.written();
		u32::try_from(len).map_err(|_| ErrorKind::TooLarge { what: "attribute", len }.into())
	}

	/// Reads the `attributes_count` and `attributes` items.
	pub(crate) fn read_all(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<Vec<AttributeInfo>> {
		decoder.nested(|decoder| {
			reader.read_vec(|r| r.read_u16_as_usize(), |r| AttributeInfo::read(r, decoder))
		}).at("attributes")
	}

	fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<AttributeInfo> {
		let pool = decoder.pool;
		let offset = reader.offset();

		let attribute_name_index = reader.read_u16().at("attribute_name_index")?;
		let name = pool.get_utf8(attribute_name_index).at("attribute_name_index")?;
		let kind = AttributeKind::from_name(name);

		let attribute_length = reader.read_u32().at("attribute_length")?;
		let mut body = reader.take(attribute_length as usize).at("info")?;
		let attribute = AttributeInfo::read_body(kind, attribute_name_index, &mut body, decoder)?;
		if !body.is_empty() {
			let consumed = attribute_length as usize - body.remaining();
			return Err(ErrorKind::LengthMismatch { declared: attribute_length, consumed }).at("attribute_length");
		}

		decoder.sink.read(offset, format_args!("attribute {}, {attribute_length} bytes", to_display_string(name)));
		Ok(attribute)
	}

	fn read_body(kind: AttributeKind, attribute_name_index: u16, reader: &mut ByteReader, decoder: &mut Decoder) -> Result<AttributeInfo> {
		let attribute = match kind {
			AttributeKind::ConstantValue => AttributeInfo::ConstantValue {
				attribute_name_index,
				constantvalue_index: reader.read_u16().at("constantvalue_index")?,
			},
			AttributeKind::Code => AttributeInfo::Code {
				attribute_name_index,
				max_stack: reader.read_u16().at("max_stack")?,
				max_locals: reader.read_u16().at("max_locals")?,
				code: {
					let code_length = reader.read_u32_as_usize().at("code_length")?;
					reader.read_u8_vec(code_length).at("code")?
				},
				exception_table: reader.read_vec(|r| r.read_u16_as_usize(), ExceptionTableEntry::read)
					.at("exception_table")?,
				attributes: AttributeInfo::read_all(reader, decoder)?,
			},
			AttributeKind::StackMapTable => AttributeInfo::StackMapTable {
				attribute_name_index,
				entries: reader.read_vec(|r| r.read_u16_as_usize(), StackMapFrame::read).at("entries")?,
			},
			AttributeKind::Exceptions => AttributeInfo::Exceptions {
				attribute_name_index,
				exception_index_table: read_u16_vec(reader).at("exception_index_table")?,
			},
			AttributeKind::InnerClasses => AttributeInfo::InnerClasses {
				attribute_name_index,
				classes: reader.read_vec(|r| r.read_u16_as_usize(), InnerClassesEntry::read).at("classes")?,
			},
			AttributeKind::EnclosingMethod => AttributeInfo::EnclosingMethod {
				attribute_name_index,
				class_index: reader.read_u16().at("class_index")?,
				method_index: reader.read_u16().at("method_index")?,
			},
			AttributeKind::Synthetic => AttributeInfo::Synthetic { attribute_name_index },
			AttributeKind::Signature => AttributeInfo::Signature {
				attribute_name_index,
				signature_index: reader.read_u16().at("signature_index")?,
			},
			AttributeKind::SourceFile => AttributeInfo::SourceFile {
				attribute_name_index,
				sourcefile_index: reader.read_u16().at("sourcefile_index")?,
			},
			AttributeKind::SourceDebugExtension => AttributeInfo::SourceDebugExtension {
				attribute_name_index,
				debug_extension: reader.read_u8_vec(reader.remaining())?,
			},
			AttributeKind::LineNumberTable => AttributeInfo::LineNumberTable {
				attribute_name_index,
				line_number_table: reader.read_vec(|r| r.read_u16_as_usize(), LineNumberTableEntry::read)
					.at("line_number_table")?,
			},
			AttributeKind::LocalVariableTable => AttributeInfo::LocalVariableTable {
				attribute_name_index,
				local_variable_table: reader.read_vec(|r| r.read_u16_as_usize(), LocalVariableTableEntry::read)
					.at("local_variable_table")?,
			},
			AttributeKind::LocalVariableTypeTable => AttributeInfo::LocalVariableTypeTable {
				attribute_name_index,
				local_variable_type_table: reader.read_vec(|r| r.read_u16_as_usize(), LocalVariableTypeTableEntry::read)
					.at("local_variable_type_table")?,
			},
			AttributeKind::Deprecated => AttributeInfo::Deprecated { attribute_name_index },
			AttributeKind::RuntimeVisibleAnnotations => AttributeInfo::RuntimeVisibleAnnotations {
				attribute_name_index,
				annotations: Annotation::read_all(reader, decoder).at("annotations")?,
			},
			AttributeKind::RuntimeInvisibleAnnotations => AttributeInfo::RuntimeInvisibleAnnotations {
				attribute_name_index,
				annotations: Annotation::read_all(reader, decoder).at("annotations")?,
			},
			AttributeKind::RuntimeVisibleParameterAnnotations => AttributeInfo::RuntimeVisibleParameterAnnotations {
				attribute_name_index,
				parameter_annotations: reader.read_vec(|r| r.read_u8_as_usize(), |r| Annotation::read_all(r, decoder))
					.at("parameter_annotations")?,
			},
			AttributeKind::RuntimeInvisibleParameterAnnotations => AttributeInfo::RuntimeInvisibleParameterAnnotations {
				attribute_name_index,
				parameter_annotations: reader.read_vec(|r| r.read_u8_as_usize(), |r| Annotation::read_all(r, decoder))
					.at("parameter_annotations")?,
			},
			AttributeKind::AnnotationDefault => AttributeInfo::AnnotationDefault {
				attribute_name_index,
				default_value: ElementValue::read(reader, decoder).at("default_value")?,
			},
			AttributeKind::BootstrapMethods => AttributeInfo::BootstrapMethods {
				attribute_name_index,
				bootstrap_methods: BootstrapMethodEntry::read_all(reader, decoder).at("bootstrap_methods")?,
			},
			AttributeKind::MethodParameters => AttributeInfo::MethodParameters {
				attribute_name_index,
				parameters: reader.read_vec(|r| r.read_u8_as_usize(), MethodParametersEntry::read).at("parameters")?,
			},
			AttributeKind::NestHost => AttributeInfo::NestHost {
				attribute_name_index,
				host_class_index: reader.read_u16().at("host_class_index")?,
			},
			AttributeKind::NestMembers => AttributeInfo::NestMembers {
				attribute_name_index,
				classes: read_u16_vec(reader).at("classes")?,
			},
			AttributeKind::PermittedSubclasses => AttributeInfo::PermittedSubclasses {
				attribute_name_index,
				classes: read_u16_vec(reader).at("classes")?,
			},
			AttributeKind::ModulePackages => AttributeInfo::ModulePackages {
				attribute_name_index,
				package_index: read_u16_vec(reader).at("package_index")?,
			},
			AttributeKind::ModuleMainClass => AttributeInfo::ModuleMainClass {
				attribute_name_index,
				main_class_index: reader.read_u16().at("main_class_index")?,
			},
			AttributeKind::Record => AttributeInfo::Record {
				attribute_name_index,
				components: reader.read_vec(|r| r.read_u16_as_usize(), |r| RecordComponentInfo::read(r, decoder))
					.at("components")?,
			},
			AttributeKind::Other => AttributeInfo::Other {
				attribute_name_index,
				info: reader.read_u8_vec(reader.remaining())?,
			},
		};
		Ok(attribute)
	}

	/// Writes the `attributes_count` and `attributes` items.
	pub(crate) fn write_all<W: Write>(attributes: &[AttributeInfo], writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		writer.write_slice(attributes, |w, len| w.write_usize_as_u16(len, "attributes"), |w, attribute| attribute.write(w, sink))
			.at("attributes")
	}

	fn write<W: Write>(&self, writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		let offset = writer.written();
		writer.write_u16(self.name_index())?;

		// the length is only known after writing the contents
		let mut body = ByteWriter::buffer(offset + 6);
		self.write_body(&mut body, sink)?;
		let body = body.into_inner();

		writer.write_usize_as_u32(body.len(), "attribute").at("attribute_length")?;
		writer.write_u8_slice(&body)?;

		sink.wrote(offset, format_args!("attribute {:?}, {} bytes", self.kind(), body.len()));
		Ok(())
	}

	fn write_body(&self, writer: &mut ByteWriter<Vec<u8>>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		match self {
			AttributeInfo::ConstantValue { constantvalue_index, .. } => writer.write_u16(*constantvalue_index),
			AttributeInfo::Code { max_stack, max_locals, code, exception_table, attributes, .. } => {
				writer.write_u16(*max_stack)?;
				writer.write_u16(*max_locals)?;
				writer.write_usize_as_u32(code.len(), "code").at("code_length")?;
				writer.write_u8_slice(code)?;
				writer.write_slice(exception_table, |w, len| w.write_usize_as_u16(len, "exception_table"), ExceptionTableEntry::write)
					.at("exception_table")?;
				AttributeInfo::write_all(attributes, writer, sink)
			},
			AttributeInfo::StackMapTable { entries, .. } => {
				writer.write_slice(entries, |w, len| w.write_usize_as_u16(len, "entries"), StackMapFrame::write)
					.at("entries")
			},
			AttributeInfo::Exceptions { exception_index_table, .. } => {
				write_u16_slice(writer, exception_index_table, "exception_index_table").at("exception_index_table")
			},
			AttributeInfo::InnerClasses { classes, .. } => {
				writer.write_slice(classes, |w, len| w.write_usize_as_u16(len, "classes"), InnerClassesEntry::write)
					.at("classes")
			},
			AttributeInfo::EnclosingMethod { class_index, method_index, .. } => {
				writer.write_u16(*class_index)?;
				writer.write_u16(*method_index)
			},
			AttributeInfo::Synthetic { .. } | AttributeInfo::Deprecated { .. } => Ok(()),
			AttributeInfo::Signature { signature_index, .. } => writer.write_u16(*signature_index),
			AttributeInfo::SourceFile { sourcefile_index, .. } => writer.write_u16(*sourcefile_index),
			AttributeInfo::SourceDebugExtension { debug_extension, .. } => writer.write_u8_slice(debug_extension),
			AttributeInfo::LineNumberTable { line_number_table, .. } => {
				writer.write_slice(line_number_table, |w, len| w.write_usize_as_u16(len, "line_number_table"), LineNumberTableEntry::write)
					.at("line_number_table")
			},
			AttributeInfo::LocalVariableTable { local_variable_table, .. } => {
				writer.write_slice(local_variable_table, |w, len| w.write_usize_as_u16(len, "local_variable_table"), LocalVariableTableEntry::write)
					.at("local_variable_table")
			},
			AttributeInfo::LocalVariableTypeTable { local_variable_type_table, .. } => {
				writer.write_slice(local_variable_type_table, |w, len| w.write_usize_as_u16(len, "local_variable_type_table"), LocalVariableTypeTableEntry::write)
					.at("local_variable_type_table")
			},
			AttributeInfo::RuntimeVisibleAnnotations { annotations, .. }
			| AttributeInfo::RuntimeInvisibleAnnotations { annotations, .. } => {
				Annotation::write_all(annotations, writer).at("annotations")
			},
			AttributeInfo::RuntimeVisibleParameterAnnotations { parameter_annotations, .. }
			| AttributeInfo::RuntimeInvisibleParameterAnnotations { parameter_annotations, .. } => {
				writer.write_slice(
					parameter_annotations,
					|w, len| w.write_usize_as_u8(len, "parameter_annotations"),
					|w, annotations| Annotation::write_all(annotations, w),
				).at("parameter_annotations")
			},
			AttributeInfo::AnnotationDefault { default_value, .. } => default_value.write(writer).at("default_value"),
			AttributeInfo::BootstrapMethods { bootstrap_methods, .. } => {
				writer.write_slice(bootstrap_methods, |w, len| w.write_usize_as_u16(len, "bootstrap_methods"), BootstrapMethodEntry::write)
					.at("bootstrap_methods")
			},
			AttributeInfo::MethodParameters { parameters, .. } => {
				writer.write_slice(parameters, |w, len| w.write_usize_as_u8(len, "parameters"), MethodParametersEntry::write)
					.at("parameters")
			},
			AttributeInfo::NestHost { host_class_index, .. } => writer.write_u16(*host_class_index),
			AttributeInfo::NestMembers { classes, .. } | AttributeInfo::PermittedSubclasses { classes, .. } => {
				write_u16_slice(writer, classes, "classes").at("classes")
			},
			AttributeInfo::ModulePackages { package_index, .. } => {
				write_u16_slice(writer, package_index, "package_index").at("package_index")
			},
			AttributeInfo::ModuleMainClass { main_class_index, .. } => writer.write_u16(*main_class_index),
			AttributeInfo::Record { components, .. } => {
				writer.write_slice(components, |w, len| w.write_usize_as_u16(len, "components"), |w, component| component.write(w, sink))
					.at("components")
			},
			AttributeInfo::Other { info, .. } => writer.write_u8_slice(info),
		}
	}
}

impl ExceptionTableEntry {
	fn read(reader: &mut ByteReader) -> Result<ExceptionTableEntry> {
		Ok(ExceptionTableEntry {
			start_pc: reader.read_u16()?,
			end_pc: reader.read_u16()?,
			handler_pc: reader.read_u16()?,
			catch_type: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &ExceptionTableEntry) -> Result<()> {
		writer.write_u16(entry.start_pc)?;
		writer.write_u16(entry.end_pc)?;
		writer.write_u16(entry.handler_pc)?;
		writer.write_u16(entry.catch_type)
	}
}

impl VerificationTypeInfo {
	fn read(reader: &mut ByteReader) -> Result<VerificationTypeInfo> {
		let info = match reader.read_u8()? {
			0 => VerificationTypeInfo::Top,
			1 => VerificationTypeInfo::Integer,
			2 => VerificationTypeInfo::Float,
			3 => VerificationTypeInfo::Double,
			4 => VerificationTypeInfo::Long,
			5 => VerificationTypeInfo::Null,
			6 => VerificationTypeInfo::UninitializedThis,
			7 => VerificationTypeInfo::Object { cpool_index: reader.read_u16()? },
			8 => VerificationTypeInfo::Uninitialized { offset: reader.read_u16()? },
			tag => return Err(ErrorKind::InvalidTag { what: "verification type info", tag }.into()),
		};
		Ok(info)
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, info: &VerificationTypeInfo) -> Result<()> {
		match info {
			VerificationTypeInfo::Top => writer.write_u8(0),
			VerificationTypeInfo::Integer => writer.write_u8(1),
			VerificationTypeInfo::Float => writer.write_u8(2),
			VerificationTypeInfo::Double => writer.write_u8(3),
			VerificationTypeInfo::Long => writer.write_u8(4),
			VerificationTypeInfo::Null => writer.write_u8(5),
			VerificationTypeInfo::UninitializedThis => writer.write_u8(6),
			VerificationTypeInfo::Object { cpool_index } => {
				writer.write_u8(7)?;
				writer.write_u16(*cpool_index)
			},
			VerificationTypeInfo::Uninitialized { offset } => {
				writer.write_u8(8)?;
				writer.write_u16(*offset)
			},
		}
	}
}

impl StackMapFrame {
	fn read(reader: &mut ByteReader) -> Result<StackMapFrame> {
		let frame_type = reader.read_u8()?;
		let frame = match frame_type {
			0..=63 => StackMapFrame::SameFrame { offset_delta: frame_type },
			64..=127 => StackMapFrame::SameLocals1StackItemFrame {
				offset_delta: frame_type - 64,
				stack: VerificationTypeInfo::read(reader).at("stack")?,
			},
			247 => StackMapFrame::SameLocals1StackItemFrameExtended {
				offset_delta: reader.read_u16().at("offset_delta")?,
				stack: VerificationTypeInfo::read(reader).at("stack")?,
			},
			248..=250 => StackMapFrame::ChopFrame {
				k: 251 - frame_type,
				offset_delta: reader.read_u16().at("offset_delta")?,
			},
			251 => StackMapFrame::SameFrameExtended {
				offset_delta: reader.read_u16().at("offset_delta")?,
			},
			252..=254 => StackMapFrame::AppendFrame {
				offset_delta: reader.read_u16().at("offset_delta")?,
				locals: (0..(frame_type - 251) as usize)
					.map(|i| VerificationTypeInfo::read(reader).at_index(i))
					.collect::<Result<_>>()
					.at("locals")?,
			},
			255 => StackMapFrame::FullFrame {
				offset_delta: reader.read_u16().at("offset_delta")?,
				locals: reader.read_vec(|r| r.read_u16_as_usize(), VerificationTypeInfo::read).at("locals")?,
				stack: reader.read_vec(|r| r.read_u16_as_usize(), VerificationTypeInfo::read).at("stack")?,
			},
			tag => return Err(ErrorKind::InvalidTag { what: "stack map frame", tag }.into()),
		};
		Ok(frame)
	}

	/// The frame type byte this frame is written with.
	pub fn frame_type(&self) -> Result<u8> {
		match self {
			StackMapFrame::SameFrame { offset_delta } => match *offset_delta {
				delta @ 0..=63 => Ok(delta),
				delta => Err(ErrorKind::TooLarge { what: "same_frame offset_delta", len: delta as usize }.into()),
			},
			StackMapFrame::SameLocals1StackItemFrame { offset_delta, .. } => match *offset_delta {
				delta @ 0..=63 => Ok(delta + 64),
				delta => Err(ErrorKind::TooLarge { what: "same_locals_1_stack_item_frame offset_delta", len: delta as usize }.into()),
			},
			StackMapFrame::SameLocals1StackItemFrameExtended { .. } => Ok(247),
			StackMapFrame::ChopFrame { k, .. } => match *k {
				k @ 1..=3 => Ok(251 - k),
				k => Err(ErrorKind::InvalidCount { what: "chop_frame k", count: k as usize }.into()),
			},
			StackMapFrame::SameFrameExtended { .. } => Ok(251),
			StackMapFrame::AppendFrame { locals, .. } => match locals.len() {
				len @ 1..=3 => Ok(251 + len as u8),
				len => Err(ErrorKind::InvalidCount { what: "append_frame locals", count: len }.into()),
			},
			StackMapFrame::FullFrame { .. } => Ok(255),
		}
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, frame: &StackMapFrame) -> Result<()> {
		writer.write_u8(frame.frame_type()?)?;
		match frame {
			StackMapFrame::SameFrame { .. } => Ok(()),
			StackMapFrame::SameLocals1StackItemFrame { stack, .. } => VerificationTypeInfo::write(writer, stack).at("stack"),
			StackMapFrame::SameLocals1StackItemFrameExtended { offset_delta, stack } => {
				writer.write_u16(*offset_delta)?;
				VerificationTypeInfo::write(writer, stack).at("stack")
			},
			StackMapFrame::ChopFrame { offset_delta, .. } | StackMapFrame::SameFrameExtended { offset_delta } => {
				writer.write_u16(*offset_delta)
			},
			StackMapFrame::AppendFrame { offset_delta, locals } => {
				writer.write_u16(*offset_delta)?;
				for (i, local) in locals.iter().enumerate() {
					VerificationTypeInfo::write(writer, local).at_index(i).at("locals")?;
				}
				Ok(())
			},
			StackMapFrame::FullFrame { offset_delta, locals, stack } => {
				writer.write_u16(*offset_delta)?;
				writer.write_slice(locals, |w, len| w.write_usize_as_u16(len, "locals"), VerificationTypeInfo::write).at("locals")?;
				writer.write_slice(stack, |w, len| w.write_usize_as_u16(len, "stack"), VerificationTypeInfo::write).at("stack")
			},
		}
	}
}

impl InnerClassesEntry {
	fn read(reader: &mut ByteReader) -> Result<InnerClassesEntry> {
		Ok(InnerClassesEntry {
			inner_class_info_index: reader.read_u16()?,
			outer_class_info_index: reader.read_u16()?,
			inner_name_index: reader.read_u16()?,
			inner_class_access_flags: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &InnerClassesEntry) -> Result<()> {
		writer.write_u16(entry.inner_class_info_index)?;
		writer.write_u16(entry.outer_class_info_index)?;
		writer.write_u16(entry.inner_name_index)?;
		writer.write_u16(entry.inner_class_access_flags)
	}
}

impl LineNumberTableEntry {
	fn read(reader: &mut ByteReader) -> Result<LineNumberTableEntry> {
		Ok(LineNumberTableEntry {
			start_pc: reader.read_u16()?,
			line_number: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &LineNumberTableEntry) -> Result<()> {
		writer.write_u16(entry.start_pc)?;
		writer.write_u16(entry.line_number)
	}
}

impl LocalVariableTableEntry {
	fn read(reader: &mut ByteReader) -> Result<LocalVariableTableEntry> {
		Ok(LocalVariableTableEntry {
			start_pc: reader.read_u16()?,
			length: reader.read_u16()?,
			name_index: reader.read_u16()?,
			descriptor_index: reader.read_u16()?,
			index: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &LocalVariableTableEntry) -> Result<()> {
		writer.write_u16(entry.start_pc)?;
		writer.write_u16(entry.length)?;
		writer.write_u16(entry.name_index)?;
		writer.write_u16(entry.descriptor_index)?;
		writer.write_u16(entry.index)
	}
}

impl LocalVariableTypeTableEntry {
	fn read(reader: &mut ByteReader) -> Result<LocalVariableTypeTableEntry> {
		Ok(LocalVariableTypeTableEntry {
			start_pc: reader.read_u16()?,
			length: reader.read_u16()?,
			name_index: reader.read_u16()?,
			signature_index: reader.read_u16()?,
			index: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &LocalVariableTypeTableEntry) -> Result<()> {
		writer.write_u16(entry.start_pc)?;
		writer.write_u16(entry.length)?;
		writer.write_u16(entry.name_index)?;
		writer.write_u16(entry.signature_index)?;
		writer.write_u16(entry.index)
	}
}

impl Annotation {
	fn read_all(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<Vec<Annotation>> {
		reader.read_vec(|r| r.read_u16_as_usize(), |r| Annotation::read(r, decoder))
	}

	fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<Annotation> {
		Ok(Annotation {
			type_index: reader.read_u16().at("type_index")?,
			element_value_pairs: reader.read_vec(|r| r.read_u16_as_usize(), |r| {
				Ok(ElementValuePair {
					element_name_index: r.read_u16().at("element_name_index")?,
					value: ElementValue::read(r, decoder).at("value")?,
				})
			}).at("element_value_pairs")?,
		})
	}

	fn write_all<W: Write>(annotations: &[Annotation], writer: &mut ByteWriter<W>) -> Result<()> {
		writer.write_slice(annotations, |w, len| w.write_usize_as_u16(len, "annotations"), |w, annotation| annotation.write(w))
	}

	fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
		writer.write_u16(self.type_index)?;
		writer.write_slice(
			&self.element_value_pairs,
			|w, len| w.write_usize_as_u16(len, "element_value_pairs"),
			|w, pair| {
				w.write_u16(pair.element_name_index)?;
				pair.value.write(w).at("value")
			},
		).at("element_value_pairs")
	}
}

impl ElementValue {
	pub const CONST_TAGS: &'static [u8] = b"BCDFIJSZs";

	fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<ElementValue> {
		decoder.nested(|decoder| {
			let value = match reader.read_u8().at("tag")? {
				tag if ElementValue::CONST_TAGS.contains(&tag) => ElementValue::Const {
					tag,
					const_value_index: reader.read_u16().at("const_value_index")?,
				},
				b'e' => ElementValue::Enum {
					type_name_index: reader.read_u16().at("type_name_index")?,
					const_name_index: reader.read_u16().at("const_name_index")?,
				},
				b'c' => ElementValue::Class {
					class_info_index: reader.read_u16().at("class_info_index")?,
				},
				b'@' => ElementValue::Annotation(Annotation::read(reader, decoder).at("annotation_value")?),
				b'[' => ElementValue::Array {
					values: reader.read_vec(|r| r.read_u16_as_usize(), |r| ElementValue::read(r, decoder)).at("values")?,
				},
				tag => return Err(ErrorKind::InvalidTag { what: "element value", tag }).at("tag"),
			};
			Ok(value)
		})
	}

	/// The tag byte this value is written with.
	pub fn tag(&self) -> u8 {
		match self {
			ElementValue::Const { tag, .. } => *tag,
			ElementValue::Enum { .. } => b'e',
			ElementValue::Class { .. } => b'c',
			ElementValue::Annotation(_) => b'@',
			ElementValue::Array { .. } => b'[',
		}
	}

	fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
		match self {
			ElementValue::Const { tag, const_value_index } => {
				if !ElementValue::CONST_TAGS.contains(tag) {
					return Err(ErrorKind::InvalidTag { what: "element value", tag: *tag }).at("tag");
				}
				writer.write_u8(*tag)?;
				writer.write_u16(*const_value_index)
			},
			ElementValue::Enum { type_name_index, const_name_index } => {
				writer.write_u8(b'e')?;
				writer.write_u16(*type_name_index)?;
				writer.write_u16(*const_name_index)
			},
			ElementValue::Class { class_info_index } => {
				writer.write_u8(b'c')?;
				writer.write_u16(*class_info_index)
			},
			ElementValue::Annotation(annotation) => {
				writer.write_u8(b'@')?;
				annotation.write(writer).at("annotation_value")
			},
			ElementValue::Array { values } => {
				writer.write_u8(b'[')?;
				writer.write_slice(values, |w, len| w.write_usize_as_u16(len, "values"), |w, value| value.write(w))
					.at("values")
			},
		}
	}
}

impl BootstrapMethodEntry {
	/// Reads the entries, checking that each `method_ref` is a `MethodHandle`.
	///
	/// Problems with the rest of the chain leading to the name of an entry are only reported to the sink.
	fn read_all(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<Vec<BootstrapMethodEntry>> {
		let pool = decoder.pool;
		let mut index = 0usize;
		reader.read_vec(|r| r.read_u16_as_usize(), |r| {
			let offset = r.offset();
			let method_ref = r.read_u16().at("method_ref")?;
			pool.get_method_handle(method_ref).at("method_ref")?;
			let arguments = read_u16_vec(r).at("arguments")?;
			let entry = BootstrapMethodEntry { method_ref, arguments };

			match entry.defining_name(pool) {
				Ok(name) => decoder.sink.read(offset, format_args!("bootstrap method {index}: {name}")),
				Err(e) => decoder.sink.warn(format_args!("bootstrap method {index} has no name: {e}")),
			}
			index += 1;
			Ok(entry)
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &BootstrapMethodEntry) -> Result<()> {
		writer.write_u16(entry.method_ref)?;
		write_u16_slice(writer, &entry.arguments, "arguments").at("arguments")
	}
}

impl MethodParametersEntry {
	fn read(reader: &mut ByteReader) -> Result<MethodParametersEntry> {
		Ok(MethodParametersEntry {
			name_index: reader.read_u16()?,
			access_flags: reader.read_u16()?,
		})
	}

	fn write<W: Write>(writer: &mut ByteWriter<W>, entry: &MethodParametersEntry) -> Result<()> {
		writer.write_u16(entry.name_index)?;
		writer.write_u16(entry.access_flags)
	}
}

impl RecordComponentInfo {
	fn read(reader: &mut ByteReader, decoder: &mut Decoder) -> Result<RecordComponentInfo> {
		Ok(RecordComponentInfo {
			name_index: reader.read_u16().at("name_index")?,
			descriptor_index: reader.read_u16().at("descriptor_index")?,
			attributes: AttributeInfo::read_all(reader, decoder)?,
		})
	}

	fn write<W: Write>(&self, writer: &mut ByteWriter<W>, sink: &mut dyn DiagnosticSink) -> Result<()> {
		writer.write_u16(self.name_index)?;
		writer.write_u16(self.descriptor_index)?;
		AttributeInfo::write_all(&self.attributes, writer, sink)
	}
}

/// Something shown as one element of an attribute tree: either an attribute or an entry of a `BootstrapMethods` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
	Attribute(&'a AttributeInfo),
	/// The entry and its position in the `bootstrap_methods` list.
	BootstrapMethod(usize, &'a BootstrapMethodEntry),
}

impl<'a> Node<'a> {
	pub fn children(&self) -> Vec<Node<'a>> {
		match self {
			Node::Attribute(AttributeInfo::BootstrapMethods { bootstrap_methods, .. }) => bootstrap_methods.iter()
				.enumerate()
				.map(|(i, entry)| Node::BootstrapMethod(i, entry))
				.collect(),
			Node::Attribute(attribute) => attribute.nested_attributes()
				.into_iter()
				.map(Node::Attribute)
				.collect(),
			Node::BootstrapMethod(..) => Vec::new(),
		}
	}

	/// The index of the `Utf8` entry naming this node.
	///
	/// For attributes that's the `attribute_name_index`, for bootstrap methods it's the name of
	/// the member the method handle refers to.
	pub fn name_index(&self, pool: &ConstantPool) -> Result<u16> {
		match self {
			Node::Attribute(attribute) => Ok(attribute.name_index()),
			Node::BootstrapMethod(_, entry) => entry.defining_name_index(pool),
		}
	}
}

/// Finds the first attribute of the given kind, searching depth first through nested attributes.
///
/// The attributes of a `Code` attribute and those of `Record` components are searched, in the order they appear.
pub fn find_attribute(attributes: &[AttributeInfo], kind: AttributeKind) -> Option<&AttributeInfo> {
	for attribute in attributes {
		if attribute.kind() == kind {
			return Some(attribute);
		}
		for nested in attribute.nested_attributes() {
			if let Some(found) = find_attribute(std::slice::from_ref(nested), kind) {
				return Some(found);
			}
		}
	}
	None
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::attribute::{find_attribute, AttributeInfo, AttributeKind, Decoder, ElementValue, LineNumberTableEntry, Node, StackMapFrame, VerificationTypeInfo};
	use crate::cursor::{ByteReader, ByteWriter};
	use crate::error::{ErrorKind, Result};
	use crate::pool::{ConstantPool, CpInfo, CpTag, MemberRef, MethodHandle, NameAndType};

	fn utf8(pool: &mut ConstantPool, text: &str) -> Result<u16> {
		pool.push(CpInfo::Utf8 { bytes: text.as_bytes().to_vec() })
	}

	/// The pool used by most tests here:
	///  1: "BootstrapMethods"
	///  5: MethodHandle invokeStatic -> 8 (metafactory)
	///  7: Class java/lang/invoke/LambdaMetafactory
	///  9: MethodType ()V
	/// 12: MethodHandle invokeStatic -> 13 (bootstrap)
	/// 14: Fieldref, 15: MethodHandle invokeStatic -> 14 (invalid)
	fn bootstrap_pool() -> Result<ConstantPool> {
		let mut pool = ConstantPool::new();
		utf8(&mut pool, "BootstrapMethods")?;
		utf8(&mut pool, "metafactory")?;
		utf8(&mut pool, "()V")?;
		pool.push(CpInfo::NameAndType(NameAndType { name_index: 2, descriptor_index: 3 }))?;
		pool.push(CpInfo::MethodHandle(MethodHandle { reference_kind: 6, reference_index: 8 }))?;
		utf8(&mut pool, "java/lang/invoke/LambdaMetafactory")?;
		pool.push(CpInfo::Class { name_index: 6 })?;
		pool.push(CpInfo::Methodref(MemberRef { class_index: 7, name_and_type_index: 4 }))?;
		pool.push(CpInfo::MethodType { descriptor_index: 3 })?;
		utf8(&mut pool, "bootstrap")?;
		pool.push(CpInfo::NameAndType(NameAndType { name_index: 10, descriptor_index: 3 }))?;
		pool.push(CpInfo::MethodHandle(MethodHandle { reference_kind: 6, reference_index: 13 }))?;
		pool.push(CpInfo::Methodref(MemberRef { class_index: 7, name_and_type_index: 11 }))?;
		pool.push(CpInfo::Fieldref(MemberRef { class_index: 7, name_and_type_index: 11 }))?;
		pool.push(CpInfo::MethodHandle(MethodHandle { reference_kind: 6, reference_index: 14 }))?;
		Ok(pool)
	}

	fn read(pool: &ConstantPool, bytes: &[u8], sink: &mut Vec<String>) -> Result<Vec<AttributeInfo>> {
		AttributeInfo::read_all(&mut ByteReader::new(bytes), &mut Decoder::new(pool, sink))
	}

	fn write(attributes: &[AttributeInfo]) -> Result<Vec<u8>> {
		let mut writer = ByteWriter::new(Vec::new());
		AttributeInfo::write_all(attributes, &mut writer, &mut ())?;
		Ok(writer.into_inner())
	}

	#[test]
	fn bootstrap_methods() -> Result<()> {
		let pool = bootstrap_pool()?;
		let bytes = [
			0x00, 0x01, // attributes_count
			0x00, 0x01, // attribute_name_index: BootstrapMethods
			0x00, 0x00, 0x00, 0x0e, // attribute_length: 2 + 8 + 4
			0x00, 0x02, // num_bootstrap_methods
			0x00, 0x05, 0x00, 0x02, 0x00, 0x07, 0x00, 0x09,
			0x00, 0x0c, 0x00, 0x00,
		];

		let mut sink = Vec::new();
		let attributes = read(&pool, &bytes, &mut sink)?;
		assert_eq!(attributes.len(), 1);

		let AttributeInfo::BootstrapMethods { attribute_name_index, bootstrap_methods } = &attributes[0] else {
			panic!("expected BootstrapMethods, got {:?}", attributes[0]);
		};
		assert_eq!(*attribute_name_index, 1);
		assert_eq!(bootstrap_methods.len(), 2);
		assert_eq!(bootstrap_methods[0].method_ref, 5);
		assert_eq!(bootstrap_methods[0].arguments, vec![7, 9]);
		assert_eq!(bootstrap_methods[1].method_ref, 12);
		assert_eq!(bootstrap_methods[1].arguments, Vec::<u16>::new());

		assert_eq!(attributes[0].attribute_length()?, 14);
		assert_eq!(write(&attributes)?, bytes);

		assert!(sink.contains(&"10: read bootstrap method 0: metafactory".to_owned()));
		assert!(sink.contains(&"18: read bootstrap method 1: bootstrap".to_owned()));
		assert!(sink.iter().all(|line| !line.starts_with("warning")));
		Ok(())
	}

	#[test]
	fn bootstrap_method_ref_must_be_a_method_handle() -> Result<()> {
		let pool = bootstrap_pool()?;
		let bytes = [
			0x00, 0x01,
			0x00, 0x01,
			0x00, 0x00, 0x00, 0x0a,
			0x00, 0x02,
			0x00, 0x05, 0x00, 0x00,
			0x00, 0x07, 0x00, 0x00, // a Class, not a MethodHandle
		];

		let error = read(&pool, &bytes, &mut Vec::new()).unwrap_err();
		assert!(matches!(
			error.kind(),
			ErrorKind::TypeMismatch { index: 7, expected: "MethodHandle", found: CpTag::Class }
		));
		assert_eq!(error.path(), "attributes[0].bootstrap_methods[1].method_ref");
		Ok(())
	}

	#[test]
	fn unresolvable_bootstrap_name_is_a_warning() -> Result<()> {
		let pool = bootstrap_pool()?;
		let bytes = [
			0x00, 0x01,
			0x00, 0x01,
			0x00, 0x00, 0x00, 0x06,
			0x00, 0x01,
			0x00, 0x0f, 0x00, 0x00, // invokeStatic pointing to a Fieldref
		];

		let mut sink = Vec::new();
		let attributes = read(&pool, &bytes, &mut sink)?;
		assert_eq!(attributes[0].kind(), AttributeKind::BootstrapMethods);

		let warnings: Vec<&String> = sink.iter().filter(|line| line.starts_with("warning")).collect();
		assert_eq!(warnings.len(), 1);
		assert!(warnings[0].starts_with("warning: bootstrap method 0 has no name: cannot resolve constant pool entry 15"));

		let node = Node::Attribute(&attributes[0]);
		let children = node.children();
		assert_eq!(children.len(), 1);
		let error = children[0].name_index(&pool).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::Unresolvable { index: 15, .. }));
		assert!(matches!(error.root_kind(), ErrorKind::TypeMismatch { index: 14, found: CpTag::Fieldref, .. }));
		Ok(())
	}

	#[test]
	fn unknown_attribute_is_kept() -> Result<()> {
		let mut pool = ConstantPool::new();
		utf8(&mut pool, "com.example.Custom")?;
		let bytes = [
			0x00, 0x01,
			0x00, 0x01,
			0x00, 0x00, 0x00, 0x05,
			0xde, 0xad, 0xbe, 0xef, 0x00,
		];

		let attributes = read(&pool, &bytes, &mut Vec::new())?;
		assert_eq!(attributes, vec![
			AttributeInfo::Other { attribute_name_index: 1, info: vec![0xde, 0xad, 0xbe, 0xef, 0x00] },
		]);
		assert_eq!(attributes[0].kind(), AttributeKind::Other);
		assert_eq!(write(&attributes)?, bytes);
		Ok(())
	}

	#[test]
	fn length_must_match_contents() -> Result<()> {
		let mut pool = ConstantPool::new();
		utf8(&mut pool, "ConstantValue")?;

		let too_long = [0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x02, 0x00];
		let error = read(&pool, &too_long, &mut Vec::new()).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::LengthMismatch { declared: 3, consumed: 2 }));
		assert_eq!(error.path(), "attributes[0].attribute_length");

		let too_short = [0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02];
		let error = read(&pool, &too_short, &mut Vec::new()).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::Truncated { offset: 8, needed: 2, available: 1 }));
		assert_eq!(error.path(), "attributes[0].constantvalue_index");
		Ok(())
	}

	#[test]
	fn name_must_be_utf8() -> Result<()> {
		let mut pool = ConstantPool::new();
		pool.push(CpInfo::Integer { bytes: 4 })?;
		let bytes = [0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];

		let error = read(&pool, &bytes, &mut Vec::new()).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::TypeMismatch { index: 1, expected: "Utf8", found: CpTag::Integer }));
		assert_eq!(error.path(), "attributes[0].attribute_name_index");
		Ok(())
	}

	#[test]
	fn code_with_nested_attributes() -> Result<()> {
		let mut pool = ConstantPool::new();
		let code_name = utf8(&mut pool, "Code")?;
		let lines_name = utf8(&mut pool, "LineNumberTable")?;
		let frames_name = utf8(&mut pool, "StackMapTable")?;
		let source_name = utf8(&mut pool, "SourceFile")?;

		let code = AttributeInfo::Code {
			attribute_name_index: code_name,
			max_stack: 1,
			max_locals: 1,
			code: vec![0x2a, 0xb7, 0x00, 0x01, 0xb1],
			exception_table: vec![],
			attributes: vec![
				AttributeInfo::LineNumberTable {
					attribute_name_index: lines_name,
					line_number_table: vec![LineNumberTableEntry { start_pc: 0, line_number: 3 }],
				},
				AttributeInfo::StackMapTable {
					attribute_name_index: frames_name,
					entries: vec![
						StackMapFrame::SameFrame { offset_delta: 4 },
						StackMapFrame::SameLocals1StackItemFrame { offset_delta: 1, stack: VerificationTypeInfo::Integer },
						StackMapFrame::ChopFrame { k: 2, offset_delta: 300 },
						StackMapFrame::AppendFrame { offset_delta: 7, locals: vec![VerificationTypeInfo::Object { cpool_index: 1 }, VerificationTypeInfo::Long] },
						StackMapFrame::FullFrame { offset_delta: 0, locals: vec![VerificationTypeInfo::Top], stack: vec![VerificationTypeInfo::Uninitialized { offset: 9 }] },
					],
				},
			],
		};
		let attributes = vec![
			AttributeInfo::SourceFile { attribute_name_index: source_name, sourcefile_index: 1 },
			code,
		];

		let bytes = write(&attributes)?;
		let mut sink = Vec::new();
		let read_back = read(&pool, &bytes, &mut sink)?;
		assert_eq!(read_back, attributes);
		assert_eq!(write(&read_back)?, bytes);

		// 2 + 2 + 4 + 5 + 2 + 2 + (6 + 2 + 4) + (6 + 2 + 1 + 2 + 3 + 7 + 11)
		assert_eq!(attributes[1].attribute_length()?, 61);

		let found = find_attribute(&read_back, AttributeKind::LineNumberTable);
		assert_eq!(found.map(AttributeInfo::name_index), Some(lines_name));
		assert_eq!(find_attribute(&read_back, AttributeKind::SourceFile).map(AttributeInfo::name_index), Some(source_name));
		assert_eq!(find_attribute(&read_back, AttributeKind::BootstrapMethods), None);

		let children = Node::Attribute(&read_back[1]).children();
		assert_eq!(children.len(), 2);
		assert_eq!(children[1].name_index(&pool)?, frames_name);

		// nested attributes are reported before the attribute containing them is done
		let code_line = sink.iter().position(|line| line.contains("read attribute Code"));
		let lines_line = sink.iter().position(|line| line.contains("read attribute LineNumberTable"));
		assert!(lines_line.is_some() && code_line.is_some());
		assert!(lines_line < code_line);
		Ok(())
	}

	#[test]
	fn length_follows_edits() -> Result<()> {
		let mut pool = ConstantPool::new();
		let name = utf8(&mut pool, "NestMembers")?;
		let mut attribute = AttributeInfo::NestMembers { attribute_name_index: name, classes: vec![3, 4] };
		assert_eq!(attribute.attribute_length()?, 6);

		if let AttributeInfo::NestMembers { classes, .. } = &mut attribute {
			classes.push(5);
		}
		assert_eq!(attribute.attribute_length()?, 8);
		assert_eq!(write(&[attribute])?, vec![
			0x00, 0x01,
			0x00, 0x01, 0x00, 0x00, 0x00, 0x08,
			0x00, 0x03, 0x00, 0x03, 0x00, 0x04, 0x00, 0x05,
		]);
		Ok(())
	}

	#[test]
	fn reserved_frame_type() -> Result<()> {
		let mut pool = ConstantPool::new();
		utf8(&mut pool, "StackMapTable")?;
		let bytes = [0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 200];

		let error = read(&pool, &bytes, &mut Vec::new()).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::InvalidTag { what: "stack map frame", tag: 200 }));
		assert_eq!(error.path(), "attributes[0].entries[0]");

		let frame = StackMapFrame::ChopFrame { k: 4, offset_delta: 0 };
		assert!(matches!(frame.frame_type().unwrap_err().kind(), ErrorKind::InvalidCount { count: 4, .. }));
		Ok(())
	}

	#[test]
	fn annotations_too_deep() -> Result<()> {
		let mut pool = ConstantPool::new();
		utf8(&mut pool, "RuntimeVisibleAnnotations")?;

		let mut value = ElementValue::Const { tag: b's', const_value_index: 1 };
		for _ in 0..100 {
			value = ElementValue::Array { values: vec![value] };
		}
		// one annotation of type 1, with one element named 1
		let mut body = ByteWriter::new(vec![0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01]);
		value.write(&mut body)?;
		let body = body.into_inner();

		let mut bytes = vec![0x00, 0x01, 0x00, 0x01];
		bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
		bytes.extend_from_slice(&body);

		let error = read(&pool, &bytes, &mut Vec::new()).unwrap_err();
		assert!(matches!(error.kind(), ErrorKind::TooDeep { .. }));
		assert!(error.path().starts_with("attributes[0].annotations[0].element_value_pairs[0].value.values[0]"));
		Ok(())
	}

	#[test]
	fn names() {
		assert_eq!(AttributeKind::from_name(b"Code"), AttributeKind::Code);
		assert_eq!(AttributeKind::from_name(b"code"), AttributeKind::Other);
		assert_eq!(AttributeKind::BootstrapMethods.name(), Some("BootstrapMethods"));
		assert_eq!(AttributeKind::Other.name(), None);
	}
}
