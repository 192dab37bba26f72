use std::io::Write;
use anyhow::Result;
use class_structures::flags::{self, FlagTarget};
use class_structures::{AttributeInfo, ClassFile, ConstantPool, CpInfo, Node, ReferenceKind};

/// Shows the value, or the error in angle brackets. Used for anything looked up in the constant pool,
/// so that a broken reference doesn't stop the whole dump.
fn text_or_error(result: class_structures::Result<String>) -> String {
	result.unwrap_or_else(|e| format!("<{e}>"))
}

fn flags_text(access_flags: u16, target: FlagTarget) -> String {
	format!("{access_flags:#06x} ({})", flags::names(access_flags, target).join(" "))
}

fn entry_text(pool: &ConstantPool, index: u16, entry: &CpInfo) -> String {
	let name = text_or_error(pool.display_name(index));
	let mut text = match entry {
		CpInfo::MethodHandle(handle) => match ReferenceKind::from_u8(handle.reference_kind) {
			Ok(kind) => format!("{} {name}", kind.name()),
			Err(_) => format!("<reference kind {}> {name}", handle.reference_kind),
		},
		_ => name,
	};
	if matches!(entry,
		CpInfo::NameAndType(_) | CpInfo::Fieldref(_) | CpInfo::Methodref(_) | CpInfo::InterfaceMethodref(_)
		| CpInfo::MethodHandle(_) | CpInfo::Dynamic(_) | CpInfo::InvokeDynamic(_)
	) {
		text.push(':');
		text.push_str(&text_or_error(pool.descriptor(index)));
	}
	text
}

fn write_node(out: &mut impl Write, pool: &ConstantPool, node: &Node, depth: usize) -> Result<()> {
	let indent = "  ".repeat(depth);
	match node {
		Node::Attribute(attribute) => {
			let name = text_or_error(pool.utf8_text(attribute.name_index()));
			writeln!(out, "{indent}{name}, {} bytes", attribute.attribute_length()?)?;
		},
		Node::BootstrapMethod(index, entry) => {
			let kind = pool.get_method_handle(entry.method_ref).ok()
				.and_then(|handle| ReferenceKind::from_u8(handle.reference_kind).ok())
				.map_or("unknown kind", ReferenceKind::name);
			let name = entry.defining_name(pool).unwrap_or_else(|e| {
				log::warn!("bootstrap method {index} has no name: {e}");
				format!("<{e}>")
			});
			writeln!(out, "{indent}bootstrap method {index}: {name} ({kind}), {} arguments", entry.arguments.len())?;
		},
	}
	for child in node.children() {
		write_node(out, pool, &child, depth + 1)?;
	}
	Ok(())
}

fn write_attributes(out: &mut impl Write, pool: &ConstantPool, attributes: &[AttributeInfo], depth: usize) -> Result<()> {
	for attribute in attributes {
		write_node(out, pool, &Node::Attribute(attribute), depth)?;
	}
	Ok(())
}

/// Prints the header, the constant pool, all members and the attribute tree of a class.
pub(crate) fn dump(class: &ClassFile, out: &mut impl Write) -> Result<()> {
	let pool = &class.constant_pool;

	writeln!(out, "class {}", text_or_error(class.this_class_name()))?;
	let release = class.release().map_or_else(|| "unknown release".to_owned(), |release| release.to_string());
	writeln!(out, "  version: {}.{} ({release})", class.major_version, class.minor_version)?;
	writeln!(out, "  flags: {}", flags_text(class.access_flags, FlagTarget::Class))?;
	match class.super_class_name() {
		Ok(Some(name)) => writeln!(out, "  super class: {name}")?,
		Ok(None) => writeln!(out, "  super class: none")?,
		Err(e) => writeln!(out, "  super class: <{e}>")?,
	}
	writeln!(out, "  interfaces: {}", class.interfaces.len())?;
	for &interface in &class.interfaces {
		writeln!(out, "    {}", text_or_error(pool.display_name(interface)))?;
	}

	writeln!(out, "constant pool: {} entries", pool.len())?;
	for (index, entry) in pool.iter() {
		writeln!(out, "  #{index} = {} {}", entry.tag(), entry_text(pool, index, entry))?;
	}

	writeln!(out, "fields: {}", class.fields.len())?;
	for field in &class.fields {
		writeln!(out, "  {} {}", text_or_error(pool.utf8_text(field.name_index)), text_or_error(pool.utf8_text(field.descriptor_index)))?;
		writeln!(out, "    flags: {}", flags_text(field.access_flags, FlagTarget::Field))?;
		write_attributes(out, pool, &field.attributes, 2)?;
	}

	writeln!(out, "methods: {}", class.methods.len())?;
	for method in &class.methods {
		writeln!(out, "  {} {}", text_or_error(pool.utf8_text(method.name_index)), text_or_error(pool.utf8_text(method.descriptor_index)))?;
		writeln!(out, "    flags: {}", flags_text(method.access_flags, FlagTarget::Method))?;
		write_attributes(out, pool, &method.attributes, 2)?;
	}

	writeln!(out, "attributes: {}", class.attributes.len())?;
	write_attributes(out, pool, &class.attributes, 1)?;

	Ok(())
}
