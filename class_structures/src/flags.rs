//! Access flags of classes, fields, methods, inner classes and method parameters.
//!
//! Some bits mean different things depending on what they're attached to, like `0x0020` being
//! `ACC_SUPER` on a class but `ACC_SYNCHRONIZED` on a method.

pub const ACC_PUBLIC: u16       = 0x0001; // class, field, method, inner class
pub const ACC_PRIVATE: u16      = 0x0002; // field, method, inner class
pub const ACC_PROTECTED: u16    = 0x0004; // field, method, inner class
pub const ACC_STATIC: u16       = 0x0008; // field, method, inner class
pub const ACC_FINAL: u16        = 0x0010; // class, field, method, inner class, parameter
pub const ACC_SUPER: u16        = 0x0020; // class
pub const ACC_SYNCHRONIZED: u16 = 0x0020; // method
pub const ACC_VOLATILE: u16     = 0x0040; // field
pub const ACC_BRIDGE: u16       = 0x0040; // method
pub const ACC_TRANSIENT: u16    = 0x0080; // field
pub const ACC_VARARGS: u16      = 0x0080; // method
pub const ACC_NATIVE: u16       = 0x0100; // method
pub const ACC_INTERFACE: u16    = 0x0200; // class, inner class
pub const ACC_ABSTRACT: u16     = 0x0400; // class, method, inner class
pub const ACC_STRICT: u16       = 0x0800; // method
pub const ACC_SYNTHETIC: u16    = 0x1000; // class, field, method, inner class, parameter
pub const ACC_ANNOTATION: u16   = 0x2000; // class, inner class
pub const ACC_ENUM: u16         = 0x4000; // class, field, inner class
pub const ACC_MODULE: u16       = 0x8000; // class
pub const ACC_MANDATED: u16     = 0x8000; // parameter

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagTarget {
	Class,
	Field,
	Method,
	InnerClass,
	Parameter,
}

const CLASS: &[(u16, &str)] = &[
	(ACC_PUBLIC, "public"),
	(ACC_FINAL, "final"),
	(ACC_SUPER, "super"),
	(ACC_INTERFACE, "interface"),
	(ACC_ABSTRACT, "abstract"),
	(ACC_SYNTHETIC, "synthetic"),
	(ACC_ANNOTATION, "annotation"),
	(ACC_ENUM, "enum"),
	(ACC_MODULE, "module"),
];

const FIELD: &[(u16, &str)] = &[
	(ACC_PUBLIC, "public"),
	(ACC_PRIVATE, "private"),
	(ACC_PROTECTED, "protected"),
	(ACC_STATIC, "static"),
	(ACC_FINAL, "final"),
	(ACC_VOLATILE, "volatile"),
	(ACC_TRANSIENT, "transient"),
	(ACC_SYNTHETIC, "synthetic"),
	(ACC_ENUM, "enum"),
];

const METHOD: &[(u16, &str)] = &[
	(ACC_PUBLIC, "public"),
	(ACC_PRIVATE, "private"),
	(ACC_PROTECTED, "protected"),
	(ACC_STATIC, "static"),
	(ACC_FINAL, "final"),
	(ACC_SYNCHRONIZED, "synchronized"),
	(ACC_BRIDGE, "bridge"),
	(ACC_VARARGS, "varargs"),
	(ACC_NATIVE, "native"),
	(ACC_ABSTRACT, "abstract"),
	(ACC_STRICT, "strict"),
	(ACC_SYNTHETIC, "synthetic"),
];

const INNER_CLASS: &[(u16, &str)] = &[
	(ACC_PUBLIC, "public"),
	(ACC_PRIVATE, "private"),
	(ACC_PROTECTED, "protected"),
	(ACC_STATIC, "static"),
	(ACC_FINAL, "final"),
	(ACC_INTERFACE, "interface"),
	(ACC_ABSTRACT, "abstract"),
	(ACC_SYNTHETIC, "synthetic"),
	(ACC_ANNOTATION, "annotation"),
	(ACC_ENUM, "enum"),
];

const PARAMETER: &[(u16, &str)] = &[
	(ACC_FINAL, "final"),
	(ACC_SYNTHETIC, "synthetic"),
	(ACC_MANDATED, "mandated"),
];

/// The names of the flags set, in the order of their bits. Bits with no meaning for the target are ignored.
pub fn names(access_flags: u16, target: FlagTarget) -> Vec<&'static str> {
	let table = match target {
		FlagTarget::Class => CLASS,
		FlagTarget::Field => FIELD,
		FlagTarget::Method => METHOD,
		FlagTarget::InnerClass => INNER_CLASS,
		FlagTarget::Parameter => PARAMETER,
	};
	table.iter()
		.filter(|(bit, _)| access_flags & bit != 0)
		.map(|&(_, name)| name)
		.collect()
}
