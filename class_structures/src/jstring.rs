//! Turning the string format used in the Java Virtual Machine Specification into displayable rust strings.
//!
//! The Java Virtual Machine Specification's string format is using a 2x3-format for supplementary
//! characters and storing `\0` using two bytes.
//!
//! See <https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.4.7> for the complete specification of
//! the string format used in the Java Virtual Machine Specification.
//!
//! `Utf8` pool entries are kept as raw bytes, so this is only ever needed for showing them.

use java_string::JavaString;

/// Decodes modified UTF-8 for display.
///
/// Unpaired surrogates become replacement characters. If the data isn't modified UTF-8 at all,
/// it's decoded as lossy standard UTF-8 instead.
pub(crate) fn to_display_string(bytes: &[u8]) -> String {
	match JavaString::from_modified_utf8(bytes.to_vec()) {
		Ok(string) => string.as_str_lossy().into_owned(),
		Err(_) => String::from_utf8_lossy(bytes).into_owned(),
	}
}
