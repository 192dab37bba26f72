use pretty_assertions::assert_eq;
use class_structures::{flags, AttributeInfo, ClassFile, ConstantPool, CpInfo, FieldInfo, MethodInfo, Result};

fn utf8(bytes: &mut Vec<u8>, text: &str) {
	bytes.push(1);
	bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
	bytes.extend_from_slice(text.as_bytes());
}

fn u16s(bytes: &mut Vec<u8>, values: &[u16]) {
	for value in values {
		bytes.extend_from_slice(&value.to_be_bytes());
	}
}

#[test]
fn test() -> Result<()> {
	let mut constant_pool = ConstantPool::new();
	for entry in [
		CpInfo::Utf8 { bytes: b"ThisClass".to_vec() },
		CpInfo::Class { name_index: 1 },
		CpInfo::Utf8 { bytes: b"ThatClass".to_vec() },
		CpInfo::Class { name_index: 3 },
		CpInfo::Utf8 { bytes: b"ThisInterface".to_vec() },
		CpInfo::Class { name_index: 5 },
		CpInfo::Utf8 { bytes: b"ThatInterface".to_vec() },
		CpInfo::Class { name_index: 7 },
		CpInfo::Utf8 { bytes: b"thisField".to_vec() },
		CpInfo::Utf8 { bytes: b"I".to_vec() },
		CpInfo::Utf8 { bytes: b"ConstantValue".to_vec() },
		CpInfo::Integer { bytes: 42 },
		CpInfo::Utf8 { bytes: b"thatField".to_vec() },
		CpInfo::Utf8 { bytes: b"F".to_vec() },
		CpInfo::Float { bytes: 42.3456f32.to_bits() },
		CpInfo::Utf8 { bytes: b"thisMethod".to_vec() },
		CpInfo::Utf8 { bytes: b"()I".to_vec() },
		CpInfo::Utf8 { bytes: b"thatMethod".to_vec() },
		CpInfo::Utf8 { bytes: b"()F".to_vec() },
	] {
		constant_pool.push(entry)?;
	}

	let class = ClassFile {
		minor_version: 0,
		major_version: 52,
		constant_pool,
		access_flags: 0,
		this_class: 2,
		super_class: 4,
		interfaces: vec![6, 8],
		fields: vec![
			FieldInfo {
				access_flags: 0,
				name_index: 9,
				descriptor_index: 10,
				attributes: vec![
					AttributeInfo::ConstantValue {
						attribute_name_index: 11,
						constantvalue_index: 12,
					}
				],
			},
			FieldInfo {
				access_flags: 0,
				name_index: 13,
				descriptor_index: 14,
				attributes: vec![
					AttributeInfo::ConstantValue {
						attribute_name_index: 11,
						constantvalue_index: 15,
					}
				],
			},
		],
		methods: vec![
			MethodInfo {
				access_flags: flags::ACC_ABSTRACT,
				name_index: 16,
				descriptor_index: 17,
				attributes: vec![],
			},
			MethodInfo {
				access_flags: flags::ACC_ABSTRACT,
				name_index: 18,
				descriptor_index: 19,
				attributes: vec![],
			},
		],
		attributes: vec![],
	};

	let mut expected = vec![0xca, 0xfe, 0xba, 0xbe, 0x00, 0x00, 0x00, 0x34, 0x00, 0x14];
	utf8(&mut expected, "ThisClass");
	expected.extend_from_slice(&[0x07, 0x00, 0x01]);
	utf8(&mut expected, "ThatClass");
	expected.extend_from_slice(&[0x07, 0x00, 0x03]);
	utf8(&mut expected, "ThisInterface");
	expected.extend_from_slice(&[0x07, 0x00, 0x05]);
	utf8(&mut expected, "ThatInterface");
	expected.extend_from_slice(&[0x07, 0x00, 0x07]);
	utf8(&mut expected, "thisField");
	utf8(&mut expected, "I");
	utf8(&mut expected, "ConstantValue");
	expected.extend_from_slice(&[0x03, 0x00, 0x00, 0x00, 0x2a]);
	utf8(&mut expected, "thatField");
	utf8(&mut expected, "F");
	expected.push(0x04);
	expected.extend_from_slice(&42.3456f32.to_bits().to_be_bytes());
	utf8(&mut expected, "thisMethod");
	utf8(&mut expected, "()I");
	utf8(&mut expected, "thatMethod");
	utf8(&mut expected, "()F");
	// access_flags, this_class, super_class, interfaces
	u16s(&mut expected, &[0, 2, 4, 2, 6, 8]);
	// fields, each with a ConstantValue attribute of length 2
	u16s(&mut expected, &[2]);
	u16s(&mut expected, &[0, 9, 10, 1, 11, 0, 2, 12]);
	u16s(&mut expected, &[0, 13, 14, 1, 11, 0, 2, 15]);
	// methods
	u16s(&mut expected, &[2]);
	u16s(&mut expected, &[0x0400, 16, 17, 0]);
	u16s(&mut expected, &[0x0400, 18, 19, 0]);
	// attributes
	u16s(&mut expected, &[0]);

	let bytes = class.to_bytes()?;
	assert_eq!(bytes, expected);

	let mut cursor = std::io::Cursor::new(bytes);
	let read = ClassFile::read(&mut cursor)?;

	assert_eq!(class, read);

	Ok(())
}
