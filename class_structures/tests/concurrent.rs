use std::thread;
use pretty_assertions::assert_eq;
use class_structures::{AttributeInfo, AttributeKind, BootstrapMethodEntry, ClassFile, ConstantPool, CpInfo, Error, MethodInfo, Node, Result};
use class_structures::pool::{MemberRef, MethodHandle, NameAndType};

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn model_is_send_and_sync() {
	assert_send_sync::<ClassFile>();
	assert_send_sync::<ConstantPool>();
	assert_send_sync::<AttributeInfo>();
	assert_send_sync::<Error>();
}

fn class_with_bootstrap_methods() -> Result<ClassFile> {
	let mut pool = ConstantPool::new();
	let name = pool.push(CpInfo::Utf8 { bytes: b"Lambdas".to_vec() })?;
	let this_class = pool.push(CpInfo::Class { name_index: name })?;
	let bootstrap_methods = pool.push(CpInfo::Utf8 { bytes: b"BootstrapMethods".to_vec() })?;
	let code = pool.push(CpInfo::Utf8 { bytes: b"Code".to_vec() })?;
	let descriptor = pool.push(CpInfo::Utf8 { bytes: b"()V".to_vec() })?;

	let mut methods = Vec::new();
	let mut entries = Vec::new();
	for i in 0..16 {
		let method_name = pool.push(CpInfo::Utf8 { bytes: format!("lambda${i}").into_bytes() })?;
		let name_and_type = pool.push(CpInfo::NameAndType(NameAndType { name_index: method_name, descriptor_index: descriptor }))?;
		let method_ref = pool.push(CpInfo::Methodref(MemberRef { class_index: this_class, name_and_type_index: name_and_type }))?;
		let handle = pool.push(CpInfo::MethodHandle(MethodHandle { reference_kind: 6, reference_index: method_ref }))?;

		methods.push(MethodInfo {
			access_flags: 0,
			name_index: method_name,
			descriptor_index: descriptor,
			attributes: vec![
				AttributeInfo::Code { attribute_name_index: code, max_stack: 0, max_locals: 0, code: vec![0xb1], exception_table: vec![], attributes: vec![] },
			],
		});
		entries.push(BootstrapMethodEntry { method_ref: handle, arguments: vec![descriptor; i] });
	}

	Ok(ClassFile {
		minor_version: 0,
		major_version: 65,
		constant_pool: pool,
		access_flags: 0,
		this_class,
		super_class: 0,
		interfaces: vec![],
		fields: vec![],
		methods,
		attributes: vec![
			AttributeInfo::BootstrapMethods { attribute_name_index: bootstrap_methods, bootstrap_methods: entries },
		],
	})
}

#[test]
fn read_only_queries_from_many_threads() -> Result<()> {
	let bytes = class_with_bootstrap_methods()?.to_bytes()?;
	let class = ClassFile::from_bytes(&bytes)?;
	let class = &class;
	let bytes = bytes.as_slice();

	let results: Vec<Result<Vec<String>>> = thread::scope(|scope| {
		let handles: Vec<_> = (0..8)
			.map(|_| scope.spawn(move || -> Result<Vec<String>> {
				assert_eq!(class.to_bytes()?, bytes);

				let node = Node::Attribute(&class.attributes[0]);
				let mut names = Vec::new();
				for child in node.children() {
					let name_index = child.name_index(&class.constant_pool)?;
					names.push(class.constant_pool.utf8_text(name_index)?);
				}
				for (i, method) in class.methods.iter().enumerate() {
					assert!(class_structures::find_attribute(&method.attributes, AttributeKind::Code).is_some());
					assert_eq!(class.bootstrap_method_name_index(i)?, method.name_index);
				}
				Ok(names)
			}))
			.collect();

		handles.into_iter()
			.map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
			.collect()
	});

	let expected: Vec<String> = (0..16).map(|i| format!("lambda${i}")).collect();
	for result in results {
		assert_eq!(result?, expected);
	}
	Ok(())
}
