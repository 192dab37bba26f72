use std::fs::File;
use std::io::Read;
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;
use zip::ZipArchive;

/// The bytes of a single class file, with a name to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClassSource {
	/// The path of the file, or `archive.jar!/path/in/Archive.class` for jar entries.
	pub(crate) name: String,
	pub(crate) bytes: Vec<u8>,
}

fn is_archive(path: &Path) -> bool {
	path.extension().is_some_and(|extension| extension == "jar" || extension == "zip")
}

fn is_class(name: &str) -> bool {
	name.ends_with(".class")
}

/// Collects all class files a path given on the command line stands for.
///
/// Directories are walked recursively and contribute their `.class` files and jars. A jar or zip
/// contributes all `.class` entries. Any other file is taken as a class file, whatever its name.
pub(crate) fn collect(path: &Path) -> Result<Vec<ClassSource>> {
	if path.is_dir() {
		let mut sources = Vec::new();
		for entry in WalkDir::new(path).sort_by_file_name() {
			let entry = entry.with_context(|| anyhow!("failed to walk directory {path:?}"))?;
			if entry.file_type().is_dir() {
				continue;
			}
			let entry_path = entry.path();
			if is_archive(entry_path) {
				sources.extend(read_archive(entry_path)?);
			} else if entry_path.to_str().is_some_and(is_class) {
				sources.push(read_file(entry_path)?);
			}
		}
		log::debug!("found {} class files in {path:?}", sources.len());
		Ok(sources)
	} else if is_archive(path) {
		read_archive(path)
	} else {
		Ok(vec![read_file(path)?])
	}
}

pub(crate) fn read_file(path: &Path) -> Result<ClassSource> {
	let bytes = std::fs::read(path)
		.with_context(|| anyhow!("could not read file {path:?}"))?;
	Ok(ClassSource { name: path.display().to_string(), bytes })
}

fn read_archive(path: &Path) -> Result<Vec<ClassSource>> {
	let file = File::open(path)
		.with_context(|| anyhow!("could not open file {path:?}"))?;
	let mut archive = ZipArchive::new(file)
		.with_context(|| anyhow!("failed to read zip archive from {path:?}"))?;

	let mut sources = Vec::new();
	for index in 0..archive.len() {
		let mut entry = archive.by_index(index)
			.with_context(|| anyhow!("failed to read entry {index} of {path:?}"))?;
		if entry.is_dir() || !is_class(entry.name()) {
			continue;
		}
		let name = format!("{}!/{}", path.display(), entry.name());
		let mut bytes = Vec::with_capacity(entry.size() as usize);
		entry.read_to_end(&mut bytes)
			.with_context(|| anyhow!("failed to decompress {name}"))?;
		sources.push(ClassSource { name, bytes });
	}
	log::debug!("found {} class files in {path:?}", sources.len());
	Ok(sources)
}
