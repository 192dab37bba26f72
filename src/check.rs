use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use anyhow::{anyhow, Context, Result};
use class_structures::{ClassFile, LogSink};
use crate::input::ClassSource;

/// What decoding and encoding a class file again gave.
#[derive(Debug)]
pub(crate) enum Outcome {
	Identical,
	/// Encoded fine, but not to the input.
	Differs {
		/// Offset of the first byte that's different, or the length of the shorter one.
		first_difference: usize,
		original_len: usize,
		written_len: usize,
	},
	Failed(anyhow::Error),
}

impl Outcome {
	pub(crate) fn is_identical(&self) -> bool {
		matches!(self, Outcome::Identical)
	}
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
	a.iter()
		.zip(b)
		.position(|(x, y)| x != y)
		.or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

/// Decodes and encodes the class again, with all diagnostics sent to the log.
pub(crate) fn round_trip(bytes: &[u8]) -> Result<Vec<u8>> {
	let class = ClassFile::read_with(bytes, &mut LogSink)
		.context("failed to decode")?;
	let mut written = Vec::with_capacity(bytes.len());
	class.write_with(&mut written, &mut LogSink)
		.context("failed to encode")?;
	Ok(written)
}

pub(crate) fn check_one(source: &ClassSource) -> Outcome {
	log::debug!("checking {}", source.name);
	match round_trip(&source.bytes) {
		Ok(written) => match first_difference(&source.bytes, &written) {
			None => Outcome::Identical,
			Some(first_difference) => Outcome::Differs {
				first_difference,
				original_len: source.bytes.len(),
				written_len: written.len(),
			},
		},
		Err(e) => Outcome::Failed(e),
	}
}

fn worker_count(tasks: usize) -> usize {
	thread::available_parallelism()
		.map_or(1, NonZeroUsize::get)
		.min(tasks)
		.max(1)
}

/// Checks all sources on a pool of scoped threads. The outcomes are in the order of `sources`.
pub(crate) fn check_all(sources: &[ClassSource]) -> Result<Vec<Outcome>> {
	let next = AtomicUsize::new(0);
	let workers = worker_count(sources.len());
	log::info!("checking {} class files on {workers} threads", sources.len());

	let mut outcomes: Vec<(usize, Outcome)> = thread::scope(|scope| {
		let handles: Vec<_> = (0..workers)
			.map(|_| scope.spawn(|| {
				let mut done = Vec::new();
				loop {
					let index = next.fetch_add(1, Ordering::Relaxed);
					let Some(source) = sources.get(index) else {
						break done;
					};
					done.push((index, check_one(source)));
				}
			}))
			.collect();

		handles.into_iter()
			.map(|handle| handle.join().map_err(|_| anyhow!("a worker thread panicked")))
			.collect::<Result<Vec<_>>>()
			.map(|done| done.into_iter().flatten().collect())
	})?;

	outcomes.sort_by_key(|(index, _)| *index);
	Ok(outcomes.into_iter().map(|(_, outcome)| outcome).collect())
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use crate::check::{check_all, first_difference, Outcome};
	use crate::dump::testing::sample_class;
	use crate::input::ClassSource;

	#[test]
	fn differences() {
		assert_eq!(first_difference(b"abc", b"abc"), None);
		assert_eq!(first_difference(b"abc", b"abd"), Some(2));
		assert_eq!(first_difference(b"abc", b"ab"), Some(2));
		assert_eq!(first_difference(b"", b"a"), Some(0));
	}

	#[test]
	fn outcomes_keep_their_order() -> Result<()> {
		let good = sample_class()?.to_bytes()?;
		let mut trailing = good.clone();
		trailing.push(0);

		let mut sources = Vec::new();
		for i in 0..20 {
			let bytes = match i % 4 {
				0 => b"not a class".to_vec(),
				1 => trailing.clone(),
				_ => good.clone(),
			};
			sources.push(ClassSource { name: format!("{i}.class"), bytes });
		}

		let outcomes = check_all(&sources)?;
		assert_eq!(outcomes.len(), 20);
		for (i, outcome) in outcomes.iter().enumerate() {
			match (i % 4, outcome) {
				(0, Outcome::Failed(e)) => assert!(format!("{e:#}").starts_with("failed to decode: ")),
				(1, Outcome::Failed(e)) => assert!(format!("{e:#}").contains("after the end of the class file")),
				(2 | 3, Outcome::Identical) => {},
				(_, outcome) => panic!("unexpected outcome for {i}: {outcome:?}"),
			}
		}
		Ok(())
	}

	#[test]
	fn nothing_to_check() -> Result<()> {
		assert!(check_all(&[])?.is_empty());
		Ok(())
	}
}
