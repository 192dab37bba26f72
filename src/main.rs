use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use class_structures::{ClassFile, LogSink};
use crate::check::Outcome;

mod check;
mod dump;
mod input;

#[derive(Debug, Parser)]
#[command(version, about = "Reads, prints and checks java class files")]
struct Cli {
	/// Be verbose. Given twice, every record read and written is logged.
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Prints the header, constant pool, members and attributes of a class file
	Dump {
		file: PathBuf,
	},
	/// Reads and writes class files again, and reports the ones that don't give the same bytes
	///
	/// Directories are searched for class files and jars, jars and zips are searched for class files.
	Check {
		#[arg(required = true)]
		paths: Vec<PathBuf>,
	},
	/// Reads a class file and writes it to a new file
	Rewrite {
		input: PathBuf,
		output: PathBuf,
	},
}

fn setup_logger(verbose: u8) -> Result<()> {
	let level = match verbose {
		0 => LevelFilter::Warn,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up the logger")
}

fn run_dump(file: PathBuf) -> Result<()> {
	let source = input::read_file(&file)?;
	let class = ClassFile::read_with(&source.bytes, &mut LogSink)
		.with_context(|| anyhow!("failed to decode {}", source.name))?;

	let mut stdout = std::io::stdout().lock();
	dump::dump(&class, &mut stdout)?;
	stdout.flush()?;
	Ok(())
}

/// Returns the number of class files that failed the check.
fn run_check(paths: Vec<PathBuf>) -> Result<usize> {
	let mut sources = Vec::new();
	for path in &paths {
		sources.extend(input::collect(path)?);
	}

	let outcomes = check::check_all(&sources)?;

	let mut stdout = std::io::stdout().lock();
	let mut failed = 0;
	for (source, outcome) in sources.iter().zip(&outcomes) {
		match outcome {
			Outcome::Identical => writeln!(stdout, "ok   {}", source.name)?,
			Outcome::Differs { first_difference, original_len, written_len } => writeln!(stdout,
				"DIFF {}: first difference at byte {first_difference}, read {original_len} bytes, wrote {written_len} bytes",
				source.name,
			)?,
			Outcome::Failed(e) => writeln!(stdout, "FAIL {}: {e:#}", source.name)?,
		}
		if !outcome.is_identical() {
			failed += 1;
		}
	}
	writeln!(stdout, "{} class files checked, {failed} failed", sources.len())?;
	stdout.flush()?;

	Ok(failed)
}

fn run_rewrite(input: PathBuf, output: PathBuf) -> Result<()> {
	let source = input::read_file(&input)?;
	let class = ClassFile::read_with(&source.bytes, &mut LogSink)
		.with_context(|| anyhow!("failed to decode {}", source.name))?;

	let mut bytes = Vec::with_capacity(source.bytes.len());
	class.write_with(&mut bytes, &mut LogSink)
		.with_context(|| anyhow!("failed to encode {}", source.name))?;
	std::fs::write(&output, &bytes)
		.with_context(|| anyhow!("could not write file {output:?}"))?;

	log::info!("wrote {} bytes to {output:?}", bytes.len());
	Ok(())
}

fn main() -> Result<ExitCode> {
	let cli = Cli::parse();
	setup_logger(cli.verbose)?;
	log::debug!("{cli:?}");

	match cli.command {
		Command::Dump { file } => run_dump(file)?,
		Command::Check { paths } => {
			if run_check(paths)? > 0 {
				return Ok(ExitCode::FAILURE);
			}
		},
		Command::Rewrite { input, output } => run_rewrite(input, output)?,
	}
	Ok(ExitCode::SUCCESS)
}
