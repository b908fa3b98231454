use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use tiny_mappings::tree::mappings::Mappings;
use tiny_mappings::{ColumnLayout, MergeOptions};

/// Merges tiny v2 mappings files that share their first namespace into one file.
#[derive(Debug, Parser)]
#[command(name = "tiny-merge")]
struct Cli {
	/// Be verbose.
	#[arg(short = 'v', long = "verbose")]
	verbose: bool,

	/// Only print warnings and errors.
	#[arg(long = "quiet", conflicts_with = "verbose")]
	quiet: bool,

	/// Keep the names of each input in their own columns, leaving them empty where an input has no entry.
	#[arg(long = "align-columns")]
	align_columns: bool,

	/// The input files, followed by the output file.
	#[arg(value_name = "FILE", required = true, num_args = 3..)]
	files: Vec<PathBuf>,
}

fn setup_logger(level: LevelFilter) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

fn main() -> Result<()> {
	let cli: Cli = Cli::parse();

	let level = if cli.verbose {
		LevelFilter::Trace
	} else if cli.quiet {
		LevelFilter::Warn
	} else {
		LevelFilter::Info
	};
	setup_logger(level)?;

	// clap makes sure there are at least three
	let (output, inputs) = cli.files.split_last()
		.context("no output file given")?;

	let mappings = inputs.iter()
		.map(tiny_mappings::tiny_v2::read_file)
		.collect::<Result<Vec<_>>>()?;

	if let [first, rest @ ..] = inputs {
		let rest: Vec<_> = rest.iter().map(|path| path.display().to_string()).collect();
		info!("Merging {} with {}", first.display(), rest.join(", "));
	}

	let options = MergeOptions {
		layout: if cli.align_columns { ColumnLayout::Aligned } else { ColumnLayout::Compact },
	};

	let merged = Mappings::merge_with(&mappings, options)
		.map_err(|error| match error.input().and_then(|input| inputs.get(input)) {
			Some(path) => anyhow!(error).context(format!("cannot merge {path:?}")),
			None => anyhow!(error),
		})?;

	tiny_mappings::tiny_v2::write_file(&merged, output)?;

	info!("Merged mappings written to {}", output.display());

	Ok(())
}
