//! The tiny v2 mappings format.
//!
//! A file starts with a header naming the version and the namespaces, followed by indented properties. Every
//! further line is a class (`c`), or, indented below it, a field (`f`), method (`m`), parameter (`p`), local
//! variable (`v`) or comment (`c`). Names are tab separated, one for each namespace.
//!
//! Use [`read_file`] or [`read`] to parse mappings, and check the namespaces you got with
//! [`Namespaces::check_that`][crate::tree::names::Namespaces::check_that].
//!
//! [`write`][fn@write], [`write_file`], [`write_vec`] and [`write_string`] write mappings back. Entries come out
//! in the order they are stored in, and rows with fewer names than namespaces are padded with empty names. A name
//! containing a tab or a line break can't be written unless the `escaped-names` property is set.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use anyhow::{anyhow, bail, Context, Result};
use crate::lines::tiny_line::TinyLine;
use crate::lines::{escape, Level};
use crate::tree::mappings::{ClassMapping, ClassNode, FieldMapping, FieldNode, LocalVariableMapping, LocalVariableNode, MappingInfo, Mappings, MethodMapping, MethodNode, ParameterMapping, ParameterNode};
use crate::tree::names::Names;
use crate::tree::NodeInfo;

/// Opens the file at the given path and reads it as tiny v2.
pub fn read_file(path: impl AsRef<Path>) -> Result<Mappings> {
	let file = File::open(&path)
		.with_context(|| anyhow!("failed to open mappings file {:?}", path.as_ref()))?;
	read(file)
		.with_context(|| anyhow!("cannot read {:?} as tiny v2 mappings", path.as_ref()))
}

#[allow(clippy::tabs_in_doc_comments)]
/// Reads tiny v2 mappings from the given reader.
///
/// Sections that aren't known are skipped, together with everything indented below them.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let string = "\
/// tiny	2	0	namespaceA	namespaceB	namespaceC
/// c	A	B	C
/// 	f	LA;	a	b	c
/// 	m	(LA;)V	a	b	c
/// 		p	1		x	y
/// ";
///
/// let mappings = tiny_mappings::tiny_v2::read(string.as_bytes()).unwrap();
///
/// mappings.info.namespaces.check_that(&["namespaceA", "namespaceB", "namespaceC"]).unwrap();
/// assert_eq!(mappings.classes.len(), 1);
/// let class = &mappings.classes["A"];
/// assert_eq!(class.fields.len(), 1);
/// assert_eq!(class.methods.len(), 1);
/// ```
pub fn read(reader: impl Read) -> Result<Mappings> {
	let mut lines = BufReader::new(reader)
		.lines()
		.enumerate()
		.map(|(number, line)| -> Result<TinyLine> {
			Ok(TinyLine::new(number + 1, &line?))
		})
		.peekable();

	let header = lines.next().context("file is empty, expected a tiny v2 header")??;
	let mut level = Level::top(&mut lines);

	let mut info = read_header(header)?;

	level.children().for_each_line(|level, mut line| {
		let value = line.next_optional();
		if let Some(extra) = line.next_optional() {
			bail!("property {:?} has a second value {extra:?}", line.first_field);
		}
		if info.properties.insert(line.first_field, value).is_some() {
			bail!("property given twice");
		}
		level.skip_children()
	}).context("reading properties")?;

	let format = Format {
		len: info.namespaces.len(),
		escaped: info.escaped_names(),
	};
	let mut mappings = Mappings::new(info);

	level.for_each_line(|level, line| match line.first_field.as_str() {
		"c" => {
			let class = ClassNode::new(ClassMapping { names: line.into_names(format.len, format.escaped)? });
			let class = mappings.add_class(class)?;
			read_class(level.children(), class, format)
				.context("reading class sub-sections")
		},
		_ => level.skip_children(),
	}).context("reading lines")?;

	if let Some(line) = lines.next() {
		bail!("expected end of input, got: {line:?}");
	}

	Ok(mappings)
}

#[derive(Clone, Copy)]
struct Format {
	len: usize,
	escaped: bool,
}

fn read_header(mut header: TinyLine) -> Result<MappingInfo> {
	if header.depth() != 0 || header.first_field != "tiny" {
		bail!("not a tiny file, header line is {header:?}");
	}

	let major_version: u32 = header.next_parse()?;
	let minor_version: u32 = header.next_parse()?;
	if major_version != 2 {
		bail!("expected tiny v2, got version {major_version}.{minor_version} in line {}", header.number());
	}

	let mut info = MappingInfo::new(header.into_namespaces()?);
	info.major_version = major_version;
	info.minor_version = minor_version;
	Ok(info)
}

/// Reads the comments below a field, parameter or local variable, ignoring anything else.
fn read_comments<I>(level: Level<'_, I>, comments: &mut Vec<String>) -> Result<()>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	level.for_each_line(|level, line| {
		if line.first_field == "c" {
			comments.push(line.into_comment()?);
		}
		level.skip_children()
	})
}

fn read_class<I>(level: Level<'_, I>, class: &mut ClassNode, format: Format) -> Result<()>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	level.for_each_line(|level, mut line| match line.first_field.as_str() {
		"f" => {
			let desc = line.next()?;
			let names = line.into_names(format.len, format.escaped)?;
			let field = class.add_field(FieldNode::new(FieldMapping { desc, names }))?;

			read_comments(level.children(), &mut field.comments)
				.context("reading field sub-sections")
		},
		"m" => {
			let desc = line.next()?;
			let names = line.into_names(format.len, format.escaped)?;
			let method = class.add_method(MethodNode::new(MethodMapping { desc, names }))?;

			read_method(level.children(), method, format)
				.context("reading method sub-sections")
		},
		"c" => {
			class.comments.push(line.into_comment()?);
			level.skip_children()
		},
		_ => level.skip_children(),
	})
}

fn read_method<I>(level: Level<'_, I>, method: &mut MethodNode, format: Format) -> Result<()>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	level.for_each_line(|level, mut line| match line.first_field.as_str() {
		"p" => {
			let index = line.next_parse()?;
			let names = line.into_names(format.len, format.escaped)?;
			let parameter = method.add_parameter(ParameterNode::new(ParameterMapping { index, names }));

			read_comments(level.children(), &mut parameter.comments)
				.context("reading parameter sub-sections")
		},
		"v" => {
			let index = line.next_parse()?;
			let start_offset = line.next_parse()?;
			// -1 means there's no index into the local variable table
			let lvt_index: i64 = line.next_parse()?;
			let lvt_index = usize::try_from(lvt_index).ok();
			let names = line.into_names(format.len, format.escaped)?;
			let local = method.add_local(LocalVariableNode::new(LocalVariableMapping { index, start_offset, lvt_index, names }));

			read_comments(level.children(), &mut local.comments)
				.context("reading local variable sub-sections")
		},
		"c" => {
			method.comments.push(line.into_comment()?);
			level.skip_children()
		},
		_ => level.skip_children(),
	})
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the given mappings into a `String`, in the tiny v2 format.
///
/// This is equivalent to first calling [`write_vec`] and then [`String::from_utf8`].
///
/// This method is of most use in test cases, where you also use the `pretty_assertions` crate for viewing string diffs.
pub fn write_string(mappings: &Mappings) -> Result<String> {
	let vec = write_vec(mappings)?;
	String::from_utf8(vec).context("failed to convert written mappings to utf8")
}

/// Writes the given mappings into a `Vec<u8>`, in the tiny v2 format.
///
/// This is equivalent to letting [`write`][fn@write] write into a `Vec<u8>`.
pub fn write_vec(mappings: &Mappings) -> Result<Vec<u8>> {
	let mut vec = Vec::new();
	write(mappings, &mut vec)?;
	Ok(vec)
}

/// Writes the given mappings into the file at the given path, creating or truncating it.
pub fn write_file(mappings: &Mappings, path: impl AsRef<Path>) -> Result<()> {
	let mut file = File::create(&path)
		.with_context(|| anyhow!("failed to create mappings file {:?}", path.as_ref()))?;
	write(mappings, &mut file)
		.with_context(|| anyhow!("failed to write mappings file {:?}", path.as_ref()))
}

fn write_names(w: &mut impl Write, names: &Names, len: usize, escaped: bool) -> Result<()> {
	if names.len() > len {
		bail!("cannot write {names:?}: there are only {len} namespaces");
	}
	for name in names.iter() {
		let name = name.unwrap_or("");
		if escaped {
			write!(w, "\t{}", escape(name))?;
		} else if name.contains(['\t', '\n', '\r']) {
			bail!("name {name:?} can only be written with the {:?} property set", MappingInfo::ESCAPED_NAMES);
		} else {
			write!(w, "\t{name}")?;
		}
	}
	for _ in names.len()..len {
		write!(w, "\t")?;
	}
	writeln!(w)?;
	Ok(())
}

fn write_comments(w: &mut impl Write, comments: &[String], depth: usize) -> Result<()> {
	for comment in comments {
		writeln!(w, "{}c\t{}", "\t".repeat(depth), escape(comment))?;
	}
	Ok(())
}

#[allow(clippy::tabs_in_doc_comments)]
/// Writes the given mappings to the given writer, in the tiny v2 format.
///
/// ```
/// # use pretty_assertions::assert_eq;
/// let input = "\
/// tiny	2	0	namespaceA	namespaceB
/// 	escaped-names
/// c	A	B
/// 	c	A comment\\twith a tab.
/// 	f	I	a	b
/// 	m	()V	b	c
/// 		v	1	2	-1		d
/// ";
///
/// let mappings = tiny_mappings::tiny_v2::read(input.as_bytes()).unwrap();
///
/// let mut buf: Vec<u8> = Vec::new();
/// tiny_mappings::tiny_v2::write(&mappings, &mut buf).unwrap();
/// let written = String::from_utf8(buf).unwrap();
///
/// assert_eq!(written, input);
/// ```
pub fn write(mappings: &Mappings, w: &mut impl Write) -> Result<()> {
	// the buffering makes it much faster
	let mut w = BufWriter::new(w);
	let w = &mut w;

	let len = mappings.info.namespaces.len();
	let escaped = mappings.info.escaped_names();

	write!(w, "tiny\t{}\t{}", mappings.info.major_version, mappings.info.minor_version)?;
	for namespace in mappings.info.namespaces.names() {
		write!(w, "\t{namespace}")?;
	}
	writeln!(w)?;

	for (key, value) in &mappings.info.properties {
		match value {
			Some(value) => writeln!(w, "\t{key}\t{value}")?,
			None => writeln!(w, "\t{key}")?,
		}
	}

	for class in mappings.classes.values() {
		write!(w, "c")?;
		write_names(w, &class.info.names, len, escaped)
			.with_context(|| anyhow!("for class {:?}", class.info.names))?;
		write_comments(w, &class.comments, 1)?;

		for field in class.fields.values() {
			write!(w, "\tf\t{}", field.info.desc)?;
			write_names(w, &field.info.names, len, escaped)
				.with_context(|| anyhow!("for field {:?} in class {:?}", field.info.names, class.info.names))?;
			write_comments(w, &field.comments, 2)?;
		}

		for method in class.methods.values() {
			write!(w, "\tm\t{}", method.info.desc)?;
			write_names(w, &method.info.names, len, escaped)
				.with_context(|| anyhow!("for method {:?} in class {:?}", method.info.names, class.info.names))?;
			write_comments(w, &method.comments, 2)?;

			for parameter in &method.parameters {
				write!(w, "\t\tp\t{}", parameter.info.index)?;
				write_names(w, &parameter.info.names, len, escaped)
					.with_context(|| anyhow!("for parameter {:?} in method {:?}", parameter.info.names, method.info.names))?;
				write_comments(w, &parameter.comments, 3)?;
			}

			for local in &method.locals {
				let lvt_index = local.info.lvt_index.map_or(-1, |x| x as i64);
				write!(w, "\t\tv\t{}\t{}\t{lvt_index}", local.info.index, local.info.start_offset)?;
				write_names(w, &local.info.names, len, escaped)
					.with_context(|| anyhow!("for local variable {:?} in method {:?}", local.info.names, method.info.names))?;
				write_comments(w, &local.comments, 3)?;
			}
		}
	}

	w.flush()?;

	Ok(())
}
