use std::borrow::Cow;
use std::iter::Peekable;
use anyhow::{anyhow, bail, Context, Result};
use crate::lines::tiny_line::TinyLine;

/// The lines of one indentation level.
///
/// A line indented less than the level ends it. A line indented more is an error, since it should have been
/// consumed by the [`Level::children`] of the line before it.
pub(crate) struct Level<'a, I: Iterator> {
	depth: usize,
	lines: &'a mut Peekable<I>,
}

impl<'a, I> Level<'a, I>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	pub(crate) fn top(lines: &'a mut Peekable<I>) -> Level<'a, I> {
		Level { depth: 0, lines }
	}

	pub(crate) fn children(&mut self) -> Level<'_, I> {
		Level { depth: self.depth + 1, lines: self.lines }
	}

	pub(crate) fn for_each_line(mut self, mut f: impl FnMut(&mut Self, TinyLine) -> Result<()>) -> Result<()> {
		while let Some(line) = self.next().transpose()? {
			let number = line.number();

			f(&mut self, line)
				.with_context(|| anyhow!("in line {number}"))?;
		}
		Ok(())
	}

	/// Consumes all lines below the current one, without looking at them.
	pub(crate) fn skip_children(&mut self) -> Result<()> {
		self.children().for_each_line(|level, _| level.skip_children())
	}
}

impl<I> Iterator for Level<'_, I>
where
	I: Iterator<Item=Result<TinyLine>>,
{
	type Item = Result<TinyLine>;

	fn next(&mut self) -> Option<Self::Item> {
		let depth = match self.lines.peek()? {
			Ok(line) => line.depth(),
			Err(_) => return self.lines.next(),
		};

		if depth < self.depth {
			return None;
		}

		let expected = self.depth;
		self.lines.next().map(|line| line.and_then(|line| {
			if line.depth() > expected {
				bail!("line {} is indented {} times, expected at most {expected}: {line:?}", line.number(), line.depth());
			}
			Ok(line)
		}))
	}
}

/// Undoes the escaping of tiny v2: `\\`, `\n`, `\r`, `\t` and `\0`.
pub(crate) fn unescape(string: &str) -> Result<Cow<'_, str>> {
	if !string.contains('\\') {
		return Ok(Cow::Borrowed(string));
	}

	let mut result = String::with_capacity(string.len());
	let mut chars = string.chars();
	while let Some(char) = chars.next() {
		if char == '\\' {
			result.push(match chars.next() {
				Some('\\') => '\\',
				Some('n') => '\n',
				Some('r') => '\r',
				Some('t') => '\t',
				Some('0') => '\0',
				Some(other) => bail!("unknown escape sequence \\{other} in {string:?}"),
				None => bail!("unterminated escape sequence at the end of {string:?}"),
			});
		} else {
			result.push(char);
		}
	}
	Ok(Cow::Owned(result))
}

pub(crate) fn escape(string: &str) -> Cow<'_, str> {
	if !string.contains(['\\', '\n', '\r', '\t', '\0']) {
		return Cow::Borrowed(string);
	}

	let mut result = String::with_capacity(string.len() + 2);
	for char in string.chars() {
		match char {
			'\\' => result.push_str("\\\\"),
			'\n' => result.push_str("\\n"),
			'\r' => result.push_str("\\r"),
			'\t' => result.push_str("\\t"),
			'\0' => result.push_str("\\0"),
			char => result.push(char),
		}
	}
	Cow::Owned(result)
}

pub(crate) mod tiny_line {
	use std::borrow::Cow;
	use std::str::FromStr;
	use anyhow::{anyhow, bail, Context, Result};
	use crate::lines::unescape;
	use crate::tree::names::{Names, Namespaces};

	/// A line split at its tabs, after the leading tabs are counted.
	#[derive(Debug)]
	pub(crate) struct TinyLine {
		number: usize,
		depth: usize,
		pub(crate) first_field: String,
		rest: std::vec::IntoIter<String>,
	}

	impl TinyLine {
		pub(crate) fn new(number: usize, line: &str) -> TinyLine {
			let content = line.trim_start_matches('\t');
			let depth = line.len() - content.len();

			let mut fields = content.split('\t').map(String::from);
			// split always gives at least one element
			let first_field = fields.next().unwrap_or_default();

			TinyLine {
				number,
				depth,
				first_field,
				rest: fields.collect::<Vec<_>>().into_iter(),
			}
		}

		pub(crate) fn number(&self) -> usize {
			self.number
		}

		pub(crate) fn depth(&self) -> usize {
			self.depth
		}

		pub(crate) fn next(&mut self) -> Result<String> {
			let number = self.number;
			self.rest.next()
				.with_context(|| anyhow!("line {number} ended early, after {:?}", self.first_field))
		}

		pub(crate) fn next_parse<T>(&mut self) -> Result<T>
		where
			T: FromStr,
			T::Err: std::error::Error + Send + Sync + 'static,
		{
			let field = self.next()?;
			field.parse()
				.with_context(|| anyhow!("cannot parse {field:?} in line {}", self.number))
		}

		pub(crate) fn next_optional(&mut self) -> Option<String> {
			self.rest.next()
		}

		/// Reads a comment, which is always escaped.
		pub(crate) fn into_comment(mut self) -> Result<String> {
			let comment = self.next()?;
			if !self.rest.as_slice().is_empty() {
				bail!("comment in line {} is followed by more fields: {:?}", self.number, self.rest.as_slice());
			}

			let comment = unescape(&comment)
				.with_context(|| anyhow!("invalid comment in line {}", self.number))?;
			Ok(comment.into_owned())
		}

		pub(crate) fn into_namespaces(self) -> Result<Namespaces> {
			let number = self.number;
			Namespaces::try_from(self.rest.collect::<Vec<String>>())
				.with_context(|| anyhow!("in header line {number}"))
		}

		/// Reads the rest of the line as names, there must be exactly one for each of the `len` namespaces.
		pub(crate) fn into_names(self, len: usize, escaped: bool) -> Result<Names> {
			let number = self.number;
			let names: Vec<String> = self.rest.collect();
			if names.len() != len {
				bail!("line {number} has {} names, but there are {len} namespaces: {names:?}", names.len());
			}

			if !escaped {
				return Ok(Names::from(names));
			}

			names.iter()
				.map(|name| unescape(name).map(Cow::into_owned))
				.collect::<Result<Vec<String>>>()
				.map(Names::from)
				.with_context(|| anyhow!("invalid name in line {number}"))
		}
	}
}
