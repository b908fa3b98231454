use anyhow::Result;
use crate::tree::names::Names;

pub mod mappings;

/// Something carrying a name in each of the namespaces of a mapping tree.
///
/// Classes, fields, methods, parameters and local variables all implement this, which lets the
/// merging code treat them alike. The name in the first namespace is the one shared between files.
pub trait Mapping {
	fn names(&self) -> &Names;
}

/// A node of the mapping tree, created from the mapping it holds, without any children yet.
pub trait NodeInfo<I> {
	fn new(info: I) -> Self;
}

pub trait ToKey<K> {
	fn get_key(&self) -> Result<K>;
}

pub mod names {
	use std::fmt::{Debug, Formatter};
	use anyhow::{bail, Context, Error, Result};
	use indexmap::IndexSet;

	/// A struct storing the names of the namespaces.
	///
	/// Invariants:
	/// there's at least one namespace, every namespace name is non-empty and no name appears twice
	#[derive(Clone, PartialEq)]
	pub struct Namespaces {
		names: Vec<String>,
	}

	impl Namespaces {
		pub fn names(&self) -> &[String] {
			&self.names
		}

		pub fn len(&self) -> usize {
			self.names.len()
		}

		/// The first namespace, the one names are shared in when merging.
		pub fn base(&self) -> &str {
			// the constructor makes sure there's at least one element
			&self.names[0]
		}

		/// Appends the namespaces of `other` that `self` doesn't have yet, keeping their order.
		pub(crate) fn union(&self, other: &Namespaces) -> Namespaces {
			let mut names = self.names.clone();
			for namespace in &other.names {
				if !names.contains(namespace) {
					names.push(namespace.clone());
				}
			}
			Namespaces { names }
		}

		/// Returns an error if the names of `self` aren't the names given in the argument.
		/// This can be used to check that after reading mappings, you have the correct namespaces in them.
		pub fn check_that(&self, names: &[&str]) -> Result<()> {
			if self.names != names {
				bail!("expected namespaces {names:?}, got {self:?}");
			}
			Ok(())
		}
	}

	impl Debug for Namespaces {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	impl TryFrom<Vec<String>> for Namespaces {
		type Error = Error;

		fn try_from(value: Vec<String>) -> Result<Self> {
			if value.is_empty() {
				bail!("there must be at least one namespace");
			}
			if value.iter().any(|i| i.is_empty()) {
				bail!("found empty namespace name in {value:?}, every namespace name must be non-empty");
			}
			let unique: IndexSet<&String> = value.iter().collect();
			if unique.len() != value.len() {
				bail!("found duplicate namespace name in {value:?}");
			}

			Ok(Namespaces { names: value })
		}
	}

	/// A row of names, one for each namespace the row was built for.
	///
	/// A missing name is stored as `None`, never as an empty string.
	#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Hash)]
	pub struct Names {
		names: Vec<Option<String>>,
	}

	impl Names {
		/// Only use this when none of the names are `Some("")`.
		pub(crate) fn new(names: Vec<Option<String>>) -> Names {
			Names { names }
		}

		pub fn len(&self) -> usize {
			self.names.len()
		}

		pub fn is_empty(&self) -> bool {
			self.names.is_empty()
		}

		pub fn first_name(&self) -> Result<&str> {
			self.names.first()
				.context("no names at all, expected at least a name in the first namespace")?
				.as_deref()
				.with_context(|| format!("no name for the first namespace: {self:?}"))
		}

		/// Returns the name at the given index, `None` if there's no name or the row is shorter than that.
		pub fn get(&self, index: usize) -> Option<&str> {
			self.names.get(index)?.as_deref()
		}

		pub fn iter(&self) -> impl Iterator<Item=Option<&str>> {
			self.names.iter().map(|x| x.as_deref())
		}

		/// All names except the one in the first namespace.
		pub fn others(&self) -> impl Iterator<Item=Option<&str>> {
			self.iter().skip(1)
		}
	}

	impl Debug for Names {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.debug_list()
				.entries(&self.names)
				.finish()
		}
	}

	/// Note that empty inputs are converted into `None`.
	impl From<Vec<String>> for Names {
		fn from(value: Vec<String>) -> Self {
			let names = value.into_iter()
				.map(|x| if x.is_empty() { None } else { Some(x) })
				.collect();

			Names { names }
		}
	}

	impl<const N: usize> From<[&str; N]> for Names {
		fn from(value: [&str; N]) -> Self {
			Names::from(value.map(String::from).to_vec())
		}
	}

	#[cfg(test)]
	mod testing {
		use pretty_assertions::assert_eq;
		use crate::tree::names::{Names, Namespaces};

		#[test]
		fn empty_names_become_none() {
			let names = Names::from(["a", "", "c"]);
			assert_eq!(names.iter().collect::<Vec<_>>(), vec![Some("a"), None, Some("c")]);
			assert_eq!(names.first_name().unwrap(), "a");
			assert_eq!(names.get(1), None);
			assert_eq!(names.get(7), None);
		}

		#[test]
		fn missing_first_name() {
			assert!(Names::from(["", "b"]).first_name().is_err());
			assert!(Names::from(Vec::<String>::new()).first_name().is_err());
		}

		#[test]
		fn namespaces_must_be_unique_and_non_empty() {
			assert!(Namespaces::try_from(vec![]).is_err());
			assert!(Namespaces::try_from(vec!["a".to_owned(), "".to_owned()]).is_err());
			assert!(Namespaces::try_from(vec!["a".to_owned(), "a".to_owned()]).is_err());

			let namespaces = Namespaces::try_from(vec!["a".to_owned(), "b".to_owned()]).unwrap();
			assert_eq!(namespaces.base(), "a");
			assert_eq!(namespaces.len(), 2);
			assert!(namespaces.check_that(&["a", "b"]).is_ok());
			assert!(namespaces.check_that(&["a"]).is_err());
		}
	}
}
