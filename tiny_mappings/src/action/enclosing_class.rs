use indexmap::IndexMap;
use crate::tree::mappings::{ClassMapping, ClassNode};
use crate::tree::names::Names;
use crate::tree::NodeInfo;

/// Guesses the name of a class that has no entry in `classes` in the given column, from its enclosing classes.
///
/// Say `net/minecraft/class_123$class_124` doesn't have a mapping, but `net/minecraft/class_123` is mapped to
/// `path/to/SomeClass`, then this returns `path/to/SomeClass$class_124`. The closest enclosing class with a name
/// in that column is used. If no enclosing class has a name there, this returns the name unchanged.
pub(crate) fn match_enclosing_class(name: &str, classes: &IndexMap<String, ClassNode>, column: usize) -> String {
	let mut path: Vec<&str> = name.split('$').collect();
	// trailing `$` are not their own segment
	while path.len() > 1 && path.last() == Some(&"") {
		path.pop();
	}

	for i in (0..path.len().saturating_sub(1)).rev() {
		let enclosing = path[..=i].join("$");

		if let Some(mapped) = classes.get(&enclosing).and_then(|class| class.info.names.get(column)) {
			return format!("{mapped}${}", path[i + 1..].join("$"));
		}
	}

	name.to_owned()
}

/// Creates a stand-in for a class that is missing from a file.
///
/// It has the name `key` in the first namespace and a guessed name (see [`match_enclosing_class`]) in each of
/// the `columns` other namespaces. It has no fields, methods or comments.
pub(crate) fn enclosing_class_stand_in(key: &str, classes: &IndexMap<String, ClassNode>, columns: usize) -> ClassNode {
	let names = std::iter::once(key.to_owned())
		.chain((1..=columns).map(|column| match_enclosing_class(key, classes, column)))
		.map(Some)
		.collect();

	ClassNode::new(ClassMapping { names: Names::new(names) })
}
