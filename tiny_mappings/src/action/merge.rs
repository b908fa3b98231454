use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use crate::action::enclosing_class::enclosing_class_stand_in;
use crate::tree::mappings::{ClassMapping, ClassNode, FieldMapping, FieldNode, LocalVariableMapping, LocalVariableNode, MappingInfo, Mappings, MethodKey, MethodMapping, MethodNode, ParameterMapping, ParameterNode};
use crate::tree::names::Names;
use crate::tree::Mapping;

/// How the names of the different files are laid out in a merged row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnLayout {
	/// A file that has no entry for something doesn't add any names to its row. This means that names of later
	/// files move to the left, and rows can be shorter than the number of namespaces.
	#[default]
	Compact,
	/// A file that has no entry for something adds empty names to its row, so that the names of each file are
	/// always in the same columns. Parameters and local variables are moved to the columns of their file.
	Aligned,
}

/// Settings for [`Mappings::merge_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
	/// Where the names of each input end up in the merged rows, [`ColumnLayout::Compact`] by default.
	pub layout: ColumnLayout,
}

/// The reasons merging can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
	NoInputs,
	/// Inputs are identified by their index in the slice given to [`Mappings::merge`].
	TooFewNamespaces {
		input: usize,
		namespaces: Vec<String>,
	},
	BaseNamespaceMismatch {
		input: usize,
		expected: String,
		found: String,
	},
	/// Not a single file gave a descriptor for a method or field.
	MissingDescriptor {
		kind: &'static str,
		key: String,
	},
}

impl MergeError {
	/// The index of the input the error is about, if it's about one.
	pub fn input(&self) -> Option<usize> {
		match self {
			MergeError::TooFewNamespaces { input, .. } => Some(*input),
			MergeError::BaseNamespaceMismatch { input, .. } => Some(*input),
			MergeError::NoInputs | MergeError::MissingDescriptor { .. } => None,
		}
	}
}

impl Display for MergeError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			MergeError::NoInputs => write!(f, "no mappings given to merge"),
			MergeError::TooFewNamespaces { input, namespaces } =>
				write!(f, "input {input} must have at least 2 namespaces, got {namespaces:?}"),
			MergeError::BaseNamespaceMismatch { input, expected, found } =>
				write!(f, "the inputs must have the same namespace as the first column (input {input} has {found:?} instead of {expected:?})"),
			MergeError::MissingDescriptor { kind, key } => write!(f, "no descriptor for {kind} {key:?}"),
		}
	}
}

impl std::error::Error for MergeError {}

/// How many names (besides the one in the first namespace) each file has, and where they go in a merged row.
struct Columns {
	widths: Vec<usize>,
	offsets: Vec<usize>,
	layout: ColumnLayout,
}

impl Columns {
	fn new(widths: Vec<usize>, layout: ColumnLayout) -> Columns {
		let offsets = widths.iter()
			.scan(0, |offset, width| {
				let this = *offset;
				*offset += width;
				Some(this)
			})
			.collect();

		Columns { widths, offsets, layout }
	}

	/// Moves the names of a row from the given input into the columns of that input.
	///
	/// The name in the first namespace stays where it is.
	fn place(&self, names: &Names, input: usize) -> Names {
		match self.layout {
			ColumnLayout::Compact => names.clone(),
			ColumnLayout::Aligned => {
				let mut row: Vec<Option<String>> = vec![None; 1 + self.widths.iter().sum::<usize>()];

				let mut names = names.iter();
				row[0] = names.next().flatten().map(str::to_owned);
				for (column, name) in names.take(self.widths[input]).enumerate() {
					row[1 + self.offsets[input] + column] = name.map(str::to_owned);
				}

				Names::new(row)
			},
		}
	}
}

fn key_union<'a, K>(collections: impl IntoIterator<Item=impl IntoIterator<Item=&'a K>>) -> Vec<K>
where
	K: Hash + Eq + Ord + Clone + 'a,
{
	let keys: IndexSet<&K> = collections.into_iter().flatten().collect();

	let mut keys: Vec<K> = keys.into_iter().cloned().collect();
	keys.sort();
	keys
}

fn merge_names<'a, T>(key: &str, mappings: impl IntoIterator<Item=Option<&'a T>>, columns: &Columns) -> Names
where
	T: Mapping + 'a,
{
	let mut merged = vec![Some(key.to_owned())];

	for (mapping, &width) in mappings.into_iter().zip(&columns.widths) {
		match mapping {
			Some(mapping) => {
				merged.extend(mapping.names().others().map(|name| Some(name.unwrap_or(key).to_owned())));
			},
			None if columns.layout == ColumnLayout::Aligned => {
				merged.extend(std::iter::repeat(None).take(width));
			},
			None => {},
		}
	}

	Names::new(merged)
}

fn merge_comments<'a>(comments: impl IntoIterator<Item=&'a Vec<String>>) -> Vec<String> {
	let comments: IndexSet<&String> = comments.into_iter().flatten().collect();
	comments.into_iter().cloned().collect()
}

fn merge_infos(first: &MappingInfo, inputs: &[Mappings]) -> MappingInfo {
	let mut namespaces = first.namespaces.clone();

	for input in inputs.iter().skip(1) {
		namespaces = namespaces.union(&input.info.namespaces);

		if (input.info.major_version, input.info.minor_version) != (first.major_version, first.minor_version) {
			warn!("version {}.{} of {:?} differs from version {}.{}, keeping the latter",
				input.info.major_version, input.info.minor_version, input.info.namespaces, first.major_version, first.minor_version);
		}
		if input.info.properties != first.properties {
			warn!("properties {:?} of {:?} differ from {:?}, keeping the latter",
				input.info.properties, input.info.namespaces, first.properties);
		}
	}

	MappingInfo {
		namespaces,
		major_version: first.major_version,
		minor_version: first.minor_version,
		properties: first.properties.clone(),
	}
}

fn check_inputs(inputs: &[Mappings]) -> Result<&Mappings, MergeError> {
	let first = inputs.first().ok_or(MergeError::NoInputs)?;
	let base = first.info.namespaces.base();

	for (input, mappings) in inputs.iter().enumerate() {
		let namespaces = &mappings.info.namespaces;

		if namespaces.len() < 2 {
			return Err(MergeError::TooFewNamespaces { input, namespaces: namespaces.names().to_vec() });
		}
		if namespaces.base() != base {
			return Err(MergeError::BaseNamespaceMismatch {
				input,
				expected: base.to_owned(),
				found: namespaces.base().to_owned(),
			});
		}
	}

	Ok(first)
}

fn merge_classes(key: &str, classes: &[Cow<'_, ClassNode>], columns: &Columns) -> Result<ClassNode, MergeError> {
	let names = merge_names(key, classes.iter().map(|class| Some(&class.info)), columns);
	let comments = merge_comments(classes.iter().map(|class| &class.comments));

	let mut methods = IndexMap::new();
	for method_key in key_union(classes.iter().map(|class| class.methods.keys())) {
		let slots: Vec<Option<&MethodNode>> = classes.iter()
			.map(|class| class.methods.get(&method_key))
			.collect();

		let method = merge_methods(&method_key, &slots, columns)?;
		methods.insert(method_key, method);
	}

	let mut fields = IndexMap::new();
	for field_key in key_union(classes.iter().map(|class| class.fields.keys())) {
		let slots: Vec<Option<&FieldNode>> = classes.iter()
			.map(|class| class.fields.get(&field_key))
			.collect();

		let field = merge_fields(&field_key, &slots, columns)?;
		fields.insert(field_key, field);
	}

	Ok(ClassNode {
		info: ClassMapping { names },
		fields,
		methods,
		comments,
	})
}

fn merge_methods(key: &MethodKey, methods: &[Option<&MethodNode>], columns: &Columns) -> Result<MethodNode, MergeError> {
	let names = merge_names(&key.name, methods.iter().map(|method| method.map(|method| &method.info)), columns);
	let comments = merge_comments(methods.iter().flatten().map(|method| &method.comments));

	let desc = methods.iter().flatten()
		.map(|method| method.info.desc.clone())
		.next()
		.ok_or_else(|| MergeError::MissingDescriptor { kind: "method", key: format!("{}{}", key.name, key.desc) })?;

	let present = || methods.iter()
		.enumerate()
		.filter_map(|(input, method)| method.map(|method| (input, method)));

	let parameters = present()
		.flat_map(|(input, method)| method.parameters.iter().map(move |parameter| ParameterNode {
			info: ParameterMapping {
				index: parameter.info.index,
				names: columns.place(&parameter.info.names, input),
			},
			comments: parameter.comments.clone(),
		}))
		.collect();

	let locals = present()
		.flat_map(|(input, method)| method.locals.iter().map(move |local| LocalVariableNode {
			info: LocalVariableMapping {
				index: local.info.index,
				start_offset: local.info.start_offset,
				lvt_index: local.info.lvt_index,
				names: columns.place(&local.info.names, input),
			},
			comments: local.comments.clone(),
		}))
		.collect();

	Ok(MethodNode {
		info: MethodMapping { desc, names },
		parameters,
		locals,
		comments,
	})
}

fn merge_fields(key: &str, fields: &[Option<&FieldNode>], columns: &Columns) -> Result<FieldNode, MergeError> {
	let names = merge_names(key, fields.iter().map(|field| field.map(|field| &field.info)), columns);
	let comments = merge_comments(fields.iter().flatten().map(|field| &field.comments));

	let desc = fields.iter().flatten()
		.map(|field| field.info.desc.clone())
		.next()
		.ok_or_else(|| MergeError::MissingDescriptor { kind: "field", key: key.to_owned() })?;

	Ok(FieldNode {
		info: FieldMapping { desc, names },
		comments,
	})
}

impl Mappings {
	/// Merges mappings that share their first namespace, using the default [`MergeOptions`].
	///
	/// See [`Mappings::merge_with`].
	pub fn merge(inputs: &[Mappings]) -> Result<Mappings, MergeError> {
		Mappings::merge_with(inputs, MergeOptions::default())
	}

	#[allow(clippy::tabs_in_doc_comments)]
	/// Merges mappings that share their first namespace.
	///
	/// The result has the first namespace, followed by all other namespaces of the inputs, in the order they
	/// appear in. Version and properties are the ones of the first input.
	///
	/// Classes, fields and methods are matched up by their name in the first namespace (methods also by their
	/// descriptor). The merged row of names contains, for each input that has the entry, all names except the first
	/// one. Empty names are replaced by the name in the first namespace.
	///
	/// If an input doesn't have a class, a name is guessed from its enclosing classes: if `a/B` is mapped to
	/// `x/C` in that input, then `a/B$D` is given the name `x/C$D`. If none of the enclosing classes have a name,
	/// the name in the first namespace is used.
	///
	/// Parameters and local variables are not matched up, the ones of each input are kept.
	///
	/// Entries are sorted by their name in the first namespace.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use tiny_mappings::tree::mappings::Mappings;
	///
	/// let a = "\
	/// tiny	2	0	intermediary	named
	/// c	net/minecraft/class_123	net/minecraft/somePkg/someClass
	/// 	m	(Lnet/minecraft/class_124;)V	method_1234	someMethod
	/// ";
	/// let b = "\
	/// tiny	2	0	intermediary	official
	/// c	net/minecraft/class_123	a
	/// 	m	(Lnet/minecraft/class_124;)V	method_1234	a
	/// ";
	/// let expected = "\
	/// tiny	2	0	intermediary	named	official
	/// c	net/minecraft/class_123	net/minecraft/somePkg/someClass	a
	/// 	m	(Lnet/minecraft/class_124;)V	method_1234	someMethod	a
	/// ";
	///
	/// let a = tiny_mappings::tiny_v2::read(a.as_bytes()).unwrap();
	/// let b = tiny_mappings::tiny_v2::read(b.as_bytes()).unwrap();
	///
	/// let merged = Mappings::merge(&[a, b]).unwrap();
	///
	/// assert_eq!(tiny_mappings::tiny_v2::write_string(&merged).unwrap(), expected);
	/// ```
	pub fn merge_with(inputs: &[Mappings], options: MergeOptions) -> Result<Mappings, MergeError> {
		let first = check_inputs(inputs)?;

		let info = merge_infos(&first.info, inputs);

		let widths = inputs.iter()
			.map(|input| input.info.namespaces.len() - 1)
			.collect();
		let columns = Columns::new(widths, options.layout);

		let keys = key_union(inputs.iter().map(|input| input.classes.keys()));

		debug!("merging {} classes of {} inputs into namespaces {:?}", keys.len(), inputs.len(), info.namespaces);

		let mut classes = IndexMap::with_capacity(keys.len());
		for key in keys {
			let slots: Vec<Cow<ClassNode>> = inputs.iter()
				.zip(&columns.widths)
				.enumerate()
				.map(|(index, (input, &width))| match input.classes.get(&key) {
					Some(class) => Cow::Borrowed(class),
					None => {
						let class = enclosing_class_stand_in(&key, &input.classes, width);
						trace!("input {index} has no class {key:?}, using {:?}", class.info.names);
						Cow::Owned(class)
					},
				})
				.collect();

			let class = merge_classes(&key, &slots, &columns)?;
			classes.insert(key, class);
		}

		debug!("merged {} classes", classes.len());

		Ok(Mappings { info, classes })
	}
}
