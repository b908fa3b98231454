use anyhow::{bail, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use crate::tree::names::{Names, Namespaces};
use crate::tree::{Mapping, NodeInfo, ToKey};

/// A whole mapping file: the header and the classes, keyed by their name in the first namespace.
#[derive(Debug, Clone)]
pub struct Mappings {
	pub info: MappingInfo,
	pub classes: IndexMap<String, ClassNode>,
}

impl NodeInfo<MappingInfo> for Mappings {
	fn new(info: MappingInfo) -> Self {
		Mappings {
			info,
			classes: IndexMap::new(),
		}
	}
}

impl Mappings {
	pub fn add_class(&mut self, child: ClassNode) -> Result<&mut ClassNode> {
		match self.classes.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				bail!("cannot add child {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

/// The header of a mapping file.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingInfo {
	pub namespaces: Namespaces,
	pub major_version: u32,
	pub minor_version: u32,
	/// Properties given after the header line, in the order they were given. Not all of them have a value.
	pub properties: IndexMap<String, Option<String>>,
}

impl MappingInfo {
	pub const ESCAPED_NAMES: &'static str = "escaped-names";

	pub fn new(namespaces: Namespaces) -> MappingInfo {
		MappingInfo {
			namespaces,
			major_version: 2,
			minor_version: 0,
			properties: IndexMap::new(),
		}
	}

	/// Whether names in the file have escape sequences in them.
	pub fn escaped_names(&self) -> bool {
		self.properties.contains_key(Self::ESCAPED_NAMES)
	}
}

#[derive(Debug, Clone)]
pub struct ClassNode {
	pub info: ClassMapping,
	pub fields: IndexMap<String, FieldNode>,
	pub methods: IndexMap<MethodKey, MethodNode>,
	pub comments: Vec<String>,
}

impl NodeInfo<ClassMapping> for ClassNode {
	fn new(info: ClassMapping) -> Self {
		ClassNode {
			info,
			fields: IndexMap::new(),
			methods: IndexMap::new(),
			comments: Vec::new(),
		}
	}
}

impl ClassNode {
	pub fn add_field(&mut self, child: FieldNode) -> Result<&mut FieldNode> {
		match self.fields.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				bail!("cannot add child {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}

	pub fn add_method(&mut self, child: MethodNode) -> Result<&mut MethodNode> {
		match self.methods.entry(child.info.get_key()?) {
			Entry::Occupied(e) => {
				bail!("cannot add child {child:?} for key {:?}, as there's already one: {:?}", e.key(), e.get());
			},
			Entry::Vacant(e) => Ok(e.insert(child)),
		}
	}
}

#[derive(Debug, Clone)]
pub struct FieldNode {
	pub info: FieldMapping,
	pub comments: Vec<String>,
}

impl NodeInfo<FieldMapping> for FieldNode {
	fn new(info: FieldMapping) -> FieldNode {
		FieldNode {
			info,
			comments: Vec::new(),
		}
	}
}

/// Parameters and local variables are kept in the order they were given in.
///
/// There may be more than one entry for the same index, these are never combined.
#[derive(Debug, Clone)]
pub struct MethodNode {
	pub info: MethodMapping,
	pub parameters: Vec<ParameterNode>,
	pub locals: Vec<LocalVariableNode>,
	pub comments: Vec<String>,
}

impl NodeInfo<MethodMapping> for MethodNode {
	fn new(info: MethodMapping) -> Self {
		MethodNode {
			info,
			parameters: Vec::new(),
			locals: Vec::new(),
			comments: Vec::new(),
		}
	}
}

impl MethodNode {
	pub fn add_parameter(&mut self, child: ParameterNode) -> &mut ParameterNode {
		self.parameters.push(child);
		let last = self.parameters.len() - 1;
		&mut self.parameters[last]
	}

	pub fn add_local(&mut self, child: LocalVariableNode) -> &mut LocalVariableNode {
		self.locals.push(child);
		let last = self.locals.len() - 1;
		&mut self.locals[last]
	}
}

#[derive(Debug, Clone)]
pub struct ParameterNode {
	pub info: ParameterMapping,
	pub comments: Vec<String>,
}

impl NodeInfo<ParameterMapping> for ParameterNode {
	fn new(info: ParameterMapping) -> ParameterNode {
		ParameterNode {
			info,
			comments: Vec::new(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct LocalVariableNode {
	pub info: LocalVariableMapping,
	pub comments: Vec<String>,
}

impl NodeInfo<LocalVariableMapping> for LocalVariableNode {
	fn new(info: LocalVariableMapping) -> LocalVariableNode {
		LocalVariableNode {
			info,
			comments: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassMapping {
	pub names: Names,
}

impl Mapping for ClassMapping {
	fn names(&self) -> &Names {
		&self.names
	}
}

impl ToKey<String> for ClassMapping {
	fn get_key(&self) -> Result<String> {
		Ok(self.names.first_name()?.to_owned())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldMapping {
	pub desc: String,
	pub names: Names,
}

impl Mapping for FieldMapping {
	fn names(&self) -> &Names {
		&self.names
	}
}

/// Fields are only told apart by their name, not their descriptor.
impl ToKey<String> for FieldMapping {
	fn get_key(&self) -> Result<String> {
		Ok(self.names.first_name()?.to_owned())
	}
}

/// Sorts by name first, and then by descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
	pub name: String,
	pub desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodMapping {
	pub desc: String,
	pub names: Names,
}

impl Mapping for MethodMapping {
	fn names(&self) -> &Names {
		&self.names
	}
}

impl ToKey<MethodKey> for MethodMapping {
	fn get_key(&self) -> Result<MethodKey> {
		Ok(MethodKey {
			name: self.names.first_name()?.to_owned(),
			desc: self.desc.clone(),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterMapping {
	pub index: usize,
	pub names: Names,
}

impl Mapping for ParameterMapping {
	fn names(&self) -> &Names {
		&self.names
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalVariableMapping {
	pub index: usize,
	pub start_offset: usize,
	/// Index into the local variable table, if known.
	pub lvt_index: Option<usize>,
	pub names: Names,
}

impl Mapping for LocalVariableMapping {
	fn names(&self) -> &Names {
		&self.names
	}
}
