use anyhow::Result;
use pretty_assertions::assert_eq;
use tiny_mappings::tree::mappings::{Mappings, MethodKey};
use tiny_mappings::tree::names::Names;
use tiny_mappings::{ColumnLayout, MergeError, MergeOptions};

fn read(string: &str) -> Result<Mappings> {
	tiny_mappings::tiny_v2::read(string.as_bytes())
}

fn merge_to_string(inputs: &[&str]) -> Result<String> {
	let inputs = inputs.iter()
		.map(|input| read(input))
		.collect::<Result<Vec<_>>>()?;

	let output = Mappings::merge(&inputs)?;

	tiny_mappings::tiny_v2::write_string(&output)
}

#[test]
fn merge() -> Result<()> {
	let input_a = include_str!("merge_input_a.tiny");
	let input_b = include_str!("merge_input_b.tiny");
	let input_c = include_str!("merge_input_c.tiny");
	let expected = include_str!("merge_output.tiny");

	let actual = merge_to_string(&[input_a, input_b, input_c])?;

	assert_eq!(actual, expected, "left: actual, right: expected");

	Ok(())
}

#[test]
fn merge_two_files() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	net/minecraft/class_123	net/minecraft/somePkg/someClass
	m	(Lnet/minecraft/class_124;)V	method_1234	someMethod
";
	let b = "\
tiny	2	0	intermediary	official
c	net/minecraft/class_123	a
	m	(Lnet/minecraft/class_124;)V	method_1234	a
";
	let expected = "\
tiny	2	0	intermediary	named	official
c	net/minecraft/class_123	net/minecraft/somePkg/someClass	a
	m	(Lnet/minecraft/class_124;)V	method_1234	someMethod	a
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn missing_class_takes_name_of_enclosing_class() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/B	x/y/Renamed
";
	let b = "\
tiny	2	0	intermediary	official
c	a/B$C	q
";
	let expected = "\
tiny	2	0	intermediary	named	official
c	a/B	x/y/Renamed	a/B
c	a/B$C	x/y/Renamed$C	q
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn missing_class_without_enclosing_class_keeps_its_name() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/Other	x/Other
";
	let b = "\
tiny	2	0	intermediary	official
c	a/B$C	q
";
	let expected = "\
tiny	2	0	intermediary	named	official
c	a/B$C	a/B$C	q
c	a/Other	x/Other	a/Other
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn empty_names_are_filled_with_the_first_name() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/A\t
	f	I	field_1\t
";
	let b = "\
tiny	2	0	intermediary	official
c	a/A	b
	f	I	field_1	c
";
	let expected = "\
tiny	2	0	intermediary	named	official
c	a/A	a/A	b
	f	I	field_1	field_1	c
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn merging_a_file_with_itself_keeps_comments_once() -> Result<()> {
	let a = read("\
tiny	2	0	intermediary	named
c	a/A	x/A
	c	A class.
	m	()V	method_1	run
		c	Runs it.
")?;

	let merged = Mappings::merge(&[a.clone(), a])?;

	// the namespaces are the same, so the header doesn't grow
	merged.info.namespaces.check_that(&["intermediary", "named"])?;

	let class = &merged.classes["a/A"];
	assert_eq!(class.info.names, Names::from(["a/A", "x/A", "x/A"]));
	assert_eq!(class.comments, vec!["A class."]);

	let method = &class.methods[&MethodKey { name: "method_1".to_owned(), desc: "()V".to_owned() }];
	assert_eq!(method.info.names, Names::from(["method_1", "run", "run"]));
	assert_eq!(method.comments, vec!["Runs it."]);

	// such a tree has more names than namespaces
	assert!(tiny_mappings::tiny_v2::write_string(&merged).is_err());

	Ok(())
}

#[test]
fn overloaded_methods_are_kept_apart() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/A	x/A
	m	(I)V	method_1	setInt
";
	let b = "\
tiny	2	0	intermediary	official
c	a/A	b
	m	(J)V	method_1	c
	m	(I)V	method_1	d
";
	let expected = "\
tiny	2	0	intermediary	named	official
c	a/A	x/A	b
	m	(I)V	method_1	setInt	d
	m	(J)V	method_1	c\t
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn aligned_layout() -> Result<()> {
	let a = read("\
tiny	2	0	intermediary	named
c	a/A	x/A
	m	(I)V	method_1	setInt
		p	1		value
")?;
	let b = read("\
tiny	2	0	intermediary	official
c	a/A	b
	f	I	field_1	c
	m	(I)V	method_1	d
		p	1		e
")?;
	let expected = "\
tiny	2	0	intermediary	named	official
c	a/A	x/A	b
	f	I	field_1		c
	m	(I)V	method_1	setInt	d
		p	1		value\t
		p	1			e
";

	let merged = Mappings::merge_with(&[a, b], MergeOptions { layout: ColumnLayout::Aligned })?;

	assert_eq!(tiny_mappings::tiny_v2::write_string(&merged)?, expected);

	Ok(())
}

#[test]
fn no_inputs() {
	assert_eq!(Mappings::merge(&[]).err(), Some(MergeError::NoInputs));
}

#[test]
fn base_namespace_mismatch() -> Result<()> {
	let a = read("tiny\t2\t0\tintermediary\tnamed\n")?;
	let b = read("tiny\t2\t0\tofficial\tintermediary\n")?;

	let error = Mappings::merge(&[a, b]).err();

	assert_eq!(error, Some(MergeError::BaseNamespaceMismatch {
		input: 1,
		expected: "intermediary".to_owned(),
		found: "official".to_owned(),
	}));
	assert_eq!(error.and_then(|error| error.input()), Some(1));

	Ok(())
}

#[test]
fn too_few_namespaces() -> Result<()> {
	let a = read("tiny\t2\t0\tintermediary\n")?;
	let b = read("tiny\t2\t0\tintermediary\tnamed\n")?;

	let error = Mappings::merge(&[b, a]).err();

	assert_eq!(error, Some(MergeError::TooFewNamespaces {
		input: 1,
		namespaces: vec!["intermediary".to_owned()],
	}));

	Ok(())
}

#[test]
fn properties_and_version_of_the_first_file_win() -> Result<()> {
	let a = "\
tiny	2	1	intermediary	named
	some-property	a
";
	let b = "\
tiny	2	0	intermediary	official
	escaped-names
	other-property
";
	let expected = "\
tiny	2	1	intermediary	named	official
	some-property	a
";

	assert_eq!(merge_to_string(&[a, b])?, expected);

	Ok(())
}

#[test]
fn missing_class_guesses_a_name_in_every_column() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/B$C	x
";
	let b = "\
tiny	2	0	intermediary	official	hashed
c	a/B	q	r
";
	let expected = "\
tiny	2	0	intermediary	named	official	hashed
c	a/B	a/B	q	r
c	a/B$C	x	q$C	r$C
";

	let merged = Mappings::merge(&[read(a)?, read(b)?])?;

	assert_eq!(merged.classes["a/B$C"].info.names, Names::from(["a/B$C", "x", "q$C", "r$C"]));
	assert_eq!(tiny_mappings::tiny_v2::write_string(&merged)?, expected);

	Ok(())
}

#[test]
fn escaped_names_of_later_files_are_not_written_raw() -> Result<()> {
	let a = "\
tiny	2	0	intermediary	named
c	a/A	x/A
";
	let b = "\
tiny	2	0	intermediary	official
	escaped-names
c	a/A	b\\tc
";

	let merged = Mappings::merge(&[read(a)?, read(b)?])?;
	assert_eq!(merged.classes["a/A"].info.names, Names::from(["a/A", "x/A", "b\tc"]));

	// the properties of the first file don't allow escaping, so the tab can't be written
	assert!(tiny_mappings::tiny_v2::write_string(&merged).is_err());

	// the other way around the name is escaped
	let expected = "\
tiny	2	0	intermediary	official	named
	escaped-names
c	a/A	b\\tc	x/A
";
	assert_eq!(merge_to_string(&[b, a])?, expected);

	Ok(())
}
