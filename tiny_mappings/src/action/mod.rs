pub(crate) mod enclosing_class;
pub(crate) mod merge;
