pub(crate) mod document;
pub(crate) mod effect;
pub(crate) mod layout;
pub(crate) mod node;
pub(crate) mod paint;
pub(crate) mod reaction;
pub(crate) mod text;
pub(crate) mod value;
pub(crate) mod vector;
