pub(crate) mod model;
pub(crate) mod overlay;
pub(crate) mod store;
pub(crate) mod tool;
