pub(crate) mod compiler;
pub(crate) mod font_face;
pub(crate) mod ini;
