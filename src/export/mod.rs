pub(crate) mod skin_dir;
