pub(crate) mod groups;
pub(crate) mod migrate;
pub(crate) mod names;
pub(crate) mod shared;
pub(crate) mod status;
