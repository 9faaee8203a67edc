pub(crate) mod deck;
pub(crate) mod store;
pub(crate) mod templates;
