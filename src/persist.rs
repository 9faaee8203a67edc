pub(crate) mod autosave;
pub(crate) mod backend;
pub(crate) mod coordinator;
