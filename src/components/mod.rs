pub mod edits;
pub mod selection;
pub mod viewer;
