pub mod export;
pub mod remap;
