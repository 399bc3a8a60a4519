pub mod api;
pub mod mem;
pub mod util;

#[cfg(feature = "typed")]
pub mod typed;

pub use api::tree::Tree;
pub use mem::raw::RawTree;
pub use mem::tree::BTree;
