pub(crate) mod node;
pub mod raw;
pub mod slice;
pub mod tree;
