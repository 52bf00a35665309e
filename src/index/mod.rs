pub mod idioms;
pub mod rbtree;
pub mod trie;

pub use idioms::{IdxRecord, Idioms, KeyLeaf, TagValue, TreeKind, ValueLeaf};
pub use rbtree::{NumKind, RbTree, WalkAction};
pub use trie::PrefixMap;
