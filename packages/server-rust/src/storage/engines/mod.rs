//! [`StackStore`](super::StackStore) implementations.

mod hashmap;

pub use hashmap::HashMapStackStore;
