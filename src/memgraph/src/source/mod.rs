//! Memory Source Abstraction
//!
//! Core abstractions for reading memory the traversal walks over:
//! - The current process via `SelfProcess`
//! - Mock sources for testing

mod heap;
mod maps;
#[cfg(test)]
mod mock;
mod process;
mod traits;

pub use heap::is_heap_like;
pub use maps::{parse_maps, parse_maps_line, MappedRange};
#[cfg(test)]
pub use mock::MockMemorySource;
pub use process::SelfProcess;
pub use traits::{MemorySource, WORD_SIZE};
