//! Hierarchy reconstruction from classified lines.
//!
//! [`state`] holds the pure transition function over
//! `NoContext → InBranch → InBranchAndChapter`; [`HierarchyBuilder`]
//! applies its side effects to the growing tree.

mod engine;
pub mod state;

pub use engine::HierarchyBuilder;
pub use state::{transition, BuilderState, SideEffect};
