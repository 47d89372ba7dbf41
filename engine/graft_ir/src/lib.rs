//! Graft IR - Syntax Tree Model
//!
//! This crate contains the tree data structures shared by the rewriting
//! engine:
//! - Spans for buffer locations (with a dummy sentinel for synthesized nodes)
//! - Names for interned identifiers and literal tokens
//! - `Tree`, an arena of `NodeKind` nodes addressed by `NodeId(u32)`
//! - Structural `Property` descriptors with generic `PropertyRef` /
//!   `PropertyValue` access, the layer rewrite events are keyed on
//! - Modifier flags and language levels
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier and literal text → `Name(u32)`
//! - **Flatten Everything**: child links are `NodeId(u32)` indices, no boxing
//! - **One reflective surface**: the rewriter never matches node payloads
//!   directly; it walks `properties()` and reads slots generically

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod flags;
mod interner;
mod kind;
mod level;
mod name;
mod node;
mod op;
mod property;
mod span;

pub use flags::{ModifierFlags, ModifierKeyword};
pub use interner::NameInterner;
pub use kind::{Modifiers, NodeKind};
pub use level::LanguageLevel;
pub use name::Name;
pub use node::{NodeData, NodeId, Tree};
pub use op::{Operator, PrimitiveKind};
pub use property::{Property, PropertyRef, PropertyShape, PropertyValue};
pub use span::{Span, SpanError};
