//! Render declaratively-authored prompt trees into role-tagged chat messages,
//! then map those messages onto the wire schema of a specific LLM client.
//!
//! The pipeline is a pure, synchronous transform: a [`models::node::Node`]
//! tree goes in, an ordered list of [`models::message::Message`] records
//! comes out of [`render::render`], and the adapters in [`adapters`] rewrite
//! that list into provider-exact payloads.

pub mod adapters;
pub mod dsl;
pub mod errors;
pub mod markup;
pub mod models;
pub mod render;

pub use models::message::{Message, ToolCall, WrapMode};
pub use models::node::{Node, RenderContext};
pub use models::role::Role;
pub use render::{render, render_to_text};
