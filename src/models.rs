//! These models represent the values passed through the rendering pipeline
//!
//! There are several related formats the pipeline touches:
//! - the author-facing node tree (elements, text leaves, deferred conditionals)
//! - the internal role-tagged message IR produced by the tree walker
//! - openai messages/tools, the flat chat-completions wire array
//! - vercel ai-sdk messages, the camelCase typed-content-part wire array
//! - anthropic messages, with a separated system field and content blocks
//!
//! The wire formats overlap to varying degrees, so the IR is not an exact
//! match for any of them; the adapters own the final structural rewriting.

pub mod content;
pub mod message;
pub mod node;
pub mod role;
