//! # hcledit Editor
//!
//! Address-based structural edits of HCL documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: source bytes → lossless tree        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - parse an address (`b1.l1.a1`)            │
//! │  - resolve it against the tree              │
//! │  - apply one filter, or query with a sink   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree → bytes, formatted only when changed   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Not found is not an error**: an address matching nothing leaves the
//!    input byte for byte as it was
//! 2. **Errors before mutation**: syntax, address and value errors are
//!    reported before anything is changed
//! 3. **Paths, not references**: matches are index paths, so several blocks
//!    can be removed against one snapshot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hcledit_editor::{EditOperator, Filter};
//!
//! let filter = Filter::attribute_set("b1.l1.a1", "\"v2\"")?;
//! let output = EditOperator::new(filter).apply(source.as_bytes(), "main.tf")?;
//! ```

mod address;
mod errors;
mod filter;
mod matcher;
mod operator;
mod sink;
mod vertical_formatter;

pub use address::{parse_address, Address, Segment};
pub use errors::{EditorError, EditorResult};
pub use filter::Filter;
pub use matcher::{
    attribute_at, attribute_at_mut, block_at, body_at_mut, find_attribute, find_blocks, node_at,
    NodePath,
};
pub use operator::{derive_stream, edit_stream, DeriveOperator, EditOperator};
pub use sink::{list_blocks, AttributeGet, BlockGet, BlockList, Sink};
pub use vertical_formatter::{
    remove_duplicated_newlines, trim_leading_newlines, vertical_format, MAX_CONSECUTIVE_NEWLINES,
};

// Re-export common types for convenience
pub use hcledit_parser::ast::File;
pub use hcledit_parser::ParseError;
