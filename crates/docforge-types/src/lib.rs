//! Shared data model for document assembly
//!
//! The three template artifacts (form schema, content library, structure
//! skeleton) arrive as JSON from an external analysis step. This crate holds
//! their serde definitions plus the renderer-agnostic document tree produced
//! by the engine.

pub mod condition;
pub mod content;
pub mod schema;
pub mod structure;
pub mod tree;

pub use condition::{Condition, Operator};
pub use content::{Block, ConditionalSection, ContentLibrary, LibraryTable, Variant};
pub use schema::{
    ColumnKind, Field, FieldKind, FormSection, Schema, SelectSpec, TableBounds, TableColumn,
    TableFieldSpec, Validation,
};
pub use structure::{
    ConditionalItem, ContentEntry, ContentItem, Heading, ParagraphItem, SectionKind, Structure,
    StructureSection, TableDirective,
};
pub use tree::{DocumentTree, Node, SectionNode, TableNode, TreeStats};
