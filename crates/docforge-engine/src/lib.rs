//! Document assembly engine
//!
//! Turns a structure skeleton, a content library and a user data record into
//! an abstract document tree, then renders that tree to DOCX or HTML:
//! - Dotted-path resolution over JSON data (`resolver`)
//! - One condition evaluator shared by forms and documents (`condition`)
//! - `{{path}}` substitution with `boilerplate.` lookups (`template`)
//! - Loop / library / static / empty table expansion (`table`)
//! - Skeleton walking with fail-open warnings (`assembler`)
//! - DOCX and HTML renderers over the same tree (`render`)
//! - Form field visibility and submission checks (`form`, `validate`)
//!
//! # Feature Flags
//!
//! - `server` (default): Enables async `generate_async` with timeout (requires tokio)

pub mod assembler;
pub mod condition;
pub mod errors;
pub mod form;
pub mod generate;
pub mod render;
pub mod resolver;
pub mod table;
pub mod template;
pub mod validate;

pub use assembler::{assemble, Assembly};
pub use condition::evaluate;
pub use errors::{EngineError, FormError, Warning, WarningKind};
pub use form::{visible_fields, FormState, VisibilityChange};
pub use generate::{generate, GenerateRequest, GenerateResponse, GenerateStatus, RenderArtifact};
pub use render::{render_docx, render_html, render_html_page, OutputFormat};
pub use resolver::resolve;
pub use table::{expand, ExpandedTable};
pub use template::render as render_template;
pub use validate::{is_valid, validate, Severity, ValidationIssue};

#[cfg(feature = "server")]
pub use generate::generate_async;

pub use docforge_types as types;
