//! # hyperpdf – cascading style documents → positioned PDF cells
//!
//! This crate turns a tree of CSS-like rules (JSON) into draw instructions
//! for a cell-based PDF writer. The pipeline stages are:
//!
//! 1. **Parse** – JSON → raw rules ([`rules`])
//! 2. **Cascade** – defaults, directives and ancestry ([`cascade`])
//! 3. **Compile** – style strings → typed rendering properties ([`compile`], [`properties`])
//! 4. **Position** – offsets, widths and inline flow ([`boxes`])
//! 5. **Draw** – command stream through a backend seam ([`draw`])
//! 6. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod boxes;
pub mod cascade;
pub mod compile;
pub mod draw;
pub mod error;
pub mod ffi;
pub mod pipeline;
pub mod properties;
pub mod render;
pub mod rules;
pub mod templates;

// Re-exports for convenience
pub use error::HyperError;
pub use pipeline::{
    compute_draw_commands, generate_pdf, generate_pdf_from_json, PageOrientation, PipelineConfig,
};
