//! Error types surfaced by the pipeline.
//!
//! Only conditions that must stop a render are errors. Malformed colours,
//! unknown keywords and missing attributes are absorbed by the stages
//! themselves and never reach this type.

use thiserror::Error;

/// Top-level error for parsing, layout and rendering.
#[derive(Debug, Error)]
pub enum HyperError {
    /// The style document is not valid JSON or does not have the rule shape.
    #[error("invalid style document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Page width minus horizontal margins leaves no room to lay out into.
    /// Percentage widths and offsets would divide by this, so it is fatal.
    #[error("content width must be positive, got {0}")]
    InvalidContentWidth(f32),

    /// A draw-command stream could not be written out as JSON.
    #[error("could not serialise draw commands: {0}")]
    Serialize(String),

    /// The PDF backend failed to produce a document.
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialisation_failures_are_not_reported_as_parse_errors() {
        let err = HyperError::Serialize("key must be a string".to_string());
        assert_eq!(
            err.to_string(),
            "could not serialise draw commands: key must be a string"
        );

        let parse: HyperError = serde_json::from_str::<u8>("x").unwrap_err().into();
        assert!(parse.to_string().starts_with("invalid style document"));
    }
}
