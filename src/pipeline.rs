//! Pipeline – ties together rule parsing, cascade, property compilation,
//! box positioning and rendering into a single function call.

use crate::boxes::BoxTree;
use crate::cascade::StyleTree;
use crate::compile::LayoutTree;
use crate::draw::{paint, replay, CommandRecorder, DrawCommand};
use crate::error::HyperError;
use crate::render::{PageSetup, PdfBackend};
use crate::rules::parse_rules;

/// Default page margin in points.
pub const PAGE_MARGIN_PT: f32 = 40.0;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height.
    Landscape,
}

/// Configuration for the generation pipeline. All lengths are points.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Document title embedded in the PDF metadata (default: "hyperpdf output").
    pub title: String,
    /// Page width (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height (default: A4 = 841.89).
    pub page_height: f32,
    pub margin_left: f32,
    /// Top margin; also used at the bottom of each page.
    pub margin_top: f32,
    pub margin_right: f32,
    /// Swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title: "hyperpdf output".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            margin_left: PAGE_MARGIN_PT,
            margin_top: PAGE_MARGIN_PT,
            margin_right: PAGE_MARGIN_PT,
            orientation: PageOrientation::Portrait,
        }
    }
}

impl PipelineConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    /// Width available to layout: page width minus left and right margins.
    pub fn content_width(&self) -> f32 {
        self.effective_width() - self.margin_left - self.margin_right
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    fn page_setup(&self) -> PageSetup {
        PageSetup {
            title: self.title.clone(),
            width: self.effective_width(),
            height: self.effective_height(),
            margin_left: self.margin_left,
            margin_top: self.margin_top,
            margin_bottom: self.margin_top,
        }
    }
}

/// Parse, cascade, compile and position a style document.
pub fn build_layout(
    json: &str,
    config: &PipelineConfig,
) -> Result<(LayoutTree, BoxTree), HyperError> {
    let rules = parse_rules(json)?;
    let styles = StyleTree::resolve(&rules);
    log::debug!("style tree: {} node(s)", styles.len());

    let tree = LayoutTree::compile(styles);
    let boxes = BoxTree::layout(&tree, config.content_width())?;
    Ok((tree, boxes))
}

/// Generate only the draw-command stream (no PDF rendering).
pub fn compute_draw_commands(
    json: &str,
    config: &PipelineConfig,
) -> Result<Vec<DrawCommand>, HyperError> {
    let (tree, boxes) = build_layout(json, config)?;
    let mut recorder = CommandRecorder::new();
    paint(
        &tree,
        &boxes,
        (config.margin_left, config.margin_top),
        &mut recorder,
    );
    Ok(recorder.into_commands())
}

/// Render a previously computed command stream.
pub fn render_commands(
    commands: &[DrawCommand],
    config: &PipelineConfig,
) -> Result<Vec<u8>, HyperError> {
    let mut backend = PdfBackend::new(config.page_setup());
    replay(commands, &mut backend);
    backend.finish()
}

/// Full pipeline: style document → PDF bytes.
///
/// Returns `(pdf_bytes, draw_commands)`.
pub fn generate_pdf(
    json: &str,
    config: &PipelineConfig,
) -> Result<(Vec<u8>, Vec<DrawCommand>), HyperError> {
    let commands = compute_draw_commands(json, config)?;
    let bytes = render_commands(&commands, config)?;
    Ok((bytes, commands))
}

/// Convenience: generate PDF with default A4 config.
pub fn generate_pdf_from_json(json: &str) -> Result<Vec<u8>, HyperError> {
    let (bytes, _) = generate_pdf(json, &PipelineConfig::default())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_basic() {
        let json = r#"[{"name": "h1", "text": "Hello"}, {"name": "p", "text": "World"}]"#;
        let (bytes, commands) = generate_pdf(json, &PipelineConfig::default()).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, DrawCommand::Cell(_)))
                .count(),
            2
        );
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let config = PipelineConfig::a4_landscape();
        assert_eq!(config.effective_width(), 841.89);
        assert_eq!(config.effective_height(), 595.28);
        assert_eq!(config.content_width(), 841.89 - 80.0);
    }

    #[test]
    fn cells_start_at_the_margins() {
        let config = PipelineConfig {
            margin_left: 10.0,
            margin_top: 25.0,
            ..PipelineConfig::default()
        };
        let commands = compute_draw_commands(r#"{"name": "a"}"#, &config).unwrap();
        assert!(commands.contains(&DrawCommand::MoveTo { x: 10.0, y: 25.0 }));
    }

    #[test]
    fn margins_wider_than_the_page_are_rejected() {
        let config = PipelineConfig {
            margin_left: 300.0,
            margin_right: 300.0,
            ..PipelineConfig::default()
        };
        let err = compute_draw_commands(r#"{"name": "a"}"#, &config).unwrap_err();
        assert!(matches!(err, HyperError::InvalidContentWidth(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = generate_pdf_from_json("{not json").unwrap_err();
        assert!(matches!(err, HyperError::Parse(_)));
    }
}
