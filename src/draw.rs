//! Draw instructions – the contract between layout and a rendering backend.
//!
//! [`paint`] walks a [`BoxTree`] in traversal order and, for every drawn box,
//! issues: optional text/draw/fill colours, an optional font, a cursor move,
//! one cell, then either a new line or an advance past the cell. Styling
//! state is set before every cell; nothing assumes it persisted from the
//! previous box.
//!
//! [`CommandRecorder`] captures the calls as serialisable [`DrawCommand`]s,
//! which [`replay`] can later feed to any other backend.

use serde::{Deserialize, Serialize};

use crate::boxes::BoxTree;
use crate::compile::LayoutTree;
use crate::error::HyperError;
use crate::properties::{Align, BorderSides, Rgb};

/// One text cell: a bordered, optionally filled box with a line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub border: BorderSides,
    pub align: Option<Align>,
    pub fill: bool,
}

/// What a renderer must be able to do.
pub trait Backend {
    fn set_text_color(&mut self, color: Rgb);
    fn set_draw_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_font(&mut self, family: &str, style: &str, size: f32);
    fn move_to(&mut self, x: f32, y: f32);
    fn cell(&mut self, cell: &Cell);
    /// Go to the start of the next line; `height` is the cell just drawn.
    fn new_line(&mut self, height: f32);
    fn advance_x(&mut self, width: f32);
}

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    SetTextColor { color: Rgb },
    SetDrawColor { color: Rgb },
    SetFillColor { color: Rgb },
    SetFont { family: String, style: String, size: f32 },
    MoveTo { x: f32, y: f32 },
    Cell(Cell),
    NewLine { height: f32 },
    AdvanceX { width: f32 },
}

/// Backend that only records what it is asked to do.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl Backend for CommandRecorder {
    fn set_text_color(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::SetTextColor { color });
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::SetDrawColor { color });
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.commands.push(DrawCommand::SetFillColor { color });
    }

    fn set_font(&mut self, family: &str, style: &str, size: f32) {
        self.commands.push(DrawCommand::SetFont {
            family: family.to_string(),
            style: style.to_string(),
            size,
        });
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo { x, y });
    }

    fn cell(&mut self, cell: &Cell) {
        self.commands.push(DrawCommand::Cell(cell.clone()));
    }

    fn new_line(&mut self, height: f32) {
        self.commands.push(DrawCommand::NewLine { height });
    }

    fn advance_x(&mut self, width: f32) {
        self.commands.push(DrawCommand::AdvanceX { width });
    }
}

/// Feed recorded commands to another backend.
pub fn replay<B: Backend + ?Sized>(commands: &[DrawCommand], backend: &mut B) {
    for command in commands {
        match command {
            DrawCommand::SetTextColor { color } => backend.set_text_color(*color),
            DrawCommand::SetDrawColor { color } => backend.set_draw_color(*color),
            DrawCommand::SetFillColor { color } => backend.set_fill_color(*color),
            DrawCommand::SetFont {
                family,
                style,
                size,
            } => backend.set_font(family, style, *size),
            DrawCommand::MoveTo { x, y } => backend.move_to(*x, *y),
            DrawCommand::Cell(cell) => backend.cell(cell),
            DrawCommand::NewLine { height } => backend.new_line(*height),
            DrawCommand::AdvanceX { width } => backend.advance_x(*width),
        }
    }
}

/// Serialise a command stream to pretty JSON.
pub fn commands_to_json(commands: &[DrawCommand]) -> Result<String, HyperError> {
    serde_json::to_string_pretty(commands).map_err(|e| HyperError::Serialize(e.to_string()))
}

/// Deserialise a command stream.
pub fn commands_from_json(json: &str) -> Result<Vec<DrawCommand>, serde_json::Error> {
    serde_json::from_str(json)
}

fn decode_color(what: &str, value: Option<&String>) -> Option<Rgb> {
    let value = value?;
    let rgb = Rgb::from_hex(value);
    if rgb.is_none() {
        log::warn!("skipping {what} {value:?}: not a 6-digit hex colour");
    }
    rgb
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Issue the draw calls for every drawn box. `origin` is the page position of
/// the content area's top-left corner.
pub fn paint<B: Backend + ?Sized>(
    tree: &LayoutTree,
    boxes: &BoxTree,
    origin: (f32, f32),
    backend: &mut B,
) {
    for b in boxes.iter().filter(|b| b.drawn) {
        let props = tree.properties(b.node);

        if let Some(color) = decode_color("text colour", props.text_color.as_ref()) {
            backend.set_text_color(color);
        }
        if let Some(color) = decode_color("draw colour", props.draw_color.as_ref()) {
            backend.set_draw_color(color);
        }
        let fill = decode_color("fill colour", props.fill_color.as_ref());
        if let Some(color) = fill {
            backend.set_fill_color(color);
        }
        if let Some(font) = &props.font {
            backend.set_font(&capitalize(&font.family), &font.style.to_string(), font.size);
        }

        backend.move_to(origin.0 + b.offset_x, origin.1 + b.offset_y);
        backend.cell(&Cell {
            width: b.width,
            height: b.height,
            text: tree.text(b.node).unwrap_or_default().to_string(),
            border: props.border_or_default(),
            align: props.align,
            fill: fill.is_some(),
        });

        if b.forces_line_break {
            backend.new_line(b.height);
        } else {
            backend.advance_x(b.width);
        }
    }
}
