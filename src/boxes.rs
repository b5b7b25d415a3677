//! Box tree – assigns every layout node a content-relative offset, a resolved
//! width and a line-break decision.
//!
//! Two models run at once:
//!
//! - **Geometric accumulation.** A node's own `x`/`y` contribution plus the
//!   contributions of all its ancestors.
//! - **Inline flow.** Siblings with `display` other than `block` are laid out
//!   left to right from their parent's offset; a `block` sibling ends the row
//!   and the next inline sibling starts over at the parent's offset.
//!
//! Vertically, relative boxes sit on the current line; a line break moves the
//! line down by the tallest cell of the finished row. Absolute boxes ignore
//! the line.
//!
//! Traversal is pre-order: a node is always positioned before its children,
//! and siblings in declaration order.

use crate::compile::{LayoutNodeId, LayoutTree};
use crate::error::HyperError;
use crate::properties::{Offset, Properties};

/// Cell height used when a node has no `height` property.
pub const DEFAULT_CELL_HEIGHT: f32 = 5.0;

/// A layout node with its resolved geometry. Offsets are relative to the
/// top-left corner of the content area.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedBox {
    pub node: LayoutNodeId,
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
    pub forces_line_break: bool,
    /// False for nodes without any rendering property; they get no draw call.
    pub drawn: bool,
}

/// Vertical position of the current row.
#[derive(Debug, Default)]
struct LineCursor {
    top: f32,
    row_height: f32,
}

impl LineCursor {
    fn extend_row(&mut self, height: f32) {
        self.row_height = self.row_height.max(height);
    }

    fn break_line(&mut self) {
        self.top += self.row_height;
        self.row_height = 0.0;
    }
}

/// Positioned boxes for one render pass.
#[derive(Debug, Clone)]
pub struct BoxTree {
    content_width: f32,
    boxes: Vec<Option<PositionedBox>>,
    order: Vec<LayoutNodeId>,
}

impl BoxTree {
    /// Position every node of `tree` inside a content area `content_width`
    /// units wide.
    ///
    /// Fails before anything is positioned when the content width is not a
    /// positive finite number, since fractional widths and offsets scale by it.
    pub fn layout(tree: &LayoutTree, content_width: f32) -> Result<Self, HyperError> {
        if !(content_width.is_finite() && content_width > 0.0) {
            return Err(HyperError::InvalidContentWidth(content_width));
        }

        let mut boxes = Self {
            content_width,
            boxes: vec![None; tree.len()],
            order: Vec::with_capacity(tree.len()),
        };
        let mut cursor = LineCursor::default();
        boxes.place_siblings(tree, tree.roots(), 0.0, &mut cursor);

        log::debug!(
            "box tree: {} box(es), content width {content_width}, last line at {}",
            boxes.order.len(),
            cursor.top
        );
        Ok(boxes)
    }

    /// Place one group of siblings whose row starts at `base_x`, then recurse.
    fn place_siblings(
        &mut self,
        tree: &LayoutTree,
        siblings: &[LayoutNodeId],
        base_x: f32,
        cursor: &mut LineCursor,
    ) {
        let mut running_x = base_x;

        for &id in siblings {
            let props = tree.properties(id);
            let drawn = !props.is_empty();
            let width = self.resolve_width(tree, id);
            let height = props.height.unwrap_or(DEFAULT_CELL_HEIGHT);
            let forces_line_break = props.line_break == Some(true);
            let anchored = std::iter::once(id)
                .chain(tree.ancestors(id))
                .any(|n| matches!(tree.properties(n).y, Some(Offset::Absolute(_))));

            let offset_x = if drawn && props.line_break == Some(false) {
                let x = running_x;
                running_x += width;
                x
            } else {
                self.accumulated_offset(tree, id, |p| p.x.as_ref())
            };

            let geometric_y = self.accumulated_offset(tree, id, |p| p.y.as_ref());
            let offset_y = if anchored {
                geometric_y
            } else {
                cursor.top + geometric_y
            };

            log::trace!(
                "place {:?} ({}) at ({offset_x}, {offset_y}) width {width}",
                id,
                tree.name(id).unwrap_or("-")
            );

            self.order.push(id);
            self.boxes[id.0] = Some(PositionedBox {
                node: id,
                offset_x,
                offset_y,
                width,
                height,
                forces_line_break,
                drawn,
            });

            if drawn && !anchored {
                cursor.extend_row(height);
            }
            if drawn && forces_line_break {
                cursor.break_line();
                running_x = base_x;
            }

            self.place_siblings(tree, tree.children(id), offset_x, cursor);
        }
    }

    /// Own contribution plus every ancestor's, each resolved against the
    /// content width.
    fn accumulated_offset<F>(&self, tree: &LayoutTree, id: LayoutNodeId, pick: F) -> f32
    where
        F: Fn(&Properties) -> Option<&Offset>,
    {
        let own = |n: LayoutNodeId| {
            pick(tree.properties(n))
                .map(|o| o.resolve(self.content_width))
                .unwrap_or(0.0)
        };
        own(id) + tree.ancestors(id).map(own).sum::<f32>()
    }

    /// Widths from the root down: fractions (`<= 1`) scale the basis, a
    /// literal width replaces it. A missing width keeps the basis.
    fn resolve_width(&self, tree: &LayoutTree, id: LayoutNodeId) -> f32 {
        let mut chain: Vec<LayoutNodeId> = tree.ancestors(id).collect();
        chain.reverse();
        chain.push(id);

        chain.into_iter().fold(self.content_width, |basis, n| {
            match tree.properties(n).width {
                Some(w) if w <= 1.0 => basis * w,
                Some(w) => w,
                None => basis,
            }
        })
    }

    pub fn get(&self, id: LayoutNodeId) -> Option<&PositionedBox> {
        self.boxes.get(id.0).and_then(Option::as_ref)
    }

    /// Boxes in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = &PositionedBox> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
