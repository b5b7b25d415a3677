//! Property compiler – translates the resolved style map of every style node
//! into typed rendering [`Properties`], producing a [`LayoutTree`] that
//! mirrors the [`StyleTree`] one to one.
//!
//! Compilation is table driven: [`HANDLERS`] lists every supported keyword in
//! the order it is applied. Shorthands come before their longhands so that a
//! later, more specific declaration refines an earlier one (`border` before
//! `border-top` before `border-top-width`), and `line-height` comes before
//! `height` so an explicit height wins. Attributes without a handler produce
//! nothing.

use crate::cascade::{StyleNodeId, StyleTree};
use crate::properties::{Align, BorderSides, Length, Offset, Properties, Property, Side};

const WHITE: &str = "#ffffff";

/// A single attribute being compiled on one node. Keyword and value are
/// lowercase.
pub struct Declaration<'a> {
    pub tree: &'a StyleTree,
    pub node: StyleNodeId,
    pub keyword: &'a str,
    pub value: &'a str,
}

pub type Handler = fn(&Declaration<'_>, &mut Properties);

/// Keyword → handler, in application order.
pub const HANDLERS: &[(&str, Handler)] = &[
    ("text-align", text_align),
    ("border", border),
    ("border-color", border_color),
    ("border-top", border_side),
    ("border-right", border_side),
    ("border-bottom", border_side),
    ("border-left", border_side),
    ("border-top-color", border_side_color),
    ("border-right-color", border_side_color),
    ("border-bottom-color", border_side_color),
    ("border-left-color", border_side_color),
    ("border-top-width", border_side_width),
    ("border-right-width", border_side_width),
    ("border-bottom-width", border_side_width),
    ("border-left-width", border_side_width),
    ("background-color", background_color),
    ("font-family", font_family),
    ("font-size", font_size),
    ("font-style", font_style),
    ("font-weight", font_weight),
    ("color", color),
    ("width", width),
    ("line-height", height),
    ("height", height),
    ("left", left),
    ("top", top),
    ("display", display),
];

fn handler_for(keyword: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, h)| *h)
}

/// Compile every attribute of `node` into a fresh property set.
pub fn compile_node(tree: &StyleTree, node: StyleNodeId) -> Properties {
    let styles = &tree.node(node).styles;
    let mut props = Properties::default();

    for (keyword, value) in styles.iter() {
        if handler_for(keyword).is_none() {
            log::trace!("no rendering property for `{keyword}: {value}`");
        }
    }

    for &(keyword, handler) in HANDLERS {
        if let Some(value) = styles.get(keyword) {
            let value = value.to_ascii_lowercase();
            handler(
                &Declaration {
                    tree,
                    node,
                    keyword,
                    value: &value,
                },
                &mut props,
            );
        }
    }
    props
}

/// Apply one declaration to an existing property set.
///
/// Returns `false` when the keyword has no handler, in which case `props` is
/// left untouched.
pub fn apply_declaration(
    tree: &StyleTree,
    node: StyleNodeId,
    keyword: &str,
    value: &str,
    props: &mut Properties,
) -> bool {
    let keyword = keyword.trim().to_ascii_lowercase();
    let value = value.trim().to_ascii_lowercase();
    match handler_for(&keyword) {
        Some(handler) => {
            handler(
                &Declaration {
                    tree,
                    node,
                    keyword: &keyword,
                    value: &value,
                },
                props,
            );
            true
        }
        None => false,
    }
}

/// Re-dispatch to another keyword on the same node.
fn delegate(d: &Declaration<'_>, keyword: &str, value: &str, props: &mut Properties) {
    apply_declaration(d.tree, d.node, keyword, value, props);
}

// ---------------------------------------------------------------------------
// Explicit inheritance
// ---------------------------------------------------------------------------

/// A keyword value after classification.
enum Keyword<T> {
    Value(T),
    Initial,
    Inherit,
}

/// Walk the ancestors' values for the declaration's attribute until one of
/// them classifies as a concrete value.
fn resolve_inherited<T>(d: &Declaration<'_>, classify: fn(&str) -> Keyword<T>) -> Option<T> {
    for value in d.tree.inherited(d.node, d.keyword) {
        match classify(&value.to_ascii_lowercase()) {
            Keyword::Value(v) => return Some(v),
            Keyword::Initial => return None,
            Keyword::Inherit => continue,
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn classify_align(value: &str) -> Keyword<Align> {
    match value {
        "left" => Keyword::Value(Align::Left),
        "right" => Keyword::Value(Align::Right),
        "center" => Keyword::Value(Align::Center),
        "justify" => Keyword::Value(Align::Justify),
        "initial" => Keyword::Initial,
        _ => Keyword::Inherit,
    }
}

fn text_align(d: &Declaration<'_>, props: &mut Properties) {
    let align = match classify_align(d.value) {
        Keyword::Value(a) => a,
        Keyword::Initial => return,
        Keyword::Inherit => resolve_inherited(d, classify_align).unwrap_or(Align::Justify),
    };
    props.set(Property::Align(align));
}

/// The `width style color` triple of a border shorthand.
struct BorderSpec<'a> {
    width: Option<&'a str>,
    color: Option<&'a str>,
}

impl<'a> BorderSpec<'a> {
    fn parse(value: &'a str) -> Self {
        let parts: Vec<&str> = value.split_whitespace().collect();
        let color = match parts.len() {
            0 | 1 => None,
            2 => parts.last().copied().filter(|p| p.starts_with('#')),
            _ => Some(parts[2]),
        };
        Self {
            width: parts.first().copied(),
            color,
        }
    }
}

fn border(d: &Declaration<'_>, props: &mut Properties) {
    if d.value == "none" {
        props.set(Property::Border(BorderSides::NONE));
        return;
    }
    if let Some(color) = BorderSpec::parse(d.value).color {
        delegate(d, "border-color", color, props);
    }
    props.set(Property::Border(BorderSides::ALL));
}

fn border_color(d: &Declaration<'_>, props: &mut Properties) {
    props.set(Property::DrawColor(d.value.to_string()));
}

/// `border-top`, `border-right`, … : per-side shorthand.
fn border_side(d: &Declaration<'_>, props: &mut Properties) {
    props.set(Property::Border(props.border_or_default()));

    let width_kw = format!("{}-width", d.keyword);
    let color_kw = format!("{}-color", d.keyword);

    if d.value == "none" {
        delegate(d, &width_kw, "0pt", props);
        let previous = props
            .draw_color
            .clone()
            .unwrap_or_else(|| WHITE.to_string());
        delegate(d, &color_kw, &previous, props);
        return;
    }

    let spec = BorderSpec::parse(d.value);
    if let Some(color) = spec.color {
        delegate(d, &color_kw, color, props);
    }
    if let Some(width) = spec.width {
        delegate(d, &width_kw, width, props);
    }
}

fn border_side_color(d: &Declaration<'_>, props: &mut Properties) {
    delegate(d, "border-color", d.value, props);
}

/// `border-top-width` → `Side::Top`.
fn side_of(keyword: &str) -> Option<Side> {
    keyword
        .strip_prefix("border-")
        .and_then(|rest| rest.split('-').next())
        .and_then(Side::from_keyword)
}

fn border_side_width(d: &Declaration<'_>, props: &mut Properties) {
    let Some(side) = side_of(d.keyword) else {
        return;
    };
    let width = Length::parse(d.value).map(|l| l.value).unwrap_or(0.0);
    let mut sides = props.border_or_default();
    if width == 0.0 {
        sides.remove(side);
    } else {
        sides.insert(side);
    }
    props.set(Property::Border(sides));
}

fn background_color(d: &Declaration<'_>, props: &mut Properties) {
    props.set(Property::FillColor(d.value.to_string()));
}

fn font_family(d: &Declaration<'_>, props: &mut Properties) {
    let mut font = props.font_or_default();
    font.family = d.value.to_string();
    props.set(Property::Font(font));
}

fn font_size(d: &Declaration<'_>, props: &mut Properties) {
    let mut font = props.font_or_default();
    if let Some(size) = Length::parse(d.value) {
        font.size = size.value;
    }
    props.set(Property::Font(font));
}

fn classify_font_style(value: &str) -> Keyword<bool> {
    match value {
        "italic" | "oblique" => Keyword::Value(true),
        "normal" => Keyword::Value(false),
        "initial" => Keyword::Initial,
        _ => Keyword::Inherit,
    }
}

fn font_style(d: &Declaration<'_>, props: &mut Properties) {
    let mut font = props.font_or_default();
    let italic = match classify_font_style(d.value) {
        Keyword::Value(italic) => Some(italic),
        Keyword::Initial => Some(false),
        Keyword::Inherit => resolve_inherited(d, classify_font_style),
    };
    if let Some(italic) = italic {
        font.style.italic = italic;
    }
    props.set(Property::Font(font));
}

fn font_weight(d: &Declaration<'_>, props: &mut Properties) {
    let mut font = props.font_or_default();
    font.style.bold = match d.value {
        "bold" => true,
        other => other.parse::<f32>().map(|w| w > 600.0).unwrap_or(false),
    };
    props.set(Property::Font(font));
}

fn color(d: &Declaration<'_>, props: &mut Properties) {
    props.set(Property::TextColor(d.value.to_string()));
}

fn width(d: &Declaration<'_>, props: &mut Properties) {
    if let Some(len) = Length::parse(d.value) {
        props.set(Property::Width(len.fraction()));
    }
}

fn height(d: &Declaration<'_>, props: &mut Properties) {
    if let Some(len) = Length::parse(d.value) {
        props.set(Property::Height(len.value));
    }
}

/// Own literal for absolute nodes; otherwise the explicit values of every
/// ancestor that sets `attr`, nearest first, to be summed at layout time.
fn position_offset(d: &Declaration<'_>, attr: &str) -> Option<Offset> {
    let absolute = d
        .tree
        .style(d.node, "position")
        .is_some_and(|p| p.eq_ignore_ascii_case("absolute"));
    if absolute {
        return Length::parse(d.value).map(|l| Offset::Absolute(l.value));
    }
    let entries = d
        .tree
        .ancestors_by_style(d.node, attr)
        .into_iter()
        .filter_map(|a| d.tree.style(a, attr))
        .filter_map(Length::parse)
        .map(|l| l.fraction())
        .collect();
    Some(Offset::Deferred(entries))
}

fn left(d: &Declaration<'_>, props: &mut Properties) {
    if let Some(offset) = position_offset(d, "left") {
        props.set(Property::X(offset));
    }
}

fn top(d: &Declaration<'_>, props: &mut Properties) {
    if let Some(offset) = position_offset(d, "top") {
        props.set(Property::Y(offset));
    }
}

fn display(d: &Declaration<'_>, props: &mut Properties) {
    props.set(Property::LineBreak(d.value == "block"));
}

// ---------------------------------------------------------------------------
// Layout tree
// ---------------------------------------------------------------------------

/// Index of a node in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutNodeId(pub usize);

#[derive(Debug, Clone)]
pub struct LayoutNode {
    /// The style node this was compiled from.
    pub source: StyleNodeId,
    pub properties: Properties,
    pub parent: Option<LayoutNodeId>,
    pub children: Vec<LayoutNodeId>,
}

/// Compiled tree. Owns the style tree it mirrors so text and styles stay
/// reachable through [`LayoutNode::source`].
#[derive(Debug, Clone)]
pub struct LayoutTree {
    styles: StyleTree,
    nodes: Vec<LayoutNode>,
    roots: Vec<LayoutNodeId>,
}

impl LayoutTree {
    /// Compile every node of `styles`, parents before children.
    pub fn compile(styles: StyleTree) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(styles.len()),
            roots: Vec::new(),
            styles,
        };
        let style_roots = tree.styles.roots().to_vec();
        for root in style_roots {
            let id = tree.compile_subtree(root, None);
            tree.roots.push(id);
        }
        log::debug!("compiled {} layout node(s)", tree.nodes.len());
        tree
    }

    fn compile_subtree(&mut self, source: StyleNodeId, parent: Option<LayoutNodeId>) -> LayoutNodeId {
        let id = LayoutNodeId(self.nodes.len());
        self.nodes.push(LayoutNode {
            source,
            properties: compile_node(&self.styles, source),
            parent,
            children: Vec::new(),
        });
        let style_children = self.styles.children(source).to_vec();
        let children = style_children
            .into_iter()
            .map(|child| self.compile_subtree(child, Some(id)))
            .collect();
        self.nodes[id.0].children = children;
        id
    }

    pub fn styles(&self) -> &StyleTree {
        &self.styles
    }

    pub fn roots(&self) -> &[LayoutNodeId] {
        &self.roots
    }

    pub fn node(&self, id: LayoutNodeId) -> &LayoutNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn properties(&self, id: LayoutNodeId) -> &Properties {
        &self.node(id).properties
    }

    pub fn properties_mut(&mut self, id: LayoutNodeId) -> &mut Properties {
        &mut self.nodes[id.0].properties
    }

    pub fn parent(&self, id: LayoutNodeId) -> Option<LayoutNodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: LayoutNodeId) -> &[LayoutNodeId] {
        &self.node(id).children
    }

    /// Text of the source style node.
    pub fn text(&self, id: LayoutNodeId) -> Option<&str> {
        self.styles.node(self.node(id).source).text.as_deref()
    }

    /// Name of the source style node.
    pub fn name(&self, id: LayoutNodeId) -> Option<&str> {
        self.styles.node(self.node(id).source).name.as_deref()
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: LayoutNodeId) -> impl Iterator<Item = LayoutNodeId> + '_ {
        std::iter::successors(self.parent(id), move |a| self.parent(*a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{FontFlags, FontRecord};
    use crate::rules::RawRule;

    fn compile_one(rule: RawRule) -> Properties {
        let tree = StyleTree::resolve(&[rule]);
        compile_node(&tree, tree.roots()[0])
    }

    /// Properties of the first child of a single root.
    fn compile_child(parent: RawRule) -> Properties {
        let tree = StyleTree::resolve(&[parent]);
        let child = tree.children(tree.roots()[0])[0];
        compile_node(&tree, child)
    }

    #[test]
    fn defaults_compile_to_full_property_set() {
        let props = compile_one(RawRule::element("plain"));
        assert_eq!(props.align, Some(Align::Left));
        assert_eq!(props.border, Some(BorderSides::NONE));
        assert_eq!(props.fill_color.as_deref(), Some("#ffffff"));
        assert_eq!(props.text_color.as_deref(), Some("#000000"));
        assert_eq!(
            props.font,
            Some(FontRecord {
                family: "arial".to_string(),
                style: FontFlags::default(),
                size: 10.0,
            })
        );
        assert_eq!(props.width, Some(1.0));
        assert_eq!(props.height, Some(5.0));
        assert_eq!(props.x, Some(Offset::Deferred(Vec::new())));
        assert_eq!(props.y, Some(Offset::Deferred(Vec::new())));
        assert_eq!(props.line_break, None);
    }

    #[test]
    fn text_align_keywords() {
        for (value, expected) in [
            ("left", Some(Align::Left)),
            ("RIGHT", Some(Align::Right)),
            ("center", Some(Align::Center)),
            ("justify", Some(Align::Justify)),
            ("initial", None),
        ] {
            let props = compile_one(RawRule::element("t").style("text-align", value));
            assert_eq!(props.align, expected, "text-align: {value}");
        }
    }

    #[test]
    fn unrecognised_text_align_inherits_from_parent() {
        let props = compile_child(
            RawRule::element("p")
                .style("text-align", "center")
                .child(RawRule::element("c").style("text-align", "inherit")),
        );
        assert_eq!(props.align, Some(Align::Center));
    }

    #[test]
    fn unrecognised_text_align_without_ancestor_is_justified() {
        let props = compile_one(RawRule::element("t").style("text-align", "start"));
        assert_eq!(props.align, Some(Align::Justify));
    }

    #[test]
    fn border_shorthand_sets_all_sides_and_draw_color() {
        let props = compile_one(RawRule::element("b").style("border", "1pt solid #FF0000"));
        assert_eq!(props.border, Some(BorderSides::ALL));
        assert_eq!(props.draw_color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn side_none_removes_only_that_side() {
        let props = compile_one(
            RawRule::element("b")
                .style("border", "1pt solid #00ff00")
                .style("border-right", "none"),
        );
        assert_eq!(props.border.map(|b| b.to_string()).as_deref(), Some("LTB"));
        assert_eq!(props.draw_color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn side_none_without_previous_color_resets_to_white() {
        let props = compile_one(RawRule::element("b").style("border-top", "none"));
        assert_eq!(props.border, Some(BorderSides::NONE));
        assert_eq!(props.draw_color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn side_flags_accumulate() {
        let props = compile_one(
            RawRule::element("b")
                .style("border-top", "2pt solid #123456")
                .style("border-bottom", "1pt dashed #654321"),
        );
        assert_eq!(props.border.map(|b| b.to_string()).as_deref(), Some("TB"));
        // bottom is applied after top
        assert_eq!(props.draw_color.as_deref(), Some("#654321"));
    }

    #[test]
    fn side_width_longhand_refines_shorthand() {
        let props = compile_one(
            RawRule::element("b")
                .style("border", "1pt solid #000000")
                .style("border-left-width", "0")
                .style("border-top-width", "3pt"),
        );
        assert_eq!(props.border.map(|b| b.to_string()).as_deref(), Some("TRB"));
    }

    #[test]
    fn side_width_on_empty_border_initialises_that_side() {
        let props = compile_one(RawRule::element("b").style("border-right-width", "1pt"));
        assert_eq!(props.border.map(|b| b.to_string()).as_deref(), Some("R"));
    }

    #[test]
    fn side_color_becomes_draw_color() {
        let props = compile_one(RawRule::element("b").style("border-left-color", "#0000ff"));
        assert_eq!(props.draw_color.as_deref(), Some("#0000ff"));
    }

    #[test]
    fn font_attributes_combine() {
        let props = compile_one(
            RawRule::element("f")
                .style("font-family", "Times")
                .style("font-size", "14pt")
                .style("font-style", "oblique")
                .style("font-weight", "bold"),
        );
        let font = props.font.unwrap();
        assert_eq!(font.family, "times");
        assert_eq!(font.size, 14.0);
        assert_eq!(font.style.to_string(), "BI");
    }

    #[test]
    fn italic_flag_is_idempotent() {
        let tree = StyleTree::resolve(&[RawRule::element("f")]);
        let id = tree.roots()[0];
        let mut props = Properties::default();
        apply_declaration(&tree, id, "font-style", "italic", &mut props);
        apply_declaration(&tree, id, "font-style", "italic", &mut props);
        assert_eq!(props.font.as_ref().unwrap().style.to_string(), "I");
        apply_declaration(&tree, id, "font-style", "normal", &mut props);
        assert_eq!(props.font.as_ref().unwrap().style.to_string(), "");
    }

    #[test]
    fn font_weight_most_recent_wins() {
        let tree = StyleTree::resolve(&[RawRule::element("f")]);
        let id = tree.roots()[0];
        let mut props = Properties::default();
        apply_declaration(&tree, id, "font-weight", "900", &mut props);
        assert_eq!(props.font.as_ref().unwrap().style.to_string(), "B");
        apply_declaration(&tree, id, "font-weight", "normal", &mut props);
        assert_eq!(props.font.as_ref().unwrap().style.to_string(), "");
        apply_declaration(&tree, id, "font-weight", "600", &mut props);
        assert!(!props.font.as_ref().unwrap().style.bold);
    }

    #[test]
    fn unrecognised_font_style_inherits() {
        let props = compile_child(
            RawRule::element("p")
                .style("font-style", "italic")
                .child(RawRule::element("c").style("font-style", "inherit")),
        );
        assert!(props.font.unwrap().style.italic);
    }

    #[test]
    fn width_percent_becomes_fraction() {
        assert_eq!(compile_one(RawRule::element("w").style("width", "30%")).width, Some(0.3));
        assert_eq!(compile_one(RawRule::element("w").style("width", "120pt")).width, Some(120.0));
        // unparseable widths produce no property
        assert_eq!(compile_one(RawRule::element("w").style("width", "auto")).width, None);
    }

    #[test]
    fn explicit_height_beats_line_height() {
        let props = compile_one(
            RawRule::element("h")
                .style("height", "20pt")
                .style("line-height", "8pt"),
        );
        assert_eq!(props.height, Some(20.0));
        let props = compile_one(RawRule::element("h").style("line-height", "8pt"));
        assert_eq!(props.height, Some(8.0));
    }

    #[test]
    fn relative_offsets_collect_ancestor_values() {
        let tree = StyleTree::resolve(&[RawRule::element("outer")
            .style("left", "20pt")
            .style("top", "50%")
            .child(RawRule::element("inner").child(RawRule::element("leaf")))]);
        let leaf = tree.preorder()[2];
        let props = compile_node(&tree, leaf);
        assert_eq!(props.x, Some(Offset::Deferred(vec![20.0])));
        assert_eq!(props.y, Some(Offset::Deferred(vec![0.5])));
    }

    #[test]
    fn absolute_offsets_are_literal() {
        let props = compile_child(
            RawRule::element("outer").style("left", "20pt").child(
                RawRule::element("abs")
                    .style("position", "absolute")
                    .style("left", "15pt")
                    .style("top", "7pt"),
            ),
        );
        assert_eq!(props.x, Some(Offset::Absolute(15.0)));
        assert_eq!(props.y, Some(Offset::Absolute(7.0)));
    }

    #[test]
    fn display_sets_line_break() {
        assert_eq!(compile_one(RawRule::element("d").style("display", "block")).line_break, Some(true));
        assert_eq!(compile_one(RawRule::element("d").style("display", "inline")).line_break, Some(false));
    }

    #[test]
    fn unknown_keywords_are_ignored() {
        let with = compile_one(RawRule::element("u").style("letter-spacing", "2pt"));
        let without = compile_one(RawRule::element("u"));
        assert_eq!(with, without);

        let tree = StyleTree::resolve(&[RawRule::element("u")]);
        let mut props = Properties::default();
        assert!(!apply_declaration(&tree, tree.roots()[0], "z-index", "3", &mut props));
        assert!(props.is_empty());
    }

    #[test]
    fn layout_tree_mirrors_style_tree() {
        let styles = StyleTree::resolve(&[RawRule::element("p")
            .text("parent")
            .child(RawRule::element("a").text("A"))
            .child(RawRule::element("b"))]);
        let layout = LayoutTree::compile(styles);
        assert_eq!(layout.len(), 3);
        let root = layout.roots()[0];
        assert_eq!(layout.text(root), Some("parent"));
        let kids = layout.children(root);
        assert_eq!(kids.len(), 2);
        assert_eq!(layout.name(kids[0]), Some("a"));
        assert_eq!(layout.text(kids[0]), Some("A"));
        assert_eq!(layout.parent(kids[1]), Some(root));
        assert_eq!(layout.ancestors(kids[1]).collect::<Vec<_>>(), vec![root]);
    }
}
