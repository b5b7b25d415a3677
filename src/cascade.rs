//! Cascade resolver – turns raw rules into a [`StyleTree`] whose nodes carry
//! complete style maps.
//!
//! Nodes live in an arena and refer to each other by [`StyleNodeId`]. The
//! arena owns every node; `children` are the forward edges, `parent` is a
//! plain index used only for upward lookups.

use std::collections::BTreeMap;

use crate::rules::{RawRule, RuleKind};

/// Values every node ends up with unless something more specific set them.
pub const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("position", "relative"),
    ("left", "0pt"),
    ("top", "0pt"),
    ("width", "100%"),
    ("background-color", "#ffffff"),
    ("color", "#000000"),
    ("font-family", "Arial"),
    ("font-size", "10pt"),
    ("font-style", "normal"),
    ("font-weight", "normal"),
    ("border", "none"),
    ("text-align", "left"),
    ("line-height", "5pt"),
];

/// Attributes that accumulate along the ancestor chain instead of being
/// overridden by the nearest ancestor.
const GEOMETRIC_ATTRIBUTES: &[&str] = &["left", "top", "position", "width", "height"];

fn is_geometric(attr: &str) -> bool {
    GEOMETRIC_ATTRIBUTES.contains(&attr)
}

// ---------------------------------------------------------------------------
// Style maps
// ---------------------------------------------------------------------------

/// Where a style value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written on the rule itself.
    Declared,
    /// Broadcast from a directive sibling.
    Directive,
    /// Filled in by default completion.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    pub value: String,
    pub origin: Origin,
}

/// Attribute → value map of one node. Attribute names are lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: BTreeMap<String, StyleEntry>,
}

impl StyleMap {
    /// Build a map from a rule's own declarations (no defaults yet).
    ///
    /// Names that only differ in case collapse into one attribute: a name
    /// already written in lowercase wins, otherwise the last name in byte
    /// order does.
    pub fn declared(style: &BTreeMap<String, String>) -> Self {
        let is_lowercase = |attr: &str| attr.trim() == attr.trim().to_ascii_lowercase();
        let mut map = Self::default();
        let (exact, folded): (Vec<_>, Vec<_>) =
            style.iter().partition(|(attr, _)| is_lowercase(attr));
        for (attr, value) in folded.into_iter().chain(exact) {
            map.set(attr, value);
        }
        map
    }

    /// Set a declared value, replacing whatever was there.
    pub fn set(&mut self, attr: &str, value: &str) {
        let attr = attr.trim().to_ascii_lowercase();
        if attr.is_empty() {
            return;
        }
        self.entries.insert(
            attr,
            StyleEntry {
                value: value.trim().to_string(),
                origin: Origin::Declared,
            },
        );
    }

    /// Fill every missing default attribute. Present values are never touched.
    pub fn complete_defaults(&mut self) {
        for (attr, value) in DEFAULT_STYLES {
            self.entries
                .entry((*attr).to_string())
                .or_insert_with(|| StyleEntry {
                    value: (*value).to_string(),
                    origin: Origin::Default,
                });
        }
    }

    /// Patch this map with a directive's explicit values.
    ///
    /// Attributes this node set explicitly keep their value; defaulted ones
    /// are replaced. Applying the same directive twice is the same as once.
    pub fn merge_directive(&mut self, directive: &StyleMap) {
        for (attr, entry) in &directive.entries {
            if entry.origin == Origin::Default || self.is_explicit(attr) {
                continue;
            }
            self.entries.insert(
                attr.clone(),
                StyleEntry {
                    value: entry.value.clone(),
                    origin: Origin::Directive,
                },
            );
        }
        self.complete_defaults();
    }

    pub fn get(&self, attr: &str) -> Option<&str> {
        self.entries.get(attr).map(|e| e.value.as_str())
    }

    pub fn origin(&self, attr: &str) -> Option<Origin> {
        self.entries.get(attr).map(|e| e.origin)
    }

    /// True when the value was declared on the rule or broadcast by a directive.
    pub fn is_explicit(&self, attr: &str) -> bool {
        matches!(
            self.origin(attr),
            Some(Origin::Declared) | Some(Origin::Directive)
        )
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.entries.contains_key(attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, e)| (k.as_str(), e.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Style tree
// ---------------------------------------------------------------------------

/// Index of a node in a [`StyleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleNodeId(pub usize);

/// One element rule instantiated as a tree node.
#[derive(Debug, Clone)]
pub struct StyleNode {
    pub name: Option<String>,
    pub styles: StyleMap,
    pub text: Option<String>,
    pub parent: Option<StyleNodeId>,
    pub children: Vec<StyleNodeId>,
}

/// Resolved style tree. Built once, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StyleTree {
    nodes: Vec<StyleNode>,
    roots: Vec<StyleNodeId>,
}

impl StyleTree {
    /// Resolve a sequence of top-level rules. The sequence is treated as one
    /// nesting level, so a directive among them patches later roots.
    pub fn resolve(rules: &[RawRule]) -> Self {
        let mut tree = Self::default();
        tree.roots = tree.resolve_level(rules, None);
        log::debug!(
            "cascade: {} node(s), {} root(s)",
            tree.nodes.len(),
            tree.roots.len()
        );
        tree
    }

    /// Instantiate the rules of one nesting level under `parent`.
    fn resolve_level(&mut self, rules: &[RawRule], parent: Option<StyleNodeId>) -> Vec<StyleNodeId> {
        let mut directive: Option<StyleMap> = None;
        let mut ids = Vec::with_capacity(rules.len());

        for rule in rules {
            match &rule.kind {
                RuleKind::Directive => {
                    if !rule.children.is_empty() {
                        log::warn!(
                            "directive rule has {} child rule(s); they are discarded",
                            rule.children.len()
                        );
                    }
                    if directive.is_some() {
                        log::warn!("second directive at the same level is ignored");
                        continue;
                    }
                    let mut styles = StyleMap::declared(&rule.style);
                    styles.complete_defaults();
                    directive = Some(styles);
                }
                RuleKind::Element { name } => {
                    let id = self.alloc(name.clone(), rule, parent);
                    let children = self.resolve_level(&rule.children, Some(id));
                    let node = &mut self.nodes[id.0];
                    node.children = children;
                    if let Some(d) = &directive {
                        node.styles.merge_directive(d);
                    }
                    ids.push(id);
                }
            }
        }

        if directive.is_some() && ids.is_empty() {
            log::warn!("directive has no siblings to patch");
        }
        ids
    }

    fn alloc(&mut self, name: Option<String>, rule: &RawRule, parent: Option<StyleNodeId>) -> StyleNodeId {
        let mut styles = StyleMap::declared(&rule.style);
        styles.complete_defaults();
        let id = StyleNodeId(self.nodes.len());
        self.nodes.push(StyleNode {
            name,
            styles,
            text: rule.text.clone(),
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn roots(&self) -> &[StyleNodeId] {
        &self.roots
    }

    pub fn node(&self, id: StyleNodeId) -> &StyleNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: StyleNodeId) -> Option<StyleNodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: StyleNodeId) -> &[StyleNodeId] {
        &self.node(id).children
    }

    /// The node's own value for `attr`.
    pub fn style(&self, id: StyleNodeId, attr: &str) -> Option<&str> {
        self.node(id).styles.get(attr)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: StyleNodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Ancestors whose own map explicitly defines `attr`, nearest first.
    pub fn ancestors_by_style(&self, id: StyleNodeId, attr: &str) -> Vec<StyleNodeId> {
        self.ancestors(id)
            .filter(|a| self.node(*a).styles.is_explicit(attr))
            .collect()
    }

    /// Candidate values for inheriting `attr`, nearest ancestor first.
    ///
    /// Geometric attributes are summed along the chain elsewhere and are never
    /// inherited by override, so for them this yields nothing.
    pub fn inherited<'a>(
        &'a self,
        id: StyleNodeId,
        attr: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let blocked = is_geometric(attr);
        self.ancestors(id)
            .take_while(move |_| !blocked)
            .filter_map(move |a| self.node(a).styles.get(attr))
    }

    /// All node ids, parents before children, siblings in declaration order.
    pub fn preorder(&self) -> Vec<StyleNodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<StyleNodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }
}

/// Iterator over strict ancestors, see [`StyleTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a StyleTree,
    next: Option<StyleNodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = StyleNodeId;

    fn next(&mut self) -> Option<StyleNodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
