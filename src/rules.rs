//! Style rules – the nested input description of a document.
//!
//! A document is either a single rule object or a bare array of rules:
//!
//! ```json
//! { "name": "row", "style": { "width": "50%" }, "text": "…", "children": [ … ] }
//! ```
//!
//! Children are also accepted under the legacy key `">"`. A rule named `*`
//! is a directive: it is tagged [`RuleKind::Directive`] here, at parse time,
//! and later stages never look at the name again.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::error::HyperError;

/// Name that marks a rule as a directive.
pub const DIRECTIVE_NAME: &str = "*";

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// What a rule becomes in the style tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Broadcasts its style to later siblings; never becomes a node.
    Directive,
    /// An ordinary rule, instantiated as a style node.
    Element { name: Option<String> },
}

/// One raw rule as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RuleDef")]
pub struct RawRule {
    pub kind: RuleKind,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<RawRule>,
}

impl RawRule {
    /// An element rule with the given name and no style.
    pub fn element(name: &str) -> Self {
        Self::with_kind(RuleKind::Element {
            name: Some(name.to_string()),
        })
    }

    /// An empty directive rule.
    pub fn directive() -> Self {
        Self::with_kind(RuleKind::Directive)
    }

    fn with_kind(kind: RuleKind) -> Self {
        Self {
            kind,
            style: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn style(mut self, attr: &str, value: &str) -> Self {
        self.style.insert(attr.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: RawRule) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_directive(&self) -> bool {
        self.kind == RuleKind::Directive
    }

    /// The rule's name; directives report `*`.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Directive => Some(DIRECTIVE_NAME),
            RuleKind::Element { name } => name.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON decoding
// ---------------------------------------------------------------------------

/// Wire shape of a rule before the directive tag is decided.
#[derive(Deserialize)]
struct RuleDef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    style: BTreeMap<String, Option<Scalar>>,
    #[serde(default)]
    text: Option<Scalar>,
    #[serde(default, alias = ">")]
    children: Vec<RawRule>,
}

/// Style values and text may be written as JSON strings, numbers or booleans.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<RuleDef> for RawRule {
    fn from(def: RuleDef) -> Self {
        let kind = match def.name {
            Some(name) if name.trim() == DIRECTIVE_NAME => RuleKind::Directive,
            name => RuleKind::Element { name },
        };
        let style = def
            .style
            .into_iter()
            .filter_map(|(attr, value)| value.map(|v| (attr, v.to_string())))
            .collect();
        RawRule {
            kind,
            style,
            text: def.text.map(|t| t.to_string()),
            children: def.children,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<RawRule>),
    One(RawRule),
}

/// Parse a style document into its top-level rules.
///
/// A single rule object yields one root; a bare array yields one root per
/// entry, all at the same nesting level.
pub fn parse_rules(json: &str) -> Result<Vec<RawRule>, HyperError> {
    let rules = match serde_json::from_str::<Document>(json)? {
        Document::Many(rules) => rules,
        Document::One(rule) => vec![rule],
    };
    log::debug!("parsed {} top-level rule(s)", rules.len());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_object() {
        let rules = parse_rules(
            r##"{"name": "row", "style": {"width": "50%"}, "text": "hi",
                "children": [{"name": "a"}]}"##,
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name(), Some("row"));
        assert_eq!(rules[0].style.get("width").map(String::as_str), Some("50%"));
        assert_eq!(rules[0].text.as_deref(), Some("hi"));
        assert_eq!(rules[0].children.len(), 1);
    }

    #[test]
    fn parse_bare_sequence() {
        let rules = parse_rules(r#"[{"name": "a"}, {"name": "b"}, {}]"#).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2].name(), None);
    }

    #[test]
    fn legacy_children_key() {
        let rules = parse_rules(r#"{"name": "p", ">": [{"name": "c"}]}"#).unwrap();
        assert_eq!(rules[0].children[0].name(), Some("c"));
    }

    #[test]
    fn directive_is_tagged_at_parse_time() {
        let rules = parse_rules(r#"[{"name": "*"}, {"name": "x"}]"#).unwrap();
        assert!(rules[0].is_directive());
        assert_eq!(rules[0].kind, RuleKind::Directive);
        assert!(!rules[1].is_directive());
    }

    #[test]
    fn scalar_style_values_are_stringified() {
        let rules =
            parse_rules(r#"{"style": {"font-weight": 900, "left": 1.5, "color": null}, "text": 42}"#)
                .unwrap();
        let style = &rules[0].style;
        assert_eq!(style.get("font-weight").map(String::as_str), Some("900"));
        assert_eq!(style.get("left").map(String::as_str), Some("1.5"));
        assert!(!style.contains_key("color"));
        assert_eq!(rules[0].text.as_deref(), Some("42"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_rules("{not json").unwrap_err();
        assert!(matches!(err, HyperError::Parse(_)));
    }

    #[test]
    fn builder_matches_parsed_rule() {
        let built = RawRule::element("a").style("color", "#ff0000").text("A");
        let parsed = parse_rules(r##"{"name": "a", "style": {"color": "#ff0000"}, "text": "A"}"##)
            .unwrap()
            .remove(0);
        assert_eq!(built, parsed);
    }
}
