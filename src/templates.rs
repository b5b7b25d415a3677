//! Sample style documents for testing and demonstration.
//!
//! Each template exercises a different part of the cascade: directives,
//! inline rows, absolute placement, borders and fonts.

use serde_json::{json, Value};

/// Invoice with a header block and directive-styled table rows.
///
/// Every row is a zero-height `block` container followed by inline cells; the
/// next container closes the previous row.
pub fn invoice_template() -> &'static str {
    r##"[
    {"name": "title", "text": "Invoice #2024-001",
     "style": {"display": "block", "height": "26pt", "font-size": "18pt",
               "font-weight": "bold", "color": "#1a365d"}},
    {"name": "from", "text": "Acme Corp, 123 Business St, New York",
     "style": {"display": "block", "height": "14pt"}},
    {"name": "to", "text": "Client Inc, 456 Client Ave, Los Angeles",
     "style": {"display": "block", "height": "22pt"}},

    {"name": "head", "style": {"display": "block", "height": "0pt"}, "children": [
        {"name": "*", "style": {"display": "inline", "width": "25%", "height": "18pt",
                                "background-color": "#e2e8f0", "font-weight": "bold",
                                "border": "1pt solid #a0aec0"}},
        {"name": "th", "text": "Item"},
        {"name": "th", "text": "Qty", "style": {"text-align": "right"}},
        {"name": "th", "text": "Price", "style": {"text-align": "right"}},
        {"name": "th", "text": "Total", "style": {"text-align": "right"}}
    ]},
    {"name": "row", "style": {"display": "block", "height": "0pt"}, "children": [
        {"name": "*", "style": {"display": "inline", "width": "25%", "height": "16pt",
                                "border-bottom": "1pt solid #cbd5e0"}},
        {"name": "td", "text": "Web Development"},
        {"name": "td", "text": "40", "style": {"text-align": "right"}},
        {"name": "td", "text": "$150.00", "style": {"text-align": "right"}},
        {"name": "td", "text": "$6,000.00", "style": {"text-align": "right"}}
    ]},
    {"name": "row", "style": {"display": "block", "height": "0pt"}, "children": [
        {"name": "*", "style": {"display": "inline", "width": "25%", "height": "16pt",
                                "border-bottom": "1pt solid #cbd5e0"}},
        {"name": "td", "text": "Design Services"},
        {"name": "td", "text": "20", "style": {"text-align": "right"}},
        {"name": "td", "text": "$120.00", "style": {"text-align": "right"}},
        {"name": "td", "text": "$2,400.00", "style": {"text-align": "right"}}
    ]},
    {"name": "total", "text": "Total due: $8,400.00",
     "style": {"display": "block", "height": "24pt", "text-align": "right",
               "font-weight": "700"}}
]"##
}

/// Report with nested sections and explicit inheritance keywords.
pub fn report_template() -> &'static str {
    r##"{
    "name": "report",
    "style": {"display": "block", "text-align": "center", "font-style": "italic",
              "font-family": "times", "height": "20pt", "font-size": "14pt"},
    "text": "Quarterly Report",
    "children": [
        {"name": "summary", "text": "Revenue grew in every region.",
         "style": {"display": "block", "text-align": "inherit", "font-style": "inherit",
                   "font-family": "times", "height": "14pt"}},
        {"name": "detail", "text": "Figures are unaudited.",
         "style": {"display": "block", "text-align": "initial", "font-style": "initial",
                   "height": "14pt", "color": "#4a5568"}},
        {"name": "code", "text": "ref: Q3-2024",
         "style": {"display": "block", "font-family": "courier", "height": "14pt"}}
    ]
}"##
}

/// Enough block rows to spill onto several pages.
pub fn multi_page_template() -> String {
    let rows: Vec<Value> = (1..=80)
        .map(|i| {
            json!({
                "name": "line",
                "text": format!("Line item {i}"),
                "style": {"display": "block", "height": "18pt", "border-bottom": "1pt solid #e2e8f0"}
            })
        })
        .collect();
    Value::Array(rows).to_string()
}

/// Colours, per-side borders and an absolutely positioned stamp.
pub fn styled_template() -> &'static str {
    r##"[
    {"name": "banner", "text": "Styled document",
     "style": {"display": "block", "height": "30pt", "background-color": "#2b6cb0",
               "color": "#ffffff", "font-size": "20pt", "text-align": "center"}},
    {"name": "box", "text": "Left and right borders only",
     "style": {"display": "block", "height": "20pt", "width": "60%",
               "border-left": "2pt solid #e53e3e", "border-right": "2pt solid #e53e3e"}},
    {"name": "box", "text": "All borders but the top",
     "style": {"display": "block", "height": "20pt", "width": "60%",
               "border": "1pt solid #2f855a", "border-top-width": "0"}},
    {"name": "stamp", "text": "PAID",
     "style": {"position": "absolute", "left": "380pt", "top": "120pt", "width": "80pt",
               "height": "24pt", "border": "1pt solid #c53030", "color": "#c53030",
               "font-weight": "bold", "text-align": "center"}}
]"##
}

/// Smallest useful document.
pub fn minimal_template() -> &'static str {
    r#"{"name": "p", "text": "Hello, world!"}"#
}

/// One node per supported keyword family, including edge-case values.
pub fn all_properties_template() -> &'static str {
    r##"[
    {"name": "*", "style": {"color": "#333333"}},
    {"name": "align", "text": "justify", "style": {"display": "block", "text-align": "justify"}},
    {"name": "border-color", "text": "border-color",
     "style": {"display": "block", "border": "1pt", "border-color": "#718096"}},
    {"name": "sides", "text": "per-side",
     "style": {"display": "block", "border-top": "1pt solid #000000", "border-bottom": "none"}},
    {"name": "fill", "text": "fill", "style": {"display": "block", "background-color": "#fefcbf"}},
    {"name": "font", "text": "font",
     "style": {"display": "block", "font-family": "helvetica", "font-size": 11,
               "font-weight": 900, "font-style": "oblique"}},
    {"name": "sizes", "text": "sizes",
     "style": {"display": "block", "width": "50%", "line-height": "12pt"}},
    {"name": "short-colour", "text": "short colour ignored",
     "style": {"display": "block", "color": "#f00"}},
    {"name": "row", "style": {"display": "block", "height": "0pt"}, "children": [
        {"name": "a", "text": "a", "style": {"display": "inline", "width": "30%"}},
        {"name": "b", "text": "b", "style": {"display": "inline", "width": "30%"}}
    ]},
    {"name": "end", "style": {"display": "block", "left": "10%", "top": "4pt"}, "text": "offset"}
]"##
}
