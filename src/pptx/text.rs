//! DrawingML text: paragraphs, runs and the namespace prefixes used to build them.

use super::ns;
use crate::xml::Element;
use std::fmt::Write;

/// Namespace prefixes declared on a part's root element.
#[derive(Debug, Clone)]
pub(crate) struct Prefixes {
    p: String,
    a: String,
    r: String,
}

impl Prefixes {
    /// Prefixes bound on `root`, falling back to the conventional ones.
    pub fn of(root: &Element) -> Self {
        let bound = |uri: &str, fallback: &str| {
            root.namespace_prefix(uri).unwrap_or(fallback).to_string()
        };
        Self {
            p: bound(ns::PRESENTATION, "p"),
            a: bound(ns::DRAWING, "a"),
            r: bound(ns::RELATIONSHIPS, "r"),
        }
    }

    pub fn p(&self, local: &str) -> Element {
        Element::new(format!("{}:{}", self.p, local))
    }

    pub fn a(&self, local: &str) -> Element {
        Element::new(format!("{}:{}", self.a, local))
    }

    /// Qualified name of a relationship attribute (`r:id`, `r:embed`).
    pub fn r(&self, local: &str) -> String {
        format!("{}:{}", self.r, local)
    }
}

/// Replace characters XML 1.0 cannot carry with `_xHHHH_`.
pub(crate) fn escape_control_chars(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\t' | '\n' => escaped.push(ch),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                let _ = write!(escaped, "_x{:04X}_", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// `\r\n` and lone `\r` become `\n`.
pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Runs for one paragraph; every character in `breaks` becomes an `a:br`.
pub(crate) fn runs(prefixes: &Prefixes, text: &str, breaks: &[char]) -> Vec<Element> {
    let mut elements = Vec::new();
    for (i, segment) in text.split(breaks).enumerate() {
        if i > 0 {
            elements.push(prefixes.a("br"));
        }
        if !segment.is_empty() {
            elements.push(
                prefixes
                    .a("r")
                    .with_child(prefixes.a("t").with_text(escape_control_chars(segment))),
            );
        }
    }
    elements
}

/// A paragraph holding `text`, line breaks inside it as `a:br`.
pub(crate) fn paragraph(prefixes: &Prefixes, text: &str) -> Element {
    let mut p = prefixes.a("p");
    for run in runs(prefixes, text, &['\n', '\u{000B}']) {
        p.push(run);
    }
    p
}

/// `p:txBody` with empty body properties, list style and one empty paragraph.
pub(crate) fn empty_text_body(prefixes: &Prefixes) -> Element {
    prefixes
        .p("txBody")
        .with_child(prefixes.a("bodyPr"))
        .with_child(prefixes.a("lstStyle"))
        .with_child(prefixes.a("p"))
}

/// Plain text of a text body: paragraphs joined by `\n`, `a:br` read as `\n`.
pub(crate) fn text_of(tx_body: &Element) -> String {
    tx_body
        .children_named("p")
        .map(|p| {
            let mut line = String::new();
            for child in p.elements() {
                match child.local_name() {
                    "r" | "fld" => {
                        if let Some(t) = child.child("t") {
                            line.push_str(&t.text());
                        }
                    }
                    "br" => line.push('\n'),
                    _ => {}
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
