//! Navigable tree for the XML footer.
//!
//! Child lookup reports cardinality explicitly through [`Children`], so a
//! caller asking for one element never silently receives the first of many.

use crate::error::{FormatError, Result};
use itertools::Itertools;
use std::fmt::Write;
use std::str::FromStr;

/// Name given to the synthetic node that holds the document's root element.
pub const DOCUMENT_NODE: &str = "#document";

/// One XML element with its attributes, ordered children and text content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

/// Result of looking up children by tag name.
#[derive(Debug, Clone, PartialEq)]
pub enum Children<'a> {
    None,
    One(&'a Element),
    Many(Vec<&'a Element>),
}

impl<'a> Children<'a> {
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Many(elements) => elements.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }

    /// All matched elements in document order.
    pub fn to_vec(&self) -> Vec<&'a Element> {
        match self {
            Children::None => Vec::new(),
            Children::One(element) => vec![*element],
            Children::Many(elements) => elements.clone(),
        }
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The synthetic parent of the document's root element.
    pub fn document() -> Self {
        Self::new(DOCUMENT_NODE)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Look up the children named `name`.
    pub fn child(&self, name: &str) -> Children<'_> {
        let mut matches = self.children_named(name).collect_vec();
        match matches.len() {
            0 => Children::None,
            1 => Children::One(matches.remove(0)),
            _ => Children::Many(matches),
        }
    }

    /// Every child named `name`, in document order.
    pub fn children_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Walk a tag path from this node.
    ///
    /// Every intermediate segment must match exactly one element; the final
    /// segment may match any number. A missing segment yields
    /// [`Children::None`].
    pub fn select(&self, path: &[&str]) -> Result<Children<'_>> {
        let Some((last, intermediate)) = path.split_last() else {
            return Ok(Children::None);
        };
        let mut node = self;
        for (depth, segment) in intermediate.iter().enumerate() {
            match node.child(segment) {
                Children::None => return Ok(Children::None),
                Children::One(next) => node = next,
                Children::Many(siblings) => {
                    return Err(FormatError::AmbiguousFooterPath {
                        path: path[..=depth].join("/"),
                        count: siblings.len(),
                    });
                }
            }
        }
        Ok(node.child(last))
    }

    /// Walk a tag path that must end at exactly one element.
    pub fn select_one(&self, path: &[&str]) -> Result<&Element> {
        match self.select(path)? {
            Children::None => Err(FormatError::missing(path.join("/"))),
            Children::One(element) => Ok(element),
            Children::Many(siblings) => Err(FormatError::AmbiguousFooterPath {
                path: path.join("/"),
                count: siblings.len(),
            }),
        }
    }

    /// Like [`Element::select_one`], but a missing path is `Ok(None)`.
    pub fn select_optional(&self, path: &[&str]) -> Result<Option<&Element>> {
        match self.select(path) {
            Ok(Children::None) => Ok(None),
            Ok(_) => self.select_one(path).map(Some),
            Err(e) => Err(e),
        }
    }

    /// Parse a required attribute. `path` names this element in errors.
    pub fn parse_attr<T: FromStr>(&self, attribute: &str, path: &str) -> Result<T> {
        let raw = self
            .attr(attribute)
            .ok_or_else(|| FormatError::missing(format!("{path}@{attribute}")))?;
        raw.trim()
            .parse()
            .map_err(|_| FormatError::malformed(path, attribute, raw))
    }

    /// Indented listing of element names below this node.
    ///
    /// Children whose tag repeats among their siblings are skipped along with
    /// their subtrees, which keeps long lists such as turret or region
    /// entries out of the output.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, depth: usize) {
        for child in &self.children {
            if self.children_named(&child.name).nth(1).is_some() {
                continue;
            }
            let _ = writeln!(out, "{} {}", " -->".repeat(depth), child.name);
            child.write_tree(out, depth + 1);
        }
    }
}
