//! # Security Element
//!
//! A minimal structural XML tree: a tag, ordered attributes, child elements
//! and optional text. No namespaces, comments, CDATA or processing
//! instructions.

use std::fmt::Write as _;
use thiserror::Error;

/// Failure to parse a security XML document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("at byte {position}: {message}")]
pub struct XmlError {
    /// Byte offset where parsing failed.
    pub position: usize,
    /// What was wrong.
    pub message: String,
}

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityElement {
    /// Tag name.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<SecurityElement>,
    /// Text content, if any.
    pub text: Option<String>,
}

impl SecurityElement {
    /// An element with no attributes, children or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder-style attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder-style child.
    #[must_use]
    pub fn child(mut self, child: SecurityElement) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Children with a given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a SecurityElement> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Serialize to compact XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_into(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }

    /// Parse a document containing exactly one root element.
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let mut parser = Parser {
            input,
            pos: 0,
            depth: 0,
        };
        parser.skip_whitespace();
        let root = parser.element()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(parser.error("trailing content after root element"));
        }
        Ok(root)
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(value: &str, position: usize) -> Result<String, XmlError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let Some(semi) = after.find(';') else {
            return Err(XmlError {
                position,
                message: "unterminated entity".to_string(),
            });
        };
        let replacement = match &after[..=semi] {
            "&amp;" => '&',
            "&lt;" => '<',
            "&gt;" => '>',
            "&quot;" => '"',
            "&apos;" => '\'',
            other => {
                return Err(XmlError {
                    position,
                    message: format!("unknown entity {other}"),
                })
            }
        };
        out.push(replacement);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Deepest element nesting accepted by [`SecurityElement::parse`].
pub const MAX_ELEMENT_DEPTH: usize = 64;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> XmlError {
        XmlError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn expect(&mut self, token: &str) -> Result<(), XmlError> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(format!("expected '{token}'")))
        }
    }

    fn name(&mut self) -> Result<&'a str, XmlError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn element(&mut self) -> Result<SecurityElement, XmlError> {
        if self.depth >= MAX_ELEMENT_DEPTH {
            return Err(self.error(format!("elements nested deeper than {MAX_ELEMENT_DEPTH}")));
        }
        self.depth += 1;
        let element = self.element_body();
        self.depth -= 1;
        element
    }

    fn element_body(&mut self) -> Result<SecurityElement, XmlError> {
        self.expect("<")?;
        let mut element = SecurityElement::new(self.name()?);

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.pos += 2;
                return Ok(element);
            }
            if self.rest().starts_with('>') {
                self.pos += 1;
                break;
            }
            let name = self.name()?.to_string();
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            self.expect("\"")?;
            let start = self.pos;
            let end = self
                .rest()
                .find('"')
                .ok_or_else(|| self.error("unterminated attribute value"))?;
            self.pos += end + 1;
            let value = unescape(&self.input[start..start + end], start)?;
            element.attributes.push((name, value));
        }

        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(format!("unclosed element <{}>", element.tag))),
                Some('<') if self.rest().starts_with("</") => {
                    self.pos += 2;
                    let close = self.name()?;
                    if close != element.tag {
                        return Err(self.error(format!(
                            "mismatched closing tag </{close}> for <{}>",
                            element.tag
                        )));
                    }
                    self.skip_whitespace();
                    self.expect(">")?;
                    break;
                }
                Some('<') => element.children.push(self.element()?),
                Some(_) => {
                    let start = self.pos;
                    let len = self.rest().find('<').unwrap_or(self.rest().len());
                    self.pos += len;
                    text.push_str(&unescape(&self.input[start..start + len], start)?);
                }
            }
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            element.text = Some(trimmed.to_string());
        }
        Ok(element)
    }
}
