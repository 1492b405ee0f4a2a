//! Selector parsing and matching
//!
//! Supports selector lists, compound selectors (tag, `*`, `#id`, `.class`,
//! attribute selectors), the `:focus`, `:checked`, `:disabled`, `:enabled`
//! and `:not()` pseudo-classes, and the descendant / child combinators.

use crate::{DomError, DomTree, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, left to right.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    compounds: Vec<CompoundSelector>,
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CompoundSelector {
    /// None = universal
    tag: Option<String>,
    components: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute { name: String, op: Option<(AttrOp, String)> },
    Focus,
    Checked,
    Disabled,
    Enabled,
    Not(Box<CompoundSelector>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

impl AttrOp {
    fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Includes => actual.split_whitespace().any(|t| t == expected),
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

impl Selector {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self, DomError> {
        let alternatives = Parser::new(source).parse_list()?;
        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    /// Source text as parsed
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the element matches any alternative of the list
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.element(node).is_some()
            && self
                .alternatives
                .iter()
                .any(|complex| complex.matches_at(tree, node, complex.compounds.len() - 1))
    }
}

impl ComplexSelector {
    fn matches_at(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(tree, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| self.matches_at(tree, p, idx - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .any(|a| self.matches_at(tree, a, idx - 1)),
        }
    }
}

impl CompoundSelector {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(elem) = tree.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !elem.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.components.iter().all(|component| match component {
            SimpleSelector::Id(id) => elem.id.as_deref() == Some(id.as_str()),
            SimpleSelector::Class(class) => elem.classes.contains(class),
            SimpleSelector::Attribute { name, op } => match (elem.get_attr(name), op) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((op, expected))) => op.matches(actual, expected),
            },
            SimpleSelector::Focus => tree.is_focused(node),
            SimpleSelector::Checked => elem.checked,
            SimpleSelector::Disabled => tree.is_disabled(node),
            SimpleSelector::Enabled => !tree.is_disabled(node),
            SimpleSelector::Not(inner) => !inner.matches(tree, node),
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, message: impl Into<String>) -> DomError {
        DomError::InvalidSelector {
            selector: self.input.to_string(),
            message: message.into(),
        }
    }

    fn unexpected(&self, c: char) -> DomError {
        self.error(format!("unexpected '{c}' at offset {}", self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), DomError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}' at offset {}", self.pos)))
        }
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn ident(&mut self) -> Result<String, DomError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
        {
            self.bump();
        }
        if start == self.pos {
            return Err(self.error(format!("expected identifier at offset {start}")));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn quoted_or_ident(&mut self) -> Result<String, DomError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.bump();
                }
                let value = self.input[start..self.pos].to_string();
                self.expect(quote)?;
                Ok(value)
            }
            _ => self.ident(),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>, DomError> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                }
                Some(c) => return Err(self.unexpected(c)),
            }
        }
        Ok(list)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, DomError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, DomError> {
        let start = self.pos;
        let mut compound = CompoundSelector::default();

        if self.eat('*') {
            // universal
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.components.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    compound.components.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    compound.components.push(self.parse_attribute()?);
                }
                Some(':') => {
                    self.bump();
                    compound.components.push(self.parse_pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.error(format!("expected selector at offset {start}")));
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector, DomError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        if self.eat(']') {
            return Ok(SimpleSelector::Attribute { name, op: None });
        }

        let op = match self.bump() {
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.expect('=')?;
                match c {
                    '~' => AttrOp::Includes,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Substring,
                }
            }
            _ => return Err(self.error("invalid attribute operator")),
        };
        self.skip_ws();
        let value = self.quoted_or_ident()?;
        self.skip_ws();
        self.expect(']')?;
        Ok(SimpleSelector::Attribute {
            name,
            op: Some((op, value)),
        })
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector, DomError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "focus" => Ok(SimpleSelector::Focus),
            "checked" => Ok(SimpleSelector::Checked),
            "disabled" => Ok(SimpleSelector::Disabled),
            "enabled" => Ok(SimpleSelector::Enabled),
            "not" => {
                self.expect('(')?;
                self.skip_ws();
                let inner = self.parse_compound()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(SimpleSelector::Not(Box::new(inner)))
            }
            other => Err(self.error(format!("unsupported pseudo-class ':{other}'"))),
        }
    }
}
