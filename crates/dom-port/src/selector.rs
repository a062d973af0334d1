//! CSS selector subset used by [`crate::MemoryDom`].
//!
//! Supported: type and universal selectors, `.class`, `#id`, attribute selectors with
//! `= *= ^= $= ~= |=` (quoted or bare values, backslash escapes in names), `:not(...)`,
//! `:has(...)`, descendant and child combinators, and comma-separated lists. Anything else is
//! rejected with a [`SelectorError`], mirroring how `querySelector` throws on syntax it does
//! not understand.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{reason} at offset {offset}")]
pub struct SelectorError {
    pub offset: usize,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
    DashMatch,
}

#[derive(Clone, Debug, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    not: Vec<Complex>,
    has: Vec<Complex>,
}

/// Compounds from left to right; the combinator links a compound to the one before it.
#[derive(Clone, Debug, PartialEq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

/// Parsed comma-separated selector list.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

/// Read access to an element tree, enough to evaluate a selector.
pub trait SelectorTree {
    type Node: Copy;

    /// Lower-cased tag name.
    fn tag_name(&self, node: Self::Node) -> &str;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node>;
    fn descendant_elements(&self, node: Self::Node) -> Vec<Self::Node>;
}

impl SelectorList {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(source);
        let selectors = parser.parse_list()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self { selectors })
    }

    pub fn matches<T: SelectorTree>(&self, tree: &T, node: T::Node) -> bool {
        self.selectors
            .iter()
            .any(|complex| matches_complex(tree, complex, node))
    }
}

fn matches_complex<T: SelectorTree>(tree: &T, complex: &Complex, node: T::Node) -> bool {
    match complex.parts.len() {
        0 => false,
        len => matches_from(tree, &complex.parts, len - 1, node),
    }
}

fn matches_from<T: SelectorTree>(
    tree: &T,
    parts: &[(Combinator, Compound)],
    index: usize,
    node: T::Node,
) -> bool {
    let (combinator, compound) = &parts[index];
    if !matches_compound(tree, compound, node) {
        return false;
    }
    if index == 0 {
        return true;
    }
    match combinator {
        Combinator::Child => tree
            .parent_element(node)
            .map_or(false, |parent| matches_from(tree, parts, index - 1, parent)),
        Combinator::Descendant => {
            let mut current = tree.parent_element(node);
            while let Some(ancestor) = current {
                if matches_from(tree, parts, index - 1, ancestor) {
                    return true;
                }
                current = tree.parent_element(ancestor);
            }
            false
        }
    }
}

fn matches_compound<T: SelectorTree>(tree: &T, compound: &Compound, node: T::Node) -> bool {
    if let Some(tag) = &compound.tag {
        if tree.tag_name(node) != tag {
            return false;
        }
    }
    for id in &compound.ids {
        if tree.attribute(node, "id") != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.is_empty() {
        let class = tree.attribute(node, "class").unwrap_or_default();
        if !compound
            .classes
            .iter()
            .all(|wanted| class.split_whitespace().any(|name| name == wanted))
        {
            return false;
        }
    }
    for attr in &compound.attrs {
        let Some(value) = tree.attribute(node, &attr.name) else {
            return false;
        };
        if let Some((op, expected)) = &attr.test {
            if !attribute_matches(*op, value, expected) {
                return false;
            }
        }
    }
    if compound
        .not
        .iter()
        .any(|complex| matches_complex(tree, complex, node))
    {
        return false;
    }
    for relative in &compound.has {
        let found = tree
            .descendant_elements(node)
            .into_iter()
            .any(|descendant| matches_complex(tree, relative, descendant));
        if !found {
            return false;
        }
    }
    true
}

fn attribute_matches(op: AttrOp, value: &str, expected: &str) -> bool {
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Contains => !expected.is_empty() && value.contains(expected),
        AttrOp::Prefix => !expected.is_empty() && value.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && value.ends_with(expected),
        AttrOp::Includes => value.split_whitespace().any(|word| word == expected),
        AttrOp::DashMatch => {
            value == expected
                || value
                    .strip_prefix(expected)
                    .map_or(false, |rest| rest.starts_with('-'))
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SelectorError {
        SelectorError {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn expect(&mut self, wanted: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(ch) if ch == wanted => Ok(()),
            Some(ch) => Err(self.error(format!("expected `{wanted}`, found `{ch}`"))),
            None => Err(self.error(format!("expected `{wanted}`, found end of input"))),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
                continue;
            }
            return Ok(list);
        }
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        parts.push((Combinator::Descendant, self.parse_compound()?));
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some('+') | Some('~') => {
                    return Err(self.error("sibling combinators are not supported"))
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(ch) => return Err(self.error(format!("unexpected `{ch}`"))),
            };
            parts.push((combinator, self.parse_compound()?));
        }
        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let mut consumed = false;

        if self.peek() == Some('*') {
            self.pos += 1;
            consumed = true;
        } else if self.peek().map_or(false, is_ident_start) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            consumed = true;
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.ids.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    self.parse_pseudo(&mut compound)?;
                }
                _ => break,
            }
            consumed = true;
        }

        if consumed {
            Ok(compound)
        } else {
            Err(self.error("expected a selector"))
        }
    }

    fn parse_pseudo(&mut self, compound: &mut Compound) -> Result<(), SelectorError> {
        let name = self.parse_ident()?.to_ascii_lowercase();
        match name.as_str() {
            "not" | "has" => {
                self.expect('(')?;
                let list = self.parse_list()?;
                self.skip_whitespace();
                self.expect(')')?;
                if name == "not" {
                    compound.not.extend(list);
                } else {
                    compound.has.extend(list);
                }
                Ok(())
            }
            other => Err(self.error(format!("pseudo-class `:{other}` is not supported"))),
        }
    }

    fn parse_attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let op = match self.bump() {
            Some(']') => return Ok(AttrSelector { name, test: None }),
            Some('=') => AttrOp::Equals,
            Some(prefix) => {
                let op = match prefix {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    other => {
                        return Err(self.error(format!("unexpected `{other}` in attribute selector")))
                    }
                };
                self.expect('=')?;
                op
            }
            None => return Err(self.error("unterminated attribute selector")),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrSelector {
            name,
            test: Some((op, value)),
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(ch) => out.push(ch),
                    None => return Err(self.error("dangling escape")),
                },
                Some(ch) if ch == quote => return Ok(out),
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.pos += 1;
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
            } else if is_ident_char(ch) {
                out.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            Err(self.error("expected an identifier"))
        } else {
            Ok(out)
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal tree: (tag, attrs, parent).
    struct Tree(Vec<(&'static str, Vec<(&'static str, &'static str)>, Option<usize>)>);

    impl SelectorTree for Tree {
        type Node = usize;

        fn tag_name(&self, node: usize) -> &str {
            self.0[node].0
        }

        fn attribute(&self, node: usize, name: &str) -> Option<&str> {
            self.0[node]
                .1
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
        }

        fn parent_element(&self, node: usize) -> Option<usize> {
            self.0[node].2
        }

        fn descendant_elements(&self, node: usize) -> Vec<usize> {
            (0..self.0.len())
                .filter(|candidate| {
                    let mut current = self.0[*candidate].2;
                    while let Some(parent) = current {
                        if parent == node {
                            return true;
                        }
                        current = self.0[parent].2;
                    }
                    false
                })
                .collect()
        }
    }

    fn sample() -> Tree {
        Tree(vec![
            ("body", vec![], None),
            (
                "div",
                vec![("class", "send-button-container disabled")],
                Some(0),
            ),
            ("svg", vec![("class", "send-icon")], Some(1)),
            ("textarea", vec![("placeholder", "Message DeepSeek")], Some(0)),
            ("use", vec![("xlink:href", "#qwpcicon-sendChat")], Some(2)),
        ])
    }

    fn matches(selector: &str, node: usize) -> bool {
        SelectorList::parse(selector)
            .unwrap_or_else(|err| panic!("{selector}: {err}"))
            .matches(&sample(), node)
    }

    #[test]
    fn compound_and_descendant_selectors() {
        assert!(matches("div.send-button-container svg.send-icon", 2));
        assert!(!matches("div.send-button-container:not(.disabled) svg.send-icon", 2));
        assert!(matches("body > div", 1));
        assert!(!matches("body > svg", 2));
        assert!(matches("div:has(svg)", 1));
        assert!(!matches("textarea:has(svg)", 3));
    }

    #[test]
    fn attribute_operators() {
        assert!(matches(r#"textarea[placeholder*="Message"]"#, 3));
        assert!(!matches(r#"textarea[placeholder*="message"]"#, 3));
        assert!(matches("textarea[placeholder^=Message]", 3));
        assert!(matches(r#"div[class~="disabled"]"#, 1));
        assert!(matches(r##"svg use[xlink\:href="#qwpcicon-sendChat"]"##, 4));
        assert!(matches("button, textarea", 3));
    }

    #[test]
    fn unsupported_or_broken_selectors_are_rejected() {
        assert!(SelectorList::parse(r##"svg use[xlink:href="#x"]"##).is_err());
        assert!(SelectorList::parse("li:first-child").is_err());
        assert!(SelectorList::parse("a + b").is_err());
        assert!(SelectorList::parse("div[").is_err());
        assert!(SelectorList::parse("").is_err());
    }
}
