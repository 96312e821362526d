//! CSS Selectors for `querySelector` / `matches`
//!
//! Supported syntax:
//! - type (`div`), universal (`*`), `#id`, `.class`
//! - attributes: `[a]`, `[a=v]`, `[a~=v]`, `[a|=v]`, `[a^=v]`, `[a$=v]`,
//!   `[a*=v]`, with an optional `i` flag
//! - combinators: descendant, `>`, `+`, `~`
//! - pseudo-classes: `:root`, `:scope`, `:empty`, `:first-child`,
//!   `:last-child`, `:only-child`, `:first-of-type`, `:last-of-type`,
//!   `:nth-child()`, `:nth-last-child()`, `:not()`, `:checked`, `:disabled`
//! - selector lists separated by `,`
//!
//! Anything else (pseudo-elements, unknown pseudo-classes, namespace
//! prefixes) is rejected with `DomError::Syntax`.

use std::str::FromStr;

use crate::node::{Namespace, NodeData};
use crate::tree::DomTree;
use crate::{DomError, DomResult, NodeId};

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, stored left to right.
/// The combinator of part `i` links it to part `i - 1`.
#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    /// Lower-cased type selector, `None` for `*` or omitted
    tag: Option<String>,
    simple: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq)]
enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        test: Option<(AttrOp, String)>,
        case_insensitive: bool,
    },
    Pseudo(PseudoClass),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

#[derive(Debug, Clone, PartialEq)]
enum PseudoClass {
    Root,
    Scope,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    Not(SelectorList),
    Checked,
    Disabled,
}

/// `An+B` expression of the `:nth-*` pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    pub a: i32,
    pub b: i32,
}

impl NthExpression {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse `odd`, `even`, `3`, `2n+1`, `-n + 3`
    pub fn parse(s: &str) -> Option<Self> {
        let s: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::new(2, 1)),
            "even" => return Some(Self::new(2, 0)),
            "" => return None,
            _ => {}
        }
        if let Ok(b) = s.parse::<i32>() {
            return Some(Self::new(0, b));
        }

        let (a_str, rest) = s.split_once('n')?;
        let a = match a_str {
            "" | "+" => 1,
            "-" => -1,
            _ => a_str.parse().ok()?,
        };
        let b = match rest {
            "" => 0,
            _ if rest.starts_with('+') || rest.starts_with('-') => rest.parse().ok()?,
            _ => return None,
        };
        Some(Self::new(a, b))
    }

    /// Whether the 1-based `index` is selected
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let diff = index - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(input: &str) -> DomResult<Self> {
        let mut parser = Parser::new(input);
        let list = parser.selector_list(false)?;
        if !parser.at_end() {
            return Err(parser.error());
        }
        Ok(list)
    }

    /// Whether `element` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.matches_in_scope(tree, element, None)
    }

    /// Like [`matches`](Self::matches), with `:scope` bound to `scope`
    pub fn matches_in_scope(&self, tree: &DomTree, element: NodeId, scope: Option<NodeId>) -> bool {
        tree.element(element).is_some()
            && self
                .selectors
                .iter()
                .any(|s| s.matches(tree, s.parts.len() - 1, element, scope))
    }

    /// Matching descendants of `root` in tree order
    pub fn query_all(&self, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
        let scope = scope_element(tree, root);
        tree.descendants(root)
            .into_iter()
            .filter(|&d| self.matches_in_scope(tree, d, scope))
            .collect()
    }

    /// First matching descendant of `root` in tree order
    pub fn query_first(&self, tree: &DomTree, root: NodeId) -> Option<NodeId> {
        let scope = scope_element(tree, root);
        tree.descendants(root)
            .into_iter()
            .find(|&d| self.matches_in_scope(tree, d, scope))
    }
}

impl FromStr for SelectorList {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `:scope` of a document query is its document element
fn scope_element(tree: &DomTree, root: NodeId) -> Option<NodeId> {
    if tree.element(root).is_some() {
        Some(root)
    } else {
        tree.element_children(root).first().copied()
    }
}

// ===========================================================================
// Matching (right to left)
// ===========================================================================

impl ComplexSelector {
    fn matches(&self, tree: &DomTree, index: usize, element: NodeId, scope: Option<NodeId>) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(tree, element, scope) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        match combinator {
            Combinator::Descendant => tree
                .ancestors(element)
                .into_iter()
                .filter(|&a| tree.element(a).is_some())
                .any(|a| self.matches(tree, next, a, scope)),
            Combinator::Child => tree
                .parent_element(element)
                .is_some_and(|p| self.matches(tree, next, p, scope)),
            Combinator::NextSibling => tree
                .previous_element_sibling(element)
                .is_some_and(|s| self.matches(tree, next, s, scope)),
            Combinator::SubsequentSibling => {
                let mut sibling = tree.previous_element_sibling(element);
                while let Some(s) = sibling {
                    if self.matches(tree, next, s, scope) {
                        return true;
                    }
                    sibling = tree.previous_element_sibling(s);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, element: NodeId, scope: Option<NodeId>) -> bool {
        let Some(data) = tree.element(element) else {
            return false;
        };
        let html = data.namespace == Namespace::Html;

        if let Some(tag) = &self.tag {
            let same = if html {
                data.local_name.eq_ignore_ascii_case(tag)
            } else {
                data.local_name == *tag
            };
            if !same {
                return false;
            }
        }

        self.simple.iter().all(|simple| match simple {
            SimpleSelector::Id(id) => data.id.as_deref() == Some(id.as_str()),
            SimpleSelector::Class(class) => data.has_class(class),
            SimpleSelector::Attribute {
                name,
                test,
                case_insensitive,
            } => {
                let value = data.attrs.iter().find(|a| {
                    if html {
                        a.name.eq_ignore_ascii_case(name)
                    } else {
                        a.name == *name
                    }
                });
                match (value, test) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(attr), Some((op, expected))) => {
                        attr_matches(*op, &attr.value, expected, *case_insensitive)
                    }
                }
            }
            SimpleSelector::Pseudo(pseudo) => pseudo.matches(tree, element, scope),
        })
    }
}

fn attr_matches(op: AttrOp, value: &str, expected: &str, case_insensitive: bool) -> bool {
    let (value, expected) = if case_insensitive {
        (value.to_lowercase(), expected.to_lowercase())
    } else {
        (value.to_string(), expected.to_string())
    };
    match op {
        AttrOp::Equals => value == expected,
        AttrOp::Includes => !expected.is_empty() && value.split_ascii_whitespace().any(|w| w == expected),
        AttrOp::DashMatch => value == expected || value.starts_with(&format!("{expected}-")),
        AttrOp::Prefix => !expected.is_empty() && value.starts_with(&expected),
        AttrOp::Suffix => !expected.is_empty() && value.ends_with(&expected),
        AttrOp::Substring => !expected.is_empty() && value.contains(&expected),
    }
}

impl PseudoClass {
    fn matches(&self, tree: &DomTree, element: NodeId, scope: Option<NodeId>) -> bool {
        match self {
            Self::Root => tree
                .parent(element)
                .and_then(|p| tree.get(p))
                .is_some_and(|p| matches!(p.data, NodeData::Document)),
            Self::Scope => match scope {
                Some(scope) => scope == element,
                None => Self::Root.matches(tree, element, scope),
            },
            Self::Empty => tree
                .children(element)
                .all(|(_, n)| match &n.data {
                    NodeData::Comment(_) => true,
                    NodeData::Text(t) => t.is_empty(),
                    _ => false,
                }),
            Self::FirstChild => tree.previous_element_sibling(element).is_none(),
            Self::LastChild => tree.next_element_sibling(element).is_none(),
            Self::OnlyChild => {
                tree.previous_element_sibling(element).is_none() && tree.next_element_sibling(element).is_none()
            }
            Self::FirstOfType => type_position(tree, element, false) == 1,
            Self::LastOfType => type_position(tree, element, true) == 1,
            Self::NthChild(nth) => nth.matches(sibling_position(tree, element, false)),
            Self::NthLastChild(nth) => nth.matches(sibling_position(tree, element, true)),
            Self::Not(list) => !list.matches_in_scope(tree, element, scope),
            Self::Checked => tree.element(element).is_some_and(|e| {
                let input = e.local_name == "input"
                    && matches!(e.get_attr("type"), Some(t) if t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"));
                (input && e.get_attr("checked").is_some())
                    || (e.local_name == "option" && e.get_attr("selected").is_some())
            }),
            Self::Disabled => tree.element(element).is_some_and(|e| {
                matches!(
                    e.local_name.as_str(),
                    "button" | "input" | "select" | "textarea" | "optgroup" | "option" | "fieldset"
                ) && e.get_attr("disabled").is_some()
            }),
        }
    }
}

/// 1-based position among element siblings, from the end when `reverse`
fn sibling_position(tree: &DomTree, element: NodeId, reverse: bool) -> i32 {
    let step = |n| {
        if reverse {
            tree.next_element_sibling(n)
        } else {
            tree.previous_element_sibling(n)
        }
    };
    let mut position = 1;
    let mut cur = step(element);
    while let Some(n) = cur {
        position += 1;
        cur = step(n);
    }
    position
}

/// 1-based position among siblings with the same local name
fn type_position(tree: &DomTree, element: NodeId, reverse: bool) -> i32 {
    let Some(name) = tree.element(element).map(|e| e.local_name.clone()) else {
        return 0;
    };
    let step = |n| {
        if reverse {
            tree.next_element_sibling(n)
        } else {
            tree.previous_element_sibling(n)
        }
    };
    let mut position = 1;
    let mut cur = step(element);
    while let Some(n) = cur {
        if tree.element(n).is_some_and(|e| e.local_name == name) {
            position += 1;
        }
        cur = step(n);
    }
    position
}

// ===========================================================================
// Parsing
// ===========================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self) -> DomError {
        DomError::Syntax(self.input.to_string())
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

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn selector_list(&mut self, nested: bool) -> DomResult<SelectorList> {
        let mut selectors = Vec::new();
        loop {
            selectors.push(self.complex(nested)?);
            if !self.eat(',') {
                break;
            }
        }
        Ok(SelectorList { selectors })
    }

    fn complex(&mut self, nested: bool) -> DomResult<ComplexSelector> {
        self.skip_ws();
        let first = self.compound()?.ok_or_else(|| self.error())?;
        let mut parts = vec![(Combinator::Descendant, first)];

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some(')') if nested => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.error()),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_ws();
            }
            let compound = self.compound()?.ok_or_else(|| self.error())?;
            parts.push((combinator, compound));
        }
        Ok(ComplexSelector { parts })
    }

    fn compound(&mut self) -> DomResult<Option<Compound>> {
        let mut compound = Compound::default();
        let mut any = false;

        if self.eat('*') {
            any = true;
        } else if let Some(tag) = self.ident() {
            compound.tag = Some(tag.to_ascii_lowercase());
            any = true;
        }
        if self.peek() == Some('|') {
            return Err(self.error());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let id = self.ident().ok_or_else(|| self.error())?;
                    compound.simple.push(SimpleSelector::Id(id));
                }
                Some('.') => {
                    self.bump();
                    let class = self.ident().ok_or_else(|| self.error())?;
                    compound.simple.push(SimpleSelector::Class(class));
                }
                Some('[') => {
                    self.bump();
                    let attr = self.attribute()?;
                    compound.simple.push(attr);
                }
                Some(':') => {
                    self.bump();
                    let pseudo = self.pseudo_class()?;
                    compound.simple.push(SimpleSelector::Pseudo(pseudo));
                }
                _ => break,
            }
            any = true;
        }

        Ok(any.then_some(compound))
    }

    fn attribute(&mut self) -> DomResult<SimpleSelector> {
        self.skip_ws();
        let name = self.ident().ok_or_else(|| self.error())?;
        self.skip_ws();

        if self.eat(']') {
            return Ok(SimpleSelector::Attribute {
                name,
                test: None,
                case_insensitive: false,
            });
        }

        let op = match self.bump() {
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.eat('=') => match c {
                '~' => AttrOp::Includes,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                _ => AttrOp::Substring,
            },
            _ => return Err(self.error()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                self.string(q)?
            }
            _ => self.ident().ok_or_else(|| self.error())?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        if let Some(flag) = self.peek().filter(|c| c.is_ascii_alphabetic()) {
            match flag.to_ascii_lowercase() {
                'i' => case_insensitive = true,
                's' => {}
                _ => return Err(self.error()),
            }
            self.bump();
            self.skip_ws();
        }

        if !self.eat(']') {
            return Err(self.error());
        }
        Ok(SimpleSelector::Attribute {
            name,
            test: Some((op, value)),
            case_insensitive,
        })
    }

    fn pseudo_class(&mut self) -> DomResult<PseudoClass> {
        let name = self.ident().ok_or_else(|| self.error())?.to_ascii_lowercase();

        if self.eat('(') {
            let pseudo = match name.as_str() {
                "not" => {
                    let list = self.selector_list(true)?;
                    self.skip_ws();
                    PseudoClass::Not(list)
                }
                "nth-child" | "nth-last-child" => {
                    let end = self.input[self.pos..].find(')').ok_or_else(|| self.error())?;
                    let nth = NthExpression::parse(&self.input[self.pos..self.pos + end])
                        .ok_or_else(|| self.error())?;
                    self.pos += end;
                    if name == "nth-child" {
                        PseudoClass::NthChild(nth)
                    } else {
                        PseudoClass::NthLastChild(nth)
                    }
                }
                _ => return Err(self.error()),
            };
            if !self.eat(')') {
                return Err(self.error());
            }
            return Ok(pseudo);
        }

        Ok(match name.as_str() {
            "root" => PseudoClass::Root,
            "scope" => PseudoClass::Scope,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            _ => return Err(self.error()),
        })
    }

    /// CSS identifier, with backslash escapes taken literally
    fn ident(&mut self) -> Option<String> {
        let start = self.pos;
        let mut out = String::new();

        if self.peek() == Some('-') {
            out.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                out.push(self.bump()?);
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }

        // An identifier cannot start with a digit, nor be a lone '-'
        let valid = match out.chars().next() {
            Some('-') => out.len() > 1 && !out[1..].starts_with(|c: char| c.is_ascii_digit()),
            Some(c) => !c.is_ascii_digit(),
            None => false,
        };
        if !valid {
            self.pos = start;
            return None;
        }
        Some(out)
    }

    fn string(&mut self, quote: char) -> DomResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\\') => out.push(self.bump().ok_or_else(|| self.error())?),
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err(self.error()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// <html><body><ul id="list"><li class="a">..</li> x3</ul><p></p></body></html>
    fn sample() -> (DomTree, Vec<NodeId>) {
        let mut tree = DomTree::new();
        let html = tree.create_html_element("html");
        let body = tree.create_html_element("body");
        let ul = tree.create_html_element("ul");
        let p = tree.create_html_element("p");
        tree.append_child(tree.root(), html).unwrap();
        tree.append_child(html, body).unwrap();
        tree.append_child(body, ul).unwrap();
        tree.append_child(body, p).unwrap();
        tree.set_attribute(ul, "id", "list").unwrap();

        let mut items = Vec::new();
        for i in 0..3 {
            let li = tree.create_html_element("li");
            tree.append_child(ul, li).unwrap();
            tree.set_attribute(li, "class", if i == 1 { "a b" } else { "a" }).unwrap();
            tree.set_attribute(li, "data-index", &i.to_string()).unwrap();
            items.push(li);
        }
        (tree, vec![html, body, ul, p, items[0], items[1], items[2]])
    }

    fn query(tree: &DomTree, selector: &str) -> Vec<NodeId> {
        SelectorList::parse(selector).unwrap().query_all(tree, tree.root())
    }

    #[test]
    fn test_nth_expression() {
        assert_eq!(NthExpression::parse("odd"), Some(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("even"), Some(NthExpression::new(2, 0)));
        assert_eq!(NthExpression::parse("3"), Some(NthExpression::new(0, 3)));
        assert_eq!(NthExpression::parse("-n + 3"), Some(NthExpression::new(-1, 3)));
        assert_eq!(NthExpression::parse("2n+1"), Some(NthExpression::new(2, 1)));
        assert_eq!(NthExpression::parse("2n1"), None);

        let first_three = NthExpression::new(-1, 3);
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }

    #[test]
    fn test_simple_selectors() {
        let (tree, n) = sample();
        assert_eq!(query(&tree, "li"), vec![n[4], n[5], n[6]]);
        assert_eq!(query(&tree, "LI.b"), vec![n[5]]);
        assert_eq!(query(&tree, "#list"), vec![n[2]]);
        assert_eq!(query(&tree, "[data-index=\"2\"]"), vec![n[6]]);
        assert_eq!(query(&tree, "[class~=b]"), vec![n[5]]);
    }

    #[test]
    fn test_combinators() {
        let (tree, n) = sample();
        assert_eq!(query(&tree, "body li:first-child"), vec![n[4]]);
        assert_eq!(query(&tree, "body > li"), Vec::<NodeId>::new());
        assert_eq!(query(&tree, "ul > li + li"), vec![n[5], n[6]]);
        assert_eq!(query(&tree, "ul ~ p"), vec![n[3]]);
    }

    #[test]
    fn test_pseudo_classes() {
        let (tree, n) = sample();
        assert_eq!(query(&tree, ":root"), vec![n[0]]);
        assert_eq!(query(&tree, "li:nth-child(odd)"), vec![n[4], n[6]]);
        assert_eq!(query(&tree, "li:nth-last-child(1)"), vec![n[6]]);
        assert_eq!(query(&tree, "li:not(.b)"), vec![n[4], n[6]]);
        assert_eq!(query(&tree, "p:empty"), vec![n[3]]);
    }

    #[test]
    fn test_selector_list_in_tree_order() {
        let (tree, n) = sample();
        assert_eq!(query(&tree, "p, ul"), vec![n[2], n[3]]);
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "li,", "..a", "#", "li::before", ":hover", "[x", "a >", "ns|a"] {
            assert!(
                matches!(SelectorList::parse(bad), Err(DomError::Syntax(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
