use crate::error::{Error, Result};
use crate::node::Node;
use crate::node_set::NodeSet;
use cssparser::{CowRcStr, ParseError, SourceLocation, ToCss};
use html5ever::{LocalName, Namespace};
use selectors::matching::{self, MatchingContext, MatchingMode, QuirksMode};
use selectors::parser::{self, SelectorList, SelectorParseErrorKind};
use std::fmt;

/// A compiled CSS selector list.
#[derive(Debug, Clone)]
pub struct Matcher {
    selector_list: SelectorList<InnerSelector>,
}

impl Matcher {
    /// Compiles the selector. Fails with `Error::Selector` on invalid input.
    pub fn new(sel: &str) -> Result<Self> {
        let mut input = cssparser::ParserInput::new(sel);
        let mut parser = cssparser::Parser::new(&mut input);
        SelectorList::parse(&InnerSelectorParser, &mut parser)
            .map(|selector_list| Matcher { selector_list })
            .map_err(|e| Error::Selector {
                selector: sel.to_string(),
                reason: format!("{:?}", e.kind),
            })
    }

    /// Whether the node is an element matching the selector.
    pub fn match_element(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }

        let mut context =
            MatchingContext::new(MatchingMode::Normal, None, None, QuirksMode::NoQuirks);
        matching::matches_selector_list(&self.selector_list, node, &mut context)
    }

    /// Descendants of every root that match, deduplicated and in document
    /// order. Roots are searched independently and never match themselves.
    pub fn match_all<'a, I>(&self, roots: I) -> NodeSet
    where
        I: IntoIterator<Item = &'a Node>,
    {
        let mut found = vec![];
        for root in roots {
            for node in root.descendants() {
                if self.match_element(&node) {
                    found.push(node);
                }
            }
        }

        NodeSet::from(found).sorted()
    }

    /// The nodes among `nodes` that match, in their order.
    pub fn filter<'a, I>(&self, nodes: I) -> NodeSet
    where
        I: IntoIterator<Item = &'a Node>,
    {
        nodes
            .into_iter()
            .filter(|node| self.match_element(node))
            .cloned()
            .collect()
    }
}

pub(crate) struct InnerSelectorParser;

impl<'i> parser::Parser<'i> for InnerSelectorParser {
    type Impl = InnerSelector;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> std::result::Result<NonTSPseudoClass, ParseError<'i, Self::Error>> {
        use self::NonTSPseudoClass::*;

        let pseudo_class = match &*name.to_ascii_lowercase() {
            "any-link" => AnyLink,
            "link" => Link,
            "checked" => Checked,
            "disabled" => Disabled,
            "enabled" => Enabled,
            _ => {
                return Err(location.new_custom_error(
                    SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name),
                ))
            }
        };

        Ok(pseudo_class)
    }
}

#[derive(Debug, Clone)]
pub struct InnerSelector;

impl parser::SelectorImpl for InnerSelector {
    type ExtraMatchingData = String;
    type AttrValue = String;
    type Identifier = LocalName;
    type ClassName = LocalName;
    type PartName = LocalName;
    type LocalName = LocalName;
    type NamespaceUrl = Namespace;
    type NamespacePrefix = LocalName;
    type BorrowedLocalName = LocalName;
    type BorrowedNamespaceUrl = Namespace;

    type NonTSPseudoClass = NonTSPseudoClass;
    type PseudoElement = PseudoElement;
}

/// The non tree-structural pseudo-classes understood in selectors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NonTSPseudoClass {
    AnyLink,
    Link,
    Checked,
    Disabled,
    Enabled,
}

impl parser::NonTSPseudoClass for NonTSPseudoClass {
    type Impl = InnerSelector;

    fn is_active_or_hover(&self) -> bool {
        false
    }

    fn is_user_action_state(&self) -> bool {
        false
    }

    fn has_zero_specificity(&self) -> bool {
        false
    }
}

impl ToCss for NonTSPseudoClass {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str(match *self {
            NonTSPseudoClass::AnyLink => ":any-link",
            NonTSPseudoClass::Link => ":link",
            NonTSPseudoClass::Checked => ":checked",
            NonTSPseudoClass::Disabled => ":disabled",
            NonTSPseudoClass::Enabled => ":enabled",
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PseudoElement;

impl parser::PseudoElement for PseudoElement {
    type Impl = InnerSelector;
}

impl ToCss for PseudoElement {
    fn to_css<W>(&self, dest: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        dest.write_str("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_selectors() {
        assert!(Matcher::new("").is_err());
        assert!(Matcher::new(":+ ^").is_err());
        assert!(Matcher::new("div:hover").is_err());
        assert!(Matcher::new("div > p:nth-child(2), a[href^='/']").is_ok());
    }
}
