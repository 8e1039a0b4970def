use crate::document::ContentType;
use crate::matcher::{InnerSelector, NonTSPseudoClass};
use crate::node::{Element, Node, NodeData};
use markup5ever::{local_name, namespace_url, ns};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::MatchingContext;
use selectors::matching::ElementSelectorFlags;
use selectors::parser::SelectorImpl;
use selectors::OpaqueElement;

impl Node {
    // `false` for anything that is not an element.
    fn element_is<F>(&self, f: F) -> bool
    where
        F: FnOnce(&Element) -> bool,
    {
        self.query(|node| match node.data {
            NodeData::Element(ref e) => f(e),
            _ => false,
        })
    }
}

impl selectors::Element for Node {
    type Impl = InnerSelector;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&self.id)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent().filter(|parent| parent.is_element())
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.prev_element_sibling()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.next_element_sibling()
    }

    // Type selectors are case-insensitive only for HTML elements of HTML
    // documents; XML names keep their case.
    fn is_html_element_in_html_document(&self) -> bool {
        self.document.content_type() == ContentType::Html
            && self.element_is(|e| e.name.ns == ns!(html))
    }

    fn has_local_name(&self, name: &<InnerSelector as SelectorImpl>::BorrowedLocalName) -> bool {
        self.element_is(|e| e.name.local == *name)
    }

    // Empty string for no namespace.
    fn has_namespace(&self, url: &<InnerSelector as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        self.element_is(|e| e.name.ns == *url)
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (self.qual_name(), other.qual_name()) {
            (Some(a), Some(b)) => a.local == b.local && a.ns == b.ns,
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&<InnerSelector as SelectorImpl>::NamespaceUrl>,
        name: &<InnerSelector as SelectorImpl>::LocalName,
        operation: &AttrSelectorOperation<&<InnerSelector as SelectorImpl>::AttrValue>,
    ) -> bool {
        self.element_is(|e| {
            e.attrs.iter().any(|attr| {
                let in_namespace = match *ns {
                    NamespaceConstraint::Any => true,
                    NamespaceConstraint::Specific(url) => *url == attr.name.ns,
                };
                in_namespace && attr.name.local == *name && operation.eval_str(&attr.value)
            })
        })
    }

    fn match_non_ts_pseudo_class<F>(
        &self,
        pc: &<InnerSelector as SelectorImpl>::NonTSPseudoClass,
        _: &mut MatchingContext<InnerSelector>,
        _: &mut F,
    ) -> bool
    where
        F: FnMut(&Self, ElementSelectorFlags),
    {
        match *pc {
            NonTSPseudoClass::AnyLink | NonTSPseudoClass::Link => self.is_link(),
            NonTSPseudoClass::Checked => self.has_attr("checked") || self.has_attr("selected"),
            NonTSPseudoClass::Disabled => self.has_attr("disabled"),
            NonTSPseudoClass::Enabled => is_form_control(self) && !self.has_attr("disabled"),
        }
    }

    fn match_pseudo_element(
        &self,
        _: &<InnerSelector as SelectorImpl>::PseudoElement,
        _: &mut MatchingContext<InnerSelector>,
    ) -> bool {
        false
    }

    // `a`, `area` and `link` carrying an href.
    fn is_link(&self) -> bool {
        self.element_is(|e| {
            matches!(
                e.name.local,
                local_name!("a") | local_name!("area") | local_name!("link")
            ) && e.attr("href").is_some()
        })
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(
        &self,
        id: &<InnerSelector as SelectorImpl>::Identifier,
        case: CaseSensitivity,
    ) -> bool {
        self.element_is(|e| {
            e.attr("id")
                .map_or(false, |value| case.eq(id.as_bytes(), value.as_bytes()))
        })
    }

    fn has_class(
        &self,
        class: &<InnerSelector as SelectorImpl>::ClassName,
        case: CaseSensitivity,
    ) -> bool {
        self.element_is(|e| {
            e.attr("class").map_or(false, |value| {
                value
                    .split_whitespace()
                    .any(|one| case.eq(class.as_bytes(), one.as_bytes()))
            })
        })
    }

    fn exported_part(
        &self,
        _: &<InnerSelector as SelectorImpl>::PartName,
    ) -> Option<<InnerSelector as SelectorImpl>::PartName> {
        None
    }

    fn imported_part(
        &self,
        _: &<InnerSelector as SelectorImpl>::PartName,
    ) -> Option<<InnerSelector as SelectorImpl>::PartName> {
        None
    }

    fn is_part(&self, _: &<InnerSelector as SelectorImpl>::PartName) -> bool {
        false
    }

    // Comments and empty text do not count.
    fn is_empty(&self) -> bool {
        !self
            .children()
            .iter()
            .any(|child| child.is_element() || (child.is_text() && !child.text().is_empty()))
    }

    fn is_root(&self) -> bool {
        self.parent().map_or(false, |parent| parent.is_document())
    }
}

fn is_form_control(node: &Node) -> bool {
    match node.tag_name() {
        Some(name) => matches!(
            name.to_ascii_lowercase().as_str(),
            "button" | "input" | "select" | "textarea" | "option" | "optgroup" | "fieldset"
        ),
        None => false,
    }
}
