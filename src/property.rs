use crate::selection::Selection;

/// The pseudo attribute `attr` answers with the DOM node type number.
const NODE_TYPE: &str = "nodeType";

// Splits a `style` attribute into ordered `(name, value)` declarations.
fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let mut parts = declaration.splitn(2, ':');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn format_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Selection {
    /// attr gets the attribute of the first node. `nodeType` gets the DOM
    /// node type number of the first node instead.
    pub fn attr(&self, name: &str) -> Option<String> {
        let first = self.nodes.first()?;
        if name == NODE_TYPE {
            return Some(first.node_type().to_string());
        }
        first.attr(name).map(|value| value.to_string())
    }

    /// set_attr sets the attribute on every element.
    pub fn set_attr(&mut self, name: &str, value: &str) -> &mut Self {
        for node in &self.nodes {
            node.set_attr(name, value);
        }
        self
    }

    /// set_attrs sets every pair as an attribute on every element.
    pub fn set_attrs<I, K, V>(&mut self, attrs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let attrs: Vec<(K, V)> = attrs.into_iter().collect();
        for node in &self.nodes {
            for (name, value) in &attrs {
                node.set_attr(name.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// has_attr checks that the set is not empty and that every node
    /// carries the attribute.
    pub fn has_attr(&self, name: &str) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|node| node.has_attr(name))
    }

    /// remove_attr removes the attribute from every element.
    pub fn remove_attr(&mut self, name: &str) -> &mut Self {
        for node in &self.nodes {
            node.remove_attr(name);
        }
        self
    }

    /// val gets the `value` attribute of the first node.
    pub fn val(&self) -> Option<String> {
        self.attr("value")
    }

    /// set_val sets the `value` attribute of every element.
    pub fn set_val(&mut self, value: &str) -> &mut Self {
        self.set_attr("value", value)
    }

    /// css gets the `style` attribute of the first node.
    pub fn css(&self) -> Option<String> {
        self.attr("style")
    }

    /// set_css sets one declaration in the `style` attribute of every
    /// element, keeping the others.
    pub fn set_css(&mut self, name: &str, value: &str) -> &mut Self {
        self.set_css_map(vec![(name, value)])
    }

    /// set_css_map sets several declarations in the `style` attribute of
    /// every element. Existing declarations keep their place.
    pub fn set_css_map<I, K, V>(&mut self, declarations: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let declarations: Vec<(K, V)> = declarations.into_iter().collect();

        for node in &self.nodes {
            if !node.is_element() {
                continue;
            }

            let mut style = node.attr("style").map_or(vec![], |style| parse_style(&style));
            for (name, value) in &declarations {
                let (name, value) = (name.as_ref(), value.as_ref());
                match style.iter_mut().find(|(existing, _)| existing == name) {
                    Some(declaration) => declaration.1 = value.to_string(),
                    None => style.push((name.to_string(), value.to_string())),
                }
            }
            node.set_attr("style", &format_style(&style));
        }
        self
    }

    /// add_class adds the class to every element not having it yet.
    pub fn add_class(&mut self, class: &str) -> &mut Self {
        for node in &self.nodes {
            if !node.is_element() {
                continue;
            }

            let current = node.attr("class").unwrap_or_default();
            if current.split_whitespace().any(|c| c == class) {
                continue;
            }

            let classes = if current.trim().is_empty() {
                class.to_string()
            } else {
                format!("{} {}", current.trim(), class)
            };
            node.set_attr("class", &classes);
        }
        self
    }

    /// remove_class removes the class from every element. An emptied
    /// `class` attribute is removed.
    pub fn remove_class(&mut self, class: &str) -> &mut Self {
        for node in &self.nodes {
            let current = match node.attr("class") {
                Some(current) => current,
                None => continue,
            };

            let remaining: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
            if remaining.is_empty() {
                node.remove_attr("class");
            } else {
                node.set_attr("class", &remaining.join(" "));
            }
        }
        self
    }

    /// has_class checks whether the first node has the class.
    pub fn has_class(&self, class: &str) -> bool {
        self.nodes
            .first()
            .and_then(|node| node.attr("class"))
            .map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
    }

    /// tag gets the tag name of the first node, empty when there is none.
    pub fn tag(&self) -> String {
        self.nodes
            .first()
            .and_then(|node| node.tag_name())
            .unwrap_or_default()
    }

    /// text gets the text of every node and its descendants, taking the
    /// nodes in document order.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes.clone().sorted() {
            text.push_str(&node.text());
        }
        text
    }

    /// set_text replaces the children of every node by a text node.
    pub fn set_text(&mut self, value: &str) -> &mut Self {
        for node in &self.nodes {
            node.set_text(value);
        }
        self
    }

    /// text_implode joins the direct text of every node with `separator`.
    /// With `drop_empty`, nodes whose text is only whitespace are left out.
    pub fn text_implode(&self, separator: &str, drop_empty: bool) -> String {
        self.nodes
            .iter()
            .map(|node| node.direct_text().to_string())
            .filter(|text| !drop_empty || !text.trim().is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_round_trip() {
        let style = parse_style("color: red;; margin:0 ; :bad; font: 12px/1.5 serif");
        assert_eq!(
            style,
            vec![
                ("color".to_string(), "red".to_string()),
                ("margin".to_string(), "0".to_string()),
                ("font".to_string(), "12px/1.5 serif".to_string()),
            ]
        );
        assert_eq!(format_style(&style), "color: red; margin: 0; font: 12px/1.5 serif");
    }
}
