use markup5ever::data::NAMED_ENTITIES;

// Entities every XML parser understands on its own.
const XML_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];

/// Rewrites HTML named entities into numeric character references and
/// escapes every `&` that does not start a reference, so that the markup
/// survives a strict XML parser.
pub(crate) fn replace_entities(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start + 1..];

        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))
            .unwrap_or_else(|| rest.len());

        if !rest[end..].starts_with(';') || end == 0 {
            out.push_str("&amp;");
            continue;
        }

        let name = &rest[..end];
        if is_char_ref(name) || XML_ENTITIES.contains(&name) {
            out.push('&');
            out.push_str(name);
            out.push(';');
        } else {
            let key = format!("{};", name);
            match NAMED_ENTITIES.get(key.as_str()) {
                Some(&(first, second)) => {
                    out.push_str(&format!("&#{};", first));
                    if second != 0 {
                        out.push_str(&format!("&#{};", second));
                    }
                }
                None => {
                    out.push_str("&amp;");
                    out.push_str(name);
                    out.push(';');
                }
            }
        }

        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

fn is_char_ref(name: &str) -> bool {
    let digits = match name.strip_prefix('#') {
        Some(digits) => digits,
        None => return false,
    };

    match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::replace_entities;

    #[test]
    fn test_lone_ampersand() {
        assert_eq!(replace_entities("<foo>&</foo>"), "<foo>&amp;</foo>");
        assert_eq!(replace_entities("a & b"), "a &amp; b");
        assert_eq!(replace_entities("AT&T;"), "AT&amp;T;");
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(replace_entities("&nbsp;"), "&#160;");
        assert_eq!(replace_entities("&copy; 2009"), "&#169; 2009");
    }

    #[test]
    fn test_known_references_are_kept() {
        let markup = "&amp; &lt; &#169; &#xA9; &apos;";
        assert_eq!(replace_entities(markup), markup);
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(replace_entities("&bogus;"), "&amp;bogus;");
    }
}
