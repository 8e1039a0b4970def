use crate::document::ContentType;
use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};

/// The doctype prepended to HTML output of documents that carry none.
pub const DEFAULT_DOCTYPE: &str = "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">";

/// Flags handed to the underlying html5ever / xml5ever parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserFlags {
    /// Report every parse error with full detail.
    pub exact_errors: bool,
    /// Parse `<noscript>` as if scripting were enabled (HTML only).
    pub scripting_enabled: bool,
    /// Drop a leading byte order mark.
    pub discard_bom: bool,
}

impl Default for ParserFlags {
    fn default() -> Self {
        ParserFlags {
            exact_errors: false,
            scripting_enabled: true,
            discard_bom: true,
        }
    }
}

/// The resolved configuration captured by a `Selection` when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub parser_flags: ParserFlags,
    /// Rewrite HTML named entities to numeric references, and stray `&` to
    /// `&amp;`, before parsing.
    pub replace_entities: bool,
    /// Accept XML that the parser reported errors for.
    pub ignore_parser_warnings: bool,
    /// Encoding named in the XML declaration when the document declares none.
    pub encoding: String,
    /// Doctype used by HTML output when the document has none.
    pub default_doctype: String,
    /// Force the content type instead of guessing it from the source.
    pub content_type: Option<ContentType>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            parser_flags: ParserFlags::default(),
            replace_entities: false,
            ignore_parser_warnings: false,
            encoding: "UTF-8".to_string(),
            default_doctype: DEFAULT_DOCTYPE.to_string(),
            content_type: None,
        }
    }
}

/// A partial `Options`: only the fields that are set override.
///
/// ```
/// use qpath::Overrides;
///
/// let overrides = Overrides::new().encoding("ISO-8859-1").replace_entities(true);
/// let options = qpath::options::resolve(&overrides);
/// assert_eq!(options.encoding, "ISO-8859-1");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub parser_flags: Option<ParserFlags>,
    pub replace_entities: Option<bool>,
    pub ignore_parser_warnings: Option<bool>,
    pub encoding: Option<String>,
    pub default_doctype: Option<String>,
    pub content_type: Option<ContentType>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parser_flags(mut self, flags: ParserFlags) -> Self {
        self.parser_flags = Some(flags);
        self
    }

    pub fn replace_entities(mut self, value: bool) -> Self {
        self.replace_entities = Some(value);
        self
    }

    pub fn ignore_parser_warnings(mut self, value: bool) -> Self {
        self.ignore_parser_warnings = Some(value);
        self
    }

    pub fn encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }

    pub fn default_doctype(mut self, doctype: &str) -> Self {
        self.default_doctype = Some(doctype.to_string());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Fields set in `other` win.
    pub fn merge(&mut self, other: Overrides) {
        if other.parser_flags.is_some() {
            self.parser_flags = other.parser_flags;
        }
        if other.replace_entities.is_some() {
            self.replace_entities = other.replace_entities;
        }
        if other.ignore_parser_warnings.is_some() {
            self.ignore_parser_warnings = other.ignore_parser_warnings;
        }
        if other.encoding.is_some() {
            self.encoding = other.encoding;
        }
        if other.default_doctype.is_some() {
            self.default_doctype = other.default_doctype;
        }
        if other.content_type.is_some() {
            self.content_type = other.content_type;
        }
    }

    /// Writes the set fields into `options`.
    pub fn apply(&self, options: &mut Options) {
        if let Some(flags) = self.parser_flags {
            options.parser_flags = flags;
        }
        if let Some(value) = self.replace_entities {
            options.replace_entities = value;
        }
        if let Some(value) = self.ignore_parser_warnings {
            options.ignore_parser_warnings = value;
        }
        if let Some(ref encoding) = self.encoding {
            options.encoding = encoding.clone();
        }
        if let Some(ref doctype) = self.default_doctype {
            options.default_doctype = doctype.clone();
        }
        if let Some(content_type) = self.content_type {
            options.content_type = Some(content_type);
        }
    }
}

lazy_static! {
    static ref DEFAULTS: RwLock<Overrides> = RwLock::new(Overrides::default());
}

/// The process-wide defaults.
pub fn get() -> Overrides {
    DEFAULTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide defaults. `set(Overrides::default())` resets
/// them to the built-in values.
pub fn set(overrides: Overrides) {
    *DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = overrides;
}

/// Merges into the process-wide defaults, fields of `overrides` winning.
pub fn merge(overrides: Overrides) {
    DEFAULTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .merge(overrides);
}

/// Built-in values, then the process-wide defaults, then `overrides`.
pub fn resolve(overrides: &Overrides) -> Options {
    let mut options = Options::default();
    get().apply(&mut options);
    overrides.apply(&mut options);
    options
}
