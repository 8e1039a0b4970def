use crate::document::{ContentType, Document};
use crate::error::Result;
use crate::node::{qualified_name, Node, SerializableNodeRef};
use crate::options::Options;
use crate::selection::Selection;
use markup5ever::serialize::{AttrRef, Serialize, Serializer, TraversalScope};
use markup5ever::{namespace_url, ns};
use markup5ever::{Namespace, Prefix, QualName};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// HTML elements written as `<br />` by the XHTML serializer.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Xml,
    Html,
    Xhtml,
}

fn render(node: &Node, mode: Mode, scope: TraversalScope, options: &Options) -> io::Result<String> {
    let document = node.document();
    let tree = document.tree();
    let mut source = SerializableNodeRef::new(&tree, node.id());
    if document.content_type() == ContentType::Html && mode != Mode::Html {
        source = source.without_html_namespace();
    }

    let mut buf = Vec::new();
    match mode {
        Mode::Xml => xml5ever::serialize::serialize(
            &mut buf,
            &source,
            xml5ever::serialize::SerializeOpts {
                traversal_scope: scope,
            },
        )?,
        Mode::Html => html5ever::serialize::serialize(
            &mut buf,
            &source,
            html5ever::serialize::SerializeOpts {
                scripting_enabled: options.parser_flags.scripting_enabled,
                traversal_scope: scope,
                create_missing_parent: true,
            },
        )?,
        Mode::Xhtml => source.serialize(&mut XhtmlSerializer::new(&mut buf), scope)?,
    }

    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn xml_declaration(document: &Document, options: &Options) -> String {
    let encoding = document.encoding().unwrap_or(&options.encoding);
    format!("<?xml version=\"1.0\" encoding=\"{}\"?>", encoding)
}

// The whole document: XML declaration or doctype first, then every child
// of the document node.
fn render_document(
    document: &Document,
    mode: Mode,
    options: &Options,
    declaration: bool,
) -> io::Result<String> {
    let root = document.root();
    let mut out = String::new();

    match mode {
        Mode::Xml | Mode::Xhtml => {
            if declaration {
                out.push_str(&xml_declaration(document, options));
                out.push('\n');
            }
        }
        Mode::Html => {
            if !root.children().iter().any(Node::is_doctype) {
                out.push_str(&options.default_doctype);
                out.push('\n');
            }
        }
    }

    out.push_str(&render(&root, mode, TraversalScope::ChildrenOnly(None), options)?);
    Ok(out)
}

impl Selection {
    // Markup of the first node. The document node and the document element
    // stand for the whole document.
    fn outer(&self, mode: Mode, declaration: bool) -> Option<String> {
        let first = self.nodes.first()?;
        let document = first.document();
        let root_element = document.document_element();

        if first.is_document() || root_element.as_ref() == Some(first) {
            if root_element.is_none() {
                return None;
            }
            return render_document(document, mode, &self.options, declaration).ok();
        }

        render(first, mode, TraversalScope::IncludeNode, &self.options).ok()
    }

    fn inner(&self, mode: Mode) -> Option<String> {
        let first = self.nodes.first()?;
        let scope = TraversalScope::ChildrenOnly(first.qual_name());
        render(first, mode, scope, &self.options).ok()
    }

    /// html gets the HTML markup of the first node, or of the whole
    /// document, doctype included, when the first node is the document
    /// element.
    pub fn html(&self) -> Option<String> {
        self.outer(Mode::Html, true)
    }

    /// xml gets the XML markup of the first node, or of the whole document,
    /// XML declaration included, when the first node is the document
    /// element.
    pub fn xml(&self) -> Option<String> {
        self.outer(Mode::Xml, true)
    }

    /// xml_with is `xml`, leaving out the XML declaration when asked to.
    pub fn xml_with(&self, omit_declaration: bool) -> Option<String> {
        self.outer(Mode::Xml, !omit_declaration)
    }

    /// xhtml gets XML markup where empty HTML void elements are written
    /// `<br />` and other empty elements get an end tag.
    pub fn xhtml(&self) -> Option<String> {
        self.outer(Mode::Xhtml, true)
    }

    pub fn inner_html(&self) -> Option<String> {
        self.inner(Mode::Html)
    }

    pub fn inner_xml(&self) -> Option<String> {
        self.inner(Mode::Xml)
    }

    pub fn inner_xhtml(&self) -> Option<String> {
        self.inner(Mode::Xhtml)
    }

    // Each document owning a current node, once, in order of appearance;
    // the selection's own document when the set is empty.
    fn documents(&self) -> Vec<Document> {
        let mut documents: Vec<Document> = vec![];
        for node in &self.nodes {
            if !documents.iter().any(|doc| doc.same(node.document())) {
                documents.push(node.document().clone());
            }
        }

        if documents.is_empty() {
            documents.push(self.document.clone());
        }
        documents
    }

    fn render_documents(&self, mode: Mode) -> Result<String> {
        let mut out = String::new();
        for document in self.documents() {
            out.push_str(&render_document(&document, mode, &self.options, true)?);
        }
        Ok(out)
    }

    /// to_xml renders the documents of the current set as XML.
    pub fn to_xml(&self) -> Result<String> {
        self.render_documents(Mode::Xml)
    }

    /// to_html renders the documents of the current set as HTML.
    pub fn to_html(&self) -> Result<String> {
        self.render_documents(Mode::Html)
    }

    /// to_xhtml renders the documents of the current set as XHTML.
    pub fn to_xhtml(&self) -> Result<String> {
        self.render_documents(Mode::Xhtml)
    }

    /// write_xml writes `to_xml` to the file, or to stdout without one.
    pub fn write_xml(&self, path: Option<&Path>) -> Result<()> {
        write_out(&self.to_xml()?, path)
    }

    /// write_html writes `to_html` to the file, or to stdout without one.
    pub fn write_html(&self, path: Option<&Path>) -> Result<()> {
        write_out(&self.to_html()?, path)
    }

    /// write_xhtml writes `to_xhtml` to the file, or to stdout without one.
    pub fn write_xhtml(&self, path: Option<&Path>) -> Result<()> {
        write_out(&self.to_xhtml()?, path)
    }
}

fn write_out(markup: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, markup)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(markup.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}

/// XML serializer following the XHTML compatibility rules: void elements
/// self-close with a space before the slash, other elements always get an
/// end tag.
struct XhtmlSerializer<W: Write> {
    writer: W,
    // A start tag was written without its closing `>`.
    pending: bool,
    scopes: Vec<Vec<(Option<Prefix>, Namespace)>>,
}

impl<W: Write> XhtmlSerializer<W> {
    fn new(writer: W) -> Self {
        XhtmlSerializer {
            writer,
            pending: false,
            scopes: vec![],
        }
    }

    fn declared(&self, prefix: &Option<Prefix>, namespace: &Namespace) -> bool {
        for scope in self.scopes.iter().rev() {
            if let Some((_, declared)) = scope.iter().find(|(p, _)| p == prefix) {
                return declared == namespace;
            }
        }

        prefix.is_none() && *namespace == ns!()
    }

    fn close_pending(&mut self) -> io::Result<()> {
        if self.pending {
            self.pending = false;
            self.writer.write_all(b">")?;
        }
        Ok(())
    }

    fn write_escaped(&mut self, text: &str, attr_mode: bool) -> io::Result<()> {
        for c in text.chars() {
            match c {
                '&' => self.writer.write_all(b"&amp;"),
                '"' if attr_mode => self.writer.write_all(b"&quot;"),
                '<' => self.writer.write_all(b"&lt;"),
                '>' if !attr_mode => self.writer.write_all(b"&gt;"),
                c => write!(self.writer, "{}", c),
            }?;
        }
        Ok(())
    }
}

impl<W: Write> Serializer for XhtmlSerializer<W> {
    fn start_elem<'a, AttrIter>(&mut self, name: QualName, attrs: AttrIter) -> io::Result<()>
    where
        AttrIter: Iterator<Item = AttrRef<'a>>,
    {
        self.close_pending()?;

        let attrs: Vec<AttrRef<'a>> = attrs.collect();
        let mut declarations = vec![];
        if !self.declared(&name.prefix, &name.ns) {
            declarations.push((name.prefix.clone(), name.ns.clone()));
        }
        for (attr, _) in &attrs {
            let needs_declaration = attr.prefix.is_some()
                && attr.ns != ns!(xml)
                && !self.declared(&attr.prefix, &attr.ns)
                && !declarations.iter().any(|(p, _)| *p == attr.prefix);
            if needs_declaration {
                declarations.push((attr.prefix.clone(), attr.ns.clone()));
            }
        }

        write!(self.writer, "<{}", qualified_name(&name))?;
        for (prefix, namespace) in &declarations {
            match prefix {
                Some(prefix) => write!(self.writer, " xmlns:{}=\"{}\"", prefix, namespace)?,
                None => write!(self.writer, " xmlns=\"{}\"", namespace)?,
            }
        }
        for (attr, value) in attrs {
            write!(self.writer, " {}=\"", qualified_name(attr))?;
            self.write_escaped(value, true)?;
            self.writer.write_all(b"\"")?;
        }

        self.scopes.push(declarations);
        self.pending = true;
        Ok(())
    }

    fn end_elem(&mut self, name: QualName) -> io::Result<()> {
        self.scopes.pop();

        if self.pending {
            self.pending = false;
            if VOID_ELEMENTS.contains(&&*name.local) {
                return self.writer.write_all(b" />");
            }
            self.writer.write_all(b">")?;
        }

        write!(self.writer, "</{}>", qualified_name(&name))
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.close_pending()?;
        self.write_escaped(text, false)
    }

    fn write_comment(&mut self, text: &str) -> io::Result<()> {
        self.close_pending()?;
        write!(self.writer, "<!--{}-->", text)
    }

    fn write_doctype(&mut self, name: &str) -> io::Result<()> {
        self.close_pending()?;
        write!(self.writer, "<!DOCTYPE {}>", name)
    }

    fn write_processing_instruction(&mut self, target: &str, data: &str) -> io::Result<()> {
        self.close_pending()?;
        write!(self.writer, "<?{} {}?>", target, data)
    }
}
