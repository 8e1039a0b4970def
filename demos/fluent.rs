use qpath::{qp, qp_select, HTML_STUB};

fn main() -> qpath::Result<()> {
    let mut page = qp_select(HTML_STUB, "title")?;
    page.set_text("Shopping list");

    page.top(Some("body"))?
        .append("<h1>Shopping list</h1><ul id=\"items\"></ul>")?
        .find("#items")?
        .append("<li>milk</li><li>bread</li><li>tea</li>")?
        .children(None)?
        .add_class("item")
        .eq(1)
        .set_css("font-weight", "bold");

    println!("{}", page.to_xhtml()?);

    let mut catalog = qp(())?;
    catalog.append("<catalog/>")?;
    for (id, title) in [("b1", "Dune"), ("b2", "Solaris")].iter() {
        catalog.append(format!("<book id=\"{}\"/>", id).as_str())?;
        catalog.find("book:last-child")?.set_text(title).end();
    }
    println!("{}", catalog.xml().unwrap_or_default());

    Ok(())
}
