use qpath::{qp, Node};
use std::env;
use std::path::Path;

// Usage: rewrite <input.html> [output.html]
fn main() -> qpath::Result<()> {
    let args: Vec<String> = env::args().collect();
    let input = match args.get(1) {
        Some(input) => Path::new(input),
        None => {
            eprintln!("usage: {} <input.html> [output.html]", args[0]);
            return Ok(());
        }
    };

    let mut page = qp(input)?;

    page.find("a[href^='http']")?
        .set_attr("rel", "noopener")
        .add_class("external")
        .each(|i: usize, link: &Node| {
            println!("{}: {}", i, link.attr("href").unwrap_or_default());
        })?;

    page.top(Some("script, style"))?.remove(None)?;

    let output = args.get(2).map(Path::new);
    page.write_html(output)
}
