//! Converts article bodies from markdown to HTML.

use pulldown_cmark::{html, Options, Parser};

/// A section sign followed by a regular space. Browsers happily wrap the line
/// between the two, which separates the sign from its number.
const SECTION_SPACE: &str = "§ ";

/// The replacement for [`SECTION_SPACE`].
const SECTION_NBSP: &str = "§&nbsp;";

/// Converts `markdown` to HTML with table support enabled and then keeps
/// section signs attached to whatever follows them.
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    fix_section_signs(&out)
}

fn fix_section_signs(html: &str) -> String {
    html.replace(SECTION_SPACE, SECTION_NBSP)
}
