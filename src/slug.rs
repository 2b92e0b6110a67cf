//! Turns titles into the file-name slugs used for output pages and tag pages.

/// Letters replaced by an ASCII digraph. Everything else outside ASCII is
/// passed through unchanged (e.g. `ß` stays `ß`).
const DIGRAPHS: &[(char, &str)] = &[('ä', "ae"), ('ö', "oe"), ('ü', "ue")];

/// Converts `text` into a slug: lowercased, spaces replaced with hyphens, and
/// umlauts replaced with their digraphs. Lowercasing happens first so that
/// `Ä` becomes `ae` as well.
pub fn sanitize(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match DIGRAPHS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => slug.push_str(to),
            None if c == ' ' => slug.push('-'),
            None => slug.push(c),
        }
    }
    slug
}
