//! Defines the [`Tag`] type, which represents an [`crate::article::Article`]
//! tag, and builds the site-wide tag index.

use crate::article::Article;
use crate::slug::sanitize;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Represents a post tag. Two tags are the same tag if their titles are equal
/// (case-sensitive); the URL is always derived from the title.
#[derive(Clone, Debug)]
pub struct Tag {
    /// The tag as written in the front matter, trimmed.
    pub title: String,

    /// The slug of `title`. The tag page is written to `{url}.html`.
    pub url: String,
}

impl Tag {
    /// Creates a tag from its title, deriving the URL slug.
    pub fn new(title: &str) -> Tag {
        Tag {
            title: title.to_owned(),
            url: sanitize(title),
        }
    }
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `title`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `title` field.
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}
impl Eq for Tag {}

/// Collects the distinct tags of `posts`. Posts are visited in the order given
/// (callers pass them sorted by date) and each post's tags in the order they
/// were listed, so every tag shows up at the position of its first use.
pub fn build_tag_index(posts: &[Article]) -> Vec<Tag> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut index = Vec::new();
    for tag in posts.iter().flat_map(|post| post.tags.iter()) {
        if seen.insert(&tag.title) {
            index.push(tag.clone());
        }
    }
    index
}

/// Returns the posts carrying `tag`, keeping the order of `posts`.
pub fn posts_tagged<'a>(posts: &'a [Article], tag: &Tag) -> Vec<&'a Article> {
    posts.iter().filter(|post| post.tags.contains(tag)).collect()
}
