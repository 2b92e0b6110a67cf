//! Responsible for templating and writing the HTML pages of the site: the
//! index page, one page per tag, one page per page, and one page per post.
//!
//! Every page is rendered from the same [`BaseContext`] with a small
//! per-page overlay (its title and the article or tag it is about) merged
//! into a fresh copy, so no render can see values left over from another.

use crate::article::Article;
use crate::config::SiteConfig;
use crate::menu::MenuEntry;
use crate::tag::{posts_tagged, Tag};
use crate::value::array;
use gtmpl::{Context, Template};
use gtmpl_value::Value;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The file name (without extension) of the index page.
const INDEX: &str = "index";

/// The four templates a site is rendered with.
pub struct Templates {
    /// Renders the index page.
    pub main: Template,

    /// Renders one page per tag.
    pub tags: Template,

    /// Renders pages whose `type` is `archive`.
    pub archive: Template,

    /// Renders all other pages and every post.
    pub page: Template,
}

/// The template values shared by every page of the site.
pub struct BaseContext {
    values: HashMap<String, Value>,
    site_title: String,
}

impl BaseContext {
    /// Builds the shared values: `site`, `title`, `articles`, `pages`, `tags`,
    /// `first_menu` and `second_menu`.
    pub fn new(
        site: &SiteConfig,
        posts: &[Article],
        pages: &[Article],
        tags: &[Tag],
        first_menu: &[MenuEntry],
        second_menu: &[MenuEntry],
    ) -> BaseContext {
        let mut values = HashMap::new();
        values.insert("site".to_owned(), Value::from(site));
        values.insert("title".to_owned(), Value::String(site.title.clone()));
        values.insert("articles".to_owned(), array(posts));
        values.insert("pages".to_owned(), array(pages));
        values.insert("tags".to_owned(), array(tags));
        values.insert("first_menu".to_owned(), array(first_menu));
        values.insert("second_menu".to_owned(), array(second_menu));
        values.insert("page".to_owned(), Value::Nil);
        values.insert("tag".to_owned(), Value::Nil);
        BaseContext {
            values,
            site_title: site.title.clone(),
        }
    }

    /// Returns a copy of the base values with `overlay` applied on top.
    pub fn with(&self, overlay: Vec<(&str, Value)>) -> Value {
        let mut values = self.values.clone();
        for (key, value) in overlay {
            values.insert(key.to_owned(), value);
        }
        Value::Object(values)
    }

    /// The `title` for a page other than the index.
    fn title(&self, page_title: &str) -> Value {
        Value::String(format!("{} - {}", self.site_title, page_title))
    }
}

/// A single output page.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    Index,
    Tag(&'a Tag),
    Page(&'a Article),
    Post(&'a Article),
}

impl Target<'_> {
    /// The output file name without the `.html` extension.
    pub fn url(&self) -> &str {
        match self {
            Target::Index => INDEX,
            Target::Tag(tag) => &tag.url,
            Target::Page(article) | Target::Post(article) => &article.url,
        }
    }

    /// A human-readable description of where the page comes from.
    pub fn describe(&self) -> String {
        match self {
            Target::Index => "the index page".to_owned(),
            Target::Tag(tag) => format!("tag {:?}", tag.title),
            Target::Page(article) => {
                format!("page `{}`", article.source.display())
            }
            Target::Post(article) => {
                format!("post `{}`", article.source.display())
            }
        }
    }
}

/// Lists the pages of the site in the order they are written: the index,
/// then tag pages, then pages, then posts.
pub fn targets<'a>(
    posts: &'a [Article],
    pages: &'a [Article],
    tags: &'a [Tag],
) -> Vec<Target<'a>> {
    std::iter::once(Target::Index)
        .chain(tags.iter().map(Target::Tag))
        .chain(pages.iter().map(Target::Page))
        .chain(posts.iter().map(Target::Post))
        .collect()
}

/// Characters and sequences that would let a slug name a file outside the
/// output directory.
const FORBIDDEN_IN_URL: &[&str] = &["/", "\\", ".."];

/// Fails if a target's file name is empty or could escape the output
/// directory.
pub fn check_safe_urls(targets: &[Target]) -> Result<()> {
    for target in targets {
        let url = target.url();
        if url.is_empty() || FORBIDDEN_IN_URL.iter().any(|bad| url.contains(*bad)) {
            return Err(Error::InvalidUrl {
                url: url.to_owned(),
                target: target.describe(),
            });
        }
    }
    Ok(())
}

/// Fails if two targets would be written to the same file.
pub fn check_unique_urls(targets: &[Target]) -> Result<()> {
    let mut seen: HashMap<&str, &Target> = HashMap::with_capacity(targets.len());
    for target in targets {
        if let Some(first) = seen.insert(target.url(), target) {
            return Err(Error::DuplicateUrl {
                url: target.url().to_owned(),
                first: first.describe(),
                second: target.describe(),
            });
        }
    }
    Ok(())
}

/// Renders the site's pages into `output_directory`.
pub struct Writer<'a> {
    pub templates: &'a Templates,
    pub site: &'a SiteConfig,

    /// All posts, newest first.
    pub posts: &'a [Article],

    /// All pages, in menu order.
    pub pages: &'a [Article],

    /// The tag index.
    pub tags: &'a [Tag],
    pub first_menu: &'a [MenuEntry],
    pub second_menu: &'a [MenuEntry],
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Checks that every page has its own, safe file name, then renders and
    /// writes all pages. Nothing is written if a check fails.
    pub fn write_site(&self) -> Result<()> {
        let targets = targets(self.posts, self.pages, self.tags);
        check_safe_urls(&targets)?;
        check_unique_urls(&targets)?;

        let base = BaseContext::new(
            self.site,
            self.posts,
            self.pages,
            self.tags,
            self.first_menu,
            self.second_menu,
        );
        for target in &targets {
            self.write_target(&base, target)?;
        }
        info!(
            "wrote {} pages to {}",
            targets.len(),
            self.output_directory.display()
        );
        Ok(())
    }

    /// Picks the template and overlay values for `target`.
    fn prepare<'t>(
        &'t self,
        base: &BaseContext,
        target: &Target,
    ) -> (&'t Template, Value) {
        match *target {
            Target::Index => (
                &self.templates.main,
                base.with(vec![("title", Value::String(self.site.title.clone()))]),
            ),
            Target::Tag(tag) => (
                &self.templates.tags,
                base.with(vec![
                    ("title", base.title(&tag.title)),
                    ("tag", Value::from(tag)),
                    ("tagged_articles", array(posts_tagged(self.posts, tag))),
                ]),
            ),
            Target::Page(page) => (
                if page.is_archive() {
                    &self.templates.archive
                } else {
                    &self.templates.page
                },
                base.with(vec![
                    ("title", base.title(&page.title)),
                    ("page", Value::from(page)),
                ]),
            ),
            Target::Post(post) => (
                &self.templates.page,
                base.with(vec![
                    ("title", base.title(&post.title)),
                    ("page", Value::from(post)),
                ]),
            ),
        }
    }

    /// Renders `target` to a string.
    pub fn render(&self, base: &BaseContext, target: &Target) -> Result<String> {
        let (template, value) = self.prepare(base, target);
        let template_err = |err: String| Error::Template {
            target: target.describe(),
            err,
        };
        let context = Context::from(value).map_err(template_err)?;
        let mut out: Vec<u8> = Vec::new();
        template.execute(&mut out, &context).map_err(template_err)?;
        String::from_utf8(out).map_err(|e| template_err(e.to_string()))
    }

    fn write_target(&self, base: &BaseContext, target: &Target) -> Result<()> {
        let path = self
            .output_directory
            .join(format!("{}.html", target.url()));
        debug!("writing {} to {}", target.describe(), path.display());
        let html = self.render(base, target)?;
        std::fs::write(&path, html).map_err(|err| Error::Io { path, err })
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error while templating a page.
    Template { target: String, err: String },

    /// Two pages would be written to the same file.
    DuplicateUrl {
        url: String,
        first: String,
        second: String,
    },

    /// A page's file name is empty or would leave the output directory.
    InvalidUrl { url: String, target: String },

    /// An error writing an output file.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template { target, err } => {
                write!(f, "rendering {}: {}", target, err)
            }
            Error::DuplicateUrl { url, first, second } => write!(
                f,
                "{} and {} would both be written to `{}.html`",
                first, second, url
            ),
            Error::InvalidUrl { url, target } => write!(
                f,
                "{} has an unusable file name {:?}; change its title",
                target, url
            ),
            Error::Io { path, err } => {
                write!(f, "writing `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template { .. } => None,
            Error::DuplicateUrl { .. } => None,
            Error::InvalidUrl { .. } => None,
            Error::Io { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::article::{test_article, ArticleType};
    use std::collections::BTreeMap;

    fn template(src: &str) -> Template {
        let mut template = Template::default();
        template.parse(src).unwrap();
        template
    }

    fn templates() -> Templates {
        Templates {
            main: template("main|{{.title}}|{{range .articles}}{{.url}};{{end}}"),
            tags: template(
                "tags|{{.title}}|{{.tag.url}}|{{range .tagged_articles}}{{.url}};{{end}}",
            ),
            archive: template(
                "archive|{{.title}}|{{range .articles}}{{.title}};{{end}}",
            ),
            page: template("page|{{.title}}|{{.page.type}}|{{.page.text}}"),
        }
    }

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Blog".to_owned(),
            extra: BTreeMap::new(),
        }
    }

    struct Fixture {
        posts: Vec<Article>,
        pages: Vec<Article>,
        tags: Vec<Tag>,
    }

    fn fixture() -> Fixture {
        let mut newer = test_article("Second Post", "02.01.2024");
        newer.tags = vec![Tag::new("Rust")];
        newer.text = "<p>two</p>".to_owned();
        let mut older = test_article("First Post", "01.01.2024");
        older.tags = vec![Tag::new("Misc"), Tag::new("Rust")];

        let mut about = test_article("About", "01.01.2024");
        about.kind = ArticleType::Page;
        about.text = "<p>me</p>".to_owned();
        let mut archive = test_article("Archive", "01.01.2024");
        archive.kind = ArticleType::Archive;

        Fixture {
            tags: vec![Tag::new("Rust"), Tag::new("Misc")],
            posts: vec![newer, older],
            pages: vec![about, archive],
        }
    }

    fn writer<'a>(
        templates: &'a Templates,
        site: &'a SiteConfig,
        f: &'a Fixture,
        output_directory: &'a Path,
    ) -> Writer<'a> {
        Writer {
            templates,
            site,
            posts: &f.posts,
            pages: &f.pages,
            tags: &f.tags,
            first_menu: &[],
            second_menu: &[],
            output_directory,
        }
    }

    #[test]
    fn test_targets_order() {
        let f = fixture();
        let urls: Vec<String> = targets(&f.posts, &f.pages, &f.tags)
            .iter()
            .map(|t| t.url().to_owned())
            .collect();
        assert_eq!(
            urls,
            vec![
                "index",
                "rust",
                "misc",
                "about",
                "archive",
                "second-post",
                "first-post"
            ]
        );
    }

    #[test]
    fn test_check_unique_urls() {
        let f = fixture();
        let mut posts = f.posts.clone();
        posts.push(test_article("about", "03.01.2024"));
        let targets = targets(&posts, &f.pages, &f.tags);
        match check_unique_urls(&targets) {
            Err(Error::DuplicateUrl { url, first, second }) => {
                assert_eq!(url, "about");
                assert!(first.starts_with("page"), "got: {}", first);
                assert!(second.starts_with("post"), "got: {}", second);
            }
            other => panic!("expected DuplicateUrl, got {:?}", other),
        }
    }

    #[test]
    fn test_check_safe_urls() {
        let f = fixture();
        assert!(check_safe_urls(&targets(&f.posts, &f.pages, &f.tags)).is_ok());

        for title in &["../escaped", "a/b", "back\\slash", "..", ""] {
            let mut post = test_article("placeholder", "01.01.2024");
            post.title = title.to_string();
            post.url = crate::slug::sanitize(title);
            let posts = vec![post];
            match check_safe_urls(&targets(&posts, &[], &[])) {
                Err(Error::InvalidUrl { url, target }) => {
                    assert_eq!(url, crate::slug::sanitize(title));
                    assert!(target.starts_with("post"), "got: {}", target);
                }
                other => panic!("{:?}: expected InvalidUrl, got {:?}", title, other),
            }
        }
    }

    #[test]
    fn test_write_site_rejects_escaping_tag() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("out");
        std::fs::create_dir(&output).unwrap();
        let (templates, site, mut f) = (templates(), site(), fixture());
        f.tags.push(Tag::new("../escaped"));

        let err = writer(&templates, &site, &f, &output)
            .write_site()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(!dir.path().join("escaped.html").exists());
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_index_page_collides_with_index_post() {
        let posts = vec![test_article("Index", "01.01.2024")];
        let targets = targets(&posts, &[], &[]);
        assert!(check_unique_urls(&targets).is_err());
    }

    #[test]
    fn test_render_each_target() {
        let (templates, site, f) = (templates(), site(), fixture());
        let w = writer(&templates, &site, &f, Path::new("unused"));
        let base = BaseContext::new(&site, &f.posts, &f.pages, &f.tags, &[], &[]);

        assert_eq!(
            w.render(&base, &Target::Index).unwrap(),
            "main|Blog|second-post;first-post;"
        );
        assert_eq!(
            w.render(&base, &Target::Tag(&f.tags[1])).unwrap(),
            "tags|Blog - Misc|misc|first-post;"
        );
        assert_eq!(
            w.render(&base, &Target::Page(&f.pages[0])).unwrap(),
            "page|Blog - About|page|<p>me</p>"
        );
        assert_eq!(
            w.render(&base, &Target::Page(&f.pages[1])).unwrap(),
            "archive|Blog - Archive|Second Post;First Post;"
        );
        assert_eq!(
            w.render(&base, &Target::Post(&f.posts[0])).unwrap(),
            "page|Blog - Second Post|post|<p>two</p>"
        );
    }

    #[test]
    fn test_render_does_not_leak_between_targets() {
        let (templates, site, f) = (templates(), site(), fixture());
        let w = writer(&templates, &site, &f, Path::new("unused"));
        let base = BaseContext::new(&site, &f.posts, &f.pages, &f.tags, &[], &[]);

        w.render(&base, &Target::Post(&f.posts[0])).unwrap();
        assert_eq!(
            w.render(&base, &Target::Index).unwrap(),
            "main|Blog|second-post;first-post;"
        );
    }

    #[test]
    fn test_write_site() {
        let dir = tempfile::TempDir::new().unwrap();
        let (templates, site, f) = (templates(), site(), fixture());
        writer(&templates, &site, &f, dir.path()).write_site().unwrap();

        let read =
            |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert_eq!(read("index.html"), "main|Blog|second-post;first-post;");
        assert_eq!(read("rust.html"), "tags|Blog - Rust|rust|second-post;first-post;");
        assert!(read("about.html").starts_with("page|Blog - About"));
        assert!(read("archive.html").starts_with("archive|"));
        assert!(read("first-post.html").starts_with("page|Blog - First Post"));
    }

    #[test]
    fn test_write_site_duplicate_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let (templates, site, mut f) = (templates(), site(), fixture());
        f.posts.push(test_article("Rust", "05.01.2024"));
        let err = writer(&templates, &site, &f, dir.path())
            .write_site()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateUrl { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
