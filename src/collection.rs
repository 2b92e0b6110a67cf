//! Builds the sorted post and page collections from the `posts/` and `pages/`
//! source directories.

use crate::article::{Article, ArticleType};
use crate::parser::{Error as ParseError, Parser};
use crate::slug::sanitize;
use log::{debug, info};
use std::cmp::Ordering;
use std::fmt;
use std::fs::read_dir;
use std::path::{Path, PathBuf};

/// Parses every file in `dir` as a post and returns them newest first. Posts
/// with the same date keep the order in which they were read.
pub fn build_posts(parser: &Parser, dir: &Path) -> Result<Vec<Article>> {
    let mut posts = parse_dir(parser, dir, ArticleType::Post)?;
    for post in posts.iter_mut() {
        post.summary = first_line(&post.text).to_owned();
    }
    sort_posts(&mut posts);
    info!("parsed {} posts from {}", posts.len(), dir.display());
    Ok(posts)
}

/// Parses every file in `dir` as a page and returns them sorted by their
/// `order` field. Every page must have a numeric `order`. Pages carry no
/// tags, even if their front matter lists some.
pub fn build_pages(parser: &Parser, dir: &Path) -> Result<Vec<Article>> {
    let mut pages = parse_dir(parser, dir, ArticleType::Page)?;
    for page in pages.iter_mut() {
        page.tags.clear();
    }
    let mut keyed = pages
        .into_iter()
        .map(|page| Ok((sort_order(&page)?, page)))
        .collect::<Result<Vec<(f64, Article)>>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    info!("parsed {} pages from {}", keyed.len(), dir.display());
    Ok(keyed.into_iter().map(|(_, page)| page).collect())
}

/// Sorts `posts` newest first. The sort is stable, so posts sharing a date
/// keep their relative order.
pub fn sort_posts(posts: &mut [Article]) {
    posts.sort_by(|a, b| b.date_obj.cmp(&a.date_obj));
}

fn sort_order(page: &Article) -> Result<f64> {
    let raw = page.order.as_deref().ok_or_else(|| Error::MissingField {
        path: page.source.clone(),
        field: "order",
    })?;
    match raw.parse::<f64>() {
        Ok(order) if order.is_finite() => Ok(order),
        _ => Err(Error::InvalidField {
            path: page.source.clone(),
            field: "order",
            value: raw.to_owned(),
        }),
    }
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default()
}

/// Parses the regular, non-hidden files directly inside `dir` and fills in
/// each article's `url`. The result is in directory order, which is
/// unspecified.
fn parse_dir(
    parser: &Parser,
    dir: &Path,
    default_type: ArticleType,
) -> Result<Vec<Article>> {
    let io_err = |err: std::io::Error| Error::Io {
        path: dir.to_owned(),
        err,
    };

    let mut articles = Vec::new();
    for result in read_dir(dir).map_err(io_err)? {
        let entry = result.map_err(io_err)?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().starts_with('.') {
            debug!("skipping hidden file {}", path.display());
            continue;
        }
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        let mut article = parser.parse_article(&path, default_type.clone())?;
        article.url = sanitize(&article.title);
        articles.push(article);
    }
    Ok(articles)
}

/// Represents the result of building a collection.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error building a post or page collection.
#[derive(Debug)]
pub enum Error {
    /// Returned when a file in the collection fails to parse.
    Parse(ParseError),

    /// Returned when a page lacks a field it needs to be sorted.
    MissingField { path: PathBuf, field: &'static str },

    /// Returned when a page's sort field isn't a number.
    InvalidField {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    /// Returned when the directory can't be listed.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::MissingField { path, field } => write!(
                f,
                "`{}` is missing the required field `{}`",
                path.display(),
                field
            ),
            Error::InvalidField { path, field, value } => write!(
                f,
                "`{}`: field `{}` must be a number, found {:?}",
                path.display(),
                field,
                value
            ),
            Error::Io { path, err } => {
                write!(f, "listing directory `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::MissingField { .. } => None,
            Error::InvalidField { .. } => None,
            Error::Io { err, .. } => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts a [`ParseError`] into an [`Error`]. It allows us to use the
    /// `?` operator with [`Parser::parse_article`].
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}
