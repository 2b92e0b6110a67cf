//! Defines the [`Parser`] and [`Error`] types, which turn a single content
//! source file into an [`Article`].
//!
//! A source file looks like this:
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 16.04.2021
//! tags: greet, misc
//! ---
//! # Hello
//!
//! World
//! ```
//!
//! The front matter is optional. It only counts as front matter if the
//! opening `---` is the first non-blank line and a closing `---` follows;
//! otherwise the whole file is treated as markdown.

use crate::article::{Article, ArticleType, DATE_FORMAT};
use crate::markdown;
use crate::tag::Tag;
use chrono::{Local, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

const FENCE: &str = "---";

/// Parses [`Article`] objects from source files.
pub struct Parser {
    /// The date given to articles without a `date` field.
    today: NaiveDate,
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

impl Parser {
    /// Constructs a parser that dates undated articles with the current local
    /// date.
    pub fn new() -> Parser {
        Parser::with_today(Local::now().date_naive())
    }

    /// Constructs a parser that dates undated articles with `today`.
    pub fn with_today(today: NaiveDate) -> Parser {
        Parser { today }
    }

    /// Reads and parses the file at `path`. `default_type` is used when the
    /// front matter has no `type` field. The returned article's `url` and
    /// `summary` are left empty.
    pub fn parse_article(
        &self,
        path: &Path,
        default_type: ArticleType,
    ) -> Result<Article> {
        debug!("parsing {}", path.display());
        let contents =
            std::fs::read_to_string(path).map_err(|err| Error::Io {
                path: path.to_owned(),
                err,
            })?;
        self.parse_str(path, &contents, default_type)
    }

    /// Parses `input` as if it were the contents of `path`.
    pub fn parse_str(
        &self,
        path: &Path,
        input: &str,
        default_type: ArticleType,
    ) -> Result<Article> {
        let (front_matter, body) = split_front_matter(input);
        let meta = match front_matter {
            Some(lines) => Metadata::parse(path, &lines),
            None => Metadata::default(),
        };

        let date = match meta.date {
            Some(date) if !date.is_empty() => date,
            _ => self.today.format(DATE_FORMAT).to_string(),
        };
        let date_obj = parse_date(&date).map_err(|err| Error::InvalidDate {
            path: path.to_owned(),
            date: date.clone(),
            err,
        })?;

        Ok(Article {
            source: path.to_owned(),
            title: match meta.title {
                Some(title) => title,
                None => file_stem(path),
            },
            date,
            date_obj,
            kind: match meta.kind {
                Some(kind) => ArticleType::from(kind.as_str()),
                None => default_type,
            },
            tags: meta.tags,
            image: meta.image,
            first_menu: meta.first_menu,
            second_menu: meta.second_menu,
            order: meta.order,
            extra: meta.extra,
            text: markdown::to_html(&body),
            url: String::new(),
            summary: String::new(),
        })
    }
}

/// Parses a `DD.MM.YYYY` date. chrono alone also accepts short years and
/// unpadded fields (`1.1.24`), so the date must format back to exactly the
/// input; `Err(None)` means it parsed but wasn't in that form.
fn parse_date(
    date: &str,
) -> std::result::Result<NaiveDate, Option<chrono::ParseError>> {
    let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(Some)?;
    if parsed.format(DATE_FORMAT).to_string() != date {
        return Err(None);
    }
    Ok(parsed)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == FENCE
}

/// Splits `input` into the front-matter lines (if there is a complete block)
/// and the newline-joined body.
fn split_front_matter(input: &str) -> (Option<Vec<&str>>, String) {
    let lines: Vec<&str> = input.lines().collect();
    let open = match lines.iter().position(|line| !line.trim().is_empty()) {
        Some(i) if is_fence(lines[i]) => i,
        _ => return (None, lines.join("\n")),
    };
    match lines[open + 1..].iter().position(|line| is_fence(line)) {
        Some(offset) => {
            let close = open + 1 + offset;
            (
                Some(lines[open + 1..close].to_vec()),
                lines[close + 1..].join("\n"),
            )
        }
        None => (None, lines.join("\n")),
    }
}

/// The front-matter fields as found in the file. `None` means the key was
/// absent.
#[derive(Default)]
struct Metadata {
    title: Option<String>,
    date: Option<String>,
    kind: Option<String>,
    tags: Vec<Tag>,
    image: String,
    first_menu: String,
    second_menu: String,
    order: Option<String>,
    extra: BTreeMap<String, String>,
}

impl Metadata {
    fn parse(path: &Path, lines: &[&str]) -> Metadata {
        let mut meta = Metadata::default();
        for line in lines.iter().filter(|line| !line.trim().is_empty()) {
            let (key, value) = match line.find(':') {
                Some(i) => (line[..i].trim(), line[i + 1..].trim()),
                None => {
                    debug!(
                        "{}: ignoring front-matter line without a colon: {:?}",
                        path.display(),
                        line
                    );
                    continue;
                }
            };
            meta.set(key, value);
        }
        meta
    }

    fn set(&mut self, key: &str, value: &str) {
        let value = value.to_owned();
        match key {
            "title" => self.title = Some(value),
            "date" => self.date = Some(value),
            "type" => self.kind = Some(value),
            "tags" => {
                self.tags = value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(Tag::new)
                    .collect()
            }
            "image" => self.image = value,
            "first-menu" => self.first_menu = value,
            "second-menu" => self.second_menu = value,
            "order" => self.order = Some(value),
            _ => {
                self.extra.insert(key.to_owned(), value);
            }
        }
    }
}

/// Represents the result of an [`Article`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing an [`Article`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the source file can't be read (including when it isn't
    /// valid UTF-8).
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when the `date` field doesn't match `DD.MM.YYYY`. `err` is
    /// `None` when chrono accepted the date but it isn't written in exactly
    /// that form (e.g. a two-digit year).
    InvalidDate {
        path: PathBuf,
        date: String,
        err: Option<chrono::ParseError>,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "reading `{}`: {}", path.display(), err)
            }
            Error::InvalidDate { path, date, err } => {
                write!(
                    f,
                    "parsing `{}`: invalid date {:?} (expected DD.MM.YYYY)",
                    path.display(),
                    date
                )?;
                match err {
                    Some(err) => write!(f, ": {}", err),
                    None => Ok(()),
                }
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { err, .. } => Some(err),
            Error::InvalidDate { err, .. } => match err {
                Some(err) => Some(err),
                None => None,
            },
        }
    }
}
