//! Defines the [`Article`] type, the parsed form of a post or page source
//! file, along with [`ArticleType`].

use crate::tag::Tag;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The display format of [`Article::date`], e.g. `24.12.2023`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// The value of `first-menu`/`second-menu` that puts a page into a menu.
const MENU_YES: &str = "yes";

/// The `type` front-matter field. Defaults to the kind of directory the file
/// was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArticleType {
    Post,
    Page,
    /// A page rendered with the archive template, which lists all posts.
    Archive,
    Other(String),
}

impl ArticleType {
    pub fn as_str(&self) -> &str {
        match self {
            ArticleType::Post => "post",
            ArticleType::Page => "page",
            ArticleType::Archive => "archive",
            ArticleType::Other(s) => s,
        }
    }
}

impl From<&str> for ArticleType {
    fn from(s: &str) -> ArticleType {
        match s {
            "post" => ArticleType::Post,
            "page" => ArticleType::Page,
            "archive" => ArticleType::Archive,
            other => ArticleType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post or a page. Fields mirror the front-matter keys; each one falls back
/// to the default noted on it when the key is absent.
#[derive(Clone, Debug)]
pub struct Article {
    /// The source file this article was parsed from.
    pub source: PathBuf,

    /// `title`; defaults to the source file name without extension.
    pub title: String,

    /// `date` as written (`DD.MM.YYYY`); defaults to the day of the build.
    pub date: String,

    /// `date` parsed with [`DATE_FORMAT`].
    pub date_obj: NaiveDate,

    /// `type`; defaults to [`ArticleType::Post`] or [`ArticleType::Page`].
    pub kind: ArticleType,

    /// `tags`, comma separated; defaults to none. Always empty for pages.
    pub tags: Vec<Tag>,

    /// `image`; defaults to `""`.
    pub image: String,

    /// `first-menu`; defaults to `""`.
    pub first_menu: String,

    /// `second-menu`; defaults to `""`.
    pub second_menu: String,

    /// `order`, kept verbatim. Pages must have a numeric one.
    pub order: Option<String>,

    /// Any other front-matter keys, verbatim.
    pub extra: BTreeMap<String, String>,

    /// The rendered HTML body.
    pub text: String,

    /// The slug of `title`. Filled in by the collection builder.
    pub url: String,

    /// The first line of `text` (posts only). Filled in by the collection
    /// builder.
    pub summary: String,
}

impl Article {
    pub fn in_first_menu(&self) -> bool {
        self.first_menu == MENU_YES
    }

    pub fn in_second_menu(&self) -> bool {
        self.second_menu == MENU_YES
    }

    pub fn is_archive(&self) -> bool {
        self.kind == ArticleType::Archive
    }
}

#[cfg(test)]
pub(crate) fn test_article(title: &str, date: &str) -> Article {
    Article {
        source: PathBuf::from(format!("{}.md", title)),
        title: title.to_owned(),
        date: date.to_owned(),
        date_obj: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
        kind: ArticleType::Post,
        tags: Vec::new(),
        image: String::new(),
        first_menu: String::new(),
        second_menu: String::new(),
        order: None,
        extra: BTreeMap::new(),
        text: String::new(),
        url: crate::slug::sanitize(title),
        summary: String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_article_type_round_trip_names() {
        assert_eq!(ArticleType::from("archive"), ArticleType::Archive);
        assert_eq!(
            ArticleType::from("gallery"),
            ArticleType::Other("gallery".to_owned())
        );
        assert_eq!(ArticleType::Other("gallery".to_owned()).as_str(), "gallery");
    }

    #[test]
    fn test_menu_flags_require_yes() {
        let mut page = test_article("About", "01.01.2024");
        page.first_menu = "yes".to_owned();
        page.second_menu = "Yes".to_owned();
        assert!(page.in_first_menu());
        assert!(!page.in_second_menu());
    }
}
