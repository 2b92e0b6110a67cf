//! Builds the two navigation menus from the sorted pages.

use crate::article::Article;

/// A link in a navigation menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub title: String,
    pub url: String,
}

impl From<&Article> for MenuEntry {
    fn from(page: &Article) -> MenuEntry {
        MenuEntry {
            title: page.title.clone(),
            url: page.url.clone(),
        }
    }
}

/// Returns the first and second menu: the pages flagged with
/// `first-menu: yes` and `second-menu: yes` respectively, in page order. A
/// page can be in both.
pub fn build_menus(pages: &[Article]) -> (Vec<MenuEntry>, Vec<MenuEntry>) {
    let first = pages
        .iter()
        .filter(|page| page.in_first_menu())
        .map(MenuEntry::from)
        .collect();
    let second = pages
        .iter()
        .filter(|page| page.in_second_menu())
        .map(MenuEntry::from)
        .collect();
    (first, second)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::article::test_article;

    fn page(title: &str, first: &str, second: &str) -> Article {
        let mut page = test_article(title, "01.01.2024");
        page.first_menu = first.to_owned();
        page.second_menu = second.to_owned();
        page
    }

    fn titles(entries: &[MenuEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_build_menus() {
        let pages = vec![
            page("Home", "yes", ""),
            page("Imprint", "", "yes"),
            page("Hidden", "no", ""),
            page("Blog", "yes", "yes"),
        ];
        let (first, second) = build_menus(&pages);
        assert_eq!(titles(&first), vec!["Home", "Blog"]);
        assert_eq!(titles(&second), vec!["Imprint", "Blog"]);
        assert_eq!(first[0].url, "home");
    }

    #[test]
    fn test_first_menu_only() {
        let (first, second) = build_menus(&[page("About", "yes", "")]);
        assert_eq!(titles(&first), vec!["About"]);
        assert!(second.is_empty());
    }
}
