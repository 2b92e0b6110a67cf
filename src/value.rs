//! Conversions from the site's types into template [`Value`]s.

use crate::article::Article;
use crate::config::SiteConfig;
use crate::menu::MenuEntry;
use crate::tag::Tag;
use gtmpl_value::Value;
use std::collections::HashMap;

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

fn object<'a>(fields: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Object(
        fields
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect::<HashMap<String, Value>>(),
    )
}

/// Converts a list of items into a [`Value::Array`].
pub fn array<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>) -> Value
where
    Value: From<&'a T>,
{
    Value::Array(items.into_iter().map(Value::from).collect())
}

impl From<&Tag> for Value {
    fn from(t: &Tag) -> Value {
        object(vec![("title", string(&t.title)), ("url", string(&t.url))])
    }
}

impl From<&MenuEntry> for Value {
    fn from(e: &MenuEntry) -> Value {
        object(vec![("title", string(&e.title)), ("url", string(&e.url))])
    }
}

impl From<&Article> for Value {
    /// Article fields are exposed under their front-matter names, with
    /// hyphens turned into underscores so templates can use `.first_menu`.
    /// Unknown front-matter keys are available under `meta`.
    fn from(a: &Article) -> Value {
        object(vec![
            ("title", string(&a.title)),
            ("date", string(&a.date)),
            ("type", string(a.kind.as_str())),
            ("tags", array(&a.tags)),
            ("image", string(&a.image)),
            ("first_menu", string(&a.first_menu)),
            ("second_menu", string(&a.second_menu)),
            ("order", string(a.order.as_deref().unwrap_or_default())),
            ("text", string(&a.text)),
            ("url", string(&a.url)),
            ("abstract", string(&a.summary)),
            (
                "meta",
                object(a.extra.iter().map(|(k, v)| (k.as_str(), string(v)))),
            ),
        ])
    }
}

impl From<&SiteConfig> for Value {
    fn from(c: &SiteConfig) -> Value {
        object(c.values().into_iter().map(|(k, v)| (k, string(v))))
    }
}
