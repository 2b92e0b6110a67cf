//! Loads the project configuration: the `.site-config` file plus the fixed
//! project layout (`posts/`, `pages/`, `templates/`, ...).

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The name of the config file in the project root.
pub const CONFIG_FILE: &str = ".site-config";

/// Icon files copied from the project root into the output root when present.
pub const ICON_FILES: &[&str] = &[
    "favicon.ico",
    "favicon.svg",
    "favicon-16x16.png",
    "favicon-32x32.png",
    "apple-touch-icon.png",
    "android-chrome-192x192.png",
    "android-chrome-512x512.png",
    "mstile-150x150.png",
    "safari-pinned-tab.svg",
    "site.webmanifest",
    "browserconfig.xml",
];

/// The contents of `.site-config`. Only `title` is required; every other key
/// is kept as-is for the templates.
#[derive(Deserialize, Clone, Debug)]
pub struct SiteConfig {
    pub title: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SiteConfig {
    /// Parses the `key: value` lines of a config file. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(path: &Path, input: &str) -> Result<SiteConfig> {
        let mut mapping = Mapping::new();
        for (i, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.find(':') {
                Some(colon) => {
                    mapping.insert(
                        Value::String(line[..colon].trim().to_owned()),
                        Value::String(line[colon + 1..].trim().to_owned()),
                    );
                }
                None => {
                    return Err(Error::Syntax {
                        path: path.to_owned(),
                        line: i + 1,
                        text: line.to_owned(),
                    })
                }
            }
        }

        serde_yaml::from_value(Value::Mapping(mapping)).map_err(|err| {
            Error::Invalid {
                path: path.to_owned(),
                err,
            }
        })
    }

    /// Reads and parses the config file at `path`.
    pub fn from_file(path: &Path) -> Result<SiteConfig> {
        let input = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        SiteConfig::parse(path, &input)
    }

    /// All config values including `title`, as exposed to the templates.
    pub fn values(&self) -> BTreeMap<&str, &str> {
        let mut values: BTreeMap<&str, &str> = self
            .extra
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        values.insert("title", &self.title);
        values
    }
}

/// Everything a build needs to know: the site config and where the inputs and
/// the output live.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteConfig,
    pub root_directory: PathBuf,
    pub posts_source_directory: PathBuf,
    pub pages_source_directory: PathBuf,
    pub templates_directory: PathBuf,
    pub assets_source_directory: PathBuf,
    pub images_source_directory: PathBuf,
    pub output_directory: PathBuf,
}

impl Config {
    /// Loads the config for the project rooted at `dir`. The output goes to
    /// `output_directory` if given, else to `{dir}/output`.
    pub fn from_directory(
        dir: &Path,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        Ok(Config {
            site: SiteConfig::from_file(&dir.join(CONFIG_FILE))?,
            root_directory: dir.to_owned(),
            posts_source_directory: dir.join("posts"),
            pages_source_directory: dir.join("pages"),
            templates_directory: dir.join("templates"),
            assets_source_directory: dir.join("assets"),
            images_source_directory: dir.join("images"),
            output_directory: match output_directory {
                Some(output) => output.to_owned(),
                None => dir.join("output"),
            },
        })
    }
}

/// Represents the result of loading configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when the config file can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned for a non-blank line that isn't `key: value`.
    Syntax {
        path: PathBuf,
        line: usize,
        text: String,
    },

    /// Returned when the config lacks a required key.
    Invalid {
        path: PathBuf,
        err: serde_yaml::Error,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => {
                write!(f, "reading config `{}`: {}", path.display(), err)
            }
            Error::Syntax { path, line, text } => write!(
                f,
                "{}:{}: expected `key: value`, found {:?}",
                path.display(),
                line,
                text
            ),
            Error::Invalid { path, err } => {
                write!(f, "loading config `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { err, .. } => Some(err),
            Error::Syntax { .. } => None,
            Error::Invalid { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(input: &str) -> Result<SiteConfig> {
        SiteConfig::parse(Path::new(CONFIG_FILE), input)
    }

    #[test]
    fn test_parse_config() {
        let config = parse(
            "# my blog\n\
             title: Notes: mostly Rust\n\
             \n\
             author : Jane\n\
             lang: de\n",
        )
        .unwrap();
        assert_eq!(config.title, "Notes: mostly Rust");
        assert_eq!(config.extra["author"], "Jane");
        assert_eq!(config.extra["lang"], "de");
        assert!(!config.extra.contains_key("title"));

        let values = config.values();
        assert_eq!(values["title"], "Notes: mostly Rust");
        assert_eq!(values["lang"], "de");
    }

    #[test]
    fn test_parse_config_missing_title() {
        let err = parse("author: Jane\n").unwrap_err();
        assert!(matches!(err, Error::Invalid { .. }));
        assert!(err.to_string().contains("title"), "got: {}", err);
    }

    #[test]
    fn test_parse_config_syntax_error() {
        match parse("title: Blog\njust some words\n") {
            Err(Error::Syntax { line, text, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(text, "just some words");
            }
            other => panic!("expected Syntax, got {:?}", other),
        }
    }

    #[test]
    fn test_from_directory_layout() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "title: Blog\n").unwrap();

        let config = Config::from_directory(dir.path(), None).unwrap();
        assert_eq!(config.site.title, "Blog");
        assert_eq!(config.posts_source_directory, dir.path().join("posts"));
        assert_eq!(config.output_directory, dir.path().join("output"));

        let elsewhere = Path::new("/tmp/elsewhere");
        let config =
            Config::from_directory(dir.path(), Some(elsewhere)).unwrap();
        assert_eq!(config.output_directory, elsewhere);
    }

    #[test]
    fn test_from_directory_missing_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Config::from_directory(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}
