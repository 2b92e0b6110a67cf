//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing posts and pages
//! ([`crate::collection`]), indexing tags and menus, copying static files, and
//! rendering every page ([`crate::write`]).
//!
//! The site is assembled in a staging directory next to the output directory
//! and only swapped into place once everything has been written, so a failed
//! build leaves the previous output untouched.

use crate::collection::{build_pages, build_posts, Error as CollectionError};
use crate::config::{Config, Error as ConfigError, ICON_FILES};
use crate::menu::build_menus;
use crate::parser::Parser;
use crate::tag::build_tag_index;
use crate::write::{Error as WriteError, Templates, Writer};
use gtmpl::Template;
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Builds the site from a [`Config`] object. This calls into
/// [`build_posts`], [`build_pages`], and [`Writer::write_site`] which do the
/// heavy-lifting. This function also copies the static assets, images, and
/// icons into the output directory.
pub fn build_site(config: &Config) -> Result<()> {
    let parser = Parser::new();
    let posts = build_posts(&parser, &config.posts_source_directory)?;
    let pages = build_pages(&parser, &config.pages_source_directory)?;
    let tags = build_tag_index(&posts);
    let (first_menu, second_menu) = build_menus(&pages);
    info!(
        "{} posts, {} pages, {} tags",
        posts.len(),
        pages.len(),
        tags.len()
    );

    let templates = load_templates(&config.templates_directory)?;

    let staging = staging_dir(&config.output_directory)?;
    debug!("staging build in {}", staging.path().display());

    copy_tree(
        &config.assets_source_directory,
        &staging.path().join("assets"),
    )?;
    copy_tree(
        &config.images_source_directory,
        &staging.path().join("images"),
    )?;
    copy_icons(&config.root_directory, staging.path())?;

    Writer {
        templates: &templates,
        site: &config.site,
        posts: &posts,
        pages: &pages,
        tags: &tags,
        first_menu: &first_menu,
        second_menu: &second_menu,
        output_directory: staging.path(),
    }
    .write_site()?;

    replace_dir(staging.path(), &config.output_directory)?;
    info!("site written to {}", config.output_directory.display());
    Ok(())
}

/// Loads `main.html`, `tags.html`, `archive.html`, and `page.html` from
/// `dir`.
pub fn load_templates(dir: &Path) -> Result<Templates> {
    Ok(Templates {
        main: parse_template(&dir.join("main.html"))?,
        tags: parse_template(&dir.join("tags.html"))?,
        archive: parse_template(&dir.join("archive.html"))?,
        page: parse_template(&dir.join("page.html"))?,
    })
}

fn parse_template(path: &Path) -> Result<Template> {
    let contents =
        fs::read_to_string(path).map_err(|err| Error::OpenTemplateFile {
            path: path.to_owned(),
            err,
        })?;
    let mut template = Template::default();
    template
        .parse(&contents)
        .map_err(|err| Error::ParseTemplate {
            path: path.to_owned(),
            err,
        })?;
    Ok(template)
}

/// Creates a fresh temporary directory in the parent of `output`, so that it
/// can later be renamed onto `output` without crossing file systems.
fn staging_dir(output: &Path) -> Result<tempfile::TempDir> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(fs_err(parent))?;
    tempfile::Builder::new()
        .prefix(".satz-staging-")
        .tempdir_in(parent)
        .map_err(fs_err(parent))
}

/// Copies the directory tree at `src` to `dst`. A missing `src` yields an
/// empty `dst`.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(fs_err(dst))?;
    if !src.is_dir() {
        warn!("{} does not exist, leaving it empty", src.display());
        return Ok(());
    }

    let mut copied = 0usize;
    for result in WalkDir::new(src).min_depth(1) {
        let entry = result?;
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(fs_err(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(fs_err(entry.path()))?;
            copied += 1;
        }
    }
    debug!("copied {} files from {}", copied, src.display());
    Ok(())
}

/// Copies whichever of [`ICON_FILES`] exist in `root` into `dst`.
fn copy_icons(root: &Path, dst: &Path) -> Result<()> {
    for name in ICON_FILES {
        let src = root.join(name);
        if src.is_file() {
            fs::copy(&src, dst.join(name)).map_err(fs_err(&src))?;
            debug!("copied icon {}", name);
        }
    }
    Ok(())
}

/// Moves `staging` onto `output`, replacing whatever was there. The old
/// output is moved aside first and only deleted once `staging` is in place.
fn replace_dir(staging: &Path, output: &Path) -> Result<()> {
    let backup = match output.exists() {
        false => None,
        true => {
            let name = output
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let backup = output
                .with_file_name(format!(".{}.old-{}", name, std::process::id()));
            fs::rename(output, &backup).map_err(fs_err(output))?;
            Some(backup)
        }
    };

    if let Err(err) = fs::rename(staging, output) {
        if let Some(backup) = &backup {
            if let Err(restore) = fs::rename(backup, output) {
                warn!(
                    "could not restore {} from {}: {}",
                    output.display(),
                    backup.display(),
                    restore
                );
            }
        }
        return Err(Error::FileSystem {
            path: output.to_owned(),
            err,
        });
    }

    if let Some(backup) = backup {
        fs::remove_dir_all(&backup).map_err(fs_err(&backup))?;
    }
    Ok(())
}

fn fs_err(path: &Path) -> impl Fn(std::io::Error) -> Error + '_ {
    move |err| Error::FileSystem {
        path: path.to_owned(),
        err,
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during configuration,
/// parsing, writing, loading templates, and file-system operations.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading the configuration.
    Config(ConfigError),

    /// Returned for errors parsing and sorting posts and pages.
    Collection(CollectionError),

    /// Returned for errors rendering and writing pages.
    Write(WriteError),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate { path: PathBuf, err: String },

    /// Returned for I/O problems while copying files and replacing the
    /// output directory.
    FileSystem { path: PathBuf, err: std::io::Error },

    /// Returned for errors walking a static directory tree.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Collection(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate { path, err } => {
                write!(f, "Parsing template file '{}': {}", path.display(), err)
            }
            Error::FileSystem { path, err } => {
                write!(f, "'{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Collection(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::OpenTemplateFile { err, .. } => Some(err),
            Error::ParseTemplate { .. } => None,
            Error::FileSystem { err, .. } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    /// Converts [`ConfigError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<CollectionError> for Error {
    /// Converts [`CollectionError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CollectionError) -> Error {
        Error::Collection(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
