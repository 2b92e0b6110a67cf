//! The library code for the `satz` static site generator. A build goes through
//! these steps:
//!
//! 1. Loading the project configuration ([`crate::config`])
//! 2. Parsing posts and pages from their source files ([`crate::parser`],
//!    [`crate::collection`])
//! 3. Indexing tags and composing the navigation menus ([`crate::tag`],
//!    [`crate::menu`])
//! 4. Rendering every page through its template and writing the result to
//!    disk ([`crate::write`])
//!
//! Of these, the second step holds most of the logic: a source file has an
//! optional front-matter block of `key: value` lines followed by a markdown
//! body, and every field has a default when it is missing. Posts are sorted
//! newest first, pages by their `order` field.
//!
//! [`crate::build::build_site`] stitches the steps together. It renders into a
//! staging directory and only replaces the output directory once every page
//! has been written.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod build;
pub mod collection;
pub mod config;
pub mod markdown;
pub mod menu;
pub mod parser;
pub mod slug;
pub mod tag;
pub mod value;
pub mod write;
