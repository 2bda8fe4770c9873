//! Pages served by the shell, loaded from markdown.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};
use waypoint_core::phase::normalize_path;
use waypoint_core::section::Section;
use waypoint_sections::sections_from_markdown;

use crate::error::ShellError;

/// Optional YAML front matter of a page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    /// Lines typed by the overlay before its menu enables.
    boot: Vec<String>,
}

/// A mountable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Route the page is mounted at.
    pub path: String,
    /// Display title.
    pub title: String,
    /// Sections in document order.
    pub sections: Vec<Section>,
    /// Lines typed by the overlay before its menu accepts input.
    pub boot_lines: Vec<String>,
}

impl Page {
    /// Builds a page from markdown with optional `---` delimited YAML front
    /// matter. Sections come from the level-2 headings of the body.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Yaml` if the front matter is malformed.
    pub fn from_markdown(path: &str, source: &str) -> Result<Self, ShellError> {
        let path = normalize_path(path);
        let (front, body) = split_front_matter(source);
        let front: FrontMatter = match front {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
            _ => FrontMatter::default(),
        };
        Ok(Self {
            title: front.title.unwrap_or_else(|| path.clone()),
            sections: sections_from_markdown(body),
            boot_lines: front.boot,
            path,
        })
    }
}

fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let Some(rest) = source
        .strip_prefix("---\n")
        .or_else(|| source.strip_prefix("---\r\n"))
    else {
        return (None, source);
    };
    if let Some(body) = rest.strip_prefix("---\n") {
        return (Some(""), body);
    }
    for terminator in ["\n---\n", "\n---\r\n"] {
        if let Some(end) = rest.find(terminator) {
            return (Some(&rest[..end]), &rest[end + terminator.len()..]);
        }
    }
    match rest.strip_suffix("\n---") {
        Some(front) => (Some(front), ""),
        None => (None, source),
    }
}

/// Every page the shell can mount, keyed by route path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCatalog {
    pages: BTreeMap<String, Page>,
}

impl PageCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `*.md` file in `dir`. `index.md` is served at `/`,
    /// `guide.md` at `/guide`.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::Io` if the directory or a file cannot be read
    /// and `ShellError::Yaml` for malformed front matter.
    pub fn from_dir(dir: &Path) -> Result<Self, ShellError> {
        let mut catalog = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let route = if stem == "index" { "/" } else { stem };
            let source = std::fs::read_to_string(&path)?;
            catalog.insert(Page::from_markdown(route, &source)?);
            debug!(file = %path.display(), route, "loaded page");
        }
        info!(dir = %dir.display(), pages = catalog.len(), "page catalog loaded");
        Ok(catalog)
    }

    /// Pages served when no directory is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (route, source) in [("/", BUILTIN_HOME), ("/guide", BUILTIN_GUIDE)] {
            if let Ok(page) = Page::from_markdown(route, source) {
                catalog.insert(page);
            }
        }
        catalog
    }

    /// Adds or replaces a page.
    pub fn insert(&mut self, page: Page) {
        self.pages.insert(page.path.clone(), page);
    }

    /// The page mounted at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Page> {
        self.pages.get(&normalize_path(path))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

const BUILTIN_HOME: &str = "---
title: Waypoint
boot:
  - loading sections
  - restoring position
  - ready
---
# Waypoint

## Overview

What the site covers.

## Getting Started {#getting-started}

Where to begin.

## Reference

Everything else.
";

const BUILTIN_GUIDE: &str = "---
title: Guide
---
## Setup

## Usage

## Troubleshooting
";
