//! Section extraction from markdown pages.

use std::collections::HashMap;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use waypoint_core::section::Section;

/// Extracts the section list of a markdown page: one section per level-2
/// heading, in document order.
///
/// An explicit `{#id}` heading attribute is used verbatim; otherwise the id
/// is a slug of the heading text, suffixed `-1`, `-2`, ... on collision.
#[must_use]
pub fn sections_from_markdown(source: &str) -> Vec<Section> {
    let parser = Parser::new_ext(source, Options::ENABLE_HEADING_ATTRIBUTES);
    let mut sections = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(Option<String>, String)> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                id,
                ..
            }) => {
                current = Some((id.map(|id| id.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(HeadingLevel::H2)) => {
                if let Some((explicit, title)) = current.take() {
                    let title = title.trim().to_owned();
                    let id = explicit.unwrap_or_else(|| unique_slug(&title, &mut seen));
                    if !id.is_empty() {
                        sections.push(Section::new(id, title));
                    }
                }
            }
            _ => {}
        }
    }
    sections
}

fn unique_slug(title: &str, seen: &mut HashMap<String, usize>) -> String {
    let base = slugify(title);
    let count = seen.entry(base.clone()).or_insert(0);
    let slug = if *count == 0 {
        base
    } else {
        format!("{base}-{count}")
    };
    *count += 1;
    slug
}

/// Lowercases `text`, keeps alphanumerics and joins words with `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_two_headings_become_sections() {
        let source = "# Site\n\nIntro.\n\n## Overview\n\nText.\n\n### Detail\n\n## Getting Started\n";

        let sections = sections_from_markdown(source);

        assert_eq!(
            sections,
            vec![
                Section::new("overview", "Overview"),
                Section::new("getting-started", "Getting Started"),
            ]
        );
    }

    #[test]
    fn test_explicit_heading_id_wins() {
        let sections = sections_from_markdown("## The Branching Story {#story}\n");

        assert_eq!(sections, vec![Section::new("story", "The Branching Story")]);
    }

    #[test]
    fn test_duplicate_titles_get_suffixes() {
        let sections = sections_from_markdown("## Notes\n\n## Notes\n\n## Notes\n");

        let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn test_inline_code_is_part_of_title() {
        let sections = sections_from_markdown("## Using `scroll_to`\n");

        assert_eq!(sections, vec![Section::new("using-scroll-to", "Using scroll_to")]);
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  What's New?  v2 "), "whats-new-v2");
    }
}
