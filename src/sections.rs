//! Header-anchored extraction of labeled sections from model output.
//!
//! A [`SectionParser`] is built from an ordered list of [`Section`]s. Each
//! section's body runs from the end of its header to the start of the next
//! known header (or the end of the text). A section whose header never
//! appears resolves to its fixed fallback string.

use regex::Regex;
use std::sync::LazyLock;

/// A labeled section and the text used when its header is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub label: &'static str,
    pub fallback: &'static str,
}

pub const NAME: Section = Section {
    label: "Name",
    fallback: "No name found.",
};
pub const DESCRIPTION: Section = Section {
    label: "Description",
    fallback: "No description found.",
};
pub const INGREDIENTS: Section = Section {
    label: "Ingredients",
    fallback: "No ingredients found.",
};
pub const COMPONENTS: Section = Section {
    label: "Components",
    fallback: "No components found.",
};
pub const INSTRUCTIONS: Section = Section {
    label: "Instructions",
    fallback: "No instructions found.",
};

/// Sections of the single-dish details completion.
pub static DISH_DETAILS: LazyLock<SectionParser> =
    LazyLock::new(|| SectionParser::new(&[INGREDIENTS, COMPONENTS, INSTRUCTIONS]));

/// Sections of one course block in a three-course completion.
pub static COURSE_FIELDS: LazyLock<SectionParser> =
    LazyLock::new(|| SectionParser::new(&[NAME, DESCRIPTION, INGREDIENTS, INSTRUCTIONS]));

// "Course 2:", "**Course 2:**", "**Course 2**:", "### Course 2:" and the rest
// of that line.
static COURSE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\*\*|#{1,6}[ \t]*)?\bCourse[ \t]+\d+(?:\*\*)?[ \t]*:(?:\*\*)?([^\n]*)")
        .expect("course header pattern is valid")
});

/// Build the header pattern for a label, tolerating markdown bold/heading
/// decoration around it. The closing `**` may sit on either side of the colon.
fn header_pattern(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?:\*\*|#{{1,6}}[ \t]*)?\b{}(?:\*\*)?[ \t]*:(?:\*\*)?",
        regex::escape(label)
    ))
    .expect("section header pattern is valid")
}

#[derive(Debug)]
pub struct SectionParser {
    sections: Vec<(Section, Regex)>,
}

impl SectionParser {
    pub fn new(sections: &[Section]) -> Self {
        Self {
            sections: sections
                .iter()
                .map(|section| (*section, header_pattern(section.label)))
                .collect(),
        }
    }

    pub fn parse(&self, text: &str) -> ParsedSections {
        // First occurrence of every header that appears at all.
        let headers: Vec<Option<(usize, usize)>> = self
            .sections
            .iter()
            .map(|(_, pattern)| pattern.find(text).map(|m| (m.start(), m.end())))
            .collect();

        let values = self
            .sections
            .iter()
            .zip(&headers)
            .map(|((section, _), header)| {
                let body = header.map(|(_, body_start)| {
                    let body_end = headers
                        .iter()
                        .flatten()
                        .map(|(start, _)| *start)
                        .filter(|start| *start >= body_start)
                        .min()
                        .unwrap_or(text.len());
                    text[body_start..body_end].trim().to_string()
                });
                (*section, body)
            })
            .collect();

        ParsedSections { values }
    }
}

/// Result of [`SectionParser::parse`], in the parser's section order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSections {
    values: Vec<(Section, Option<String>)>,
}

impl ParsedSections {
    /// Body of the section with `label`, or its fallback when the header was
    /// missing. Unknown labels yield an empty string.
    pub fn get(&self, label: &str) -> &str {
        self.values
            .iter()
            .find(|(section, _)| section.label == label)
            .map(|(section, body)| body.as_deref().unwrap_or(section.fallback))
            .unwrap_or("")
    }

    /// Whether the header for `label` was present in the text.
    pub fn found(&self, label: &str) -> bool {
        self.values
            .iter()
            .any(|(section, body)| section.label == label && body.is_some())
    }

    /// Take the body of `section`, falling back to its placeholder.
    pub fn take(&mut self, section: Section) -> String {
        self.values
            .iter_mut()
            .find(|(s, _)| *s == section)
            .and_then(|(_, body)| body.take())
            .unwrap_or_else(|| section.fallback.to_string())
    }
}

/// One `Course N:` block of a multi-course completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseBlock<'a> {
    /// Whatever followed `Course N:` on the header line.
    pub title: &'a str,
    pub body: &'a str,
}

/// Split a completion into its `Course N:` blocks, in header order. Text
/// before the first header is dropped.
pub fn split_courses(text: &str) -> Vec<CourseBlock<'_>> {
    let headers: Vec<_> = COURSE_HEADER.captures_iter(text).collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let title = caps.get(1).map_or("", |m| m.as_str());
            let body_end = headers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());
            CourseBlock {
                title: title.trim().trim_matches('*').trim(),
                body: &text[whole.end..body_end],
            }
        })
        .collect()
}
