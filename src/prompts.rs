use crate::models::StyleProfile;

pub const DESCRIPTION_SYSTEM: &str = include_str!("../data/prompts/description_system.txt");
pub const DESCRIPTION_USER: &str = include_str!("../data/prompts/description_user.txt");
pub const NAME_SYSTEM: &str = include_str!("../data/prompts/name_system.txt");
pub const NAME_USER: &str = include_str!("../data/prompts/name_user.txt");
pub const DETAILS_SYSTEM: &str = include_str!("../data/prompts/details_system.txt");
pub const DETAILS_USER: &str = include_str!("../data/prompts/details_user.txt");
pub const COURSES_SYSTEM: &str = include_str!("../data/prompts/courses_system.txt");
pub const COURSES_USER: &str = include_str!("../data/prompts/courses_user.txt");

/// Stand-in for an empty influence clause inside a prompt.
pub const NO_INFLUENCES: &str = "none in particular";

/// Replace `{{key}}` placeholders in a template string.
///
/// Substituted values are not scanned again, so user text containing
/// `{{...}}` is inserted verbatim. Unknown placeholders are left untouched.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let key = &after_open[..close];
                match vars.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => result.push_str(value),
                    None => {
                        result.push_str("{{");
                        result.push_str(key);
                        result.push_str("}}");
                    }
                }
                rest = &after_open[close + 2..];
            }
            None => {
                result.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Render the significant style weights as `"label: value"` joined by commas.
pub fn influence_clause(profile: &StyleProfile) -> String {
    profile
        .significant()
        .map(|(label, weight)| format!("{}: {}", label, weight))
        .collect::<Vec<_>>()
        .join(", ")
}
