//! Form hints embedded in parameter help text.
//!
//! Help text may carry a `<tag, tag>` group. When it names `secret` or
//! `prompt` the group is stripped from the visible text and the
//! corresponding form behaviour is enabled.

use std::sync::LazyLock;

use regex::Regex;

static TAG_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>]*)>").expect("static regex must compile"));

/// Placeholder in help text replaced by the parameter's default.
pub const DEFAULT_PLACEHOLDER: &str = "%(default)s";

/// Tags recognized in help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HelpTags {
    /// Mask the value while it is entered.
    pub secret: bool,
    /// The value is prompted for when the command runs.
    pub prompt: bool,
}

impl HelpTags {
    /// Returns `true` if any recognized tag is set.
    pub fn any(&self) -> bool {
        self.secret || self.prompt
    }
}

/// Parses the first tag group out of `help`.
///
/// Returns the visible help text and the tags found. The group is removed
/// only when it contains a recognized tag, so ordinary `<PATH>`-style text
/// is left alone.
///
/// # Examples
///
/// ```
/// use cmdform_introspect::extract_tags;
///
/// let (help, tags) = extract_tags("API token <secret, prompt>");
/// assert_eq!(help, "API token");
/// assert!(tags.secret && tags.prompt);
///
/// let (help, tags) = extract_tags("Write to <FILE>");
/// assert_eq!(help, "Write to <FILE>");
/// assert!(!tags.any());
/// ```
pub fn extract_tags(help: &str) -> (String, HelpTags) {
    let Some(group) = TAG_GROUP_RE.captures(help) else {
        return (help.to_string(), HelpTags::default());
    };

    let mut tags = HelpTags::default();
    if let Some(inner) = group.get(1) {
        for tag in inner.as_str().split(',').map(str::trim) {
            match tag {
                "secret" => tags.secret = true,
                "prompt" => tags.prompt = true,
                _ => {}
            }
        }
    }

    if !tags.any() {
        return (help.to_string(), tags);
    }

    let visible = match group.get(0) {
        Some(whole) => format!("{}{}", &help[..whole.start()], &help[whole.end()..]),
        None => help.to_string(),
    };
    (visible.trim().to_string(), tags)
}

/// Substitutes the default's display form into `help`.
pub fn substitute_default(help: &str, default: &str) -> String {
    help.replace(DEFAULT_PLACEHOLDER, default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_group_is_considered() {
        let (help, tags) = extract_tags("Use <FILE> here <secret>");
        assert_eq!(help, "Use <FILE> here <secret>");
        assert!(!tags.secret);
    }

    #[test]
    fn test_prompt_tag_alone() {
        let (help, tags) = extract_tags("<prompt> Password for the account");
        assert_eq!(help, "Password for the account");
        assert_eq!(
            tags,
            HelpTags {
                secret: false,
                prompt: true
            }
        );
    }

    #[test]
    fn test_substitute_default() {
        assert_eq!(
            substitute_default("Retries (default: %(default)s)", "3"),
            "Retries (default: 3)"
        );
    }
}
