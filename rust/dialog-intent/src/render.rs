//! Rendering the winning entry into response text and an optional payload.
//!
//! Three placeholders are understood:
//!
//! | placeholder  | value                              |
//! |--------------|------------------------------------|
//! | `{subject}`  | the extracted subject              |
//! | `{username}` | the user's name                    |
//! | `{name}`     | the assistant's name               |
//!
//! Anything else in braces is left as written. Substitution is a single
//! left-to-right pass, so a value that itself looks like a placeholder is
//! never expanded again.

use serde::{Deserialize, Serialize};

use crate::config::{MatcherConfig, Responses};
use crate::dispatch::DispatchPayload;
use crate::knowledge::{CommandKind, Entry};

const SUBJECT: &str = "subject";

/// Who is talking to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identities {
    pub user_name: String,
    pub agent_name: String,
}

impl Identities {
    pub fn new(user_name: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Identities {
            user_name: user_name.into(),
            agent_name: agent_name.into(),
        }
    }
}

impl From<&MatcherConfig> for Identities {
    fn from(config: &MatcherConfig) -> Self {
        Identities::new(config.user_name.clone(), config.agent_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub dispatch: Option<DispatchPayload>,
}

impl Rendered {
    pub fn text(text: String) -> Self {
        Rendered {
            text,
            dispatch: None,
        }
    }
}

/// Substitute known placeholders in `template`.
pub fn fill(template: &str, subject: &str, identities: &Identities) -> String {
    let mut out = String::with_capacity(template.len() + subject.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        // a nested '{' means this brace was not a placeholder opener
        if name.contains('{') {
            out.push('{');
            rest = after;
            continue;
        }

        match name {
            SUBJECT => out.push_str(subject),
            "username" => out.push_str(&identities.user_name),
            "name" => out.push_str(&identities.agent_name),
            _ => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// The subject as a URL query: punctuation around each word dropped,
/// words joined by `+`.
fn url_query(subject: &str) -> String {
    subject
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("+")
}

fn mentions_subject(template: &str) -> bool {
    template.contains("{subject}")
}

/// Render `entry` for the given subject.
///
/// A `url:` command that needs a subject but did not get one renders the
/// `missing_subject` response and no payload.
pub fn render(
    entry: &Entry,
    subject: &str,
    identities: &Identities,
    responses: &Responses,
) -> Rendered {
    let template = match entry.response_template() {
        t if t.trim().is_empty() => responses.missing_template.as_str(),
        t => t,
    };
    let text = fill(template, subject, identities);

    let Some(command) = entry.command() else {
        return Rendered::text(text);
    };

    let body = match command.kind {
        CommandKind::OpenUrl => {
            let query = url_query(subject);
            if query.is_empty() && mentions_subject(&command.body) {
                tracing::debug!(entry = %entry.id(), "url command needs a subject");
                return Rendered::text(fill(&responses.missing_subject, subject, identities));
            }
            fill(&command.body, &query, identities)
        }
        CommandKind::Evaluate => fill(&command.body, subject, identities),
    };

    Rendered {
        text,
        dispatch: Some(DispatchPayload::new(command.kind, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{EntryDefinition, Registry};
    use crate::normalize::Normalizer;
    use pretty_assertions::assert_eq;

    fn identities() -> Identities {
        Identities::new("Ada", "Isaac")
    }

    fn entry(definition: EntryDefinition) -> Registry {
        Registry::new(vec![definition], vec![], &Normalizer::default()).unwrap()
    }

    #[test]
    fn fills_known_placeholders() {
        assert_eq!(
            fill("Hi {username}, I am {name}. {subject}?", "tea", &identities()),
            "Hi Ada, I am Isaac. tea?"
        );
    }

    #[test]
    fn leaves_unknown_and_unbalanced_braces() {
        assert_eq!(
            fill("{greeting} {username} {x {name}", "", &identities()),
            "{greeting} Ada {x Isaac"
        );
        assert_eq!(fill("tail {subject", "s", &identities()), "tail {subject");
    }

    #[test]
    fn values_are_not_expanded_twice() {
        let sneaky = Identities::new("{name}", "Isaac");
        assert_eq!(fill("Hello {username}", "", &sneaky), "Hello {name}");
    }

    #[test]
    fn url_subject_uses_plus_for_spaces() {
        let registry = entry(
            EntryDefinition::new(["youtube"], 4.5)
                .respond("Searching YouTube for {subject}.")
                .command("url:https://www.youtube.com/results?search_query={subject}"),
        );
        let rendered = render(
            &registry.core()[0],
            "lofi beats",
            &identities(),
            &Responses::default(),
        );

        assert_eq!(rendered.text, "Searching YouTube for lofi beats.");
        assert_eq!(
            rendered.dispatch,
            Some(DispatchPayload::new(
                CommandKind::OpenUrl,
                "https://www.youtube.com/results?search_query=lofi+beats"
            ))
        );
    }

    #[test]
    fn url_query_trims_punctuation_around_words() {
        assert_eq!(url_query("brackeys!"), "brackeys");
        assert_eq!(url_query("\"lofi\"   beats, please?"), "lofi+beats+please");
        assert_eq!(url_query("rust's borrow-checker"), "rust's+borrow-checker");
        assert_eq!(url_query("?! ..."), "");
    }

    #[test]
    fn url_subject_of_only_punctuation_counts_as_missing() {
        let registry = entry(
            EntryDefinition::new(["google"], 4.0)
                .respond("Searching for {subject}.")
                .command("url:https://www.google.com/search?q={subject}"),
        );
        let rendered = render(&registry.core()[0], "?!", &identities(), &Responses::default());
        assert_eq!(rendered.dispatch, None);
        assert_eq!(rendered.text, Responses::default().missing_subject);
    }

    #[test]
    fn url_without_subject_asks_for_one() {
        let registry = entry(
            EntryDefinition::new(["google"], 4.0)
                .respond("Searching for {subject}.")
                .command("url:https://www.google.com/search?q={subject}"),
        );
        let rendered = render(&registry.core()[0], "", &identities(), &Responses::default());

        assert_eq!(
            rendered,
            Rendered::text("Please specify what you want me to search for.".into())
        );
    }

    #[test]
    fn evaluate_body_is_forwarded_unevaluated() {
        let registry = entry(
            EntryDefinition::new(["time"], 5.0)
                .respond("The time is")
                .command("py: datetime.datetime.now().strftime('%H:%M')"),
        );
        let rendered = render(&registry.core()[0], "", &identities(), &Responses::default());

        assert_eq!(rendered.text, "The time is");
        assert_eq!(
            rendered.dispatch,
            Some(DispatchPayload::new(
                CommandKind::Evaluate,
                "datetime.datetime.now().strftime('%H:%M')"
            ))
        );
    }

    #[test]
    fn empty_template_uses_configured_text() {
        let registry = entry(EntryDefinition::new(["hello"], 2.0));
        let rendered = render(&registry.core()[0], "", &identities(), &Responses::default());
        assert_eq!(rendered.text, "I'm not sure how to respond.");
    }
}
