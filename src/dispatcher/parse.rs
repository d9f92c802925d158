//! Event-string grammar.
//!
//! An event string is a whitespace-separated list of tokens. Each token is an
//! event id optionally followed by `.tag` segments: `"save.draft.local"` is
//! id `save` with tags `draft` and `local`. The id may be empty (`".draft"`),
//! which only some operations accept. Malformed input never fails; stray
//! dots produce empty ids or empty tags, and an empty tag only matches
//! callbacks registered with one.

use crate::namespace::Namespaces;

/// One parsed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventToken {
    /// Event id. Empty when the token starts with a dot.
    pub id: String,
    /// Namespace tags following the id.
    pub namespaces: Namespaces,
}

impl EventToken {
    /// Parses a single token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let mut parts = token.split('.');
        let id = parts.next().unwrap_or_default().to_string();
        let namespaces = parts.collect();
        Self { id, namespaces }
    }

    /// True when the token carries an id.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Splits an event string into tokens, in order.
pub fn tokens(events: &str) -> impl Iterator<Item = EventToken> + '_ {
    events.split_whitespace().map(EventToken::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(list: &[&str]) -> Namespaces {
        list.iter().copied().collect()
    }

    #[test]
    fn test_plain_and_namespaced() {
        let parsed: Vec<_> = tokens("a b.x c.x.y").collect();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], EventToken { id: "a".into(), namespaces: ns(&[]) });
        assert_eq!(parsed[1], EventToken { id: "b".into(), namespaces: ns(&["x"]) });
        assert_eq!(parsed[2], EventToken { id: "c".into(), namespaces: ns(&["x", "y"]) });
    }

    #[test]
    fn test_empty_id() {
        let token = EventToken::parse(".x");
        assert!(!token.has_id());
        assert_eq!(token.namespaces, ns(&["x"]));
    }

    #[test]
    fn test_blank_input_yields_nothing() {
        assert_eq!(tokens("").count(), 0);
        assert_eq!(tokens("   ").count(), 0);
    }

    #[test]
    fn test_stray_dots_become_empty_tags() {
        let token = EventToken::parse("a..x.");
        assert_eq!(token.id, "a");
        assert_eq!(token.namespaces, ns(&["", "x"]));

        let token = EventToken::parse(".");
        assert!(!token.has_id());
        assert_eq!(token.namespaces, ns(&[""]));
    }
}
