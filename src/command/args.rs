//! Argument tokenizer for command payloads.

use crate::identifier::is_user_id;

/// Separator between the target list and the free-text reason.
pub const REASON_DELIMITER: &str = " -r ";

/// Targets and optional reason parsed from a command payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    /// User identifiers in input order. Malformed tokens are dropped.
    pub users: Vec<String>,
    /// Reason text, absent when missing or whitespace-only.
    pub reason: Option<String>,
}

/// Split a payload into user identifiers and an optional reason.
///
/// Only the first [`REASON_DELIMITER`] splits; anything after it, including
/// further delimiters, is the reason verbatim.
///
/// # Examples
///
/// ```
/// use chatline::command::parse_users_and_reason;
///
/// let args = parse_users_and_reason("@a:x @b:y -r spam");
/// assert_eq!(args.users, vec!["@a:x", "@b:y"]);
/// assert_eq!(args.reason.as_deref(), Some("spam"));
/// ```
pub fn parse_users_and_reason(payload: &str) -> ParsedArguments {
    let (ids, reason) = match payload.split_once(REASON_DELIMITER) {
        Some((ids, reason)) => {
            let reason = (!reason.trim().is_empty()).then(|| reason.to_string());
            (ids, reason)
        }
        None => (payload, None),
    };

    ParsedArguments {
        users: parse_ids(ids, is_user_id),
        reason,
    }
}

/// Split on single spaces and keep the tokens accepted by `keep`.
pub fn parse_ids(payload: &str, keep: impl Fn(&str) -> bool) -> Vec<String> {
    payload
        .split(' ')
        .filter(|token| keep(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{is_room_alias, is_room_id};

    #[test]
    fn test_users_and_reason() {
        let args = parse_users_and_reason("@a:x @b:y -r spam");
        assert_eq!(args.users, vec!["@a:x", "@b:y"]);
        assert_eq!(args.reason, Some("spam".to_string()));
    }

    #[test]
    fn test_whitespace_reason_is_absent() {
        let args = parse_users_and_reason("@a:x @b:y -r  ");
        assert_eq!(args.users, vec!["@a:x", "@b:y"]);
        assert_eq!(args.reason, None);
    }

    #[test]
    fn test_no_delimiter() {
        let args = parse_users_and_reason("@a:x @b:y");
        assert_eq!(args.users, vec!["@a:x", "@b:y"]);
        assert_eq!(args.reason, None);
    }

    #[test]
    fn test_malformed_tokens_dropped() {
        let args = parse_users_and_reason("bob @a:x !room:x  #alias:x @c");
        assert_eq!(args.users, vec!["@a:x"]);
    }

    #[test]
    fn test_first_delimiter_wins() {
        let args = parse_users_and_reason("@a:x -r first -r second");
        assert_eq!(args.users, vec!["@a:x"]);
        assert_eq!(args.reason, Some("first -r second".to_string()));
    }

    #[test]
    fn test_reason_kept_verbatim() {
        let args = parse_users_and_reason("@a:x -r  padded reason ");
        assert_eq!(args.reason, Some(" padded reason ".to_string()));
    }

    #[test]
    fn test_delimiter_needs_surrounding_spaces() {
        let args = parse_users_and_reason("@a:x -rspam");
        assert_eq!(args.users, vec!["@a:x"]);
        assert_eq!(args.reason, None);
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(parse_users_and_reason(""), ParsedArguments::default());
    }

    #[test]
    fn test_order_preserved_and_nothing_invented() {
        let payload = "@z:x junk @m:x @a:x @m:x";
        let args = parse_users_and_reason(payload);
        assert_eq!(args.users, vec!["@z:x", "@m:x", "@a:x", "@m:x"]);
        for user in &args.users {
            assert!(payload.split(' ').any(|t| t == user));
        }
    }

    #[test]
    fn test_parse_ids_rooms() {
        let ids = parse_ids("!a:x #b:x @c:x", |t| is_room_id(t) || is_room_alias(t));
        assert_eq!(ids, vec!["!a:x", "#b:x"]);
    }
}
