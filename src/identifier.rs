//! Matrix identifier classification.
//!
//! Every function here is a pure function of the string form: no lookups,
//! no state. The command tokenizer and the unresolved-mention fallback both
//! rely on getting the same answer for the same token.

/// Sigils accepted at the start of an identifier.
const SIGILS: &[char] = &['@', '!', '$', '+', '#'];

/// Prefix of a content-address URI.
pub const MXC_SCHEME: &str = "mxc://";

/// Check whether a token has the `<sigil>localpart:server` shape.
///
/// The local part must be non-empty and free of `:`. The server part must
/// be a non-empty host or a bracketed IPv6 literal, optionally followed by
/// `:port` with a numeric port.
/// Whitespace is not allowed anywhere.
///
/// # Examples
///
/// ```
/// use chatline::identifier::valid_mx_id;
///
/// assert!(valid_mx_id("@alice:example.org"));
/// assert!(valid_mx_id("!room:example.org:8448"));
/// assert!(!valid_mx_id("alice:example.org"));
/// assert!(!valid_mx_id("@alice"));
/// ```
pub fn valid_mx_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if SIGILS.contains(&c) => {}
        _ => return false,
    }
    let rest = chars.as_str();
    if rest.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((localpart, server)) = rest.split_once(':') else {
        return false;
    };
    if localpart.is_empty() {
        return false;
    }
    valid_server_name(server)
}

fn valid_server_name(server: &str) -> bool {
    let (host, port) = match server.strip_prefix('[') {
        // IPv6 literal: `[addr]` or `[addr]:port`.
        Some(literal) => match literal.split_once(']') {
            Some((addr, rest)) if !addr.is_empty() && !addr.contains('[') => {
                match rest.strip_prefix(':') {
                    Some(port) => (addr, Some(port)),
                    None if rest.is_empty() => (addr, None),
                    None => return false,
                }
            }
            _ => return false,
        },
        None => match server.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (server, None),
        },
    };
    !host.is_empty() && port.map_or(true, valid_port)
}

fn valid_port(port: &str) -> bool {
    !port.is_empty() && port.chars().all(|c| c.is_ascii_digit())
}

/// Check whether a token is a user identifier (`@localpart:server`).
pub fn is_user_id(id: &str) -> bool {
    id.starts_with('@') && valid_mx_id(id)
}

/// Check whether a token is a room identifier (`!opaque:server`).
pub fn is_room_id(id: &str) -> bool {
    id.starts_with('!') && valid_mx_id(id)
}

/// Check whether a token is a room alias (`#alias:server`).
pub fn is_room_alias(id: &str) -> bool {
    id.starts_with('#') && valid_mx_id(id)
}

/// Get the local part of an identifier, without the sigil.
///
/// Returns `None` if the token is not a well-formed identifier.
pub fn local_part(id: &str) -> Option<&str> {
    if !valid_mx_id(id) {
        return None;
    }
    let (localpart, _) = id[1..].split_once(':')?;
    Some(localpart)
}

/// Get the server name of an identifier (everything after the first `:`).
///
/// Returns `None` if the token is not a well-formed identifier.
pub fn server_name(id: &str) -> Option<&str> {
    if !valid_mx_id(id) {
        return None;
    }
    let (_, server) = id.split_once(':')?;
    Some(server)
}

/// Build a user identifier from partially typed text.
///
/// If `@text` is already a valid identifier it is returned as is. Otherwise
/// the default domain is appended, adding the `:` separator unless the text
/// already ends with one. Never fails: the result is always shaped like an
/// identifier, but whether that user exists is not checked here.
///
/// # Examples
///
/// ```
/// use chatline::identifier::user_id_from_text;
///
/// assert_eq!(user_id_from_text("room", "example.org"), "@room:example.org");
/// assert_eq!(user_id_from_text("bob:", "example.org"), "@bob:example.org");
/// assert_eq!(user_id_from_text("bob:matrix.org", "example.org"), "@bob:matrix.org");
/// ```
pub fn user_id_from_text(text: &str, default_domain: &str) -> String {
    let candidate = format!("@{text}");
    if valid_mx_id(&candidate) {
        return candidate;
    }
    let separator = if text.ends_with(':') { "" } else { ":" };
    format!("{candidate}{separator}{default_domain}")
}

/// Check whether a payload is exactly one content-address URI (`mxc://` plus
/// at least one non-whitespace character, nothing else).
pub fn is_mxc_uri(payload: &str) -> bool {
    match payload.strip_prefix(MXC_SCHEME) {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}
