//! Router output validation.
//!
//! The router model is asked for a bracketed list of expert names. Its reply
//! is free text, so it is validated strictly: extract the list, read each
//! quoted token, keep only registry names.

use super::experts::Expert;
use super::roster::{SelectedExperts, MAX_ROSTER_SIZE};

/// Router reply could not be turned into a roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterParseError {
    #[error("Router reply contains no bracketed list")]
    NoList,

    #[error("Router list is malformed: {0}")]
    Malformed(String),

    #[error("Router list names no registered expert (got {rejected:?})")]
    NoKnownExperts { rejected: Vec<String> },
}

/// Parses a router reply into a roster of registered experts.
///
/// Accepts a JSON array or a single-quoted list anywhere in the reply, so
/// code fences, a stray preamble or a trailing bracketed note do not defeat
/// parsing. Each balanced top-level list is tried in order and the first one
/// naming a registered expert wins. Unknown names are dropped, duplicates
/// removed, and the result capped at [`MAX_ROSTER_SIZE`].
///
/// # Errors
///
/// Returns an error when no list can be read or none of its names is in
/// the registry. With several candidate lists, the first list's error is
/// reported.
pub fn parse_router_output(text: &str) -> Result<SelectedExperts, RouterParseError> {
    let mut first_error = None;
    for list in bracketed_lists(text) {
        match roster_from_list(list) {
            Ok(roster) => return Ok(roster),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    Err(first_error.unwrap_or(RouterParseError::NoList))
}

fn roster_from_list(list: &str) -> Result<SelectedExperts, RouterParseError> {
    let tokens = read_tokens(list)?;

    let (known, rejected): (Vec<String>, Vec<String>) = tokens
        .into_iter()
        .map(|token| token.trim().to_string())
        .partition(|token| Expert::from_name(token).is_ok());

    let roster = SelectedExperts::from_names(known).truncated(MAX_ROSTER_SIZE);
    if roster.is_empty() {
        return Err(RouterParseError::NoKnownExperts { rejected });
    }
    Ok(roster)
}

/// Balanced top-level `[...]` spans in order of appearance.
///
/// Brackets inside quoted tokens do not count. A quote only opens a token
/// right after `[` or `,`, so apostrophes in surrounding prose are ignored.
fn bracketed_lists(text: &str) -> Vec<&str> {
    let mut lists = Vec::new();
    let mut start = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut previous = ' ';

    for (idx, ch) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open {
                quote = None;
                previous = ch;
            }
            continue;
        }

        match ch {
            '[' => {
                if depth == 0 {
                    start = Some(idx);
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(begin) = start.take() {
                        lists.push(&text[begin..=idx]);
                    }
                }
            }
            '"' | '\'' if depth > 0 && matches!(previous, '[' | ',') => quote = Some(ch),
            _ => {}
        }
        if !ch.is_whitespace() {
            previous = ch;
        }
    }
    lists
}

fn read_tokens(list: &str) -> Result<Vec<String>, RouterParseError> {
    if let Ok(tokens) = serde_json::from_str::<Vec<String>>(list) {
        return Ok(tokens);
    }

    let inner = list[1..list.len() - 1].trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|raw| {
            let raw = raw.trim();
            unquote(raw).ok_or_else(|| RouterParseError::Malformed(raw.to_string()))
        })
        .collect()
}

fn unquote(raw: &str) -> Option<String> {
    ['\'', '"'].iter().find_map(|&quote| {
        raw.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_list() {
        let roster =
            parse_router_output(r#"["CBT Expert", "Gottman Method Expert", "Lawyer Expert"]"#)
                .unwrap();
        assert_eq!(
            roster.names(),
            &["CBT Expert", "Gottman Method Expert", "Lawyer Expert"]
        );
    }

    #[test]
    fn parses_single_quoted_list() {
        let roster = parse_router_output("['EFT Expert', 'Psychiatrist']").unwrap();
        assert_eq!(roster.names(), &["EFT Expert", "Psychiatrist"]);
    }

    #[test]
    fn finds_list_inside_code_fence() {
        let reply = "```json\n[\"Financial Psychology Expert\", \"CBT Expert\"]\n```";
        let roster = parse_router_output(reply).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn drops_unknown_names_and_duplicates() {
        let roster = parse_router_output(
            r#"["Astrologer", "CBT Expert", "CBT Expert", "EFT Expert"]"#,
        )
        .unwrap();
        assert_eq!(roster.names(), &["CBT Expert", "EFT Expert"]);
    }

    #[test]
    fn caps_roster_at_five() {
        let reply = r#"["CBT Expert", "EFT Expert", "Gottman Method Expert",
            "Solution-Focused Expert", "Financial Psychology Expert", "Psychiatrist"]"#;
        let roster = parse_router_output(reply).unwrap();
        assert_eq!(roster.len(), MAX_ROSTER_SIZE);
        assert!(!roster.names().contains(&"Psychiatrist".to_string()));
    }

    #[test]
    fn duplicates_do_not_count_toward_the_cap() {
        let reply = r#"["CBT Expert", "CBT Expert", "CBT Expert", "CBT Expert",
            "CBT Expert", "EFT Expert"]"#;
        let roster = parse_router_output(reply).unwrap();
        assert_eq!(roster.names(), &["CBT Expert", "EFT Expert"]);
    }

    #[test]
    fn trailing_bracketed_note_does_not_hide_the_list() {
        let reply = "[\"Financial Psychology Expert\", \"Gottman Method Expert\", \"CBT Expert\"]\n\
                     [Selected for the money conflict]";
        let roster = parse_router_output(reply).unwrap();
        assert_eq!(
            roster.names(),
            &["Financial Psychology Expert", "Gottman Method Expert", "CBT Expert"]
        );
    }

    #[test]
    fn leading_bracketed_note_is_skipped() {
        let reply = "[the user's main worry is money]\n['Financial Psychology Expert', 'EFT Expert']";
        let roster = parse_router_output(reply).unwrap();
        assert_eq!(roster.names(), &["Financial Psychology Expert", "EFT Expert"]);
    }

    #[test]
    fn bracket_inside_quoted_token_does_not_close_the_list() {
        let lists = bracketed_lists(r#"["CBT ] Expert", "EFT Expert"] tail"#);
        assert_eq!(lists, vec![r#"["CBT ] Expert", "EFT Expert"]"#]);
    }

    #[test]
    fn unbalanced_list_is_rejected() {
        assert_eq!(
            parse_router_output(r#"["CBT Expert", "EFT Expert""#),
            Err(RouterParseError::NoList)
        );
    }

    #[test]
    fn prose_is_rejected() {
        assert_eq!(
            parse_router_output("I think the CBT Expert fits best."),
            Err(RouterParseError::NoList)
        );
        assert_eq!(parse_router_output(""), Err(RouterParseError::NoList));
    }

    #[test]
    fn unquoted_tokens_are_malformed() {
        assert!(matches!(
            parse_router_output("[CBT Expert, EFT Expert]"),
            Err(RouterParseError::Malformed(_))
        ));
    }

    #[test]
    fn list_of_only_unknown_names_is_rejected() {
        assert_eq!(
            parse_router_output(r#"["Astrologer"]"#),
            Err(RouterParseError::NoKnownExperts {
                rejected: vec!["Astrologer".to_string()]
            })
        );
        assert!(matches!(
            parse_router_output("[]"),
            Err(RouterParseError::NoKnownExperts { .. })
        ));
    }
}
