//! Input line tokenization.
//!
//! Tokens are separated by runs of whitespace. A double-quoted section keeps
//! its whitespace and the quotes are stripped. There is no escape sequence for
//! a literal `"` inside a quoted section, and an unterminated quote runs to the
//! end of the input.

/// Split `text` into tokens.
///
/// ```
/// use conch::tokenize::tokenize;
///
/// assert_eq!(tokenize(r#"a "b c" d"#), vec!["a", "b c", "d"]);
/// assert!(tokenize("").is_empty());
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some((token, remainder)) = next_token(rest) {
        tokens.push(token);
        rest = remainder;
    }
    tokens
}

/// Split off the first token and return the untouched remainder.
///
/// The remainder keeps its original quoting so the command that receives it
/// can interpret it however it likes. Empty input yields an empty token.
///
/// ```
/// use conch::tokenize::split_first;
///
/// let (first, rest) = split_first(r#"  file "my notes.txt"  "#);
/// assert_eq!(first, "file");
/// assert_eq!(rest, r#""my notes.txt""#);
/// ```
pub fn split_first(text: &str) -> (String, &str) {
    match next_token(text) {
        Some((first, rest)) => (first, rest.trim()),
        None => (String::new(), ""),
    }
}

/// Join tokens back into parameter text, quoting tokens that need it.
pub fn to_param_string<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            if token.is_empty() || token.chars().any(char::is_whitespace) {
                format!("\"{}\"", token)
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_token(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    let mut token = String::new();
    let mut quoted = false;
    for (index, ch) in text.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => return Some((token, &text[index..])),
            c => token.push(c),
        }
    }
    Some((token, ""))
}
