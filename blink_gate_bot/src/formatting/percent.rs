/// The `%XX` code for characters that get escaped by [`percent_encode`].
///
/// This is a fixed set of ASCII punctuation plus space, not RFC 3986.
/// Notably `"` is left alone while `-`, `.`, `_` and `~` are escaped.
const fn reserved_code(c: char) -> Option<&'static str> {
    Some(match c {
        ' ' => "%20",
        '!' => "%21",
        '#' => "%23",
        '$' => "%24",
        '%' => "%25",
        '&' => "%26",
        '\'' => "%27",
        '(' => "%28",
        ')' => "%29",
        '*' => "%2A",
        '+' => "%2B",
        ',' => "%2C",
        '-' => "%2D",
        '.' => "%2E",
        '/' => "%2F",
        ':' => "%3A",
        ';' => "%3B",
        '<' => "%3C",
        '=' => "%3D",
        '>' => "%3E",
        '?' => "%3F",
        '@' => "%40",
        '[' => "%5B",
        '\\' => "%5C",
        ']' => "%5D",
        '^' => "%5E",
        '_' => "%5F",
        '`' => "%60",
        '{' => "%7B",
        '|' => "%7C",
        '}' => "%7D",
        '~' => "%7E",
        _ => return None,
    })
}

/// Escape every reserved character of `text` for use inside a URL query
/// component. Everything else, including non-ASCII characters, is copied
/// as is.
#[must_use]
pub fn percent_encode(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match reserved_code(c) {
            Some(code) => output.push_str(code),
            None => output.push(c),
        }
    }
    output
}
