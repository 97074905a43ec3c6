/// Removes `<...>` markup runs and trims surrounding whitespace.
///
/// Matches the narrow `<[^>]*>` contract: a `<` with no closing `>` is kept
/// verbatim. Source payloads carry well-formed highlighting spans only; if
/// that ever changes, this is the one seam to swap for a real parser.
#[must_use]
pub(crate) fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + end + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
