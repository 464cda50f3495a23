use std::fmt::Write;

/// Escape raw string content for a JSON string literal.
///
/// `"`, `\`, backspace, form feed, newline, carriage return and tab become
/// their two-character escapes. The solidus `/` is always escaped, which is
/// stricter than the grammar requires but matches what existing consumers of
/// this output expect. Characters in U+0000–U+001F, U+007F–U+009F and
/// U+2000–U+20FF become `\uXXXX` with four uppercase hex digits. Everything
/// else passes through unchanged.
///
/// This function knows nothing about JSON structure; it only transforms the
/// content that will sit between the quotes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, &mut out);
    out
}

/// [`escape`] into an existing buffer.
pub fn escape_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' => out.push_str("\\/"),
            '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' | '\u{2000}'..='\u{20FF}' => {
                // All three ranges sit below U+FFFF, so four digits always fit.
                let _ = write!(out, "\\u{:04X}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
}
