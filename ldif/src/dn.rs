//! Distinguished-name grammar and SAFE-STRING classification.

use std::sync::OnceLock;

use regex::Regex;

// Attribute types are ASCII only; values may hold any character.
const ATTRTYPE_PATTERN: &str = r"(?-u:[\w;.])+(?:;(?-u:[\w_-])+)*";
const ATTRVALUE_PATTERN: &str = r#"(?:(?:[^,]|\\,)+|".*?")"#;

fn dn_regex() -> &'static Regex {
    static DN_REGEX: OnceLock<Regex> = OnceLock::new();
    DN_REGEX.get_or_init(|| {
        let rdn = format!("{ATTRTYPE_PATTERN}[ ]*=[ ]*{ATTRVALUE_PATTERN}");
        let dn = format!(r"\A{rdn}(?:[ ]*,[ ]*{rdn})*[ ]*\z");
        Regex::new(&dn).expect("DN grammar is a valid regex")
    })
}

/// Is `s` the string representation of a distinguished name?
///
/// The empty string is the root DN and therefore valid.  Anything else has
/// to match `RDN (',' RDN)*` as a whole, where every RDN is
/// `attrtype '=' value` and a value is either a quoted string or a run of
/// characters in which commas are backslash-escaped.
pub fn is_dn(s: &str) -> bool {
    s.is_empty() || dn_regex().is_match(s)
}

/// Does `data` have to be base64-encoded to survive as an LDIF value?
///
/// True when the value starts with NUL, LF, CR, space, colon or `<`,
/// contains NUL, LF, CR or a byte >= 0x80, or ends with a space.
pub fn needs_base64(data: &[u8]) -> bool {
    let (first, last) = match (data.first(), data.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return false,
    };
    if matches!(first, 0 | b'\n' | b'\r' | b' ' | b':' | b'<') {
        return true;
    }
    if last == b' ' {
        return true;
    }
    data.iter()
        .any(|&c| c == 0 || c == b'\r' || c == b'\n' || c >= 0x80)
}
