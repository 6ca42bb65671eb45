//! Repair of line-broken extracted text.
//!
//! PDF extraction splits hyphenated words across lines (`ener-\ngy`). The only
//! repair performed here is rejoining those; whitespace, case and every
//! character inside math spans are left exactly as extracted.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S)-\n(\S)").expect("valid hyphen break regex"));

// Math may legitimately span lines and contain `-` before a newline. Inline
// `$…$` is only protected when it crosses a line, which keeps currency
// amounts on a single line out of it.
static MATH_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)\$\$.*?\$\$|\\\[.*?\\\]|\\begin\{[A-Za-z*]+\}.*?\\end\{[A-Za-z*]+\}|\$[^$\n]*\n[^$]*?\$",
    )
    .expect("valid math span regex")
});

/// Rejoin words split by a hyphen at a line break, outside math spans.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in MATH_SPAN.find_iter(text) {
        out.push_str(&dehyphenate(&text[last..m.start()]));
        out.push_str(m.as_str());
        last = m.end();
    }
    out.push_str(&dehyphenate(&text[last..]));
    out
}

fn dehyphenate(text: &str) -> Cow<'_, str> {
    HYPHEN_BREAK.replace_all(text, "${1}${2}")
}
