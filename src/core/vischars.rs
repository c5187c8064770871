// src/core/vischars.rs
// Visible-text character iterator over an HTML fragment.
// Skips tags (<...>), comments and <script>/<style> bodies, decodes common
// entities, collapses ASCII whitespace to a single ' '.
// In line mode block-level tags become '\n' so the output splits like innerText.

use super::sanitize::normalize_ws;

const BLOCK_TAGS: &[&str] = &[
    "article", "aside", "blockquote", "br", "button", "dd", "div", "dl", "dt", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

pub struct VisChars<'a> {
    s: &'a str,
    b: &'a [u8],
    i: usize,
    n: usize,
    tag_breaks: bool,
}

impl<'a> VisChars<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, b: s.as_bytes(), i: 0, n: s.len(), tag_breaks: false }
    }

    /// Like `new`, but block-level tags yield '\n'.
    pub fn lines(s: &'a str) -> Self {
        Self { tag_breaks: true, ..Self::new(s) }
    }

    #[inline]
    fn at_tag(&self) -> bool {
        matches!(self.b.get(self.i + 1), Some(c) if c.is_ascii_alphabetic() || *c == b'/' || *c == b'!')
    }

    /// Called when the current byte is '<'. Returns (lowercase name, is_closing).
    fn skip_tag(&mut self) -> (String, bool) {
        if self.s[self.i..].starts_with("<!--") {
            self.i = match self.s[self.i + 4..].find("-->") {
                Some(p) => self.i + 4 + p + 3,
                None => self.n,
            };
            return (s!(), false);
        }
        self.i += 1;
        let closing = self.b.get(self.i) == Some(&b'/');
        if closing { self.i += 1; }
        let name_start = self.i;
        while self.i < self.n && self.b[self.i].is_ascii_alphanumeric() { self.i += 1; }
        let name = self.s[name_start..self.i].to_ascii_lowercase();

        let mut in_s = false; // '
        let mut in_d = false; // "
        while self.i < self.n {
            match self.b[self.i] {
                b'\'' if !in_d => in_s = !in_s,
                b'"'  if !in_s => in_d = !in_d,
                b'>' if !in_s && !in_d => { self.i += 1; break; }
                _ => {}
            }
            self.i += 1;
        }
        (name, closing)
    }

    /// Jump to the closing tag of a raw-text element (script/style).
    fn skip_raw_text(&mut self, name: &str) {
        let close = format!("</{name}");
        let rest = super::html::to_lower(&self.s[self.i..]);
        self.i = match rest.find(&close) {
            Some(p) => self.i + p,
            None => self.n,
        };
    }

    /// Called when the current byte is '&'. Consumes and decodes a known entity.
    fn entity(&mut self) -> Option<char> {
        let rest = &self.s[self.i..];
        let end = rest.bytes().take(10).position(|c| c == b';')?;
        let name = &rest[1..end];
        let ch = match name {
            "nbsp" | "#160" => ' ',
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" | "#39" | "#x27" => '\'',
            "hellip" => '…',
            _ => {
                let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    name.strip_prefix('#')?.parse().ok()?
                };
                char::from_u32(code)?
            }
        };
        self.i += end + 1;
        Some(ch)
    }

    #[inline]
    fn next_char(&mut self) -> Option<char> {
        if self.i >= self.n { return None; }
        let c = self.b[self.i];
        if c < 0x80 { self.i += 1; Some(c as char) }
        else {
            let ch = self.s[self.i..].chars().next()?;
            self.i += ch.len_utf8();
            Some(ch)
        }
    }
}

impl<'a> Iterator for VisChars<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.n {
            match self.b[self.i] {
                b'<' if self.at_tag() => {
                    let (name, closing) = self.skip_tag();
                    if !closing && (name == "script" || name == "style") {
                        self.skip_raw_text(&name);
                    }
                    if self.tag_breaks && BLOCK_TAGS.contains(&name.as_str()) {
                        return Some('\n');
                    }
                    continue;
                }
                b'&' => {
                    if let Some(ch) = self.entity() { return Some(ch); }
                    self.i += 1;
                    return Some('&');
                }
                b' ' | b'\t' | b'\r' | b'\n' => {
                    while self.i < self.n {
                        match self.b[self.i] { b' ' | b'\t' | b'\r' | b'\n' => self.i += 1, _ => break }
                    }
                    return Some(' ');
                }
                _ => return self.next_char(),
            }
        }
        None
    }
}

/// Visible text of a fragment on one line, trimmed.
pub fn visible_text(s: &str) -> String {
    normalize_ws(&VisChars::new(s).collect::<String>())
}

/// Visible text split at block boundaries, empty lines dropped.
pub fn visible_lines(s: &str) -> Vec<String> {
    VisChars::lines(s)
        .collect::<String>()
        .split('\n')
        .map(normalize_ws)
        .filter(|l| !l.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_text_drops_tags_and_decodes() {
        let html = r#"<td class="vol"><span>$</span><b>24,356,207</b>&nbsp;</td>"#;
        assert_eq!(visible_text(html), "$24,356,207");
        assert_eq!(visible_text("a &amp; b &#8230;"), "a & b …");
        assert_eq!(visible_text("&lt; 01 &gt;"), "< 01 >");
    }

    #[test]
    fn lines_break_on_blocks_and_skip_scripts() {
        let html = r#"<div>3Bwp...QA2m</div><script>var x = "<div>no</div>";</script>
            <div><span>LVL</span> <span>6</span></div><!-- <div>hidden</div> --><p>$24,356,207</p>"#;
        assert_eq!(visible_lines(html), vec!["3Bwp...QA2m", "LVL 6", "$24,356,207"]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(visible_text("< 01 > rank"), "< 01 > rank");
    }
}
