// src/core/html.rs
// Tolerant, case-insensitive tag scanning over serialized page markup.
// No DOM, just byte offsets into the original string.

pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Next `<o ...> ... c` block at or after `from`. Not nesting-aware.
/// `lc` is `to_lower(s)`; offsets line up since
/// only ASCII is folded.
pub fn next_tag_block_ci(s: &str, lc: &str, o: &str, c: &str, from: usize) -> Option<(usize, usize)> {
    let ol = to_lower(o);
    let cl = to_lower(c);
    let mut search = from;
    loop {
        let start = lc.get(search..)?.find(&ol)? + search;
        // "<tr" must not match "<track"
        let after = lc.as_bytes().get(start + ol.len()).copied();
        if ol.starts_with('<') && after.is_some_and(|b| b.is_ascii_alphanumeric()) {
            search = start + ol.len();
            continue;
        }
        let open_end = s[start..].find('>')? + start + 1;
        let end_rel = lc[open_end..].find(&cl)?;
        let end = open_end + end_rel + c.len();
        return Some((start, end));
    }
}

pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return block[oe + 1..cs].to_string();
            }
        }
    }
    s!()
}

/// Next element whose *opening tag* contains `needle` (e.g. `role="row"`),
/// as the span from its `<` to the end of its balanced closing tag.
/// `lc` is `to_lower(s)`.
pub fn next_element_with_ci(s: &str, lc: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    let nl = to_lower(needle);
    let mut search = from;
    loop {
        let hit = lc.get(search..)?.find(&nl)? + search;
        search = hit + nl.len();

        let Some(start) = lc[..hit].rfind('<') else { continue };
        if lc[start..hit].contains('>') { continue; } // needle was in text, not in a tag
        let name: String = lc[start + 1..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if name.is_empty() { continue; }

        let open_end = s[start..].find('>')? + start + 1;
        if s[..open_end].ends_with("/>") {
            return Some((start, open_end));
        }
        let end = balanced_close(lc, &name, open_end)?;
        return Some((start, end));
    }
}

/// End offset of the closing tag matching an element opened just before `from`.
fn balanced_close(lc: &str, name: &str, from: usize) -> Option<usize> {
    let open = format!("<{name}");
    let close = format!("</{name}");
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let next_close = lc[pos..].find(&close)? + pos;
        let mut p = pos;
        while let Some(o) = lc[p..next_close].find(&open) {
            let at = p + o;
            let after = lc.as_bytes().get(at + open.len()).copied();
            if matches!(after, Some(b' ' | b'>' | b'\t' | b'\n' | b'\r' | b'/')) {
                depth += 1;
            }
            p = at + open.len();
        }
        let close_end = next_close + lc[next_close..].find('>')? + 1;
        depth -= 1;
        if depth == 0 { return Some(close_end); }
        pos = close_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_block_skips_longer_tag_names() {
        let html = "<track src=x></track><TR class=a><td>1</td></TR>";
        let (s, e) = next_tag_block_ci(html, &to_lower(html), "<tr", "</tr>", 0).unwrap();
        assert_eq!(&html[s..e], "<TR class=a><td>1</td></TR>");
    }

    #[test]
    fn element_with_attr_is_balanced() {
        let html = r#"<p>role="row" in text</p><div role="row"><div role="cell"><div>a</div></div><div role="cell">b</div></div><div role="row"></div>"#;
        let lc = to_lower(html);
        let (s, e) = next_element_with_ci(html, &lc, r#"role="row""#, 0).unwrap();
        assert_eq!(
            &html[s..e],
            r#"<div role="row"><div role="cell"><div>a</div></div><div role="cell">b</div></div>"#
        );
        let (s2, _) = next_element_with_ci(html, &lc, r#"role="row""#, e).unwrap();
        assert_eq!(&html[s2..s2 + 16], r#"<div role="row">"#);
    }

    #[test]
    fn lowered_once_and_sliced_with_the_markup() {
        let html = "<TABLE><TR><TD>a</TD></TR></TABLE>";
        let lc = to_lower(html);
        let (s, e) = next_tag_block_ci(html, &lc, "<table", "</table>", 0).unwrap();
        let (tr_s, tr_e) = next_tag_block_ci(&html[s..e], &lc[s..e], "<tr", "</tr>", 0).unwrap();
        assert_eq!(&html[s..e][tr_s..tr_e], "<TR><TD>a</TD></TR>");
        assert_eq!(to_lower("Ünï<B>"), "Ünï<b>");
    }

    #[test]
    fn inner_after_open() {
        let td = "<td class=x><span>$1,000</span></td>";
        assert_eq!(inner_after_open_tag(td), "<span>$1,000</span>");
    }
}
