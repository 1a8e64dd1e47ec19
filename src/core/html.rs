// src/core/html.rs
//
// Case-insensitive scanning over serialized page source.
// Offsets into the lowercased copy are valid in the original: only ASCII is folded.

use super::sanitize::{normalize_entities, normalize_ws};

const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];
const BREAKING_TAGS: &[&str] = &["br", "p", "div", "td", "th", "tr", "li", "table"];

pub fn to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Element locator: tag name plus an optional attribute that must match exactly,
/// the way `table[border='1']` or `#tableTwo` match in a browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selector {
    pub tag: &'static str,
    pub attr: Option<(&'static str, &'static str)>,
}

impl Selector {
    pub const fn tag(tag: &'static str) -> Self {
        Self { tag, attr: None }
    }

    pub const fn with(tag: &'static str, name: &'static str, value: &'static str) -> Self {
        Self { tag, attr: Some((name, value)) }
    }

    pub fn matches(&self, opener: &str) -> bool {
        match self.attr {
            None => true,
            Some((name, value)) => attr(opener, name).is_some_and(|v| v == value),
        }
    }
}

/// Byte index just past the `>` that closes the tag opened at `start`.
/// Quoted attribute values may contain `>`.
pub fn opener_end(s: &str, start: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut quote: Option<u8> = None;
    let mut prev = b'<';
    let mut i = start + 1;
    while i < b.len() {
        let c = b[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if (c == b'"' || c == b'\'') && prev == b'=' => quote = Some(c),
            None if c == b'>' => return Some(i + 1),
            None => {}
        }
        if !c.is_ascii_whitespace() {
            prev = c;
        }
        i += 1;
    }
    None
}

/// Next `<tag` opening (not a longer tag name sharing the prefix) at or after `from`.
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = join!("<", tag);
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find(&pat) {
        let at = pos + rel;
        match lc.as_bytes().get(at + pat.len()) {
            Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/') | None => return Some(at),
            _ => pos = at + pat.len(),
        }
    }
    None
}

/// End of the element opened at `start`, counting nested elements of the same tag.
/// An unclosed element runs to the end of the input.
fn block_end(s: &str, lc: &str, tag: &str, start: usize) -> Option<usize> {
    let open_end = opener_end(s, start)?;
    if VOID_TAGS.contains(&tag) || s[..open_end].ends_with("/>") {
        return Some(open_end);
    }
    let close = join!("</", tag);
    let mut depth = 1usize;
    let mut pos = open_end;
    loop {
        let Some(next_close) = lc[pos..].find(&close).map(|r| pos + r) else {
            return Some(s.len());
        };
        match find_open(lc, tag, pos) {
            Some(o) if o < next_close => {
                depth += 1;
                pos = opener_end(s, o)?;
            }
            _ => {
                let end = lc[next_close..].find('>').map_or(s.len(), |r| next_close + r + 1);
                depth -= 1;
                if depth == 0 {
                    return Some(end);
                }
                pos = end;
            }
        }
    }
}

/// Byte range of the first element matching `sel` at or after `from`.
pub fn find_element(s: &str, sel: &Selector, from: usize) -> Option<(usize, usize)> {
    let lc = to_lower(s);
    find_element_lc(s, &lc, sel, from)
}

fn find_element_lc(s: &str, lc: &str, sel: &Selector, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    loop {
        let start = find_open(lc, sel.tag, pos)?;
        let oe = opener_end(s, start)?;
        if sel.matches(&s[start..oe]) {
            return Some((start, block_end(s, lc, sel.tag, start)?));
        }
        pos = oe;
    }
}

/// First element matching `sel`, as a slice including its tags.
pub fn select<'a>(s: &'a str, sel: &Selector) -> Option<&'a str> {
    find_element(s, sel, 0).map(|(a, b)| &s[a..b])
}

/// All non-overlapping elements matching `sel`, outermost first.
pub fn select_all<'a>(s: &'a str, sel: &Selector) -> Vec<&'a str> {
    let lc = to_lower(s);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((a, b)) = find_element_lc(s, &lc, sel, pos) {
        out.push(&s[a..b]);
        pos = b.max(a + 1);
    }
    out
}

pub fn exists(s: &str, sel: &Selector) -> bool {
    find_element(s, sel, 0).is_some()
}

/// The opening tag of an element block, `<` through `>`.
pub fn opener(block: &str) -> &str {
    match opener_end(block, 0) {
        Some(e) => &block[..e],
        None => block,
    }
}

/// Attributes of an opening tag, names lowercased, values entity-decoded.
pub fn attributes(opener: &str) -> Vec<(String, String)> {
    let body = opener.trim_start_matches('<').trim_end_matches('>').trim_end_matches('/');
    let b = body.as_bytes();
    let n = b.len();
    let mut i = b.iter().position(|c| c.is_ascii_whitespace()).unwrap_or(n);
    let mut out = Vec::new();

    while i < n {
        while i < n && (b[i].is_ascii_whitespace() || b[i] == b'/') { i += 1; }
        let name_start = i;
        while i < n && !b[i].is_ascii_whitespace() && b[i] != b'=' { i += 1; }
        if name_start == i { break; }
        let name = body[name_start..i].to_ascii_lowercase();
        while i < n && b[i].is_ascii_whitespace() { i += 1; }
        if i >= n || b[i] != b'=' {
            out.push((name, s!()));
            continue;
        }
        i += 1;
        while i < n && b[i].is_ascii_whitespace() { i += 1; }
        let value = match b.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let vs = i + 1;
                let ve = body[vs..].find(q as char).map_or(n, |r| vs + r);
                i = (ve + 1).min(n);
                &body[vs..ve]
            }
            _ => {
                let vs = i;
                while i < n && !b[i].is_ascii_whitespace() { i += 1; }
                &body[vs..i]
            }
        };
        out.push((name, normalize_entities(value)));
    }
    out
}

pub fn attr(opener: &str, name: &str) -> Option<String> {
    attributes(opener)
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

/// `style="display: none"` and the `hidden` attribute, as a table pager leaves them.
pub fn is_hidden(opener: &str) -> bool {
    let attrs = attributes(opener);
    attrs.iter().any(|(n, v)| {
        n == "hidden" || (n == "style" && super::sanitize::squash(v).contains("display:none"))
    })
}

pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = opener_end(block, 0) {
        if let Some(cs) = block.rfind('<') {
            if cs >= oe {
                return block[oe..cs].to_string();
            }
        }
        return block[oe..].to_string();
    }
    s!()
}

/// Remove tags; block-level tags leave a space so adjacent cells don't fuse.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let Some(gt) = opener_end(rest, lt) else {
            rest = &rest[lt..];
            break;
        };
        let name = rest[lt + 1..gt - 1]
            .trim_start_matches('/')
            .split(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if BREAKING_TAGS.contains(&name.as_str()) {
            out.push(' ');
        }
        rest = &rest[gt..];
    }
    if !rest.starts_with('<') {
        out.push_str(rest);
    }
    normalize_ws(&out)
}

/// Visible text of an element block, as a browser would report it.
pub fn text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(inner_after_open_tag(block))))
}

/// Text of each `cell_tag` cell in a row.
pub fn cells(row: &str, cell_tag: &'static str) -> Vec<String> {
    select_all(row, &Selector::tag(cell_tag))
        .into_iter()
        .map(text)
        .collect()
}

/// Cells of every visible `tr` in `section`; rows without `cell_tag` cells are skipped.
pub fn rows(section: &str, cell_tag: &'static str) -> Vec<Vec<String>> {
    select_all(section, &Selector::tag("tr"))
        .into_iter()
        .filter(|tr| !is_hidden(opener(tr)))
        .map(|tr| cells(tr, cell_tag))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Whether any `<a>` in the page shows `needle` in its text.
pub fn has_link_text(s: &str, needle: &str) -> bool {
    select_all(s, &Selector::tag("a"))
        .into_iter()
        .any(|a| text(a).contains(needle))
}
