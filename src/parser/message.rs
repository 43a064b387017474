//! Turn one raw RFC 5322 message into a [`RawEmail`].

use mail_parser::MessageParser;
use tracing::debug;

use super::header::{decode_encoded_words, get_header, unfold_headers};
use super::normalize::{clean_body, clean_subject};
use crate::model::address::Sender;
use crate::model::email::RawEmail;

/// Parse a raw message (optionally still carrying its MBOX `From ` line).
///
/// The body joins every inline text part with newlines; an HTML-only message
/// falls back to its first HTML part converted to text. Messages `mail-parser` rejects are split by hand instead, so this
/// never fails.
pub fn parse_message(raw_message: &[u8]) -> RawEmail {
    let bytes = skip_from_line(raw_message);

    let Some(msg) = MessageParser::default().parse(bytes) else {
        debug!(len = bytes.len(), "mail-parser rejected message, using fallback split");
        return parse_fallback(bytes);
    };

    let sender = msg
        .from()
        .and_then(|addr| addr.first())
        .map(|addr| {
            Sender {
                display_name: addr.name().unwrap_or_default().to_string(),
                address: addr.address().unwrap_or_default().to_string(),
            }
            .display()
        })
        .unwrap_or_default();

    let parts: Vec<String> = (0..)
        .map_while(|i| msg.body_text(i))
        .map(|text| text.trim_end().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    let body = if parts.is_empty() {
        msg.body_html(0)
            .map(|html| html_to_text(&html))
            .unwrap_or_default()
    } else {
        parts.join("\n")
    };

    RawEmail::new(
        sender,
        clean_subject(msg.subject().unwrap_or_default()),
        clean_body(&body),
        msg.date().map(|d| d.to_rfc3339()),
    )
}

/// Header/body split for messages `mail-parser` cannot read.
fn parse_fallback(bytes: &[u8]) -> RawEmail {
    let text = decode_bytes(bytes);
    let (head, body) = split_head_body(&text);
    let headers = unfold_headers(head);

    let sender = get_header(&headers, "from")
        .map(decode_encoded_words)
        .unwrap_or_default();
    let subject = get_header(&headers, "subject").unwrap_or_default();
    let date = get_header(&headers, "date").map(str::to_string);

    RawEmail::new(sender.trim(), clean_subject(subject), clean_body(body), date)
}

/// UTF-8 when valid, Windows-1252 otherwise (it accepts every byte).
fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
    }
}

/// Split at the first blank line; without one the whole text is headers.
fn split_head_body(text: &str) -> (&str, &str) {
    if let Some(pos) = text.find("\r\n\r\n") {
        if text.find("\n\n").map_or(true, |lf| lf > pos) {
            return (&text[..pos], &text[pos + 4..]);
        }
    }
    match text.find("\n\n") {
        Some(pos) => (&text[..pos], &text[pos + 2..]),
        None => (text, ""),
    }
}

/// Drop a leading MBOX `From ` separator line (and a UTF-8 BOM).
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}

/// Reduce HTML to readable text.
///
/// Block tags become line breaks, scripts and styles are dropped, remaining
/// tags are stripped and common entities decoded. Runs of blank lines
/// collapse to one.
pub fn html_to_text(html: &str) -> String {
    let mut text = remove_tag_block(html, "script");
    text = remove_tag_block(&text, "style");

    let mut plain = String::with_capacity(text.len());
    let mut tag = String::new();
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                if is_block_tag(&tag) {
                    plain.push('\n');
                }
            }
            _ if in_tag => tag.push(ch),
            _ => plain.push(ch),
        }
    }

    let decoded = plain
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    let mut out = String::with_capacity(decoded.len());
    let mut prev_blank = false;
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() {
            if !prev_blank && !out.is_empty() {
                out.push('\n');
            }
            prev_blank = true;
        } else {
            out.push_str(line);
            out.push('\n');
            prev_blank = false;
        }
    }
    out.trim().to_string()
}

fn is_block_tag(tag: &str) -> bool {
    const BLOCK_TAGS: [&str; 12] = [
        "br", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "table",
    ];
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

/// Remove every `<tag …>…</tag>` block, case-insensitively.
fn remove_tag_block(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = lower[pos..].find(&open).map(|i| i + pos) {
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}
