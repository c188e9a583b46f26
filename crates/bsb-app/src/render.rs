//! Plain-text rendition of the current chapter

use bsb_core::preferences::ReaderSettings;
use bsb_core::{FontSize, SelectionSnapshot};
use once_cell::sync::Lazy;
use regex::Regex;

/// An opening, closing or self-closing tag: slash, name, attributes, slash
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*?)(/?)>").expect("valid tag pattern")
});

static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class\s*=\s*["']([^"']*)["']"#).expect("valid class pattern")
});

/// Wrap width standing in for the text size
pub fn text_width(size: FontSize) -> usize {
    match size {
        FontSize::Xs => 110,
        FontSize::Sm => 96,
        FontSize::Base => 80,
        FontSize::Lg => 68,
        FontSize::Xl => 56,
        FontSize::Xxl => 44,
    }
}

/// Whether a `COLORFGBG` value (`"fg;bg"`) describes a dark background.
///
/// Unknown values count as dark.
pub fn prefers_dark(colorfgbg: Option<&str>) -> bool {
    colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .map_or(true, |bg| bg < 7 || bg == 8)
}

pub fn terminal_prefers_dark() -> bool {
    prefers_dark(std::env::var("COLORFGBG").ok().as_deref())
}

fn is_note(attributes: &str) -> bool {
    CLASS_ATTR
        .captures(attributes)
        .map(|c| {
            c[1].split_whitespace()
                .any(|class| class == "note" || class.ends_with("-note"))
        })
        .unwrap_or(false)
}

/// Remove note elements (class `note` or `*-note`) and everything inside them
pub fn strip_notes(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut kept_from = 0;
    // Tag name of the note being skipped and how deep we are inside it
    let mut skipping: Option<(String, usize)> = None;

    for tag in TAG.captures_iter(html) {
        let Some(whole) = tag.get(0) else { continue };
        let closing = !tag[1].is_empty();
        let name = tag[2].to_ascii_lowercase();
        let self_closing = !tag[4].is_empty();

        if let Some((open, depth)) = skipping.as_mut() {
            if *open == name && !self_closing {
                if closing {
                    *depth -= 1;
                } else {
                    *depth += 1;
                }
                if *depth == 0 {
                    skipping = None;
                    kept_from = whole.end();
                }
            }
            continue;
        }

        if !closing && is_note(&tag[3]) {
            out.push_str(&html[kept_from..whole.start()]);
            if self_closing {
                kept_from = whole.end();
            } else {
                skipping = Some((name, 1));
            }
        }
    }

    // An unterminated note runs to the end of the markup
    if skipping.is_none() {
        out.push_str(&html[kept_from..]);
    }
    out
}

/// Chapter markup as wrapped text, optionally without notes
pub fn chapter_text(html: &str, width: usize, notes: bool) -> String {
    if notes {
        html2text::from_read(html.as_bytes(), width)
    } else {
        html2text::from_read(strip_notes(html).as_bytes(), width)
    }
}

/// Header, body and navigation footer for a snapshot
pub fn render_chapter(
    snapshot: &SelectionSnapshot,
    label: &str,
    settings: &ReaderSettings,
) -> String {
    let width = text_width(settings.font_size);
    let mut out = String::new();

    out.push_str(&format!("== {} {} ==\n\n", label, snapshot.reference.chapter));

    if let Some(error) = &snapshot.error {
        out.push_str(&format!("! {}\n", error));
    } else if snapshot.loading {
        out.push_str("Loading...\n");
    } else if let Some(html) = &snapshot.content {
        // Content can trail the reference while a new load is in flight
        if snapshot.content_reference.as_ref() == Some(&snapshot.reference) {
            out.push_str(chapter_text(html, width, settings.notes).trim_end());
            out.push('\n');
        }
    }

    let previous = snapshot
        .availability
        .previous
        .as_ref()
        .map(|r| format!("< {}", r))
        .unwrap_or_default();
    let next = snapshot
        .availability
        .next
        .as_ref()
        .map(|r| format!("{} >", r))
        .unwrap_or_default();
    let pad = width.saturating_sub(next.len());
    out.push_str(&format!("\n{:<pad$}{}\n", previous, next, pad = pad));

    out
}
