//! Glyph resolution for hierarchy rows.
//!
//! Hosts style rows through a `type-*` CSS class plus a short fallback
//! glyph rendered when no icon font is available. Resolution is a pure
//! mapping from the provider's kind/icon key; no theming happens here.

use serde::{Deserialize, Serialize};

/// Placeholder shown when a provider reports neither kind nor icon.
pub const DEFAULT_GLYPH: &str = "\u{1F787}";

/// Glyph text never exceeds this many characters.
const GLYPH_MAX_CHARS: usize = 3;

/// A resolved row icon: an optional style class for themed hosts and a
/// short textual glyph for plain ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconGlyph {
    pub style_class: Option<String>,
    pub text: String,
}

impl IconGlyph {
    fn placeholder() -> Self {
        Self {
            style_class: None,
            text: DEFAULT_GLYPH.to_string(),
        }
    }
}

/// Resolve a kind or icon key to a displayable glyph.
///
/// Keys already carrying the `type-` prefix are used verbatim as the style
/// class with the prefix stripped from the glyph text. Bare keys gain the
/// prefix. Absent or empty keys resolve to [`DEFAULT_GLYPH`] with no class.
pub fn resolve_icon(key: Option<&str>) -> IconGlyph {
    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => return IconGlyph::placeholder(),
    };

    let (style_class, text) = match key.strip_prefix("type-") {
        Some(stripped) => (key.to_string(), stripped),
        None => (format!("type-{key}"), key),
    };

    IconGlyph {
        style_class: Some(style_class),
        text: text.chars().take(GLYPH_MAX_CHARS).collect(),
    }
}
