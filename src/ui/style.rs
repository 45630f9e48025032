use std::time::Duration;

use rand::RngCore;

use crate::theme::{ThemeId, ThemePalette};

pub const THEME_STYLESHEET_ID: &str = "theme-vars";
const CSS_VARIABLE_PREFIX: &str = "--color-";
const TRANSITION_DURATION_PROPERTY: &str = "--transition-duration";
const NONCE_BYTES: usize = 16;

/// Compile-time motion tokens; `transition_ms` can be overridden by config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTokens {
    pub theme_transition_ms: u64,
}

pub const MOTION_TOKENS: MotionTokens = MotionTokens {
    theme_transition_ms: 500,
};

/// Flat `--color-<role>` mapping for a palette, in role order.
pub fn css_variables(palette: &ThemePalette) -> Vec<(String, &'static str)> {
    palette
        .entries()
        .map(|(role, value)| (format!("{CSS_VARIABLE_PREFIX}{}", role.as_str()), value))
        .collect()
}

pub fn root_class(theme: ThemeId) -> String {
    format!("theme-{theme}")
}

/// Per-session hex nonce for content-security-policy tagged style elements.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// The single style element the engine owns.
///
/// Content is replaced wholesale on every publish, never appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStylesheet {
    nonce: String,
    theme: Option<ThemeId>,
    content: String,
}

impl ThemeStylesheet {
    pub fn new() -> Self {
        Self::with_nonce(generate_nonce())
    }

    pub fn with_nonce(nonce: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            theme: None,
            content: String::new(),
        }
    }

    pub fn element_id(&self) -> &'static str {
        THEME_STYLESHEET_ID
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    pub fn theme(&self) -> Option<ThemeId> {
        self.theme
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn publish(&mut self, theme: ThemeId, transition: Duration) {
        self.content = render_root_block(theme.palette(), transition);
        self.theme = Some(theme);
        tracing::debug!(%theme, nonce = self.nonce.as_str(), "published theme stylesheet");
    }

    /// Full `<style>` element markup for hosts that inject raw HTML.
    pub fn to_html(&self) -> String {
        format!(
            "<style id=\"{id}\" nonce=\"{nonce}\">{content}</style>",
            id = THEME_STYLESHEET_ID,
            nonce = self.nonce,
            content = self.content,
        )
    }
}

impl Default for ThemeStylesheet {
    fn default() -> Self {
        Self::new()
    }
}

fn render_root_block(palette: &ThemePalette, transition: Duration) -> String {
    let mut declarations: Vec<String> = css_variables(palette)
        .into_iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect();
    declarations.push(format!(
        "{TRANSITION_DURATION_PROPERTY}: {}ms;",
        transition.as_millis()
    ));
    format!(":root {{\n    {}\n  }}", declarations.join("\n    "))
}
