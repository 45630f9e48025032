use crate::theme::ThemeId;

const MARKER_PREFIX: &str = "theme-";

/// Theme class painted into the document root by the server renderer.
///
/// Read once at boot; the engine never writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerMarker {
    class_attribute: Option<String>,
}

impl ServerMarker {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn from_class_attribute(class_attribute: impl Into<String>) -> Self {
        Self {
            class_attribute: Some(class_attribute.into()),
        }
    }

    /// Raw identifier following the first `theme-` prefix, if any.
    pub fn token(&self) -> Option<&str> {
        self.class_attribute.as_deref().and_then(marker_token)
    }

    pub fn theme(&self) -> Option<ThemeId> {
        let token = self.token()?;
        let theme = ThemeId::parse_lenient(token);
        if theme.is_none() {
            tracing::warn!(token, "ignoring server marker with unknown theme");
        }
        theme
    }
}

fn marker_token(class_attribute: &str) -> Option<&str> {
    class_attribute
        .match_indices(MARKER_PREFIX)
        .find_map(|(index, _)| {
            let rest = &class_attribute[index + MARKER_PREFIX.len()..];
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            (end > 0).then(|| &rest[..end])
        })
}
