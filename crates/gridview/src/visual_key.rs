use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisualKeyError {
    #[error("visual key must not be empty")]
    Empty,
    #[error("visual key must not start with '/'")]
    LeadingSlash,
    #[error("visual key must not contain '\\\\'")]
    Backslash,
    #[error("visual key must not contain '..'")]
    ParentTraversal,
    #[error("visual key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Appearance selector resolved by the style table. Variant suffixes are
/// appended as `__token` segments; resolution strips them right-to-left
/// until a styled key is found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisualKey(String);

impl VisualKey {
    pub fn new(text: impl Into<String>) -> Result<Self, VisualKeyError> {
        let text = text.into();
        validate_visual_key(&text)?;
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a `__token` variant segment. Tokens come from a closed set of
    /// internal constants, so the result is validated only in debug builds.
    pub(crate) fn with_variant(&self, token: &str) -> Self {
        let composed = format!("{}__{token}", self.0);
        debug_assert!(validate_visual_key(&composed).is_ok(), "token={token}");
        Self(composed)
    }

    pub(crate) fn base(base: &'static str) -> Self {
        debug_assert!(validate_visual_key(base).is_ok(), "base={base}");
        Self(base.to_string())
    }
}

impl std::fmt::Display for VisualKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

pub(crate) fn validate_visual_key(key: &str) -> Result<(), VisualKeyError> {
    if key.is_empty() {
        return Err(VisualKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(VisualKeyError::LeadingSlash);
    }
    if key.contains('\\') {
        return Err(VisualKeyError::Backslash);
    }
    if key.contains("..") {
        return Err(VisualKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(VisualKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// Resolution candidates, most specific first: the full key, then the key
/// with trailing `__token` segments stripped one at a time.
pub(crate) fn candidate_keys(key: &VisualKey) -> Vec<String> {
    let mut candidates = vec![key.as_str().to_string()];
    let mut remaining = key.as_str();
    while let Some(split_at) = remaining.rfind("__") {
        remaining = &remaining[..split_at];
        if remaining.is_empty() {
            break;
        }
        candidates.push(remaining.to_string());
    }
    candidates
}
