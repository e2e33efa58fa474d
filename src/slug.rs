//! Slug and SKU derivation for catalog records.

use uuid::Uuid;

/// Prefix for generated stock-keeping units.
pub const SKU_PREFIX: &str = "ASHWI";

/// Normalize a display name into a URL-safe slug: lowercase alphanumerics
/// with single hyphens between words, everything else stripped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
        }
        // punctuation is dropped without acting as a separator
    }

    slug
}

/// Generate a unique SKU of the form `ASHWI-<8 uppercase hex chars>`.
pub fn generate_sku() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", SKU_PREFIX, hex[..8].to_ascii_uppercase())
}
