//! Slug derivation for team names.

/// Derive a URL-friendly slug from a team name.
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and truncates to `max_length` without leaving a trailing hyphen. The slug
/// is derived once at team creation and never changes afterwards.
pub fn create_slug(name: &str, max_length: usize) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > max_length {
        slug.truncate(max_length);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
