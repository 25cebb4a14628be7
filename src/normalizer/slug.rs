/// Derives the page slug from a title: whitespace becomes `-`, anything
/// outside `[A-Za-z0-9-]` is dropped, the rest is lowercased.
///
/// Total and deterministic; collisions are resolved by the page store.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
