//! Anchor slugs and index ordering.

/// Turn an identifier or title into a URL-fragment-safe slug.
///
/// - lowercase, surrounding whitespace trimmed
/// - whitespace runs become a single hyphen
/// - `[` and `]` become `(` and `)`
/// - any character other than alphanumerics and `_ - . ( )` is dropped
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match c {
            '[' => slug.push('('),
            ']' => slug.push(')'),
            c if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '(' | ')') => slug.push(c),
            _ => {}
        }
    }
    slug
}

/// Sort key for the global index.
///
/// Primary order is case-insensitive; for names that differ only in case,
/// uppercase letters sort first. Each character is paired with its
/// lowercase form, so `FT_x` becomes `fFtT__xx` and sorts before `ft_X`
/// (`fftt__xX`).
pub fn index_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() * 2);
    for c in name.chars() {
        key.extend(c.to_lowercase());
        key.push(c);
    }
    key
}

/// Sort names for the global index.
pub fn sort_index(names: &mut [String]) {
    names.sort_by_cached_key(|name| index_key(name));
}
