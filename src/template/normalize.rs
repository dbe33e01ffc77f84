// letter-rendering-service/src/template/normalize.rs

/// Canonical form of a field identifier: lowercased, with whitespace,
/// underscores and hyphens removed.
///
/// "Tempat Lahir", "tempat_lahir" and "tempat-lahir" all become "tempatlahir".
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
