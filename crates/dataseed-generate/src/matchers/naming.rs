//! Identifier splitting and English singularization for name-based matching.

const IRREGULAR: &[&str] = &[
    "people",
    "children",
    "men",
    "women",
    "data",
    "media",
    "news",
    "series",
    "species",
    "information",
    "equipment",
];

/// Split an identifier into words.
///
/// Breaks on `_`, `-` and whitespace, on lower→upper transitions
/// (`ProductReviews`) and where an upper-case run meets a capitalized word
/// (`XMLParser`). Empty tokens are dropped and the original case is kept.
pub fn tokenize(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in value.split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace()) {
        let chars: Vec<char> = part.chars().collect();
        let mut current = String::new();
        for (idx, ch) in chars.iter().enumerate() {
            if !current.is_empty() && ch.is_uppercase() {
                let prev = chars[idx - 1];
                let next_is_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());
                if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            current.push(*ch);
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

/// Lower-cased singular form of an English word.
pub fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.chars().count() <= 3 || IRREGULAR.contains(&lower.as_str()) || lower.ends_with("us") {
        return lower;
    }

    for suffix in ["sses", "xes", "ches", "shes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if lower.ends_with('s') && !lower.ends_with("ss") {
        return lower[..lower.len() - 1].to_string();
    }
    lower
}

/// Tokenize then singularize every token.
pub fn singular_tokens(value: &str) -> Vec<String> {
    tokenize(value).iter().map(|token| singularize(token)).collect()
}
