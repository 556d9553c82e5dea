//! String transformation utilities for code generation

use once_cell::sync::Lazy;
use regex::Regex;

static NON_IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_]+").unwrap_or_else(|e| panic!("invalid identifier regex: {e}"))
});

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            // Word break before an uppercase letter that follows a lowercase one
            if i > 0 && prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if ch == '-' || ch == '_' || ch == ' ' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    // Remove duplicate underscores and trim
    let mut final_result = String::new();
    let mut prev_underscore = false;
    for ch in result.chars() {
        if ch == '_' {
            if !prev_underscore && !final_result.is_empty() {
                final_result.push(ch);
            }
            prev_underscore = true;
        } else {
            final_result.push(ch);
            prev_underscore = false;
        }
    }

    final_result.trim_matches('_').to_string()
}

/// Convert a string to UpperCamelCase (PascalCase)
pub fn to_upper_camel_case(s: &str) -> String {
    let snake = to_snake_case(s);

    snake
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Convert a string to lowerCamelCase
pub fn to_lower_camel_case(s: &str) -> String {
    let upper_camel = to_upper_camel_case(s);
    let mut chars = upper_camel.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Split a qualified name on every package separator (`::`, `/`, `.`)
pub fn split_qualified(name: &str) -> Vec<&str> {
    name.split("::")
        .flat_map(|part| part.split(['/', '.']))
        .filter(|part| !part.is_empty())
        .collect()
}

/// Last segment of a qualified name
pub fn last_segment(name: &str) -> &str {
    split_qualified(name).last().copied().unwrap_or(name)
}

/// Reduce arbitrary text to `[A-Za-z0-9_]`, never empty and never starting with a digit
pub fn sanitize_identifier(s: &str, fallback: &str) -> String {
    let replaced = NON_IDENT.replace_all(s, "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("{}{}", fallback, trimmed);
    }
    trimmed.to_string()
}

/// Strict and reserved Rust keywords; `self`, `Self`, `super` and `crate` can't be raw
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Field or function name usable in generated source, raw-escaped when it is a keyword
pub fn rust_ident(name: &str) -> String {
    if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

/// Render a string as a Rust string literal
pub fn rust_string_literal(s: &str) -> String {
    format!("{:?}", s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("FindPetsByStatus"), "find_pets_by_status");
        assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
        assert_eq!(to_snake_case("find_pets_by_status"), "find_pets_by_status");
        assert_eq!(to_snake_case("getHTTPResponse"), "get_httpresponse");
        assert_eq!(to_snake_case("handlersV2GetPet"), "handlers_v2_get_pet");
    }

    #[test]
    fn test_to_upper_camel_case() {
        assert_eq!(to_upper_camel_case("find_pets_by_status"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("FIND_PETS_BY_STATUS"), "FindPetsByStatus");
        assert_eq!(to_upper_camel_case("http_response"), "HttpResponse");
    }

    #[test]
    fn test_to_lower_camel_case() {
        assert_eq!(to_lower_camel_case("handlers_pets_get_pet"), "handlersPetsGetPet");
        assert_eq!(to_lower_camel_case("FindPetsByStatus"), "findPetsByStatus");
        assert_eq!(to_lower_camel_case(""), "");
    }

    #[test]
    fn test_split_qualified() {
        assert_eq!(
            split_qualified("crate::handlers::pets"),
            vec!["crate", "handlers", "pets"]
        );
        assert_eq!(
            split_qualified("example.com/api/pets.GetPet"),
            vec!["example", "com", "api", "pets", "GetPet"]
        );
        assert_eq!(last_segment("crate::models::Pet"), "Pet");
        assert_eq!(last_segment("Pet"), "Pet");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Page<Pet>", "T"), "Page_Pet");
        assert_eq!(sanitize_identifier("my-pkg", "pkg"), "my_pkg");
        assert_eq!(sanitize_identifier("2fa", "pkg"), "pkg2fa");
        assert_eq!(sanitize_identifier("<>", "T"), "T");
    }

    #[test]
    fn test_rust_ident() {
        assert_eq!(rust_ident("type"), "r#type");
        assert_eq!(rust_ident("owner_id"), "owner_id");
    }

    #[test]
    fn test_rust_string_literal_escapes() {
        assert_eq!(rust_string_literal("x-request-id"), "\"x-request-id\"");
        assert_eq!(rust_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
