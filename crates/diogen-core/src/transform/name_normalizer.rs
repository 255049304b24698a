use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::{HttpMethod, NormalizedName};

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Derive an operation name from HTTP method + path, for operations
/// without an `operationId`.
///
/// - `GET /pets` → `listPets`
/// - `GET /pets/{petId}` → `getPet`
/// - `POST /pets` → `createPets`
/// - `DELETE /store/order/{orderId}` → `deleteStoreOrder`
pub fn route_to_name(method: HttpMethod, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let prefix = match method {
        HttpMethod::Get if ends_with_param => "get",
        HttpMethod::Get => "list",
        HttpMethod::Post => "create",
        HttpMethod::Put => "update",
        HttpMethod::Delete => "delete",
        HttpMethod::Patch => "patch",
        HttpMethod::Options => "options",
        HttpMethod::Head => "head",
        HttpMethod::Trace => "trace",
    };

    let mut name = prefix.to_string();
    let last = resource_parts.len().saturating_sub(1);
    for (i, part) in resource_parts.iter().enumerate() {
        let word = if i == last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        name.push_str(&sanitize_identifier(&word).to_pascal_case());
    }
    name
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Replace every run of non-alphanumeric characters with a single `_` so
/// that case conversion sees word boundaries. `@` reads as the word `at`.
/// Never returns an empty string.
pub(crate) fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for ch in name.chars() {
        if ch == '@' {
            if !result.is_empty() {
                result.push('_');
            }
            result.push_str("at");
            prev_was_separator = true;
        } else if ch.is_alphanumeric() {
            if result.is_empty() && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        let n = normalize_name("listModels");
        assert_eq!(n.pascal_case, "ListModels");
        assert_eq!(n.camel_case, "listModels");
        assert_eq!(n.snake_case, "list_models");
        assert_eq!(n.screaming_snake, "LIST_MODELS");
    }

    #[test]
    fn test_special_chars() {
        let n = normalize_name("application/json");
        assert_eq!(n.pascal_case, "ApplicationJson");
        let tag = normalize_name("pet store");
        assert_eq!(tag.snake_case, "pet_store");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_identifier("--"), "unnamed");
        assert_eq!(sanitize_identifier("@type"), "at_type");
    }

    #[test]
    fn test_route_to_name_list_and_get() {
        assert_eq!(route_to_name(HttpMethod::Get, "/pets"), "listPets");
        assert_eq!(route_to_name(HttpMethod::Get, "/pets/{petId}"), "getPet");
    }

    #[test]
    fn test_route_to_name_mutations() {
        assert_eq!(route_to_name(HttpMethod::Post, "/pets"), "createPets");
        assert_eq!(route_to_name(HttpMethod::Put, "/pets/{petId}"), "updatePet");
        assert_eq!(
            route_to_name(HttpMethod::Delete, "/store/order/{orderId}"),
            "deleteStoreOrder"
        );
    }

    #[test]
    fn test_route_to_name_nested() {
        assert_eq!(
            route_to_name(HttpMethod::Get, "/users/{userId}/pet-tags"),
            "listUsersPetTags"
        );
        assert_eq!(route_to_name(HttpMethod::Head, "/"), "head");
    }
}
