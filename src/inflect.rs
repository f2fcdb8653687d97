//! English inflection for snake_case table names.
//!
//! Only the last `_`-separated word is inflected, so `user_roles` becomes
//! `user_role` and `order_item` becomes `order_items`.

use convert_case::{Case, Casing};
use inflector::Inflector;

/// Convert snake_case to PascalCase (`user_id` -> `UserId`)
pub fn camelize(word: &str) -> String {
    word.to_case(Case::Pascal)
}

/// Plural form of the last word. Words that are already plural keep their form.
pub fn pluralize(word: &str) -> String {
    let (prefix, last) = split_last(word);
    if last.is_empty() {
        return word.to_string();
    }
    format!("{}{}", prefix, last.to_singular().to_plural())
}

pub fn singularize(word: &str) -> String {
    let (prefix, last) = split_last(word);
    if last.is_empty() {
        return word.to_string();
    }
    format!("{}{}", prefix, last.to_singular())
}

fn split_last(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    }
}
