use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// A canonical ingredient name. Only produced by [`normalize`]; every other
/// part of the crate treats this as an opaque value and compares it with
/// plain equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ingredient(String);

impl Ingredient {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Equivalence groups for names that cleanup and singularization alone cannot
// unify. The first entry of each group is the canonical representative.
// Groups are whole equivalence classes, so transitivity holds by
// construction: every alias maps straight to the representative.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["chicken", "chicken breast", "chicken thigh", "frozen chicken", "chicken fillet"],
    &["onion", "yellow onion", "white onion", "red onion"],
    &["scallion", "green onion", "spring onion"],
    &["garlic", "garlic clove", "minced garlic"],
    &["olive oil", "extra virgin olive oil", "evoo"],
    &["butter", "unsalted butter", "salted butter"],
    &["egg", "large egg", "whole egg"],
    &["cilantro", "coriander", "fresh coriander"],
    &["bell pepper", "capsicum", "sweet pepper"],
    &["chickpea", "garbanzo bean"],
    &["zucchini", "courgette"],
    &["eggplant", "aubergine"],
    &["heavy cream", "whipping cream", "double cream"],
    &["chicken stock", "chicken broth"],
    &["vegetable stock", "vegetable broth"],
    &["beef stock", "beef broth"],
    &["powdered sugar", "confectioners sugar", "icing sugar"],
    &["cornstarch", "corn starch"],
    &["green bean", "string bean"],
    &["soy sauce", "shoyu"],
];

fn synonym_table() -> &'static HashMap<String, String> {
    static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for group in SYNONYM_GROUPS {
            let representative = singularize_phrase(&cleanup(group[0]));
            for alias in group.iter() {
                let key = singularize_phrase(&cleanup(alias));
                table.insert(key, representative.clone());
            }
        }
        table
    })
}

// Lowercase, drop punctuation, collapse internal whitespace.
fn cleanup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = true;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '/') && !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
        // Other punctuation ("," "." "'" "(" ...) is stripped outright.
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

// Suffix-based singular form of a single word. Deliberately conservative:
// short words and -ss/-us endings are left alone.
fn singularize_word(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if word.len() > 4 && word.ends_with("oes") {
        return word[..word.len() - 2].to_string();
    }
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn singularize_phrase(phrase: &str) -> String {
    phrase
        .split(' ')
        .map(singularize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonicalizes a free-text ingredient name. Total and pure: unrecognized
/// input becomes its own cleaned-up canonical singleton rather than an error.
pub fn normalize(raw: &str) -> Ingredient {
    let cleaned = singularize_phrase(&cleanup(raw));
    match synonym_table().get(&cleaned) {
        Some(representative) => Ingredient(representative.clone()),
        None => Ingredient(cleaned),
    }
}

/// The one ingredient-equality operation the rest of the crate is allowed to
/// use.
pub fn equivalent(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
