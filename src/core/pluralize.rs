//! English noun inflection for model and association names
//!
//! Model names are usually PascalCase (`Branch`, `WarehouseBranch`); only
//! the last word is inflected and the original casing is kept.

/// Irregular forms, lowercase singular → lowercase plural
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("index", "indices"),
];

/// Nouns with identical singular and plural
const UNCOUNTABLE: &[&str] = &["data", "equipment", "information", "series", "species"];

/// Converts between singular and plural forms of English nouns
pub struct Pluralizer;

impl Pluralizer {
    /// Convert a singular noun to its plural form
    ///
    /// # Examples
    ///
    /// ```
    /// use orm_graphql::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("Branch"), "Branches");
    /// assert_eq!(Pluralizer::pluralize("company"), "companies");
    /// assert_eq!(Pluralizer::pluralize("SalesPerson"), "SalesPeople");
    /// ```
    pub fn pluralize(singular: &str) -> String {
        let (head, word) = split_last_word(singular);
        if word.is_empty() {
            return singular.to_string();
        }

        let lower = word.to_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return singular.to_string();
        }
        if let Some((_, plural)) = IRREGULARS.iter().find(|(s, _)| *s == lower) {
            return format!("{}{}", head, match_case(word, plural));
        }

        format!("{}{}", head, pluralize_regular(word, &lower))
    }

    /// Convert a plural noun to its singular form
    ///
    /// # Examples
    ///
    /// ```
    /// use orm_graphql::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::singularize("Branches"), "Branch");
    /// assert_eq!(Pluralizer::singularize("companies"), "company");
    /// ```
    pub fn singularize(plural: &str) -> String {
        let (head, word) = split_last_word(plural);
        if word.is_empty() {
            return plural.to_string();
        }

        let lower = word.to_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return plural.to_string();
        }
        if let Some((singular, _)) = IRREGULARS.iter().find(|(_, p)| *p == lower) {
            return format!("{}{}", head, match_case(word, singular));
        }

        format!("{}{}", head, singularize_regular(word, &lower))
    }
}

/// Split a PascalCase or snake_case name before its last word
fn split_last_word(name: &str) -> (&str, &str) {
    let split = name
        .char_indices()
        .rev()
        .find(|(i, c)| *i > 0 && (c.is_uppercase() || *c == '_'))
        .map(|(i, c)| if c == '_' { i + 1 } else { i })
        .unwrap_or(0);
    name.split_at(split)
}

/// Apply the capitalisation of `original` to a lowercase replacement
fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().all(|c| !c.is_lowercase()) && original.len() > 1 {
        return replacement.to_uppercase();
    }
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(r)) if first.is_uppercase() => {
            r.to_uppercase().chain(chars).collect()
        }
        _ => replacement.to_string(),
    }
}

fn pluralize_regular(word: &str, lower: &str) -> String {
    if lower.ends_with('y') && lower.len() > 1 && !ends_with_vowel_then(lower, 'y') {
        return format!("{}ies", stem(word, 1));
    }
    if ["s", "sh", "ch", "x", "z"].iter().any(|s| lower.ends_with(s)) {
        return format!("{}es", word);
    }
    if lower.ends_with("fe") && lower.len() > 2 {
        return format!("{}ves", stem(word, 2));
    }
    if lower.ends_with('f') && !lower.ends_with("ff") && lower.len() > 1 {
        return format!("{}ves", stem(word, 1));
    }
    if lower.ends_with('o') && lower.len() > 1 && !ends_with_vowel_then(lower, 'o') {
        return match lower {
            "photo" | "piano" | "halo" | "memo" | "logo" => format!("{}s", word),
            _ => format!("{}es", word),
        };
    }
    format!("{}s", word)
}

fn singularize_regular(word: &str, lower: &str) -> String {
    if lower.ends_with("ies") && lower.len() > 3 {
        return format!("{}y", stem(word, 3));
    }
    if lower.ends_with("ives") && lower.len() > 4 {
        return format!("{}ife", stem(word, 3));
    }
    if lower.ends_with("ves") && lower.len() > 3 {
        return format!("{}f", stem(word, 3));
    }
    if lower.len() > 3
        && ["sses", "shes", "ches", "xes", "zes", "oes"]
            .iter()
            .any(|s| lower.ends_with(s))
    {
        return stem(word, 2).to_string();
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && lower.len() > 1 {
        return stem(word, 1).to_string();
    }
    word.to_string()
}

fn stem(word: &str, n: usize) -> &str {
    &word[..word.len() - n]
}

/// Whether `lower` ends with a vowel followed by `last`
fn ends_with_vowel_then(lower: &str, last: char) -> bool {
    let mut rev = lower.chars().rev();
    rev.next() == Some(last) && matches!(rev.next(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}
