//! Merchant/brand recognition.
//!
//! Free text typed into the expense form ("STARBUCKS #123", "grab ride",
//! "Aling Nena's") is mapped to a category with an icon and a color. The
//! brand table and category keyword lists are data, loaded once from JSON
//! into an immutable [`BrandResolver`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILTIN_BRANDS: &str = include_str!("brands.json");

pub(crate) const DEFAULT_CATEGORY: &str = "Other";
const DEFAULT_ICON: &str = "📦";
const DEFAULT_COLOR: &str = "#9E9E9E";

/// Shortest input that is allowed to match as a fragment of a brand name.
const MIN_FRAGMENT_LEN: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CategoryStyle {
    pub(crate) name: String,
    pub(crate) icon: String,
    pub(crate) color: String,
    #[serde(default)]
    pub(crate) keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Brand {
    pub(crate) name: String,
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrandData {
    categories: Vec<CategoryStyle>,
    brands: Vec<Brand>,
}

/// Result of [`BrandResolver::identify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identified {
    pub(crate) category: String,
    pub(crate) icon: String,
    pub(crate) color: String,
    pub(crate) is_known_brand: bool,
    /// Canonical brand name when `is_known_brand` is set.
    pub(crate) brand: Option<String>,
}

pub(crate) struct BrandResolver {
    categories: Vec<CategoryStyle>,
    /// Lowercased brand names paired with the original entry, in file order.
    brands: Vec<(String, Brand)>,
    /// Lowercased category name -> index into `categories`.
    category_index: HashMap<String, usize>,
}

impl BrandResolver {
    /// The brand table compiled into the binary.
    pub(crate) fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_BRANDS).context("Built-in brand table is invalid")
    }

    /// Load from `path` if given, otherwise use the built-in table.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let data = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read brand file: {}", p.display()))?;
                let resolver = Self::from_json(&data)
                    .with_context(|| format!("Invalid brand file: {}", p.display()))?;
                tracing::info!(path = %p.display(), brands = resolver.brands.len(), "loaded brand table");
                Ok(resolver)
            }
            None => Self::builtin(),
        }
    }

    pub(crate) fn from_json(data: &str) -> Result<Self> {
        let parsed: BrandData = serde_json::from_str(data)?;

        let mut category_index = HashMap::new();
        for (i, cat) in parsed.categories.iter().enumerate() {
            if category_index.insert(cat.name.to_lowercase(), i).is_some() {
                anyhow::bail!("Duplicate category: {}", cat.name);
            }
        }

        let mut brands = Vec::with_capacity(parsed.brands.len());
        for brand in parsed.brands {
            if !category_index.contains_key(&brand.category.to_lowercase()) {
                anyhow::bail!(
                    "Brand '{}' refers to unknown category '{}'",
                    brand.name,
                    brand.category
                );
            }
            brands.push((brand.name.to_lowercase(), brand));
        }

        Ok(Self {
            categories: parsed.categories,
            brands,
            category_index,
        })
    }

    pub(crate) fn categories(&self) -> &[CategoryStyle] {
        &self.categories
    }

    pub(crate) fn brand_count(&self) -> usize {
        self.brands.len()
    }

    /// Icon and color for a category name, falling back to the defaults.
    pub(crate) fn style_for(&self, category: &str) -> (&str, &str) {
        match self.find_category(category) {
            Some(cat) => (cat.icon.as_str(), cat.color.as_str()),
            None => (DEFAULT_ICON, DEFAULT_COLOR),
        }
    }

    /// Logo URL for a known brand, by the `logo.clearbit.com/<domain>` convention.
    pub(crate) fn logo_url(&self, brand: &str) -> Option<String> {
        let lower = brand.trim().to_lowercase();
        self.brands
            .iter()
            .find(|(name, _)| *name == lower)
            .and_then(|(_, b)| b.domain.as_deref())
            .map(|domain| format!("https://logo.clearbit.com/{domain}"))
    }

    /// Map free text to a category.
    ///
    /// Exact brand match, then substring match in either direction, then
    /// category keywords; anything else becomes its own category. Whole-word
    /// hits win over hits buried inside a longer word, and remaining ties go
    /// to the entry that comes first in the brand file.
    pub(crate) fn identify(&self, text: &str) -> Identified {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.default_identified();
        }

        if let Some((_, brand)) = self.brands.iter().find(|(name, _)| *name == needle) {
            return self.brand_identified(brand);
        }

        let fragment_ok = needle.chars().count() >= MIN_FRAGMENT_LEN;
        let found = self
            .brands
            .iter()
            .find(|(name, _)| {
                contains_word(&needle, name) || (fragment_ok && name.contains(needle.as_str()))
            })
            .or_else(|| {
                self.brands
                    .iter()
                    .find(|(name, _)| !name.is_empty() && needle.contains(name.as_str()))
            });
        if let Some((_, brand)) = found {
            return self.brand_identified(brand);
        }

        if let Some(cat) = self.match_keywords(&needle) {
            return Identified {
                category: cat.name.clone(),
                icon: cat.icon.clone(),
                color: cat.color.clone(),
                is_known_brand: false,
                brand: None,
            };
        }

        Identified {
            category: title_case(text.trim()),
            icon: DEFAULT_ICON.into(),
            color: DEFAULT_COLOR.into(),
            is_known_brand: false,
            brand: None,
        }
    }

    fn match_keywords(&self, needle: &str) -> Option<&CategoryStyle> {
        if let Some(cat) = self.find_category(needle) {
            return Some(cat);
        }
        self.categories
            .iter()
            .find(|cat| has_keyword(cat, needle, true))
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|cat| has_keyword(cat, needle, false))
            })
    }

    fn find_category(&self, name: &str) -> Option<&CategoryStyle> {
        self.category_index
            .get(&name.trim().to_lowercase())
            .and_then(|&i| self.categories.get(i))
    }

    fn brand_identified(&self, brand: &Brand) -> Identified {
        let (icon, color) = self.style_for(&brand.category);
        Identified {
            category: brand.category.clone(),
            icon: icon.to_string(),
            color: color.to_string(),
            is_known_brand: true,
            brand: Some(brand.name.clone()),
        }
    }

    fn default_identified(&self) -> Identified {
        let (icon, color) = self.style_for(DEFAULT_CATEGORY);
        Identified {
            category: DEFAULT_CATEGORY.into(),
            icon: icon.to_string(),
            color: color.to_string(),
            is_known_brand: false,
            brand: None,
        }
    }
}

/// Whether one of `cat`'s keywords occurs in `needle`, optionally only at
/// the start of a word.
fn has_keyword(cat: &CategoryStyle, needle: &str, at_word_start: bool) -> bool {
    cat.keywords.iter().any(|kw| {
        let kw = kw.to_lowercase();
        if at_word_start {
            starts_word(needle, &kw)
        } else {
            !kw.is_empty() && needle.contains(kw.as_str())
        }
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// `needle` occurs in `haystack` delimited by non-word characters on both sides.
fn contains_word(haystack: &str, needle: &str) -> bool {
    occurrences(haystack, needle).any(|(start, end)| {
        let before_ok = haystack[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

/// `needle` occurs in `haystack` at the start of a word.
fn starts_word(haystack: &str, needle: &str) -> bool {
    occurrences(haystack, needle).any(|(start, _)| {
        haystack[..start].chars().next_back().map_or(true, |c| !is_word_char(c))
    })
}

fn occurrences<'a>(haystack: &'a str, needle: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
    let len = needle.len();
    haystack
        .match_indices(needle)
        .filter(move |_| len > 0)
        .map(move |(start, _)| (start, start + len))
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
