#![allow(clippy::unwrap_used)]

use super::*;

fn resolver() -> BrandResolver {
    BrandResolver::builtin().unwrap()
}

// ── Built-in data ─────────────────────────────────────────────

#[test]
fn test_builtin_table_loads() {
    let r = resolver();
    assert!(r.brand_count() >= 150);
    assert!(r.categories().iter().any(|c| c.name == DEFAULT_CATEGORY));
}

#[test]
fn test_every_category_has_style() {
    for cat in resolver().categories() {
        assert!(!cat.icon.is_empty(), "{} has no icon", cat.name);
        assert!(cat.color.starts_with('#'), "{} has bad color", cat.name);
    }
}

// ── Exact and fragment matches ────────────────────────────────

#[test]
fn test_identify_starbucks_any_casing() {
    let r = resolver();
    for input in ["Starbucks", "STARBUCKS", "starbucks", "starbucks coffee", "  Starbucks  "] {
        let id = r.identify(input);
        assert_eq!(id.category, "Food & Dining", "input {input:?}");
        assert!(id.is_known_brand);
        assert!(!id.icon.is_empty());
        assert!(!id.color.is_empty());
        assert_eq!(id.brand.as_deref(), Some("Starbucks"));
    }
}

#[test]
fn test_identify_brand_inside_longer_text() {
    let r = resolver();
    let id = r.identify("Paid Meralco bill for March");
    assert_eq!(id.category, "Bills & Utilities");
    assert!(id.is_known_brand);
}

#[test]
fn test_identify_fragment_of_brand_name() {
    let r = resolver();
    // "netfl" is contained in "netflix"
    let id = r.identify("netfl");
    assert_eq!(id.category, "Entertainment");
    assert!(id.is_known_brand);
}

#[test]
fn test_identify_brand_glued_to_other_text() {
    let r = resolver();
    for input in ["mystarbucks", "starbuckscoffee"] {
        let id = r.identify(input);
        assert_eq!(id.category, "Food & Dining", "input {input:?}");
        assert_eq!(id.brand.as_deref(), Some("Starbucks"));
    }
}

#[test]
fn test_whole_word_brand_wins_over_buried_one() {
    let r = resolver();
    // "bp" hides inside "bpi" but "shell" stands alone
    let id = r.identify("bpi shell station");
    assert_eq!(id.brand.as_deref(), Some("Shell"));
}

#[test]
fn test_exact_match_beats_fragment() {
    let r = resolver();
    assert_eq!(r.identify("uber").category, "Transportation");
    assert_eq!(r.identify("uber eats").category, "Food & Dining");
}

#[test]
fn test_first_entry_wins_on_tie() {
    let r = resolver();
    // "Grab Food" appears before "Grab" in the table
    assert_eq!(r.identify("grab food order").category, "Food & Dining");
    assert_eq!(r.identify("grab ride to work").category, "Transportation");
}

// ── Keyword fallback ──────────────────────────────────────────

#[test]
fn test_identify_keyword_fallback() {
    let r = resolver();
    let id = r.identify("Corner bakery near office");
    assert_eq!(id.category, "Food & Dining");
    assert!(!id.is_known_brand);
    assert!(id.brand.is_none());
}

#[test]
fn test_keyword_inside_a_word() {
    let r = resolver();
    let id = r.identify("seafood place");
    assert_eq!(id.category, "Food & Dining");
    assert!(!id.is_known_brand);
}

#[test]
fn test_keyword_at_word_start_wins() {
    let r = resolver();
    // "food" is buried in "seafood"; "taxi" starts a word
    assert_eq!(r.identify("seafood taxi").category, "Transportation");
}

#[test]
fn test_identify_category_name() {
    let r = resolver();
    let id = r.identify("groceries");
    assert_eq!(id.category, "Groceries");
    assert!(!id.is_known_brand);
}

// ── Ad-hoc categories ─────────────────────────────────────────

#[test]
fn test_identify_unknown_becomes_category() {
    let r = resolver();
    let id = r.identify("aling nena's");
    assert_eq!(id.category, "Aling Nena's");
    assert_eq!(id.icon, DEFAULT_ICON);
    assert_eq!(id.color, DEFAULT_COLOR);
    assert!(!id.is_known_brand);
}

#[test]
fn test_identify_empty_is_other() {
    let r = resolver();
    for input in ["", "   ", "\t\n"] {
        let id = r.identify(input);
        assert_eq!(id.category, DEFAULT_CATEGORY);
        assert!(!id.is_known_brand);
        assert!(!id.icon.is_empty());
    }
}

// ── Logos and styles ──────────────────────────────────────────

#[test]
fn test_logo_url() {
    let r = resolver();
    assert_eq!(
        r.logo_url("Starbucks").as_deref(),
        Some("https://logo.clearbit.com/starbucks.com")
    );
    assert!(r.logo_url("Not A Brand").is_none());
}

#[test]
fn test_style_for_unknown_category() {
    let r = resolver();
    assert_eq!(r.style_for("Made Up"), (DEFAULT_ICON, DEFAULT_COLOR));
    let (_, color) = r.style_for("travel");
    assert_eq!(color, "#5C6BC0");
}

// ── Custom data files ─────────────────────────────────────────

#[test]
fn test_custom_table_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brands.json");
    std::fs::write(
        &path,
        r##"{
            "categories": [
                {"name": "Pets", "icon": "🐶", "color": "#123456", "keywords": ["vet"]},
                {"name": "Other", "icon": "📦", "color": "#9E9E9E"}
            ],
            "brands": [{"name": "Petco", "category": "Pets"}]
        }"##,
    )
    .unwrap();

    let r = BrandResolver::load(Some(&path)).unwrap();
    assert_eq!(r.identify("PETCO").category, "Pets");
    assert_eq!(r.identify("vet visit").category, "Pets");
    assert!(r.logo_url("Petco").is_none());
}

#[test]
fn test_unknown_brand_category_rejected() {
    let data = r#"{"categories": [], "brands": [{"name": "X", "category": "Nope"}]}"#;
    assert!(BrandResolver::from_json(data).is_err());
}

#[test]
fn test_duplicate_category_rejected() {
    let data = r##"{"categories": [
        {"name": "A", "icon": "a", "color": "#000"},
        {"name": "a", "icon": "b", "color": "#111"}
    ], "brands": []}"##;
    assert!(BrandResolver::from_json(data).is_err());
}

#[test]
fn test_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(BrandResolver::load(Some(&dir.path().join("missing.json"))).is_err());
}

// ── Helpers ───────────────────────────────────────────────────

#[test]
fn test_title_case() {
    assert_eq!(title_case("hello WORLD"), "Hello World");
    assert_eq!(title_case("  a  b "), "A B");
    assert_eq!(title_case(""), "");
}
