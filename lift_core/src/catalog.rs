//! Built-in category tables.
//!
//! Display labels for each muscle category and the hand-authored table of
//! complementary pairings used to compose two-category plans.

use crate::types::Category;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Symmetric pairings of categories that share warm-up or equipment context
const COMPLEMENTARY_PAIRS: &[(Category, Category)] = &[
    (Category::Chest, Category::Triceps),
    (Category::Chest, Category::Shoulders),
    (Category::Back, Category::Biceps),
    (Category::Back, Category::Shoulders),
    (Category::Legs, Category::Core),
    (Category::Legs, Category::Cardio),
    (Category::Biceps, Category::Triceps),
    (Category::Core, Category::Cardio),
];

/// Cached lookup built from [`COMPLEMENTARY_PAIRS`], candidates in table order
static COMPLEMENTS: Lazy<HashMap<Category, Vec<Category>>> = Lazy::new(|| {
    let mut table: HashMap<Category, Vec<Category>> = HashMap::new();
    for &(a, b) in COMPLEMENTARY_PAIRS {
        table.entry(a).or_default().push(b);
        table.entry(b).or_default().push(a);
    }
    table
});

/// Categories that pair well with `category`
pub fn complements(category: Category) -> &'static [Category] {
    COMPLEMENTS
        .get(&category)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl Category {
    /// Human-readable label used in plan names
    pub fn label(&self) -> &'static str {
        match self {
            Category::Chest => "Chest",
            Category::Back => "Back",
            Category::Biceps => "Biceps",
            Category::Triceps => "Triceps",
            Category::Shoulders => "Shoulders",
            Category::Legs => "Legs",
            Category::Core => "Core",
            Category::Cardio => "Cardio",
        }
    }
}
