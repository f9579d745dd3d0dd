use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::SNACK_KEY_PREFIX;

/// Meal slot planned independently with its own weekly quota.
///
/// Variants are declared in traversal order, so the derived `Ord` matches
/// [`Category::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Breakfast,
    Snack1,
    Lunch,
    Snack2,
    Dinner,
}

impl Category {
    /// Fixed traversal order of the planning wizard.
    pub const ORDER: [Self; 5] = [
        Self::Breakfast,
        Self::Snack1,
        Self::Lunch,
        Self::Snack2,
        Self::Dinner,
    ];

    /// Number of categories in the traversal.
    pub const COUNT: usize = Self::ORDER.len();

    /// Position of the category within [`Category::ORDER`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Breakfast => 0,
            Self::Snack1 => 1,
            Self::Lunch => 2,
            Self::Snack2 => 3,
            Self::Dinner => 4,
        }
    }

    /// Category at `index`, or `None` once the traversal is exhausted.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    /// Stable key used in persisted blobs and share tokens.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Snack1 => "snack1",
            Self::Lunch => "lunch",
            Self::Snack2 => "snack2",
            Self::Dinner => "dinner",
        }
    }

    /// Heading shown in summaries and the progress header.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Breakfast => "Desayuno",
            Self::Snack1 | Self::Snack2 => "Colación / Snack",
            Self::Lunch => "Comida",
            Self::Dinner => "Cena",
        }
    }

    /// Canonical source bucket this category draws its candidates from.
    #[must_use]
    pub const fn source_bucket(self) -> SourceBucket {
        match self {
            Self::Breakfast => SourceBucket::Breakfast,
            Self::Snack1 | Self::Snack2 => SourceBucket::Snack,
            Self::Lunch => SourceBucket::Lunch,
            Self::Dinner => SourceBucket::Dinner,
        }
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        matches!(self, Self::Dinner)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Bucket of the canonical menu catalog. Both snack categories share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBucket {
    Breakfast,
    Snack,
    Lunch,
    Dinner,
}

impl SourceBucket {
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Snack, Self::Lunch, Self::Dinner];

    /// Normalize a raw document key.
    ///
    /// Matching is case-insensitive and any key starting with `snack`
    /// (`Snack`, `snack1`, `SNACKS_PM`, ...) collapses into [`SourceBucket::Snack`].
    #[must_use]
    pub fn from_raw_key(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase();
        if key.starts_with(SNACK_KEY_PREFIX) {
            return Some(Self::Snack);
        }
        match key.as_str() {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            _ => None,
        }
    }

    /// Categories fed from this bucket.
    #[must_use]
    pub fn categories(self) -> Vec<Category> {
        Category::ORDER
            .into_iter()
            .filter(|category| category.source_bucket() == self)
            .collect()
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Snack => "snack",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

impl fmt::Display for SourceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_index_agree() {
        for (position, category) in Category::ORDER.iter().enumerate() {
            assert_eq!(category.index(), position);
            assert_eq!(Category::from_index(position), Some(*category));
        }
        assert_eq!(Category::from_index(Category::COUNT), None);
        assert!(Category::Dinner.is_last());
        assert!(!Category::Snack2.is_last());
    }

    #[test]
    fn derived_ordering_follows_traversal() {
        let mut shuffled = vec![
            Category::Dinner,
            Category::Breakfast,
            Category::Snack2,
            Category::Lunch,
            Category::Snack1,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Category::ORDER.to_vec());
    }

    #[test]
    fn raw_keys_normalize_case_insensitively() {
        assert_eq!(
            SourceBucket::from_raw_key("Breakfast"),
            Some(SourceBucket::Breakfast)
        );
        assert_eq!(SourceBucket::from_raw_key("LUNCH"), Some(SourceBucket::Lunch));
        assert_eq!(SourceBucket::from_raw_key("snack1"), Some(SourceBucket::Snack));
        assert_eq!(SourceBucket::from_raw_key("Snack2"), Some(SourceBucket::Snack));
        assert_eq!(SourceBucket::from_raw_key("snacks_pm"), Some(SourceBucket::Snack));
        assert_eq!(SourceBucket::from_raw_key("brunch"), None);
        assert_eq!(SourceBucket::from_raw_key("id"), None);
    }

    #[test]
    fn snack_categories_share_one_bucket() {
        assert_eq!(
            SourceBucket::Snack.categories(),
            vec![Category::Snack1, Category::Snack2]
        );
        assert_eq!(Category::Snack1.display_name(), Category::Snack2.display_name());
    }

    #[test]
    fn serde_uses_lowercase_keys() {
        let json = serde_json::to_string(&Category::Snack2).unwrap();
        assert_eq!(json, "\"snack2\"");
        let parsed: Category = serde_json::from_str("\"breakfast\"").unwrap();
        assert_eq!(parsed, Category::Breakfast);
    }
}
