use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity or unit as written in the catalog: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(serde_json::Number),
    Text(String),
}

impl Measure {
    /// Blank text carries no information and is treated as not specified.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text.trim()),
        }
    }
}

impl From<&str> for Measure {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u32> for Measure {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_quantity: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_unit: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_quantity: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_unit: Option<Measure>,
}

impl Ingredient {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_quantity: None,
            metric_unit: None,
            alternative_quantity: None,
            alternative_unit: None,
        }
    }

    #[must_use]
    pub fn with_metric(mut self, quantity: impl Into<Measure>, unit: impl Into<Measure>) -> Self {
        self.metric_quantity = Some(quantity.into());
        self.metric_unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_alternative(
        mut self,
        quantity: impl Into<Measure>,
        unit: impl Into<Measure>,
    ) -> Self {
        self.alternative_quantity = Some(quantity.into());
        self.alternative_unit = Some(unit.into());
        self
    }

    /// Metric amount, e.g. `"120 g"`, `"120"` or `"g"`.
    #[must_use]
    pub fn metric_label(&self) -> Option<String> {
        measure_label(self.metric_quantity.as_ref(), self.metric_unit.as_ref())
    }

    /// Household amount, e.g. `"1 taza"`.
    #[must_use]
    pub fn alternative_label(&self) -> Option<String> {
        measure_label(
            self.alternative_quantity.as_ref(),
            self.alternative_unit.as_ref(),
        )
    }
}

fn measure_label(quantity: Option<&Measure>, unit: Option<&Measure>) -> Option<String> {
    let quantity = quantity.filter(|m| !m.is_blank());
    let unit = unit.filter(|m| !m.is_blank());
    match (quantity, unit) {
        (Some(q), Some(u)) => Some(format!("{q} {u}")),
        (Some(q), None) => Some(q.to_string()),
        (None, Some(u)) => Some(u.to_string()),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// A candidate menu. Immutable for the lifetime of a planning session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub menu_name: String,
    pub dishes: Vec<Dish>,
}

impl MenuEntry {
    #[must_use]
    pub fn new(menu_name: impl Into<String>, dishes: Vec<Dish>) -> Self {
        Self {
            menu_name: menu_name.into(),
            dishes,
        }
    }

    /// Entries need a non-blank name and at least one dish to be plannable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.menu_name.trim().is_empty() && !self.dishes.is_empty()
    }
}

/// One committed assignment of a menu to a number of days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedSelection {
    pub menu_name: String,
    pub days_used: u8,
    #[serde(default)]
    pub dishes: Vec<Dish>,
}

impl CommittedSelection {
    #[must_use]
    pub fn from_entry(entry: &MenuEntry, days_used: u8) -> Self {
        Self {
            menu_name: entry.menu_name.clone(),
            days_used,
            dishes: entry.dishes.clone(),
        }
    }

    /// `"día"` for a single day, `"días"` otherwise.
    #[must_use]
    pub const fn day_word(&self) -> &'static str {
        if self.days_used > 1 { "días" } else { "día" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_combine_quantity_and_unit() {
        let ingredient = Ingredient::named("Avena")
            .with_metric(40_u32, "g")
            .with_alternative("1/2", "taza");
        assert_eq!(ingredient.metric_label().as_deref(), Some("40 g"));
        assert_eq!(ingredient.alternative_label().as_deref(), Some("1/2 taza"));
    }

    #[test]
    fn labels_fall_back_to_whichever_part_exists() {
        let mut ingredient = Ingredient::named("Sal");
        ingredient.metric_unit = Some(Measure::from("al gusto"));
        ingredient.alternative_quantity = Some(Measure::from(2_u32));
        assert_eq!(ingredient.metric_label().as_deref(), Some("al gusto"));
        assert_eq!(ingredient.alternative_label().as_deref(), Some("2"));
        assert_eq!(Ingredient::named("Agua").metric_label(), None);
    }

    #[test]
    fn zero_is_a_quantity_but_blank_text_is_not() {
        let mut ingredient = Ingredient::named("Azúcar");
        ingredient.metric_quantity = Some(Measure::from(0_u32));
        ingredient.metric_unit = Some(Measure::from("  "));
        assert_eq!(ingredient.metric_label().as_deref(), Some("0"));
    }

    #[test]
    fn parses_catalog_json_with_mixed_measures() {
        let json = r#"{
            "menuName": "Desayuno ligero",
            "dishes": [{
                "name": "Avena",
                "ingredients": [
                    {"name": "Avena", "metricQuantity": 40, "metricUnit": "g"},
                    {"name": "Leche", "alternativeQuantity": "1", "alternativeUnit": "taza"}
                ]
            }]
        }"#;
        let entry: MenuEntry = serde_json::from_str(json).unwrap();
        assert!(entry.is_valid());
        let oats = &entry.dishes[0].ingredients[0];
        assert_eq!(oats.metric_quantity, Some(Measure::from(40_u32)));
        assert!(oats.alternative_quantity.is_none());

        let back = serde_json::to_value(&entry).unwrap();
        let original: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn entries_without_dishes_or_name_are_invalid() {
        assert!(!MenuEntry::new("Vacío", Vec::new()).is_valid());
        let dish = Dish {
            name: "Pan".into(),
            ingredients: Vec::new(),
        };
        assert!(!MenuEntry::new("   ", vec![dish]).is_valid());
    }

    #[test]
    fn committed_selection_pluralizes_days() {
        let entry = MenuEntry::new(
            "A",
            vec![Dish {
                name: "x".into(),
                ingredients: Vec::new(),
            }],
        );
        assert_eq!(CommittedSelection::from_entry(&entry, 1).day_word(), "día");
        assert_eq!(CommittedSelection::from_entry(&entry, 3).day_word(), "días");
    }
}
