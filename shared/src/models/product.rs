//! Menu models: products, addons, and their recipes
//!
//! The menu file is static reference data loaded once at process start. A
//! recipe maps ingredient keys (`"<category>/<item>"`) to the quantity
//! consumed per unit of the product or addon.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Recipe: ingredient key -> quantity consumed per unit
///
/// Keys use the composite `"<category>/<item>"` form, e.g.
/// `"consumables/medium-cup"` or `"powders/taro-powder"`. Entries keep the
/// declaration order of the menu file, so shortage reports name ingredients
/// the way the menu lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipe(Vec<(String, u64)>);

impl Recipe {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantity for one ingredient key, if present
    pub fn get(&self, key: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, quantity)| *quantity)
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, quantity)| (k.as_str(), *quantity))
    }
}

impl FromIterator<(String, u64)> for Recipe {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Recipe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, quantity) in &self.0 {
            map.serialize_entry(key, quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecipeVisitor;

        impl<'de> Visitor<'de> for RecipeVisitor {
            type Value = Recipe;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of ingredient keys to quantities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, u64>()? {
                    entries.push(entry);
                }
                Ok(Recipe(entries))
            }
        }

        deserializer.deserialize_map(RecipeVisitor)
    }
}

/// Product entity (immutable menu reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in cents, keyed by size (e.g. "medium", "large")
    pub prices: BTreeMap<String, i64>,
    /// Recipe per size; every size in `prices` must have a recipe entry
    pub recipes: BTreeMap<String, Recipe>,
}

/// Addon entity (immutable menu reference data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub name: String,
    /// Price in cents
    pub price: i64,
    /// Typically a single entry of quantity 1 (one topping portion)
    pub recipe: Recipe,
}

/// Menu category grouping products for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub products: Vec<Product>,
}

/// Top-level menu file shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuFile {
    pub addons: Vec<Addon>,
    pub categories: Vec<MenuCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_file_parses() {
        let json = r#"{
            "addons": [
                { "id": "pearl", "name": "Pearl", "price": 1000,
                  "recipe": { "toppings/pearl": 1 } }
            ],
            "categories": [
                { "id": "milktea", "name": "Milk Tea", "products": [
                    { "id": "mt-taro", "name": "Taro",
                      "prices": { "medium": 2800, "large": 3800 },
                      "recipes": {
                        "medium": { "consumables/medium-cup": 1, "powders/taro-powder": 30 },
                        "large": { "consumables/large-cup": 1, "powders/taro-powder": 40 }
                      } }
                ] }
            ]
        }"#;

        let menu: MenuFile = serde_json::from_str(json).unwrap();
        assert_eq!(menu.addons[0].recipe.get("toppings/pearl"), Some(1));
        let taro = &menu.categories[0].products[0];
        assert_eq!(taro.prices.get("medium"), Some(&2800));
        assert_eq!(taro.recipes["large"].get("powders/taro-powder"), Some(40));
    }

    #[test]
    fn test_recipe_keeps_declaration_order() {
        let json = r#"{ "consumables/medium-cup": 1,
                        "consumables/sealing-film": 1,
                        "consumables/boba-straw": 1 }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = recipe.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "consumables/medium-cup",
                "consumables/sealing-film",
                "consumables/boba-straw",
            ]
        );

        // Round-trips in the same order
        let back = serde_json::to_string(&recipe).unwrap();
        let reparsed: Recipe = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, recipe);
    }
}
