//! Recipe Catalog - indexed menu lookup for pricing and fulfillment
//!
//! The catalog is built once from the menu JSON at process start and never
//! mutated. Lookups are indexed by `(product_id, size)` and by addon id, so
//! the fulfillment hot path never scans the menu, and recipe keys are parsed
//! into [`IngredientKey`]s during the build so lookups hand back
//! storage-addressable recipes directly. A missing product, size, or addon
//! is a hard error: silently returning an empty recipe would under-deduct
//! stock.

use shared::models::{IngredientKey, MenuFile, Recipe};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Recipe with parsed, storage-addressable keys, in menu declaration order
pub type IndexedRecipe = Vec<(IngredientKey, u64)>;

/// Lookup errors (cart or menu data needs correcting, never retryable)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Size {size:?} not available for product {product}")]
    SizeNotAvailable { product: String, size: String },

    #[error("Unknown addon: {0}")]
    UnknownAddon(String),
}

/// Errors raised while building the catalog from the menu file
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse menu file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Product {product} size {size:?} has a price but no recipe")]
    MissingRecipe { product: String, size: String },

    #[error("Recipe for {owner} has malformed ingredient key {key:?}")]
    BadIngredientKey { owner: String, key: String },

    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    #[error("Duplicate addon id: {0}")]
    DuplicateAddon(String),
}

/// One product flattened to a single size: what fulfillment needs per line
#[derive(Debug, Clone)]
pub struct SizedProduct {
    pub product_id: String,
    pub name: String,
    /// Price in cents for this size
    pub price: i64,
    pub recipe: IndexedRecipe,
}

/// Addon with its recipe indexed for deduction
#[derive(Debug, Clone)]
pub struct CatalogAddon {
    pub id: String,
    pub name: String,
    /// Price in cents
    pub price: i64,
    pub recipe: IndexedRecipe,
}

/// Indexed, immutable menu catalog
#[derive(Debug)]
pub struct RecipeCatalog {
    /// (product_id, size) -> flattened product entry
    products: HashMap<(String, String), SizedProduct>,
    /// addon_id -> addon
    addons: HashMap<String, CatalogAddon>,
}

impl RecipeCatalog {
    /// Load and index the menu from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path)?;
        let menu: MenuFile = serde_json::from_str(&raw)?;
        Self::from_menu(menu)
    }

    /// Build the index from an already-parsed menu
    ///
    /// Validates up front that every priced size has a recipe and that every
    /// recipe key parses as `"<category>/<item>"`. Catching drift here turns
    /// a runtime fulfillment failure into a startup configuration error.
    pub fn from_menu(menu: MenuFile) -> Result<Self, CatalogLoadError> {
        let mut products = HashMap::new();
        let mut addons = HashMap::new();

        for category in &menu.categories {
            for product in &category.products {
                for (size, price) in &product.prices {
                    let recipe = product.recipes.get(size).ok_or_else(|| {
                        CatalogLoadError::MissingRecipe {
                            product: product.id.clone(),
                            size: size.clone(),
                        }
                    })?;

                    let key = (product.id.clone(), size.clone());
                    let entry = SizedProduct {
                        product_id: product.id.clone(),
                        name: product.name.clone(),
                        price: *price,
                        recipe: index_recipe(&product.id, recipe)?,
                    };
                    if products.insert(key, entry).is_some() {
                        return Err(CatalogLoadError::DuplicateProduct(product.id.clone()));
                    }
                }
            }
        }

        for addon in &menu.addons {
            let entry = CatalogAddon {
                id: addon.id.clone(),
                name: addon.name.clone(),
                price: addon.price,
                recipe: index_recipe(&addon.id, &addon.recipe)?,
            };
            if addons.insert(addon.id.clone(), entry).is_some() {
                return Err(CatalogLoadError::DuplicateAddon(addon.id.clone()));
            }
        }

        tracing::info!(
            product_sizes = products.len(),
            addons = addons.len(),
            "Recipe catalog loaded"
        );

        Ok(Self { products, addons })
    }

    /// Look up a product at a specific size
    pub fn product(&self, product_id: &str, size: &str) -> Result<&SizedProduct, CatalogError> {
        if let Some(entry) = self
            .products
            .get(&(product_id.to_string(), size.to_string()))
        {
            return Ok(entry);
        }
        // Distinguish unknown product from unknown size for better messages
        if self.products.keys().any(|(id, _)| id == product_id) {
            Err(CatalogError::SizeNotAvailable {
                product: product_id.to_string(),
                size: size.to_string(),
            })
        } else {
            Err(CatalogError::UnknownProduct(product_id.to_string()))
        }
    }

    /// Look up an addon
    pub fn addon(&self, addon_id: &str) -> Result<&CatalogAddon, CatalogError> {
        self.addons
            .get(addon_id)
            .ok_or_else(|| CatalogError::UnknownAddon(addon_id.to_string()))
    }
}

fn index_recipe(owner: &str, recipe: &Recipe) -> Result<IndexedRecipe, CatalogLoadError> {
    let mut indexed = IndexedRecipe::with_capacity(recipe.len());
    for (key, quantity) in recipe.iter() {
        let parsed = key
            .parse::<IngredientKey>()
            .map_err(|_| CatalogLoadError::BadIngredientKey {
                owner: owner.to_string(),
                key: key.to_string(),
            })?;
        indexed.push((parsed, quantity));
    }
    Ok(indexed)
}
