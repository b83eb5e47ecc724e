use std::sync::Arc;

use crate::catalog::RecipeCatalog;
use crate::core::{Config, Result};
use crate::fulfillment::{FulfillmentEngine, PosStorage};
use shared::models::InventorySeed;

/// Server state - shared handles to every service
///
/// Cloning is shallow: the storage and catalog are behind `Arc`, so axum can
/// clone the state per request without cost.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | Immutable configuration |
/// | storage | redb-backed store (inventory, orders, logs) |
/// | catalog | Indexed menu, built once at startup |
/// | engine | Order fulfillment workflow |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: PosStorage,
    pub catalog: Arc<RecipeCatalog>,
    pub engine: FulfillmentEngine,
}

impl ServerState {
    /// Open storage, load the catalog, and seed inventory on first run
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let storage = PosStorage::open(config.database_path())?;
        let catalog = Arc::new(RecipeCatalog::load(&config.menu_path)?);

        Self::seed_inventory(&storage, config)?;

        let engine = FulfillmentEngine::new(storage.clone(), Arc::clone(&catalog));
        Ok(Self {
            config: config.clone(),
            storage,
            catalog,
            engine,
        })
    }

    /// Apply the inventory seed file, if present, to an empty registry
    fn seed_inventory(storage: &PosStorage, config: &Config) -> Result<()> {
        let path = std::path::Path::new(&config.inventory_seed_path);
        if !path.exists() {
            tracing::warn!(
                path = %config.inventory_seed_path,
                "No inventory seed file; starting with existing stock only"
            );
            return Ok(());
        }

        let raw = std::fs::read_to_string(path)?;
        let seed: InventorySeed = serde_json::from_str(&raw)?;
        let applied = storage.seed_inventory(&seed)?;
        if applied {
            tracing::info!(categories = seed.len(), "Inventory seeded from file");
        } else {
            tracing::info!("Inventory already initialized; seed file skipped");
        }
        Ok(())
    }
}
