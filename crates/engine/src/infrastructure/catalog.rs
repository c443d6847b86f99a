//! Catalog loading.
//!
//! The game content ships with the binary under `data/`. A `CATALOG_DIR`
//! override swaps in files from disk; any file missing there falls back to
//! the bundled copy.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tabletop_domain::{Catalog, DomainError, ItemDef, MonsterTemplate, QuestDef, SpellDef};
use thiserror::Error;
use tokio::fs;

const MONSTERS_FILE: &str = "monsters.json";
const ITEMS_FILE: &str = "items.json";
const SPELLS_FILE: &str = "spells.json";
const QUESTS_FILE: &str = "quests.json";

const BUNDLED_MONSTERS: &str = include_str!("../../../../data/monsters.json");
const BUNDLED_ITEMS: &str = include_str!("../../../../data/items.json");
const BUNDLED_SPELLS: &str = include_str!("../../../../data/spells.json");
const BUNDLED_QUESTS: &str = include_str!("../../../../data/quests.json");

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Catalog directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("Invalid catalog: {0}")]
    Invalid(#[from] DomainError),
}

/// Reads the four catalog files.
pub struct CatalogLoader {
    dir: Option<PathBuf>,
}

impl CatalogLoader {
    /// Loader that only uses the bundled content.
    pub fn bundled() -> Self {
        Self { dir: None }
    }

    /// Loader that prefers files under `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        if let Some(dir) = &self.dir {
            if !fs::try_exists(dir).await.unwrap_or(false) {
                return Err(CatalogError::DirectoryNotFound(dir.clone()));
            }
        }

        let monsters: Vec<MonsterTemplate> = self.read(MONSTERS_FILE, BUNDLED_MONSTERS).await?;
        let items: Vec<ItemDef> = self.read(ITEMS_FILE, BUNDLED_ITEMS).await?;
        let spells: Vec<SpellDef> = self.read(SPELLS_FILE, BUNDLED_SPELLS).await?;
        let quests: Vec<QuestDef> = self.read(QUESTS_FILE, BUNDLED_QUESTS).await?;

        let catalog = Catalog::new(monsters, items, spells, quests)?;
        tracing::info!(
            monsters = catalog.monsters().len(),
            items = catalog.items().len(),
            quests = catalog.quests().len(),
            source = %self.describe(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    async fn read<T: DeserializeOwned>(&self, file: &str, bundled: &str) -> Result<T, CatalogError> {
        let content = match self.dir.as_deref().map(|dir| dir.join(file)) {
            Some(path) if fs::try_exists(&path).await.unwrap_or(false) => read_file(&path).await?,
            Some(path) => {
                tracing::debug!(path = %path.display(), "Catalog file missing, using bundled copy");
                bundled.to_string()
            }
            None => bundled.to_string(),
        };
        serde_json::from_str(&content).map_err(|source| CatalogError::Json {
            file: file.to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        match &self.dir {
            Some(dir) => dir.display().to_string(),
            None => "bundled".to_string(),
        }
    }
}

async fn read_file(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
}
