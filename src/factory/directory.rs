use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_inside, FactoryStats, TileFactory};
use crate::domain::{Domain, Point};
use crate::error::FactoryError;
use crate::image::ImageContainer;

/// On-disk representation of one tile.
#[derive(Debug, Serialize, Deserialize)]
struct TileDocument<V> {
    lower: Vec<i64>,
    upper: Vec<i64>,
    values: Vec<V>,
}

/// Factory persisting each tile as a JSON document in a directory.
///
/// Tiles that were never flushed are produced filled with the configured
/// default value, so a fresh directory behaves like a blank image.
#[derive(Debug, Clone)]
pub struct DirectoryFactory<V, const D: usize> {
    root: PathBuf,
    domain: Domain<D>,
    fill: V,
    stats: FactoryStats,
}

impl<V, const D: usize> DirectoryFactory<V, D>
where
    V: Copy + Serialize + DeserializeOwned,
{
    /// Open (creating if needed) a tile directory for an image over `domain`.
    pub fn open(root: impl Into<PathBuf>, domain: Domain<D>, fill: V) -> Result<Self, FactoryError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;
        Ok(Self {
            root,
            domain,
            fill,
            stats: FactoryStats::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> FactoryStats {
        self.stats
    }

    /// File holding the tile over `domain`.
    pub fn tile_path(&self, domain: &Domain<D>) -> PathBuf {
        let join = |p: &Point<D>| {
            p.coords()
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("_")
        };
        self.root.join(format!(
            "tile_{}__{}.json",
            join(domain.lower()),
            join(domain.upper())
        ))
    }

    fn decode(
        &self,
        path: &Path,
        bytes: &[u8],
        domain: &Domain<D>,
    ) -> Result<ImageContainer<V, D>, FactoryError> {
        let corrupt = |message: String| FactoryError::Corrupt {
            path: path.display().to_string(),
            message,
        };

        let doc: TileDocument<V> =
            serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;

        if doc.lower.as_slice() != domain.lower().coords().as_slice()
            || doc.upper.as_slice() != domain.upper().coords().as_slice()
        {
            return Err(corrupt(format!(
                "bounds {:?}..{:?} do not match {}",
                doc.lower, doc.upper, domain
            )));
        }

        ImageContainer::from_values(*domain, doc.values).map_err(|e| corrupt(e.to_string()))
    }
}

impl<V, const D: usize> TileFactory<D> for DirectoryFactory<V, D>
where
    V: Copy + Serialize + DeserializeOwned,
{
    type Value = V;

    fn domain(&self) -> &Domain<D> {
        &self.domain
    }

    fn produce_tile(&mut self, domain: &Domain<D>) -> Result<ImageContainer<V, D>, FactoryError> {
        check_inside(&self.domain, domain)?;
        if !self.is_valid() {
            // A vanished store must not read back as a blank image
            return Err(FactoryError::Invalid(format!(
                "tile directory {} is missing",
                self.root.display()
            )));
        }
        let path = self.tile_path(domain);

        let tile = match fs::read(&path) {
            Ok(bytes) => self.decode(&path, &bytes, domain)?,
            Err(e) if e.kind() == ErrorKind::NotFound => ImageContainer::new(*domain, self.fill),
            Err(e) => return Err(io_error(&path, e)),
        };

        self.stats.produced += 1;
        Ok(tile)
    }

    fn flush_tile(&mut self, tile: &ImageContainer<V, D>) -> Result<(), FactoryError> {
        check_inside(&self.domain, tile.domain())?;
        let path = self.tile_path(tile.domain());

        let doc = TileDocument {
            lower: tile.domain().lower().coords().to_vec(),
            upper: tile.domain().upper().coords().to_vec(),
            values: tile.values().to_vec(),
        };
        let bytes = serde_json::to_vec(&doc).map_err(|e| FactoryError::Corrupt {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // Write-then-rename so a crash never leaves a half-written tile
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &bytes).map_err(|e| io_error(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| io_error(&path, e))?;

        self.stats.flushed += 1;
        debug!(tile = %tile.domain(), path = %path.display(), "persisted tile");
        Ok(())
    }

    fn release_tile(&mut self, tile: ImageContainer<V, D>) {
        self.stats.released += 1;
        drop(tile);
    }

    fn is_valid(&self) -> bool {
        self.root.is_dir()
    }
}

fn io_error(path: &Path, err: std::io::Error) -> FactoryError {
    FactoryError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
