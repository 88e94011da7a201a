//! Command-line configuration for the workload driver.
//!
//! Every option can also be set through an environment variable with the
//! `TILED_` prefix:
//!
//! - `TILED_EXTENT` - Image extents, comma-separated (default: 512,512)
//! - `TILED_TILES` - Tiles per dimension (default: 8)
//! - `TILED_CAPACITY` - Resident tile budget (default: 4)
//! - `TILED_READ_POLICY` - `fifo`, `lru` or `last` (default: lru)
//! - `TILED_WRITE_POLICY` - `write-back`, `write-through` or `discard`
//!   (default: write-back)
//! - `TILED_STORE` - Directory for on-disk tiles (default: in memory)
//! - `TILED_STRIDE` - Step of the strided read pass (default: 7)

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

// =============================================================================
// Default Values
// =============================================================================

/// Default number of tiles along each axis.
pub const DEFAULT_TILES_PER_DIMENSION: i64 = 8;

/// Default number of resident tiles.
pub const DEFAULT_CAPACITY: usize = 4;

/// Default step of the strided read pass.
pub const DEFAULT_STRIDE: usize = 7;

/// Largest number of points the driver will allocate.
pub const MAX_POINTS: i64 = 1 << 28;

// =============================================================================
// Policy Selection
// =============================================================================

/// Eviction strategy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicyKind {
    Fifo,
    Lru,
    /// Single resident tile.
    Last,
}

/// Write-back strategy.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicyKind {
    /// Persist modified tiles on eviction.
    WriteBack,
    /// Persist every evicted tile.
    WriteThrough,
    /// Never persist.
    Discard,
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tiled Image - page a large image through a bounded tile cache.
///
/// Fills an image point by point, scans it back through a cursor and a
/// strided read pass, then reports how many tile loads each pass needed.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiled-image")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Image Geometry
    // =========================================================================
    /// Image extents, one per axis (2 or 3 axes).
    #[arg(long, default_value = "512,512", env = "TILED_EXTENT", value_delimiter = ',')]
    pub extent: Vec<i64>,

    /// Number of tiles along each axis.
    #[arg(short = 'n', long = "tiles", default_value_t = DEFAULT_TILES_PER_DIMENSION, env = "TILED_TILES")]
    pub tiles_per_dimension: i64,

    // =========================================================================
    // Cache Configuration
    // =========================================================================
    /// Maximum number of resident tiles (ignored by the `last` policy).
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY, env = "TILED_CAPACITY")]
    pub capacity: usize,

    /// Eviction strategy.
    #[arg(long, value_enum, default_value_t = ReadPolicyKind::Lru, env = "TILED_READ_POLICY")]
    pub read_policy: ReadPolicyKind,

    /// Write-back strategy.
    #[arg(long, value_enum, default_value_t = WritePolicyKind::WriteBack, env = "TILED_WRITE_POLICY")]
    pub write_policy: WritePolicyKind,

    // =========================================================================
    // Storage
    // =========================================================================
    /// Keep tiles as JSON files in this directory instead of in memory.
    ///
    /// With the discard write policy the directory must be empty.
    #[arg(long, env = "TILED_STORE")]
    pub store: Option<PathBuf>,

    // =========================================================================
    // Workload
    // =========================================================================
    /// Step between points of the strided read pass.
    #[arg(long, default_value_t = DEFAULT_STRIDE, env = "TILED_STRIDE")]
    pub stride: usize,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(2..=3).contains(&self.extent.len()) {
            return Err(format!(
                "extent must list 2 or 3 axes, got {}",
                self.extent.len()
            ));
        }
        if let Some(extent) = self.extent.iter().find(|&&e| e <= 0) {
            return Err(format!("extent values must be positive, got {}", extent));
        }
        let points = self
            .extent
            .iter()
            .try_fold(1i64, |acc, &e| acc.checked_mul(e))
            .filter(|&points| points <= MAX_POINTS);
        if points.is_none() {
            return Err(format!("image is too large, at most {} points", MAX_POINTS));
        }

        if self.tiles_per_dimension <= 0 {
            return Err("tiles must be greater than 0".to_string());
        }
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".to_string());
        }
        if self.stride == 0 {
            return Err("stride must be greater than 0".to_string());
        }

        if let Some(store) = &self.store {
            if store.is_file() {
                return Err(format!("store {} is a file, not a directory", store.display()));
            }
            // Discarded writes read back as the blank fill value
            let has_entries = fs::read_dir(store)
                .map(|mut entries| entries.next().is_some())
                .unwrap_or(false);
            if self.write_policy == WritePolicyKind::Discard && has_entries {
                return Err(format!(
                    "store {} already holds tiles; the discard policy needs an empty directory",
                    store.display()
                ));
            }
        }

        Ok(())
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.extent.len()
    }

    /// Extents as a fixed-size array, if there are exactly `D` of them.
    pub fn extents<const D: usize>(&self) -> Option<[i64; D]> {
        self.extent.as_slice().try_into().ok()
    }
}
