use thiserror::Error;

/// Errors raised by domain and tile-grid arithmetic.
///
/// These are precondition violations: the caller asked about a point or a
/// block that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Lower bound exceeds upper bound along some axis
    #[error("Inverted bounds: lower {lower} exceeds upper {upper} along axis {axis}")]
    InvertedBounds {
        lower: String,
        upper: String,
        axis: usize,
    },

    /// Point is not contained in the domain
    #[error("Point {point} lies outside the domain {domain}")]
    PointOutside { point: String, domain: String },

    /// Block coordinate is not part of the tile grid
    #[error("Block {block} lies outside the tile grid {grid}")]
    BlockOutsideGrid { block: String, grid: String },

    /// The number of points along an axis does not fit in an `i64`
    #[error("Extent from {lower} to {upper} along axis {axis} overflows")]
    ExtentOverflow {
        lower: String,
        upper: String,
        axis: usize,
    },

    /// Tile count per dimension must be at least 1
    #[error("Tile count per dimension must be positive, got {0}")]
    InvalidTileCount(i64),

    /// Dense buffer length does not match the domain size
    #[error("Expected {expected} values for {domain}, got {actual}")]
    ValueCountMismatch {
        domain: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors reported by tile factories when producing or persisting tiles.
#[derive(Debug, Clone, Error)]
pub enum FactoryError {
    /// Filesystem error from a persistent backing store
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Persisted tile could not be decoded
    #[error("Corrupt tile document {path}: {message}")]
    Corrupt { path: String, message: String },

    /// Requested sub-domain is not part of the image
    #[error("Sub-domain {requested} lies outside the image domain {domain}")]
    OutsideDomain { requested: String, domain: String },

    /// Factory returned a tile over a different sub-domain than requested
    #[error("Factory produced a tile over {produced}, expected {requested}")]
    WrongTileDomain { requested: String, produced: String },

    /// Factory is not usable
    #[error("Factory is not in a valid state: {0}")]
    Invalid(String),
}

/// Errors raised by the tile cache.
///
/// Cache misses are never errors; they are reported through `Option`/`bool`
/// results on the fast path.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The factory failed to produce or persist a tile
    #[error("Factory error: {0}")]
    Factory(#[from] FactoryError),

    /// Tile addressing failed
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The read policy selected a victim that is not resident
    #[error("Read policy selected victim {victim}, which is not resident")]
    VictimNotResident { victim: String },

    /// A tile expected to be resident was not found
    #[error("Tile {domain} is not resident")]
    NotResident { domain: String },
}

/// Errors surfaced by the tiled image facade and its cursors.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Point or block addressing failed
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Cache or factory failure
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Factory rejected at construction time
    #[error("Invalid factory: {0}")]
    InvalidFactory(String),

    /// Cursor is on the end sentinel
    #[error("Cursor is past the last point")]
    CursorAtEnd,

    /// Cursor is on the first point and cannot retreat
    #[error("Cursor is on the first point")]
    CursorAtBegin,
}
