//! Tiled Image - workload driver for the tile cache.
//!
//! Builds a tiled image from the command-line configuration, runs a fixed
//! sequence of passes over it and reports the tile misses of each pass.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiled_image::{
    cache::{
        shared, DiscardPolicy, FifoReadPolicy, LastReadPolicy, LruReadPolicy, ReadPolicy, Shared,
        WriteBackPolicy, WritePolicy, WriteThroughPolicy,
    },
    config::{Config, ReadPolicyKind, WritePolicyKind},
    domain::{Domain, Point},
    error::ImageError,
    factory::{DirectoryFactory, MemoryFactory, TileFactory},
    image::ImageContainer,
    tiled::TiledImage,
};

fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_configuration(&config);

    let result = if let Some(extents) = config.extents::<2>() {
        run(&config, extents)
    } else if let Some(extents) = config.extents::<3>() {
        run(&config, extents)
    } else {
        error!("Unsupported dimension: {}", config.dimension());
        return ExitCode::FAILURE;
    };

    match result {
        Ok(passes) => report(&passes),
        Err(e) => {
            error!("Workload failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Workload
// =============================================================================

/// Outcome of one pass over the image.
#[derive(Debug, Clone)]
struct PassReport {
    name: &'static str,
    points: usize,
    read_misses: u64,
    write_misses: u64,
    mismatches: usize,
}

/// Value written at `point` by the fill pass.
fn sample<const D: usize>(point: &Point<D>) -> u32 {
    point
        .coords()
        .iter()
        .fold(0u32, |acc, &c| acc.wrapping_mul(31).wrapping_add(c as u32))
}

fn run<const D: usize>(config: &Config, extents: [i64; D]) -> Result<Vec<PassReport>, ImageError> {
    let domain = Domain::from_extents(extents)?;

    let read_policy: Shared<dyn ReadPolicy<D>> = match config.read_policy {
        ReadPolicyKind::Fifo => shared(FifoReadPolicy::new(config.capacity)),
        ReadPolicyKind::Lru => shared(LruReadPolicy::new(config.capacity)),
        ReadPolicyKind::Last => shared(LastReadPolicy::new()),
    };
    let write_policy: Shared<dyn WritePolicy<u32, D>> = match config.write_policy {
        WritePolicyKind::WriteBack => shared(WriteBackPolicy::new()),
        WritePolicyKind::WriteThrough => shared(WriteThroughPolicy::new()),
        WritePolicyKind::Discard => shared(DiscardPolicy::new()),
    };
    let persists = config.write_policy != WritePolicyKind::Discard;

    match &config.store {
        Some(root) => {
            let factory = open_store(root, domain)?;
            workload(config, factory, read_policy, write_policy, persists)
        }
        None => {
            let factory = shared(MemoryFactory::new(ImageContainer::new(domain, 0u32)));
            workload(config, factory, read_policy, write_policy, persists)
        }
    }
}

fn open_store<const D: usize>(
    root: &Path,
    domain: Domain<D>,
) -> Result<Shared<DirectoryFactory<u32, D>>, ImageError> {
    let factory = DirectoryFactory::open(root, domain, 0u32)
        .map_err(|e| ImageError::InvalidFactory(e.to_string()))?;
    info!("Tiles stored under {}", root.display());
    Ok(shared(factory))
}

fn workload<F, const D: usize>(
    config: &Config,
    factory: Shared<F>,
    read_policy: Shared<dyn ReadPolicy<D>>,
    write_policy: Shared<dyn WritePolicy<u32, D>>,
    persists: bool,
) -> Result<Vec<PassReport>, ImageError>
where
    F: TileFactory<D, Value = u32>,
{
    let image = TiledImage::new(factory, read_policy, write_policy, config.tiles_per_dimension)?;
    let grid = image.tile_grid();
    info!(
        "  Grid: {} requested per axis, {} blocks of {}, {} tiles",
        grid.tiles_per_dimension(),
        grid.block_domain(),
        grid.tile_size(),
        grid.tile_count()
    );

    let expected = |point: &Point<D>| if persists { sample(point) } else { 0 };
    let mut passes = Vec::new();

    // Fill in domain order, crossing tile boundaries along every row
    let mut points = 0;
    for point in image.domain().iter() {
        image.set_value(&point, sample(&point))?;
        points += 1;
    }
    passes.push(PassReport {
        name: "fill",
        points,
        read_misses: image.cache_miss_reads(),
        write_misses: image.cache_miss_writes(),
        mismatches: 0,
    });
    image.clear_cache_and_reset_misses()?;

    // Cursor scan, one tile at a time
    let mut cursor = image.begin()?;
    let mut points = 0;
    let mut mismatches = 0;
    while let Some(point) = cursor.point() {
        if cursor.get()? != expected(&point) {
            mismatches += 1;
        }
        points += 1;
        cursor.advance()?;
    }
    passes.push(snapshot(&image, "cursor", points, mismatches));
    image.clear_cache_and_reset_misses()?;

    // Strided reads
    let mut points = 0;
    let mut mismatches = 0;
    for point in image.domain().iter().step_by(config.stride) {
        if image.value(&point)? != expected(&point) {
            mismatches += 1;
        }
        points += 1;
    }
    passes.push(snapshot(&image, "strided", points, mismatches));
    image.clear_cache_and_reset_misses()?;

    // Reverse scan
    let mut points = 0;
    let mut mismatches = 0;
    for item in image.values().rev() {
        let (point, value) = item?;
        if value != expected(&point) {
            mismatches += 1;
        }
        points += 1;
    }
    passes.push(snapshot(&image, "reverse", points, mismatches));

    image.flush()?;
    if !image.is_valid() {
        warn!("Cache reported an inconsistent state after the workload");
    }
    Ok(passes)
}

fn snapshot<F, R, W, const D: usize>(
    image: &TiledImage<F, R, W, D>,
    name: &'static str,
    points: usize,
    mismatches: usize,
) -> PassReport
where
    F: TileFactory<D>,
    R: ReadPolicy<D> + ?Sized,
    W: WritePolicy<F::Value, D> + ?Sized,
{
    PassReport {
        name,
        points,
        read_misses: image.cache_miss_reads(),
        write_misses: image.cache_miss_writes(),
        mismatches,
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_configuration(config: &Config) {
    info!("tiled-image v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Extent: {:?}", config.extent);
    info!("  Tiles per dimension: {}", config.tiles_per_dimension);
    info!(
        "  Cache: {} tiles, read policy {:?}, write policy {:?}",
        config.capacity, config.read_policy, config.write_policy
    );
    if config.read_policy == ReadPolicyKind::Last && config.capacity != 1 {
        warn!("  The last policy keeps a single tile; capacity is ignored");
    }
    if config.write_policy == WritePolicyKind::Discard {
        warn!("  Discard policy: filled values are dropped on eviction");
    }
}

fn report(passes: &[PassReport]) -> ExitCode {
    info!("────────────────────────────────────────────────────────────────");
    for pass in passes {
        info!(
            "  {:<8} {:>10} points  {:>8} read misses  {:>8} write misses",
            pass.name, pass.points, pass.read_misses, pass.write_misses
        );
    }
    info!("────────────────────────────────────────────────────────────────");

    let mismatches: usize = passes.iter().map(|pass| pass.mismatches).sum();
    if mismatches > 0 {
        error!("{} values did not read back as written", mismatches);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiled_image=debug"
    } else {
        "tiled_image=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
