//! Bulk registration of scanned images.
//!
//! Each file is read, hashed, checked against already-registered content,
//! and registered. A failure on one file is logged and counted; the run
//! continues with the next file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use polyseg_core::hashing::sha256_hex;
use polyseg_core::importer::{ImportReport, ScannedImage};
use polyseg_core::storage::LocalBlobStore;
use polyseg_core::types::DbId;
use polyseg_db::catalog::register_picture;
use polyseg_db::repositories::PictureRepo;
use sqlx::PgPool;

/// Where scanned images get registered.
#[async_trait]
pub trait PictureRegistry: Send + Sync {
    /// Id of a picture already registered with this content hash.
    async fn find_by_hash(&self, content_hash: &str) -> anyhow::Result<Option<DbId>>;

    /// Store and register one image, returning the new picture id.
    async fn register(&self, image: &ScannedImage, content: &[u8]) -> anyhow::Result<DbId>;
}

/// Registry writing to PostgreSQL and a local blob store.
pub struct PgPictureRegistry {
    pool: PgPool,
    store: LocalBlobStore,
}

impl PgPictureRegistry {
    pub fn new(pool: PgPool, store: LocalBlobStore) -> Self {
        Self { pool, store }
    }
}

#[async_trait]
impl PictureRegistry for PgPictureRegistry {
    async fn find_by_hash(&self, content_hash: &str) -> anyhow::Result<Option<DbId>> {
        let found = PictureRepo::find_by_content_hash(&self.pool, content_hash).await?;
        Ok(found.map(|p| p.id))
    }

    async fn register(&self, image: &ScannedImage, content: &[u8]) -> anyhow::Result<DbId> {
        let picture = register_picture(
            &self.pool,
            &self.store,
            &image.display_name,
            &image.extension,
            content,
        )
        .await?;
        Ok(picture.id)
    }
}

/// Check the connection and, unless this is a dry run, apply migrations.
pub async fn prepare_database(pool: &PgPool, dry_run: bool) -> anyhow::Result<()> {
    polyseg_db::health_check(pool)
        .await
        .context("Database health check failed")?;
    if !dry_run {
        polyseg_db::run_migrations(pool)
            .await
            .context("Failed to run database migrations")?;
    }
    Ok(())
}

/// Resolve the scan directory and image root to canonical paths.
///
/// The root defaults to the directory itself and must contain it.
pub async fn resolve_paths(
    directory: &Path,
    root_directory: Option<&Path>,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    let directory = tokio::fs::canonicalize(directory)
        .await
        .with_context(|| format!("cannot resolve directory '{}'", directory.display()))?;
    let root = match root_directory {
        Some(root) => tokio::fs::canonicalize(root)
            .await
            .with_context(|| format!("cannot resolve root directory '{}'", root.display()))?,
        None => directory.clone(),
    };
    anyhow::ensure!(
        directory.starts_with(&root),
        "directory '{}' is not inside root directory '{}'",
        directory.display(),
        root.display()
    );
    Ok((directory, root))
}

/// Register every image in `images`, skipping content already registered.
pub async fn run_import<R>(registry: &R, images: &[ScannedImage], dry_run: bool) -> ImportReport
where
    R: PictureRegistry + ?Sized,
{
    let mut report = ImportReport {
        scanned: images.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();

    for image in images {
        match import_one(registry, image, dry_run, &mut seen).await {
            Ok(Outcome::Registered(id)) => {
                report.registered += 1;
                tracing::info!(name = %image.display_name, picture_id = ?id, "Imported picture");
            }
            Ok(Outcome::Duplicate) => {
                report.duplicates += 1;
                tracing::info!(name = %image.display_name, "Skipped duplicate content");
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(
                    name = %image.display_name,
                    path = %image.path.display(),
                    error = %format!("{e:#}"),
                    "Failed to import picture",
                );
            }
        }
    }

    report
}

enum Outcome {
    /// Registered; `None` in dry-run mode.
    Registered(Option<DbId>),
    Duplicate,
}

async fn import_one<R>(
    registry: &R,
    image: &ScannedImage,
    dry_run: bool,
    seen: &mut HashSet<String>,
) -> anyhow::Result<Outcome>
where
    R: PictureRegistry + ?Sized,
{
    let content = tokio::fs::read(&image.path)
        .await
        .with_context(|| format!("cannot read '{}'", image.path.display()))?;
    let hash = sha256_hex(&content);

    if seen.contains(&hash) || registry.find_by_hash(&hash).await?.is_some() {
        return Ok(Outcome::Duplicate);
    }
    if dry_run {
        seen.insert(hash);
        return Ok(Outcome::Registered(None));
    }

    // Only successful registrations count, so a later copy can retry.
    let id = registry.register(image, &content).await?;
    seen.insert(hash);
    Ok(Outcome::Registered(Some(id)))
}
