//! `add-picture-folder` -- register a folder of images as pictures.
//!
//! Scans a directory recursively, hashes each image, skips content that is
//! already registered, stores the bytes in the blob store, and inserts a
//! picture row named after the image's path relative to the image root.
//! With `--dry-run` nothing is written, migrations included.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default   | Description                     |
//! |----------------------|----------|-----------|---------------------------------|
//! | `DATABASE_URL`       | yes      | --        | PostgreSQL connection string    |
//! | `STORAGE_ROOT`       | no       | `./media` | Root of the local blob store    |
//! | `DB_MAX_CONNECTIONS` | no       | `5`       | Connection pool size            |
//! | `IMAGE_ROOT`         | no       | --        | Fallback for `--root-directory` |

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use polyseg_admin::cli::AddPictureFolderArgs;
use polyseg_admin::config::AdminConfig;
use polyseg_admin::import::{prepare_database, resolve_paths, run_import, PgPictureRegistry};
use polyseg_core::importer::scan_image_folder;
use polyseg_core::storage::LocalBlobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polyseg_admin=info,polyseg_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = AddPictureFolderArgs::parse();
    let config = AdminConfig::from_env()?;

    let (directory, root) = resolve_paths(&args.directory, args.root_directory.as_deref()).await?;
    tracing::info!(
        directory = %directory.display(),
        root = %root.display(),
        storage_root = %config.storage_root.display(),
        dry_run = args.dry_run,
        "Starting picture import",
    );

    let images = scan_image_folder(&directory, &root, args.max_depth).await?;
    tracing::info!(count = images.len(), "Scan complete");

    let pool = polyseg_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    prepare_database(&pool, args.dry_run).await?;

    let registry = PgPictureRegistry::new(pool, LocalBlobStore::new(&config.storage_root));
    let report = run_import(&registry, &images, args.dry_run).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    tracing::info!(
        scanned = report.scanned,
        registered = report.registered,
        duplicates = report.duplicates,
        failed = report.failed,
        "Picture import finished",
    );

    anyhow::ensure!(report.failed == 0, "{} file(s) failed to import", report.failed);
    Ok(())
}
