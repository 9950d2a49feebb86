//! Picture registration: store image bytes, hash them, insert the row.

use polyseg_core::hashing::sha256_hex;
use polyseg_core::picture::prepare_picture;
use polyseg_core::storage::BlobStore;
use sqlx::PgPool;

use crate::models::picture::{CreatePicture, Picture};
use crate::repositories::PictureRepo;
use crate::DbError;

/// Register a picture using the default SHA-256 content hash.
pub async fn register_picture(
    pool: &PgPool,
    store: &dyn BlobStore,
    name: &str,
    extension: &str,
    content: &[u8],
) -> Result<Picture, DbError> {
    register_picture_with(pool, store, name, extension, content, sha256_hex).await
}

/// Register a picture, hashing its bytes with `hasher`.
///
/// Fails before touching storage if `name` is blank. The bytes are written
/// to the blob store before the row is inserted, so a committed row always
/// points at stored content.
pub async fn register_picture_with<H>(
    pool: &PgPool,
    store: &dyn BlobStore,
    name: &str,
    extension: &str,
    content: &[u8],
    hasher: H,
) -> Result<Picture, DbError>
where
    H: Fn(&[u8]) -> String + Send,
{
    let prepared = prepare_picture(name, extension, content, None, hasher)?;

    if !store.exists(&prepared.file_path).await? {
        store.put(&prepared.file_path, content).await?;
    }

    let picture = PictureRepo::create(
        pool,
        &CreatePicture {
            file_path: prepared.file_path,
            name: prepared.name,
            content_hash: prepared.content_hash,
        },
    )
    .await?;

    tracing::info!(
        picture_id = picture.id,
        name = %picture.name,
        content_hash = %picture.content_hash,
        "Picture registered",
    );
    Ok(picture)
}
