//! Media storage for listing photos and profile pictures.
//!
//! Two backends behind one handle:
//! - **S3**: MinIO / any S3-compatible bucket via `aws-sdk-s3`
//! - **Local**: files under `storage.data_dir`, served by the API at `/uploads`
//!
//! Records store the public URL returned by [`MediaStore::put`]; the same URL
//! is accepted by [`MediaStore::delete`].

use anyhow::{Context, Result};
use aws_sdk_s3::{
    config::{Builder as S3Builder, Credentials, Region},
    primitives::ByteStream,
    Client,
};
use staynest_common::{config::StorageConfig, ids};
use std::path::{Component, Path, PathBuf};

/// URL path under which locally stored media is served.
pub const LOCAL_MOUNT: &str = "/uploads";

/// Storage handle, cheap to clone.
#[derive(Clone)]
pub enum MediaStore {
    S3(S3Store),
    Local(LocalStore),
}

#[derive(Clone)]
pub struct S3Store {
    inner: Client,
    bucket: String,
    base_url: String,
}

#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    /// Pick the backend from config: an empty endpoint means local disk.
    pub fn from_config(cfg: &StorageConfig) -> Self {
        if cfg.is_local() {
            let base = cfg.public_url.trim_end_matches('/');
            return Self::Local(LocalStore {
                root: PathBuf::from(&cfg.data_dir),
                base_url: format!("{base}{LOCAL_MOUNT}"),
            });
        }

        let creds = Credentials::new(
            &cfg.access_key,
            &cfg.secret_key,
            None, // session token
            None, // expiry
            "staynest-storage",
        );

        let s3_cfg = S3Builder::new()
            .endpoint_url(&cfg.endpoint)
            .credentials_provider(creds)
            .region(Region::new(cfg.region.clone()))
            // Force path-style URLs (required for MinIO)
            .force_path_style(true)
            .build();

        let public = if cfg.public_url.trim().is_empty() {
            &cfg.endpoint
        } else {
            &cfg.public_url
        };

        Self::S3(S3Store {
            inner: Client::from_conf(s3_cfg),
            bucket: cfg.bucket.clone(),
            base_url: format!("{}/{}", public.trim_end_matches('/'), cfg.bucket),
        })
    }

    /// Create the bucket or the upload directory if missing.
    pub async fn prepare(&self) -> Result<()> {
        match self {
            Self::S3(s3) => s3.ensure_bucket().await,
            Self::Local(local) => {
                tokio::fs::create_dir_all(&local.root)
                    .await
                    .with_context(|| format!("Failed to create {}", local.root.display()))?;
                tracing::debug!(dir = %local.root.display(), "Upload directory ready");
                Ok(())
            }
        }
    }

    /// Directory to serve at [`LOCAL_MOUNT`], when storing locally.
    pub fn local_root(&self) -> Option<&Path> {
        match self {
            Self::Local(local) => Some(&local.root),
            Self::S3(_) => None,
        }
    }

    /// Store `data` under `prefix` and return its public URL.
    pub async fn put(&self, prefix: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        let key = object_key(prefix, content_type);

        match self {
            Self::S3(s3) => {
                s3.inner
                    .put_object()
                    .bucket(&s3.bucket)
                    .key(&key)
                    .content_type(content_type)
                    .body(ByteStream::from(data))
                    .send()
                    .await
                    .with_context(|| format!("Failed to upload {key} to object storage"))?;
                Ok(format!("{}/{key}", s3.base_url))
            }
            Self::Local(local) => {
                let path = local.root.join(&key);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, data)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                Ok(format!("{}/{key}", local.base_url))
            }
        }
    }

    /// Remove a previously stored object by the URL [`put`](Self::put) returned.
    /// URLs this store did not issue are ignored.
    pub async fn delete(&self, url: &str) -> Result<()> {
        match self {
            Self::S3(s3) => {
                let Some(key) = key_from_url(&s3.base_url, url) else {
                    return Ok(());
                };
                s3.inner
                    .delete_object()
                    .bucket(&s3.bucket)
                    .key(key)
                    .send()
                    .await
                    .with_context(|| format!("Failed to delete {key} from object storage"))?;
            }
            Self::Local(local) => {
                let Some(key) = key_from_url(&local.base_url, url) else {
                    return Ok(());
                };
                match tokio::fs::remove_file(local.root.join(key)).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e).context("Failed to delete local media"),
                }
            }
        }
        Ok(())
    }
}

impl S3Store {
    /// Ensure the bucket exists; create it if absent.
    async fn ensure_bucket(&self) -> Result<()> {
        match self.inner.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::debug!(bucket = %self.bucket, "Bucket already exists");
                Ok(())
            }
            Err(_) => {
                tracing::info!(bucket = %self.bucket, "Bucket does not exist, creating");
                self.inner
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .context("Failed to create object storage bucket")?;
                Ok(())
            }
        }
    }
}

/// `<prefix>/<uuid v7>.<ext>`, extension derived from the content type.
fn object_key(prefix: &str, content_type: &str) -> String {
    let ext = match content_type {
        "image/jpeg" => "jpg",
        other => mime_guess::get_mime_extensions_str(other)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    };
    format!("{}/{}.{ext}", prefix.trim_matches('/'), ids::generate_id())
}

/// Strip `base_url/` from `url`, rejecting anything that could escape the store.
fn key_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    let key = url.strip_prefix(base_url)?.strip_prefix('/')?;
    let safe = !key.is_empty()
        && Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    safe.then_some(key)
}
