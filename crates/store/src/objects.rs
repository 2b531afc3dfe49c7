//! Filesystem object store laid out as `<root>/<bucket>/<key>`.

use std::path::{Component, Path, PathBuf};

use {async_trait::async_trait, tracing::debug};

use crate::{Error, Result, store::ObjectStore};

pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an object path, rejecting anything that would leave the bucket.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_segment(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

/// A bucket name: one non-empty path segment.
pub(crate) fn validate_segment(segment: &str) -> Result<()> {
    if segment.is_empty() || segment.contains(['/', '\\']) || segment == "." || segment == ".." {
        return Err(Error::invalid_object_key(segment));
    }
    Ok(())
}

/// An object key: a relative path made only of normal components.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('\\') || key.contains('\0') {
        return Err(Error::invalid_object_key(key));
    }
    let all_normal = Path::new(key)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(Error::invalid_object_key(key));
    }
    Ok(())
}

pub(crate) fn join_public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", base.trim_end_matches('/'))
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!(bucket, key, size = bytes.len(), "writing object");
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        join_public_url(&self.public_base_url, bucket, key)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("/absolute.png")]
    #[case("")]
    #[case("a\\b")]
    #[case("./a.png")]
    fn rejects_keys_leaving_the_bucket(#[case] key: &str) {
        assert!(validate_key(key).is_err(), "{key:?} should be rejected");
    }

    #[rstest]
    #[case("image.png")]
    #[case("user-1/assistant 2.jpg")]
    fn accepts_nested_relative_keys(#[case] key: &str) {
        assert!(validate_key(key).is_ok());
    }

    #[tokio::test]
    async fn put_upserts_and_get_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "/storage/");

        store
            .put("generated_images", "a_cat.png", b"one".to_vec())
            .await
            .unwrap();
        store
            .put("generated_images", "a_cat.png", b"two".to_vec())
            .await
            .unwrap();

        assert_eq!(
            store.get("generated_images", "a_cat.png").await.unwrap(),
            Some(b"two".to_vec())
        );
        assert!(dir.path().join("generated_images/a_cat.png").exists());
        assert_eq!(
            store.public_url("generated_images", "a_cat.png"),
            "/storage/generated_images/a_cat.png"
        );
    }

    #[tokio::test]
    async fn missing_object_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "/storage");
        assert!(store.get("bucket", "nope.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_bad_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path(), "/storage");
        let err = store.put("..", "x.png", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidObjectKey { .. }));
    }
}
