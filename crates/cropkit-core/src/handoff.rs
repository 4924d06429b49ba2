//! Contract with the caller's upload step.
//!
//! The pipeline ends at an [`EncodedBitmap`]. Storage naming, bucket choice,
//! overwrite policy and persisting the resulting URL belong to the caller,
//! which implements [`UploadSink`]. Nothing in this crate performs I/O.

use serde::{Deserialize, Serialize};

use crate::encode::EncodedBitmap;

/// Where an encoded bitmap should be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Storage bucket, e.g. `"avatars"`.
    pub bucket: String,
    /// Key prefix inside the bucket, without a trailing slash.
    pub prefix: String,
}

impl Destination {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Collision-free object key scoped by owner and timestamp.
    ///
    /// `"{prefix}/{owner}/{timestamp_ms}.jpg"`, or without the prefix
    /// segment when the prefix is empty.
    pub fn object_key(&self, owner: &str, timestamp_ms: u64) -> String {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            format!("{owner}/{timestamp_ms}.jpg")
        } else {
            format!("{prefix}/{owner}/{timestamp_ms}.jpg")
        }
    }

    /// Bundle a finished bitmap with its target key.
    pub fn request(&self, owner: &str, timestamp_ms: u64, bitmap: EncodedBitmap) -> UploadRequest {
        UploadRequest {
            bucket: self.bucket.clone(),
            key: self.object_key(owner, timestamp_ms),
            bitmap,
        }
    }
}

/// A bitmap ready to be handed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    pub bucket: String,
    pub key: String,
    pub bitmap: EncodedBitmap,
}

/// Implemented by the surrounding application to persist a bitmap and
/// return the reference it should record (usually a public URL).
pub trait UploadSink {
    type Error: std::error::Error;

    async fn upload(&self, request: UploadRequest) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn bitmap() -> EncodedBitmap {
        EncodedBitmap {
            bytes: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1,
            height: 1,
            mime_type: "image/jpeg",
        }
    }

    #[derive(Default)]
    struct MemorySink {
        stored: RefCell<Vec<UploadRequest>>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("never fails")]
    struct Never;

    impl UploadSink for MemorySink {
        type Error = Never;

        async fn upload(&self, request: UploadRequest) -> Result<String, Never> {
            let url = format!("https://storage.test/{}/{}", request.bucket, request.key);
            self.stored.borrow_mut().push(request);
            Ok(url)
        }
    }

    #[test]
    fn test_object_key_with_prefix() {
        let dest = Destination::new("media", "covers/");
        assert_eq!(dest.object_key("user-42", 1_700_000_000_000), "covers/user-42/1700000000000.jpg");
    }

    #[test]
    fn test_object_key_without_prefix() {
        let dest = Destination::new("avatars", "");
        assert_eq!(dest.object_key("u1", 5), "u1/5.jpg");
    }

    #[tokio::test]
    async fn test_sink_receives_request() {
        let sink = MemorySink::default();
        let request = Destination::new("avatars", "profile").request("u7", 99, bitmap());

        let url = sink.upload(request).await.unwrap();
        assert_eq!(url, "https://storage.test/avatars/profile/u7/99.jpg");
        assert_eq!(sink.stored.borrow().len(), 1);
        assert_eq!(sink.stored.borrow()[0].bitmap.width, 1);
    }
}
