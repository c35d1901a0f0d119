use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use lambda_runtime::{tracing, Error};

/// The object storage the handler reads sources from and writes results to.
///
/// Built once per container in `main` and borrowed by every invocation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full body of `bucket/key`. Missing objects are an error.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, Error>;

    /// Write `body` to `bucket/key`, replacing whatever is there.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), Error>;
}

/// [`ObjectStore`] backed by the AWS SDK S3 client.
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, Error> {
        tracing::debug!("Fetching {}/{}", bucket, key);
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        let body = response.body.collect().await?;
        Ok(body.into_bytes())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes) -> Result<(), Error> {
        tracing::debug!("Storing {} bytes in {}/{}", body.len(), bucket, key);
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_sdk_s3::types::error::NoSuchKey;
    use aws_smithy_mocks::{mock, mock_client};

    #[tokio::test]
    async fn get_object_collects_body() {
        let get_rule = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|req| req.bucket() == Some("pics") && req.key() == Some("a.png"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"image bytes"))
                    .build()
            });
        let store = S3Store::new(mock_client!(aws_sdk_s3, [&get_rule]));

        let body = store.get_object("pics", "a.png").await.unwrap();
        assert_eq!(body.as_ref(), b"image bytes");
        assert_eq!(get_rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn get_object_missing_key_is_error() {
        let get_rule = mock!(aws_sdk_s3::Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let store = S3Store::new(mock_client!(aws_sdk_s3, [&get_rule]));

        assert!(store.get_object("pics", "missing.png").await.is_err());
        assert_eq!(get_rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn put_object_targets_bucket_and_key() {
        let put_rule = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|req| {
                req.bucket() == Some("pics") && req.key() == Some("processed/a.png")
            })
            .then_output(|| PutObjectOutput::builder().build());
        let store = S3Store::new(mock_client!(aws_sdk_s3, [&put_rule]));

        store
            .put_object("pics", "processed/a.png", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        assert_eq!(put_rule.num_calls(), 1);
    }
}
