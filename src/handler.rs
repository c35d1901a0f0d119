use aws_lambda_events::event::s3::S3Event;
use bytes::Bytes;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;

use crate::error::ResizeError;
use crate::resize;
use crate::storage::ObjectStore;

const OUTPUT_PREFIX: &str = "processed/";

/// Where the triggering object lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    /// The full source key under `processed/`, path segments included.
    pub fn output_key(&self) -> String {
        format!("{}{}", OUTPUT_PREFIX, self.key)
    }
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

// Only the first record is read; any others in a batched notification are dropped.
pub fn extract_location(event: &S3Event) -> Result<ObjectLocation, ResizeError> {
    let record = event
        .records
        .first()
        .ok_or(ResizeError::MalformedEvent("event contains no records"))?;

    if event.records.len() > 1 {
        tracing::warn!(
            ignored = event.records.len() - 1,
            "S3 event carries more than one record, only the first is processed"
        );
    }

    let bucket = record
        .s3
        .bucket
        .name
        .clone()
        .ok_or(ResizeError::MalformedEvent("record has no bucket name"))?;
    let key = record
        .s3
        .object
        .key
        .clone()
        .ok_or(ResizeError::MalformedEvent("record has no object key"))?;

    Ok(ObjectLocation { bucket, key })
}

pub async fn fetch_object<S>(store: &S, bucket: &str, key: &str) -> Result<Bytes, ResizeError>
where
    S: ObjectStore + ?Sized,
{
    store
        .get_object(bucket, key)
        .await
        .map_err(|source| ResizeError::StorageRead {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
}

pub async fn store_object<S>(
    store: &S,
    bucket: &str,
    key: &str,
    body: Bytes,
) -> Result<(), ResizeError>
where
    S: ObjectStore + ?Sized,
{
    store
        .put_object(bucket, key, body)
        .await
        .map_err(|source| ResizeError::StorageWrite {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        })
}

pub fn build_result(key: &str, output_key: &str) -> InvocationResult {
    InvocationResult {
        status_code: 200,
        body: format!("Processed {} and saved to {}", key, output_key),
    }
}

/// Fetch the object named by the event, resize it to 256x256, and write it
/// back as JPEG under `processed/{key}` in the same bucket.
///
/// Steps run strictly in order and the first failure ends the invocation.
/// Nothing is rolled back: if the write fails after a successful read the
/// source is untouched and no output exists, so the event can simply be
/// redelivered. Re-running on the same event overwrites the previous output.
pub(crate) async fn function_handler<S>(
    event: LambdaEvent<S3Event>,
    store: &S,
) -> Result<InvocationResult, Error>
where
    S: ObjectStore + ?Sized,
{
    let location = extract_location(&event.payload)?;
    tracing::info!(
        request_id = %event.context.request_id,
        bucket = %location.bucket,
        key = %location.key,
        "Resizing object"
    );

    let source = fetch_object(store, &location.bucket, &location.key).await?;
    let source_len = source.len();

    let output = resize::resize_to_jpeg(source).await?;
    tracing::info!(source_len, output_len = output.len(), "Encoded resized image");

    let output_key = location.output_key();
    store_object(store, &location.bucket, &output_key, output).await?;
    tracing::info!("Saved {}/{}", location.bucket, output_key);

    Ok(build_result(&location.key, &output_key))
}
