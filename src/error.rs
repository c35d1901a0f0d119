use thiserror::Error;

/// Every way a single resize invocation can fail.
///
/// None of these are recovered from; the handler returns them to the Lambda
/// runtime, which owns retry and dead-letter policy.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// The notification did not carry a usable first record.
    #[error("malformed S3 event: {0}")]
    MalformedEvent(&'static str),

    #[error("failed to read s3://{bucket}/{key}: {source}")]
    StorageRead {
        bucket: String,
        key: String,
        #[source]
        source: lambda_runtime::Error,
    },

    #[error("failed to decode source image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    /// The image worker went away without sending a result (it panicked).
    #[error("image worker exited before returning a result")]
    Transform,

    #[error("failed to write s3://{bucket}/{key}: {source}")]
    StorageWrite {
        bucket: String,
        key: String,
        #[source]
        source: lambda_runtime::Error,
    },
}
