use aws_config::BehaviorVersion;
use aws_lambda_events::event::s3::S3Event;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
mod config;
mod error;
mod handler;
mod resize;
mod storage;
use config::{get_worker_count, init_thread_pool};
use handler::function_handler;
use storage::S3Store;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();

    // Size the image worker pool at cold start (once per container lifecycle)
    init_thread_pool(get_worker_count());

    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let store = S3Store::new(S3Client::new(&shared_config));

    run(service_fn(|event: LambdaEvent<S3Event>| {
        function_handler(event, &store)
    }))
    .await
}
