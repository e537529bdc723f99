use boda_api_service::config::Config;
use boda_api_service::routes::create_router;
use env_logger::Env;
use lambda_http::Error;
use log::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let port = config.port;
    let router = create_router(config).await;

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Starting boda API on AWS Lambda");
        return lambda_http::run(router).await;
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Boda API listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
