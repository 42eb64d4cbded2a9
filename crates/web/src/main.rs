use web::{config::WebConfig, start_web_server};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env();
    start_web_server(config)
        .await
        .expect("web server stopped unexpectedly.");
}
