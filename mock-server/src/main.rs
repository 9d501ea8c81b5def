use mock_server::{AppState, Site};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let site = Site::default();
    let listener = TcpListener::bind(&addr).await?;
    println!(
        "listening on {addr}, site /{}/site/, api_key {}",
        site.short_name, site.api_key
    );
    mock_server::run(listener, AppState::new(site)).await
}
