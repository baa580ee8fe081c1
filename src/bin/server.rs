use lineup::env_config;
use lineup::server::create_router;

#[tokio::main]
async fn main() {
    env_config::init_rayon_threads_lenient();
    let port = env_config::server_port();
    println!("Starting lineup optimizer server...");

    let app = create_router();

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();
    println!("Server is running on port {}. Press Ctrl+C to stop.", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("\nStopping server...");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
