use notepad::{db::init_db, logging::setup_tracing};
use notepad_server::{config, create_app, shared, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config();

    setup_tracing(config.log_json);

    let conn = init_db(&config.database_url).await?;

    let app = create_app(conn);
    let app = shared::tracing::add_tracing_layer(app);

    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
