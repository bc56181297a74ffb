//! Pings the notes backend on a fixed interval so a hosted database is never
//! paused for inactivity.

use notepad::{config::config, logging::setup_tracing, HttpNoteStore, NoteStore, Session};

#[tokio::main]
async fn main() {
    let config = config();
    setup_tracing(config.log_json);

    let store = HttpNoteStore::new(&config.api_url, Session::new());
    let mut interval = tokio::time::interval(config.keep_alive_interval());

    tracing::info!(
        "pinging {} every {}s",
        config.api_url,
        config.keep_alive_interval().as_secs()
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match store.ping().await {
                    Ok(()) => tracing::info!("heartbeat successful"),
                    Err(error) => tracing::error!("heartbeat failed: {error:?}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping");
                break;
            }
        }
    }
}
