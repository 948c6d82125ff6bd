use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

/// Config file (without extension) used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "server";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(cfg)?);

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &state);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::clone(&signals.shutdown),
        ))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_ignores_demo_config_json() {
        let dir = std::env::temp_dir().join(format!("das-main-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.json"), r#"{"server":{"port":9}}"#).unwrap();

        let path = dir.join(DEFAULT_CONFIG_PATH);
        let cfg = config::Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 3000);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
