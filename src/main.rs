use std::sync::Arc;

use method_dispatch::{
    build_app, config::Config, dispatcher::Dispatcher, docs::ApiDocs, logging, methods,
    AppState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;

    let mut dispatcher = Dispatcher::default();
    if let Some(key) = config.secure_key.as_deref() {
        dispatcher.set_secure_key(key);
    }
    let mut docs = ApiDocs::new();
    methods::register_builtin(&mut dispatcher, &mut docs);

    if let Some(dir) = config.docs_dir.as_deref() {
        let written = docs.write_all(dir, config.docs_format)?;
        info!(files = written.len(), dir = %dir.display(), "api docs generated");
    }

    info!(
        methods = dispatcher.registry().len(),
        versions = ?dispatcher.registry().versions(),
        access_control = dispatcher.access_control_enabled(),
        "dispatcher ready"
    );

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(Arc::new(dispatcher));
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
