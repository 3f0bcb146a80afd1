//! Web server hosting the two GameVault components.
//!
//! - The catalog façade: `POST /add_product` and `GET /products`, thin
//!   pass-throughs to the external document store.
//! - The extraction playground: a single page with a text area and a
//!   button, rendering entity spans returned by the NLP model.
//!
//! The two share a router but not data.

mod assets;
mod handlers;
mod routes;
mod templates;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::nlp::NerClient;
use crate::store::DocumentStoreClient;

/// Shared state for the web server.
///
/// Both clients are constructed once at startup; handlers only borrow them.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStoreClient>,
    pub ner: Arc<NerClient>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: Arc::new(DocumentStoreClient::new(settings.store.clone())),
            ner: Arc::new(NerClient::new(settings.nlp.clone())),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
