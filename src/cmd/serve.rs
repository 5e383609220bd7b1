use tokio::net::TcpListener;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::server::router;

pub async fn run(ctx: AppContext, bind_override: Option<String>) -> AppResult<()> {
    let bind_addr = bind_override.unwrap_or_else(|| ctx.config.bind_addr.clone());
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening for submissions");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
