use relic::config::Config;
use relic::http::router::Router;
use relic::server::{ServerControl, Supervisor, console};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let router = Router::new(cfg.document_root.clone(), cfg.realm_table()?);

    let (control, state) = ServerControl::new();
    let supervisor = Supervisor::start(&cfg, router, state).await?;

    let console_control = control.clone();
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        if let Err(e) = console::run(stdin, console_control).await {
            tracing::error!("Console error: {}", e);
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            control.stop();
        }
    });

    let report = supervisor.run().await?;

    if report.is_clean() {
        tracing::info!("Server stopped successfully");
    } else {
        tracing::error!(failed = report.failed, "There were some errors while stopping the server");
    }

    // the console task may still be parked on stdin
    std::process::exit(if report.is_clean() { 0 } else { 1 });
}
