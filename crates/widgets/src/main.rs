//! Runs a short widget catalogue session and prints what happened.

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use widgets::{
    Config, CreateWidget, DeleteWidget, GetWidget, ListWidgets, RenameWidget, WidgetApp,
    WidgetId,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    // 3. Wire the catalogue
    let app = WidgetApp::new(&config.mediator)?;

    // 4. Run a session
    let sprocket = app.execute(CreateWidget::new("sprocket")).await?;
    let cog = app.execute(CreateWidget::new("cog")).await?;
    app.execute_void(RenameWidget {
        id: cog,
        name: "flywheel".to_string(),
    })
    .await?;

    if let Err(err) = app.execute(CreateWidget::new("")).await {
        tracing::warn!(error = %err, "rejected widget");
    }

    app.execute_void(DeleteWidget { id: sprocket }).await?;
    if let Err(err) = app.execute_void(DeleteWidget { id: WidgetId::random() }).await {
        tracing::warn!(error = %err, "delete failed");
    }

    let remaining = app.query(ListWidgets).await?;
    let deleted_visible = app.query(GetWidget { id: sprocket }).await?.is_some();
    tracing::info!(widgets = remaining.len(), deleted_visible, "session finished");

    // 5. Report
    println!("widgets:\n{}", serde_json::to_string_pretty(&remaining)?);
    println!(
        "events:\n{}",
        serde_json::to_string_pretty(&app.audit().entries().await)?
    );
    println!("metrics:\n{}", metrics_handle.render());

    Ok(())
}
