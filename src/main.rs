mod http_api;
mod mongo;

use dotenvy::dotenv;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Cargar variables de entorno desde .env (si existe)
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Connect before binding the port: a missing MONGO_URI or an unreachable
    // server exits with code 1 without the server ever listening.
    let db = mongo::connect_from_env().await?;
    tracing::info!("connected to MongoDB, database `{}`", db.name());

    http_api::run_http_server(db).await?;

    Ok(())
}
