use anyhow::{anyhow, Result};
use mongodb::{bson::doc, Client, Database};

/// Database name used when the connection URI does not name one.
const DEFAULT_DB: &str = "test";

/// Abre la conexión a MongoDB desde las variables de entorno:
/// - MONGO_URI (obligatoria; su ausencia es un error fatal)
///
/// Devuelve el handle de la base para inyectarlo en la capa HTTP.
pub async fn connect_from_env() -> Result<Database> {
    let uri = std::env::var("MONGO_URI")
        .map_err(|_| anyhow!("MONGO_URI missing in environment"))?;

    let client = Client::with_uri_str(&uri)
        .await
        .map_err(|e| anyhow!("Mongo connect error: {}", e))?;

    let database = client
        .default_database()
        .unwrap_or_else(|| client.database(DEFAULT_DB));

    // The driver connects lazily; a ping surfaces an unreachable server now,
    // while the HTTP port is still unbound.
    database
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| anyhow!("Mongo connect error: {}", e))?;

    Ok(database)
}
