use anyhow::Result;
use tracing::info;

use crate::web::{PgPool, start_web_server};

pub async fn handle_run(pool: PgPool, interface: String, port: u16) -> Result<()> {
    info!("Starting PDT logbook server");
    start_web_server(interface, port, pool).await
}
