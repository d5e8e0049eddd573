use anyhow::Result;
use log::error;

use omnik_bridge::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::new();

    if let Err(e) = omnik_bridge::app(options).await {
        error!("Application error: {:#}", e);
        return Err(e);
    }

    Ok(())
}
