use clap::Parser;
use tracing::error;

use user_api::{Config, Server, app, telemetry};

#[tokio::main]
async fn main() -> Result<(), user_api::Error> {
    let config = Config::parse();
    telemetry::init(&config.log_filter);

    if let Err(e) = config.validate() {
        error!("{e}");
        return Err(e);
    }

    Server::bind(config.bind).serve(app(&config)).await
}
