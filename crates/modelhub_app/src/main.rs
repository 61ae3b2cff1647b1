use hub_logging::hub_error;

use modelhub_app::{serve, Config};

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("modelhub: {err}");
            std::process::exit(2);
        }
    };
    hub_logging::initialize(config.log_destination);

    if let Err(err) = serve(config).await {
        hub_error!("Server terminated: {}", err);
        std::process::exit(1);
    }
}
