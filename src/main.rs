use mangahub_server::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("mangahub-server".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    mangahub_server::run().await
}
