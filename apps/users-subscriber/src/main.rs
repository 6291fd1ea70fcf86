//! Users Subscriber - Entry Point
//!
//! Listens on the user notification channels and logs every event.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    users_subscriber::run().await
}
