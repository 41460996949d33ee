#[tokio::main]
async fn main() {
    if let Err(e) = frontdesk_lib::run().await {
        tracing::error!(error = %e, "Frontdesk stopped with an error");
        std::process::exit(1);
    }
}
