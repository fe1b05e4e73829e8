#[tokio::main]
async fn main() {
    if let Err(e) = ari_detect_lib::run().await {
        eprintln!("ari-detect: {e}");
        std::process::exit(1);
    }
}
