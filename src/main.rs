use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = multipart_relay::cli::Cli::parse();
    if let Err(e) = multipart_relay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
