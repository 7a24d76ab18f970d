use clap::Parser;
use reddit_companion::cli::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    reddit_companion::cli::run(config).await
}
