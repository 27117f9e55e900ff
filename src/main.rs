mod app;
mod cli;

fn main() {
    let cli = cli::parse();

    // Respect RUST_LOG if set, otherwise keep the library quiet unless verbose
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "hbqueue=debug".to_string()
        } else {
            "hbqueue=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    app::run(cli);
}
