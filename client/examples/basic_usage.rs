use std::process::exit;

use contactdb_client::{Client, ClientError, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Expect the API key as the first argument and an optional base URL after
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <api_key> [base_url]", args[0]);
        exit(1);
    }

    let api_key = &args[1];
    let client = match args.get(2) {
        Some(base_url) => Client::new(base_url)?,
        None => Client::default(),
    };

    // Create a list
    let created = client.send_post(
        api_key,
        "/v3/contactdb/lists",
        r#"{"name":"rust-client-demo"}"#,
    )?;
    println!("Created list: {}", String::from_utf8_lossy(&created));

    // List all lists
    let lists = client.send_get(api_key, "/v3/contactdb/lists")?;
    println!("Lists: {}", String::from_utf8_lossy(&lists));

    // A request the API will reject, to show the error shape
    match client.send_post(api_key, "/v3/contactdb/recipients", r#"[{"email":"nope"}]"#) {
        Ok(body) => println!("Recipients added: {}", String::from_utf8_lossy(&body)),
        Err(ClientError::Api { status, error }) => println!(
            "API rejected request (HTTP {}): field={:?} message={}",
            status, error.field, error.message
        ),
        Err(err) => return Err(err),
    }

    Ok(())
}
