//! Example: Build signed capture URLs and optionally fetch them
//!
//! Run with: cargo run -p capture --example build_urls
//!
//! Uses `CAPTURE_API_KEY` / `CAPTURE_API_SECRET` when set and fetches every
//! capture kind. Without credentials it only prints URLs built with the
//! `test`/`test` pair.

use capture::{Capture, CaptureKind, RequestOptions};
use tracing_subscriber::EnvFilter;

/// Page captured by this example
const TARGET: &str = "https://example.com/";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (capture, live) = match Capture::from_env() {
        Ok(capture) => (capture, true),
        Err(e) => {
            println!("{} - using test credentials, no requests will be sent\n", e);
            (Capture::new("test", "test"), false)
        }
    };

    let options = RequestOptions::new().with("full", true).with("delay", 2);

    println!("Capture URL Examples");
    println!("====================\n");

    let mut failed = 0;

    for (i, kind) in CaptureKind::ALL.into_iter().enumerate() {
        let url = match capture.build_url(kind, TARGET, Some(&options)) {
            Ok(url) => url,
            Err(e) => {
                println!("{}. {}: {}", i + 1, kind, e);
                failed += 1;
                continue;
            }
        };
        println!("{}. {}", i + 1, kind);
        println!("   URL: {}", url);

        if !live {
            println!();
            continue;
        }

        match capture.fetch(kind, TARGET, Some(&options)).await {
            Ok(body) => println!("   ✓ {} bytes\n", body.len()),
            Err(e) => {
                println!("   ✗ {}\n", e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
