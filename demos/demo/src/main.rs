use std::sync::Arc;
use std::time::Duration;

use liveblog_client::transport::WS_CLOSED;
use liveblog_client::{Element, LiveUpdateClient, LiveblogConfig, ReconnectPolicy};

fn main() {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "localhost:8000".to_string());
    let post = args.next().unwrap_or_else(|| "first-post".to_string());

    // Subscribe to the update feed for one post
    let config = LiveblogConfig::new("sample_app", "en", post).with_host(host);

    let mut container = Element::new("div");
    container.set_attribute("id", "liveblog-posts");

    let client = Arc::new(LiveUpdateClient::new(config, container));
    let handle = match client.clone().connect(ReconnectPolicy::default()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("invalid connection target: {}", e);
            std::process::exit(1);
        }
    };

    // Print a snapshot of the container whenever it changes
    let mut last = String::new();
    loop {
        std::thread::sleep(Duration::from_secs(1));
        if handle.ready_state() == WS_CLOSED {
            eprintln!("connection stopped");
            break;
        }
        let snapshot = client.snapshot();
        if snapshot != last {
            println!("{}", snapshot);
            last = snapshot;
        }
    }
}
