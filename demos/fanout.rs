//! Fan-out demo: many subscribers on one topic
//!
//! Run with: cargo run --example fanout [SUBSCRIBERS] [MESSAGES]
//!
//! Examples:
//!   cargo run --example fanout               # 100 subscribers, 10 messages
//!   cargo run --example fanout 1000 50       # 1000 subscribers, 50 messages
//!   RUST_LOG=topic_pubsub=trace cargo run --example fanout 3 2
//!
//! Every subscriber drains until it has seen every message, then the
//! registry is closed. The total received must equal SUBSCRIBERS x MESSAGES.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use topic_pubsub::{Registry, RegistryConfig};

const DEFAULT_SUBSCRIBERS: usize = 100;
const DEFAULT_MESSAGES: usize = 10;

fn parse_count(arg: Option<&String>, default: usize) -> Result<usize, String> {
    match arg {
        Some(s) => s
            .parse()
            .map_err(|_| format!("Invalid count: '{}'. Expected a positive integer", s)),
        None => Ok(default),
    }
}

fn print_usage() {
    eprintln!("Usage: fanout [SUBSCRIBERS] [MESSAGES]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  SUBSCRIBERS  Number of subscribers on the topic (default: 100)");
    eprintln!("  MESSAGES     Number of messages to publish (default: 10)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let (subscribers, messages) = match (
        parse_count(args.get(1), DEFAULT_SUBSCRIBERS),
        parse_count(args.get(2), DEFAULT_MESSAGES),
    ) {
        (Ok(s), Ok(m)) => (s, m),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("topic_pubsub=info".parse()?)
                .add_directive("fanout=info".parse()?),
        )
        .init();

    let registry =
        Registry::<String, Bytes>::with_config(RegistryConfig::default().sink_capacity(1));
    let topic = "test".to_string();
    let total = Arc::new(AtomicUsize::new(0));
    let mut consumers = Vec::with_capacity(subscribers);

    for id in 0..subscribers {
        let (sink, mut inbox) = registry.channel();
        registry.subscribe(topic.clone(), sink).await;

        let total = Arc::clone(&total);
        consumers.push(tokio::spawn(async move {
            let mut count = 0;
            while count < messages {
                if inbox.recv().await.is_none() {
                    break;
                }
                count += 1;
            }
            tracing::debug!(subscriber = id, received = count, "Subscriber done");
            total.fetch_add(count, Ordering::Relaxed);
        }));
    }

    let payload = Bytes::from_static(b"message");
    for _ in 0..messages {
        registry.publish(&topic, payload.clone()).await;
    }

    for consumer in consumers {
        consumer.await?;
    }

    let stats = registry.stats().await;
    registry.close().await;

    let received = total.load(Ordering::Relaxed);
    println!(
        "Received {} messages ({} subscribers x {} messages)",
        received, subscribers, messages
    );
    println!(
        "Stats: published={} scheduled={} completed={} failed={}",
        stats.messages_published,
        stats.deliveries_scheduled,
        stats.deliveries_completed,
        stats.deliveries_failed,
    );

    if received != subscribers * messages {
        eprintln!("Count mismatch: expected {}", subscribers * messages);
        std::process::exit(1);
    }

    Ok(())
}
