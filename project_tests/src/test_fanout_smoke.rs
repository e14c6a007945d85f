// Fan-out smoke driver: spins three local bidders with different artificial
// latencies, fires a deadline-bounded fan-out at them, and reports which
// bids made it back in time. Exercises the bidder-side latency contract the
// exchange relies on.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::routing::post;
use axum::Router;

use lib_common::openrtb::BidResponse;

const DEADLINE: Duration = Duration::from_millis(150);

async fn spawn_bidder(name: &'static str, delay: Duration) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind bidder");
    let addr = listener.local_addr().expect("bidder addr");
    let app = Router::new().route(
        "/bid",
        post(move || async move {
            tokio::time::sleep(delay).await;
            format!(
                r#"{{"id":"{name}","seatbid":[{{"bid":[{{"id":"{name}","impid":"1","price":1.0}}]}}]}}"#
            )
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Explicitly install the default crypto provider for rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    println!("--- fan-out smoke drill (deadline {DEADLINE:?}) ---");

    let bidders = [
        ("fast", Duration::from_millis(5)),
        ("medium", Duration::from_millis(50)),
        ("slow", Duration::from_millis(400)),
    ];

    let client = reqwest::Client::new();
    let started = Instant::now();
    let mut calls = Vec::new();
    for (name, delay) in bidders {
        let addr = spawn_bidder(name, delay).await;
        let client = client.clone();
        calls.push(tokio::spawn(async move {
            let result = client
                .post(format!("http://{addr}/bid"))
                .timeout(DEADLINE)
                .send()
                .await;
            match result {
                Ok(response) => match response.json::<BidResponse>().await {
                    Ok(bid) => (name, Some(bid)),
                    Err(_) => (name, None),
                },
                Err(_) => (name, None),
            }
        }));
    }

    let mut in_time = 0;
    for call in calls {
        let (name, outcome) = call.await.expect("call task");
        match outcome {
            Some(bid) => {
                in_time += 1;
                println!("{name}: bid {:?} after {:?}", bid.id, started.elapsed());
            }
            None => println!("{name}: missed the deadline"),
        }
    }

    assert_eq!(in_time, 2, "fast and medium beat the deadline, slow misses");
    println!("fan-out smoke ok");
    Ok(())
}
