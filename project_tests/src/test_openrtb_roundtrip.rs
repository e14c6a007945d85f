// Standalone drill for the OpenRTB codec path the exchange exercises on
// every request: decode -> encode -> gzip -> gunzip -> decode.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use lib_common::openrtb::BidRequest;

const SAMPLE: &str = r#"{
    "id": "1",
    "imp": [{"id": "1", "banner": {"w": 300, "h": 250}}],
    "app": {"id": "1250", "publisher": {"id": "1"}},
    "device": {"ua": "load-test-agent", "ip": "10.1.2.3"},
    "at": 2,
    "tmax": 120
}"#;

fn main() -> anyhow::Result<()> {
    println!("--- OpenRTB round-trip drill ---");

    let original: BidRequest = serde_json::from_str(SAMPLE)?;
    let encoded = serde_json::to_vec(&original)?;
    println!("encoded {} bytes", encoded.len());

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&encoded)?;
    let compressed = encoder.finish()?;
    println!("compressed {} bytes", compressed.len());

    let mut decompressed = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut decompressed)?;
    assert_eq!(decompressed, encoded, "gzip round-trip changed the payload");

    let decoded: BidRequest = serde_json::from_slice(&decompressed)?;
    assert_eq!(decoded, original, "codec round-trip changed the record");
    assert_eq!(
        decoded.app.as_ref().and_then(|a| a.id.as_deref()),
        Some("1250")
    );

    println!("round-trip ok");
    Ok(())
}
