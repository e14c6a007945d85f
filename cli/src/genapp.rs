// genapp generates a JSON array of App records for the exchange cache
// (d/apps.json). Publisher ids rotate so several apps share a publisher.
//
// Examples:
//   genapp --count 1000 --out d/apps.json
//   genapp --count 500000 --publisher-count 500 --start-id 1250 --out d/apps.json

use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug)]
#[clap(name = "genapp", about = "Generate a JSON array of App records")]
struct Opt {
    /// Number of App records to generate.
    #[clap(long)]
    count: i64,

    /// Output file path, or "-" for stdout.
    #[clap(long, default_value = "-")]
    out: String,

    /// Number of distinct publishers to rotate through.
    #[clap(long, default_value = "1000")]
    publisher_count: i64,

    /// Starting App id.
    #[clap(long, default_value = "1")]
    start_id: i64,
}

#[derive(Serialize)]
struct Publisher {
    id: i64,
    name: String,
}

#[derive(Serialize)]
struct App {
    id: i64,
    name: String,
    publisher: Publisher,
}

fn make_app(app_id: i64, publisher_count: i64) -> App {
    let pub_id = (app_id - 1).rem_euclid(publisher_count) + 1;
    App {
        id: app_id,
        name: format!("app-{app_id}"),
        publisher: Publisher {
            id: pub_id,
            name: format!("publisher-{pub_id}"),
        },
    }
}

fn write_apps<W: Write>(mut out: W, count: i64, start_id: i64, publisher_count: i64) -> Result<()> {
    // Stream record by record; the apps file can run to hundreds of
    // thousands of entries.
    out.write_all(b"[")?;
    for i in 0..count {
        if i > 0 {
            out.write_all(b",")?;
        }
        serde_json::to_writer(&mut out, &make_app(start_id + i, publisher_count))?;
    }
    out.write_all(b"]")?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    if opt.count < 0 {
        bail!("--count must be >= 0");
    }
    if opt.publisher_count <= 0 {
        bail!("--publisher-count must be > 0");
    }
    if opt.start_id < 0 {
        bail!("--start-id must be >= 0");
    }

    if opt.out == "-" {
        write_apps(io::stdout().lock(), opt.count, opt.start_id, opt.publisher_count)?;
    } else {
        let file = File::create(&opt.out).with_context(|| format!("create {}", opt.out))?;
        write_apps(BufWriter::new(file), opt.count, opt.start_id, opt.publisher_count)?;
        eprintln!("genapp: wrote {} apps to {}", opt.count, opt.out);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishers_rotate() {
        let first = make_app(1, 3);
        let fourth = make_app(4, 3);
        assert_eq!(first.publisher.id, 1);
        assert_eq!(fourth.publisher.id, 1);
        assert_eq!(make_app(2, 3).publisher.id, 2);
        assert_eq!(make_app(3, 3).publisher.id, 3);
    }

    #[test]
    fn output_is_a_decodable_json_array() {
        let mut buf = Vec::new();
        write_apps(&mut buf, 5, 1250, 2).expect("write");
        let parsed: Vec<serde_json::Value> = serde_json::from_slice(&buf).expect("decode");
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0]["id"], 1250);
        assert_eq!(parsed[0]["name"], "app-1250");
        assert_eq!(parsed[0]["publisher"]["id"], 2);
    }

    #[test]
    fn zero_count_emits_an_empty_array() {
        let mut buf = Vec::new();
        write_apps(&mut buf, 0, 1, 1000).expect("write");
        assert_eq!(buf, b"[]");
    }
}
