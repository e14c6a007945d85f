// gendspconfig generates d/dsps.json and d/dsp-latencies.json. The DSP count
// comes from --count, the .env DSP_COUNT entry, or a default of 25; latencies
// cycle through 0, 5ms, 10ms, 1s, 500ms.
//
// Examples:
//   gendspconfig
//   gendspconfig --count 10 --out-dsps d/dsps.json --out-latencies d/dsp-latencies.json

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

const DEFAULT_COUNT: i64 = 25;
const PROJECT_NAME: &str = "adtech";
const DSP_SERVICE: &str = "dsp";
const DSP_PORT: u16 = 8080;
const BID_PATH: &str = "/bid";
const LATENCY_CYCLE: [&str; 5] = ["0", "5ms", "10ms", "1s", "500ms"];

#[derive(Parser, Debug)]
#[clap(name = "gendspconfig", about = "Generate DSP roster and latency files")]
struct Opt {
    /// Number of DSPs; falls back to .env DSP_COUNT, then 25.
    #[clap(long)]
    count: Option<i64>,

    /// Output path for dsps.json.
    #[clap(long, default_value = "d/dsps.json")]
    out_dsps: PathBuf,

    /// Output path for dsp-latencies.json.
    #[clap(long, default_value = "d/dsp-latencies.json")]
    out_latencies: PathBuf,

    /// Path to the .env file consulted for DSP_COUNT.
    #[clap(long, default_value = ".env")]
    env: PathBuf,
}

#[derive(Serialize)]
struct DspEntry {
    id: i64,
    name: String,
    endpoint: String,
    latency: String,
}

fn load_env(path: &PathBuf) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Ok(data) = fs::read_to_string(path) else {
        return out;
    };
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !key.is_empty() {
            out.insert(key.to_string(), value.trim().to_string());
        }
    }
    out
}

fn make_entries(count: i64) -> (Vec<DspEntry>, BTreeMap<String, String>) {
    let mut dsps = Vec::with_capacity(count as usize);
    let mut latencies = BTreeMap::new();

    for i in 1..=count {
        let hostname = format!("{PROJECT_NAME}_{DSP_SERVICE}_{i}");
        let latency = LATENCY_CYCLE[((i - 1) % LATENCY_CYCLE.len() as i64) as usize];
        dsps.push(DspEntry {
            id: 1000 + i,
            name: format!("dsp{i}"),
            endpoint: format!("https://{hostname}:{DSP_PORT}{BID_PATH}"),
            latency: latency.to_string(),
        });
        latencies.insert(hostname, latency.to_string());
    }

    (dsps, latencies)
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let count = match opt.count {
        Some(n) => n,
        None => load_env(&opt.env)
            .get("DSP_COUNT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COUNT),
    };
    if count < 1 {
        bail!("invalid count: {count}");
    }

    let (dsps, latencies) = make_entries(count);

    for path in [&opt.out_dsps, &opt.out_latencies] {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("mkdir {}", dir.display()))?;
        }
    }

    let mut dsps_json = serde_json::to_vec_pretty(&dsps)?;
    dsps_json.push(b'\n');
    fs::write(&opt.out_dsps, dsps_json)
        .with_context(|| format!("write {}", opt.out_dsps.display()))?;

    let mut latencies_json = serde_json::to_vec_pretty(&latencies)?;
    latencies_json.push(b'\n');
    fs::write(&opt.out_latencies, latencies_json)
        .with_context(|| format!("write {}", opt.out_latencies.display()))?;

    eprintln!(
        "gendspconfig: wrote {count} DSPs to {} and {}",
        opt.out_dsps.display(),
        opt.out_latencies.display()
    );

    Ok(())
}
