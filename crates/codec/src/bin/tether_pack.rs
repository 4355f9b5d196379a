//! `tether-pack` — encode JSON (stdin) to the tether binary stream (stdout).
//!
//! Usage:
//!   tether-pack [--dedup grouped|exact]

use std::io::{self, Read, Write};

use tether_codec::{DedupMode, Value, ValueEncoder};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut mode = DedupMode::Grouped;
    let mut i = 1;
    while i < args.len() {
        if args[i].as_str() == "--dedup" {
            i += 1;
            match args.get(i).map(String::as_str) {
                Some("grouped") => mode = DedupMode::Grouped,
                Some("exact") => mode = DedupMode::Exact,
                other => {
                    eprintln!("Unknown dedup mode: {}", other.unwrap_or(""));
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let json: serde_json::Value = match serde_json::from_str(buf.trim()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid JSON: {e}");
            std::process::exit(1);
        }
    };

    let mut encoder = ValueEncoder::with_mode(mode);
    match encoder.encode(&Value::from(json)) {
        Ok(bytes) => {
            io::stdout().write_all(&bytes).unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
