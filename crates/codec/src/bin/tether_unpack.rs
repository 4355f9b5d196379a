//! `tether-unpack` — decode a tether binary stream (stdin) to JSON (stdout).
//!
//! Usage:
//!   tether-unpack [--dedup grouped|exact]

use std::io::{self, Read};

use tether_codec::{DedupMode, ValueDecoder};

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

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let mut decoder = ValueDecoder::with_mode(mode);
    match decoder.decode(&buf) {
        Ok(value) => {
            println!("{}", serde_json::Value::from(value));
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
