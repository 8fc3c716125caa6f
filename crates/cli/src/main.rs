//! # CLI — interactive shell over the embedded key-value store
//!
//! A REPL-style command-line interface over [`engine::Database`]. Reads
//! commands from stdin, executes them against an open database, and prints
//! results to stdout. Designed for both interactive use and scripted testing
//! (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value   Insert or overwrite a key (queues the write)
//! GET key         Look up a key (prints the value or "(nil)")
//! DEL key         Delete a key (queues a tombstone)
//! SYNC            Flush the write queue, then refresh the index
//! COMPACT         Rewrite the journal to just its live entries
//! CLEAR           Empty the database
//! STATS           Print path, live key count, and replayed record count
//! EXIT / QUIT     Close the database and exit
//! ```
//!
//! ## Configuration
//!
//! ```text
//! DAYBREAK_PATH          journal file path      (default: "daybreak.db")
//! DAYBREAK_SYNC_WRITES   SET/DEL wait for fsync  (default: "false")
//! RUST_LOG               tracing env filter      (see `tracing-subscriber`)
//! ```
use anyhow::{Context, Result};
use engine::Database;
use std::io::{self, BufRead, Write};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = env_or("DAYBREAK_PATH", "daybreak.db");
    let sync_writes: bool = env_or("DAYBREAK_SYNC_WRITES", "false")
        .parse()
        .unwrap_or(false);

    let db: Database<String> =
        Database::open(&path).with_context(|| format!("failed to open database at {path}"))?;

    println!(
        "daybreak started (path={}, size={}, sync_writes={})",
        path,
        db.size(),
        sync_writes
    );
    println!("Commands: SET key value | GET key | DEL key | SYNC | COMPACT | CLEAR | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            let result = if sync_writes {
                                db.set_sync(k, v)
                            } else {
                                db.set(k, v)
                            };
                            match result {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {e}"),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match db.get(k) {
                            Ok(Some(v)) => println!("{v}"),
                            Ok(None) => println!("(nil)"),
                            Err(e) => println!("ERR get failed: {e}"),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "DEL" => {
                    if let Some(k) = parts.next() {
                        let result = if sync_writes {
                            db.delete_sync(k)
                        } else {
                            db.delete(k)
                        };
                        match result {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR del failed: {e}"),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "SYNC" => match db.sync() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR sync failed: {e}"),
                },
                "COMPACT" => match db.compact() {
                    Ok(()) => println!("OK (size={})", db.size()),
                    Err(e) => println!("ERR compact failed: {e}"),
                },
                "CLEAR" => match db.clear() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR clear failed: {e}"),
                },
                "STATS" => {
                    println!(
                        "path={} size={} logsize={}",
                        db.path().display(),
                        db.size(),
                        db.logsize()
                    );
                }
                "EXIT" | "QUIT" => {
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {other}");
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    db.close().context("failed to close database cleanly")?;
    Ok(())
}
