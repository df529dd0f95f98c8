//! estateindex CLI — replay event logs through the mapping engine and
//! inspect the resulting entity state.
//!
//! Usage:
//! ```bash
//! estateindex replay events.json
//! estateindex replay events.json --strict
//! estateindex info
//! ```
//!
//! The replay input is a JSON array of enveloped events; see
//! `demos/events.json` for the shape. Envelopes are sorted into canonical
//! chain order `(block, tx, log)` before they are applied, so the file
//! itself may list events in any order.

use std::env;
use std::process;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use estateindex_core::{EventEnvelope, MappingConfig, MappingEngine};
use estateindex_storage::InMemoryStore;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "replay" => {
            let Some(path) = args.get(2) else {
                eprintln!("replay: missing event log path");
                process::exit(1);
            };
            let strict = args.iter().any(|a| a == "--strict");
            cmd_replay(path, strict);
        }
        "info" => cmd_info(),
        "version" | "--version" | "-V" => {
            println!("estateindex {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("estateindex {}", env!("CARGO_PKG_VERSION"));
    println!("Event-to-state mapping engine for real-estate-token lifecycles\n");
    println!("USAGE:");
    println!("    estateindex <COMMAND>\n");
    println!("COMMANDS:");
    println!("    replay <file> [--strict]  Fold a JSON event log into entity state");
    println!("    info                      Show EstateIndex configuration info");
    println!("    version                   Print version");
    println!("    help                      Print this help");
}

fn cmd_info() {
    println!("EstateIndex v{}", env!("CARGO_PKG_VERSION"));
    println!("  Event kinds: PropertyMinted, PropertyTransferred, ProposalCreated");
    println!("  Entity tables: properties, proposals");
    println!("  Creation policy: last-write-wins upsert (--strict rejects duplicates)");
    println!("  Storage backends: memory, SQLite (feature: sqlite)");
}

fn cmd_replay(path: &str, strict: bool) {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("replay: cannot read {path}: {e}");
            process::exit(1);
        }
    };

    let mut batch: Vec<EventEnvelope> = match serde_json::from_str(&raw) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("replay: invalid event log: {e}");
            process::exit(1);
        }
    };

    // Canonical chain order is the engine's precondition, not its job
    batch.sort_by_key(|e| e.position());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("replay: failed to start runtime: {e}");
            process::exit(1);
        });

    runtime.block_on(async {
        let store = Arc::new(InMemoryStore::new());
        let engine = MappingEngine::with_config(
            store,
            MappingConfig {
                strict_creates: strict,
            },
        );

        let applied = match engine.replay(&batch).await {
            Ok(applied) => applied,
            Err(e) => {
                eprintln!("replay: {e}");
                process::exit(1);
            }
        };

        let stats = engine.stats();
        println!("Applied {applied} events");
        println!(
            "  minted: {}  transferred: {}  missed transfers: {}  proposals: {}",
            stats.properties_minted(),
            stats.properties_transferred(),
            stats.transfers_missed(),
            stats.proposals_created(),
        );

        let properties = engine.store().properties().await.unwrap_or_default();
        println!("\nProperties ({}):", properties.len());
        for p in &properties {
            println!(
                "  {}  info={:?}  owner={}  valuation={}",
                p.id,
                String::from_utf8_lossy(&p.info),
                p.owner,
                p.valuation,
            );
        }

        let proposals = engine.store().proposals().await.unwrap_or_default();
        println!("\nProposals ({}):", proposals.len());
        for p in &proposals {
            let closes = Utc
                .timestamp_opt(p.voting_closing_time as i64, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| p.voting_closing_time.to_string());
            println!(
                "  {}  creator={}  closes={}  {:?}",
                p.id, p.creator, closes, p.description,
            );
        }
    });
}
