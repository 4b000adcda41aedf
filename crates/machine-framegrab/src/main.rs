//! Frame-grabber binary.
//!
//! Runs headless transfers with timing stats, optionally capturing the
//! destination regions as PNGs, or serves the machine over MCP.

use std::path::PathBuf;
use std::process;

use machine_framegrab::mcp::McpServer;
use machine_framegrab::{Framegrab, MachineConfig, capture};
use sim_core::Ticks;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    config_path: Option<PathBuf>,
    transfers: u32,
    swap_each: bool,
    captures_dir: Option<PathBuf>,
    mcp: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        transfers: 1,
        swap_each: false,
        captures_dir: None,
        mcp: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                cli.config_path = args.get(i).map(PathBuf::from);
            }
            "--transfers" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.transfers = s.parse().unwrap_or(1);
                }
            }
            "--swap-each" => {
                cli.swap_each = true;
            }
            "--captures" => {
                i += 1;
                cli.captures_dir = args.get(i).map(PathBuf::from);
            }
            "--mcp" => {
                cli.mcp = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: framegrab [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --config <file>    Machine configuration (JSON)");
                eprintln!("  --transfers <n>    Number of frame transfers to run [default: 1]");
                eprintln!("  --swap-each        Toggle the buffer selector between transfers");
                eprintln!("  --captures <dir>   Save both destination regions as PNGs");
                eprintln!("  --mcp              Run as MCP server (JSON-RPC over stdio)");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Headless run
// ---------------------------------------------------------------------------

fn make_machine(cli: &CliArgs) -> Framegrab {
    let config = match &cli.config_path {
        Some(path) => match MachineConfig::load(path) {
            Ok(c) => {
                eprintln!("Loaded config: {}", path.display());
                c
            }
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => MachineConfig::default(),
    };

    match Framegrab::new(&config) {
        Ok(mut machine) => {
            machine.framebuffer_mut().fill_test_pattern();
            machine
        }
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    }
}

fn run_headless(cli: &CliArgs) {
    let mut machine = make_machine(cli);
    let clock = machine.pixel_clock();

    for n in 0..cli.transfers {
        if cli.swap_each {
            machine.set_swap(n % 2 == 1);
        }
        match machine.run_transfer() {
            Ok(ticks) => {
                let micros = clock.micros_for(Ticks::new(ticks));
                eprintln!(
                    "transfer {}: buffer {}, {} words in {} ticks ({} us at {} Hz)",
                    n + 1,
                    u8::from(machine.swap()),
                    machine.config().total_words,
                    ticks,
                    micros,
                    clock.frequency_hz,
                );
            }
            Err(e) => {
                eprintln!("transfer {} failed: {e}", n + 1);
                process::exit(1);
            }
        }
    }

    if let Some(dir) = &cli.captures_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Cannot create {}: {e}", dir.display());
            process::exit(1);
        }
        for selector in [false, true] {
            let path = dir.join(format!("buffer{}.png", u8::from(selector)));
            if let Err(e) = capture::save_buffer_png(&machine, selector, &path) {
                eprintln!("Capture error: {e}");
                process::exit(1);
            }
            eprintln!("Captured {}", path.display());
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    if cli.mcp {
        let mut server = McpServer::new();
        if let Some(path) = cli.config_path.clone() {
            server.set_config_path(path);
        }
        server.run();
        return;
    }

    run_headless(&cli);
}
