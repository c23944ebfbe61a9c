//! Stock Browser: a terminal front end for browsing a simulated market.
//!
//! It starts on the market overview and accepts commands on stdin (`help` lists
//! them). Searches and detail views are answered by a simulated data source
//! after a delay, so several requests can be in flight at once; responses to
//! anything but the latest request of a view are discarded.
//!
//! Usage example (CLI):
//! ```bash
//! stock_browser --seed 42 --page-size 5
//! stock_browser --route "/search?q=inc" --search-delay-ms 0 --json
//! ```
//!
//! The optional `--watchlist` file lists symbols separated by commas, spaces,
//! or new lines.
mod app;
mod args;
mod command;
mod render;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{Receiver, Select, select, unbounded};
use log::{debug, error, info, warn};
use stock_common::config::TAPE_INTERVAL_MS;
use stock_common::provider::RandomQuoteProvider;
use stock_common::route::Route;
use stock_common::symbol::SymbolParser;
use stock_common::watchlist::WatchlistStore;
use stock_common::{CatalogStore, MarketError, Result, Symbol};
use stock_feed::{DataSource, SimulatedFeed, TapeEvent, TapeGenerator};

use crate::app::{Arrival, Browser};
use crate::args::Args;
use crate::command::{Command, HELP};

/// Operations registered ahead of the in-flight requests in `next_event`.
const FIXED_OPERATIONS: usize = 2;

enum Event {
    Line(String),
    InputClosed,
    Interrupt,
    Arrival(usize, Arrival),
}

enum Flow {
    Continue,
    Tape,
    Quit,
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let catalog = Arc::new(CatalogStore::default());
    let mut provider = RandomQuoteProvider::with_seed(args.seed);
    let watchlist = match &args.watchlist {
        Some(path) => {
            let symbols = read_symbols(&normalize_path(path))?;
            WatchlistStore::with_symbols(&symbols, &catalog, &mut provider)
        }
        None => WatchlistStore::seeded(&catalog, &mut provider),
    };
    info!("Watchlist: {:?}", watchlist.symbols());
    let feed = SimulatedFeed::new(Arc::clone(&catalog), args.feed_settings());
    let mut browser = Browser::new(feed, catalog, Box::new(provider), watchlist, args.page_size);

    if let Some(path) = &args.route {
        browser.navigate(Route::parse(path)?);
        browser.settle();
        return show(&mut browser, args.json);
    }

    let (interrupt_tx, interrupt_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    })
    .expect("Error setting Ctrl+C handler");

    let lines = spawn_stdin_reader();
    println!("{HELP}\n");
    show(&mut browser, args.json)?;

    loop {
        match next_event(&browser, &lines, &interrupt_rx) {
            Event::Line(line) => {
                let flow = match Command::parse(&line).and_then(|command| execute(&mut browser, command)) {
                    Ok(flow) => flow,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                match flow {
                    Flow::Continue => show(&mut browser, args.json)?,
                    Flow::Tape => stream_tape(&browser, args.seed, &interrupt_rx)?,
                    Flow::Quit => break,
                }
            }
            Event::Arrival(slot, arrival) => {
                if browser.complete(slot, arrival) {
                    show(&mut browser, args.json)?;
                }
            }
            Event::InputClosed => {
                browser.settle();
                if !matches!(browser.route(), Route::Home) {
                    show(&mut browser, args.json)?;
                }
                break;
            }
            Event::Interrupt => {
                info!("Ctrl+C received. Shutting down browser...");
                break;
            }
        }
    }
    Ok(())
}

/// Waits for the next line of input, Ctrl+C, or response.
fn next_event<S: DataSource>(browser: &Browser<S>, lines: &Receiver<String>, interrupts: &Receiver<()>) -> Event {
    let mut select = Select::new();
    select.recv(lines);
    select.recv(interrupts);
    for flight in browser.in_flight() {
        flight.register(&mut select);
    }

    let operation = select.select();
    match operation.index() {
        0 => match operation.recv(lines) {
            Ok(line) => Event::Line(line),
            Err(_) => Event::InputClosed,
        },
        1 => {
            let _ = operation.recv(interrupts);
            Event::Interrupt
        }
        index => {
            let slot = index - FIXED_OPERATIONS;
            Event::Arrival(slot, browser.in_flight()[slot].receive(operation))
        }
    }
}

fn execute<S: DataSource>(browser: &mut Browser<S>, command: Command) -> Result<Flow> {
    match command {
        Command::Navigate(route) => browser.navigate(route),
        Command::Page(page) => {
            if !browser.go_to_page(page) {
                println!("No page {page} to show");
            }
        }
        Command::NextPage => {
            if !browser.next_page() {
                println!("Already on the last page");
            }
        }
        Command::PreviousPage => {
            if !browser.previous_page() {
                println!("Already on the first page");
            }
        }
        Command::Add(raw) => {
            let symbol = Symbol::new(&raw)?;
            if browser.add_to_watchlist(symbol.as_str()) {
                println!("Added {symbol} to the watchlist");
            } else {
                println!("{symbol} is already on the watchlist");
            }
        }
        Command::Remove(raw) => {
            if browser.remove_from_watchlist(&raw) {
                println!("Removed {} from the watchlist", raw.trim().to_uppercase());
            } else {
                println!("{} is not on the watchlist", raw.trim().to_uppercase());
            }
        }
        Command::Toggle => {
            let added = browser.toggle_watchlist()?;
            println!("{}", if added { "Added to the watchlist" } else { "Removed from the watchlist" });
        }
        Command::Range(range) => browser.change_range(range)?,
        Command::Tape => return Ok(Flow::Tape),
        Command::Help => println!("{HELP}"),
        Command::Quit => return Ok(Flow::Quit),
        Command::Nothing => {}
    }
    Ok(Flow::Continue)
}

/// Prints the current view and any pending notices.
fn show<S: DataSource>(browser: &mut Browser<S>, json: bool) -> Result<()> {
    for notice in browser.take_notices() {
        println!("! {notice}");
    }
    let view = browser.view();
    if json {
        println!("{}", render::json(&view)?);
    } else {
        println!("{}", render::text(&view));
    }
    Ok(())
}

/// Prints ticker tape updates until Ctrl+C.
fn stream_tape<S: DataSource>(browser: &Browser<S>, seed: Option<u64>, interrupts: &Receiver<()>) -> Result<()> {
    let tape = TapeGenerator::start(
        browser.ticker_items(),
        Duration::from_millis(TAPE_INTERVAL_MS),
        Box::new(RandomQuoteProvider::with_seed(seed)),
    );
    let events = tape.subscribe()?;
    println!("Streaming the ticker tape. Press Ctrl+C to stop.");

    loop {
        select! {
            recv(events) -> event => match event {
                Ok(TapeEvent::Tick(item)) => println!("{}", render::ticker(&item)),
                Ok(TapeEvent::Shutdown) | Err(_) => break,
            },
            recv(interrupts) -> _ => break,
        }
    }
    tape.stop()?;
    println!();
    Ok(())
}

/// Forwards stdin lines to a channel; the channel closes at end of input.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Read input error: {}", e);
                    break;
                }
            }
        }
        debug!("Input closed");
    });
    rx
}

fn read_symbols(path: &Path) -> Result<Vec<Symbol>> {
    if !is_file_exist(path) {
        warn!("Watchlist file {} not found", path.display());
        return Err(MarketError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("watchlist file {} not found", path.display()),
        )));
    }
    let file = File::open(path)?;
    Symbol::parse_from_reader(BufReader::new(file))
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &Path) -> PathBuf {
    let raw = raw.to_string_lossy();
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
