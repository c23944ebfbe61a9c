//! Ticker tape generator and event broadcasting.
//!
//! The `TapeGenerator` runs a background thread that moves a fixed set of
//! `TickerItem`s along a small random walk and broadcasts every update to all
//! subscribers using `crossbeam_channel`. Subscribers register through
//! `TapeGenerator::subscribe`.
//!
//! Event model:
//! - `TapeEvent::Tick(TickerItem)` — a single updated tape entry.
//! - `TapeEvent::Shutdown` — signal for consumers to terminate gracefully.
//!
//! Broadcast is best-effort: if sending to a subscriber fails, that subscriber
//! is removed.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use log::{error, info};
use stock_common::provider::QuoteProvider;
use stock_common::{MarketError, Result, TickerItem};

/// Message sent by the generator to its subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum TapeEvent {
    /// New value for one tape entry.
    Tick(TickerItem),
    /// Global shutdown notification for all consumers.
    Shutdown,
}

/// One tape entry and the reference price its change is measured from.
struct Lane {
    item: TickerItem,
    base: f64,
}

impl Lane {
    fn new(item: TickerItem) -> Self {
        let base = item.price - item.change;
        Lane { item, base }
    }

    fn advance(&mut self, provider: &mut dyn QuoteProvider) -> TickerItem {
        let price = provider.next_price(self.item.price);
        let change = price - self.base;
        self.item.price = (price * 100.0).round() / 100.0;
        self.item.change = (change * 100.0).round() / 100.0;
        self.item.change_percent = if self.base > 0.0 {
            (change / self.base * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        self.item.clone()
    }
}

/// Handle to a running tape thread.
pub struct TapeGenerator {
    subscribe_tx: Sender<Sender<TapeEvent>>,
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl TapeGenerator {
    /// Starts the generator thread, updating every item once per `interval`.
    pub fn start(items: Vec<TickerItem>, interval: Duration, mut provider: Box<dyn QuoteProvider>) -> Self {
        let (subscribe_tx, subscribe_rx) = unbounded::<Sender<TapeEvent>>();
        let (stop_tx, stop_rx) = unbounded::<()>();

        let handle = thread::spawn(move || {
            let mut subscribers: Vec<Sender<TapeEvent>> = Vec::new();
            let mut lanes: Vec<Lane> = items.into_iter().map(Lane::new).collect();
            let ticker = tick(interval);
            info!("Ticker tape started with {} item(s)", lanes.len());

            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(subscribe_rx) -> msg => match msg {
                        Ok(subscriber) => subscribers.push(subscriber),
                        Err(_) => break,
                    },
                    recv(ticker) -> _ => {
                        for lane in &mut lanes {
                            let event = TapeEvent::Tick(lane.advance(provider.as_mut()));
                            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
                        }
                    },
                }
            }

            for subscriber in &subscribers {
                let _ = subscriber.send(TapeEvent::Shutdown);
            }
            info!("Ticker tape stopped");
        });

        TapeGenerator {
            subscribe_tx,
            stop_tx,
            handle,
        }
    }

    /// Registers a new subscriber and returns its event stream.
    pub fn subscribe(&self) -> Result<Receiver<TapeEvent>> {
        let (tx, rx) = unbounded();
        self.subscribe_tx.send(tx)?;
        Ok(rx)
    }

    /// Stops the thread; every subscriber receives `TapeEvent::Shutdown`.
    pub fn stop(self) -> Result<()> {
        self.stop_tx.send(())?;
        self.handle.join().map_err(|_| {
            error!("Ticker tape thread panicked");
            MarketError::ChannelRecv("ticker tape thread panicked".to_string())
        })
    }
}
