//! Live countdown timers.
//!
//! Each view that shows a live countdown owns one [`CountdownTicker`]. The
//! departure is resolved once, up front; every tick recomputes the countdown
//! from that fixed instant and a freshly sampled "now". Dropping the ticker
//! stops the timer. Tickers share no state with each other.

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::domain::{Countdown, ResolvedInstant, countdown};

/// Default tick period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Shortest period accepted; `tokio::time::interval` rejects zero.
const MIN_TICK: Duration = Duration::from_millis(1);

/// A periodic countdown for one resolved departure.
///
/// Publishes a new [`Countdown`] whenever a tick changes it. Must be created
/// inside a tokio runtime.
pub struct CountdownTicker {
    departure: ResolvedInstant,
    rx: watch::Receiver<Countdown>,
    task: JoinHandle<()>,
}

impl CountdownTicker {
    /// Start ticking every `period`.
    ///
    /// The first countdown is computed immediately, so [`current`] is valid
    /// before the first tick fires.
    ///
    /// [`current`]: CountdownTicker::current
    pub fn start(departure: ResolvedInstant, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let period = period.max(MIN_TICK);
        let (tx, rx) = watch::channel(countdown(departure, &clock.now()));

        debug!(?departure, ?period, "starting countdown ticker");

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // First tick is immediate, skip it

            loop {
                interval.tick().await;
                let next = countdown(departure, &clock.now());
                let changed = tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
                if changed {
                    trace!(%next, "countdown tick");
                }
            }
        });

        Self {
            departure,
            rx,
            task,
        }
    }

    /// The departure this ticker counts down to.
    pub fn departure(&self) -> ResolvedInstant {
        self.departure
    }

    /// The most recently published countdown.
    pub fn current(&self) -> Countdown {
        *self.rx.borrow()
    }

    /// A receiver notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<Countdown> {
        self.rx.clone()
    }

    /// Stop the timer. Equivalent to dropping the ticker.
    pub fn stop(self) {}
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
        debug!(departure = ?self.departure, "stopped countdown ticker");
    }
}

/// Turn a ticker into a stream of countdowns.
///
/// Yields the current countdown straight away, then one item per change. The
/// stream ends after the first expired countdown. The ticker lives inside the
/// stream, so dropping the stream stops the timer.
pub fn countdown_stream(ticker: CountdownTicker) -> impl Stream<Item = Countdown> + Send + 'static {
    let rx = ticker.subscribe();

    futures::stream::unfold(Some((ticker, rx, true)), |state| async move {
        let (ticker, mut rx, first) = state?;

        if !first && rx.changed().await.is_err() {
            return None;
        }
        let value = *rx.borrow_and_update();

        let next = if value.expired {
            None
        } else {
            Some((ticker, rx, false))
        };
        Some((value, next))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use futures::StreamExt;

    use crate::clock::FixedClock;

    /// A clock that follows tokio's (pausable) time.
    struct TokioClock {
        origin: DateTime<Utc>,
        start: tokio::time::Instant,
    }

    impl TokioClock {
        fn new(origin: DateTime<Utc>) -> Self {
            Self {
                origin,
                start: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = chrono::Duration::from_std(self.start.elapsed()).unwrap();
            self.origin + elapsed
        }
    }

    fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 7, 0, 0).unwrap()
    }

    fn departure_in(ms: i64) -> ResolvedInstant {
        ResolvedInstant::At(origin() + chrono::Duration::milliseconds(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn initial_value_available_immediately() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(90_500), clock, DEFAULT_TICK);

        let c = ticker.current();
        assert!(!c.expired);
        assert_eq!((c.minutes, c.seconds), (1, 30));
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_each_second() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(10_500), clock, DEFAULT_TICK);
        let mut rx = ticker.subscribe();

        assert_eq!(rx.borrow_and_update().total_seconds(), 10);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_seconds(), 9);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_seconds(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_expiry() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(1_500), clock, DEFAULT_TICK);
        let mut rx = ticker.subscribe();

        // 1.5s -> 0.5s -> expired
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().expired);
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().expired);
    }

    #[tokio::test(start_paused = true)]
    async fn unparseable_starts_expired() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(ResolvedInstant::Unparseable, clock, DEFAULT_TICK);
        assert_eq!(ticker.current(), Countdown::EXPIRED);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_ticker_stops_timer() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(60_000), clock, DEFAULT_TICK);
        let mut rx = ticker.subscribe();

        drop(ticker);

        // Sender is gone once the task is aborted
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_countdown_is_not_republished() {
        let clock = Arc::new(FixedClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(60_000), clock.clone(), DEFAULT_TICK);
        let mut rx = ticker.subscribe();
        rx.borrow_and_update();

        // Frozen clock: several ticks pass without a change
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!rx.has_changed().unwrap());

        clock.advance(chrono::Duration::seconds(10));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_seconds(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn independent_tickers() {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::new(origin()));
        let a = CountdownTicker::start(departure_in(5_500), clock.clone(), DEFAULT_TICK);
        let b = CountdownTicker::start(departure_in(100_500), clock, DEFAULT_TICK);

        let mut rx_b = b.subscribe();
        drop(a);

        rx_b.changed().await.unwrap();
        assert_eq!(rx_b.borrow_and_update().total_seconds(), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn stream_ends_after_expiry() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(2_500), clock, DEFAULT_TICK);

        let values: Vec<Countdown> = countdown_stream(ticker).collect().await;

        let totals: Vec<u64> = values.iter().map(|c| c.total_seconds()).collect();
        assert_eq!(totals, vec![2, 1, 0, 0]);
        assert_eq!(
            values.iter().map(|c| c.expired).collect::<Vec<_>>(),
            vec![false, false, false, true]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stream_of_expired_yields_once() {
        let clock = Arc::new(TokioClock::new(origin()));
        let ticker = CountdownTicker::start(departure_in(-1_000), clock, DEFAULT_TICK);

        let values: Vec<Countdown> = countdown_stream(ticker).collect().await;
        assert_eq!(values, vec![Countdown::EXPIRED]);
    }
}
