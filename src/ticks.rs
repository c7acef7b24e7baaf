use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Anything that periodically wakes the session up. Implementations must be cancel safe.
#[async_trait]
pub trait TickSource: Send {
    /// Resolves at the next tick, `None` once the source is exhausted.
    async fn tick(&mut self) -> Option<()>;
}

/// Ticks every `period`, starting one period from now. A late tick pushes back the following ones.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        IntervalTicker { interval }
    }
}

#[async_trait]
impl TickSource for IntervalTicker {
    async fn tick(&mut self) -> Option<()> {
        self.interval.tick().await;
        Some(())
    }
}

#[async_trait]
impl TickSource for Receiver<()> {
    async fn tick(&mut self) -> Option<()> {
        self.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_waits_one_period_before_the_first_tick() {
        let started = Instant::now();
        let mut ticker = IntervalTicker::new(Duration::from_millis(1500));

        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(1500));

        ticker.tick().await;
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_delays_after_an_overrun() {
        let started = Instant::now();
        let mut ticker = IntervalTicker::new(Duration::from_millis(100));

        ticker.tick().await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        ticker.tick().await;
        ticker.tick().await;

        // The overdue tick fires immediately at 350ms, the next one a full period later
        assert_eq!(started.elapsed(), Duration::from_millis(450));
    }

    #[tokio::test]
    async fn channel_ticks_until_all_senders_are_gone() {
        let (tx, mut rx) = mpsc::channel(2);
        tx.send(()).await.unwrap();
        drop(tx);

        assert_eq!(rx.tick().await, Some(()));
        assert_eq!(rx.tick().await, None);
    }
}
