//! Producer and consumer task loops.
//!
//! Both loops follow the same shape: check the stop flag, pace, run
//! one protocol step against the belt. A step that returns the
//! shutdown signal (closed semaphore) also exits the loop, so a task
//! parked mid-wait still terminates promptly.

use crate::ring::Item;
use crate::sync::Belt;
use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::{debug, trace};

/// Per-iteration delay policy, injectable so tests run deterministically.
#[derive(Debug, Clone)]
pub enum Pacing {
    /// No delay between iterations.
    None,
    /// Sleep a uniform random duration in `[0, max)` each iteration.
    Jittered { max: Duration },
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Jittered {
            max: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    pub fn pause(&self) {
        match self {
            Self::None => {}
            Self::Jittered { max } => {
                let upper = max.as_micros() as u64;
                if upper > 0 {
                    let micros = rand::thread_rng().gen_range(0..upper);
                    thread::sleep(Duration::from_micros(micros));
                }
            }
        }
    }
}

/// Default item source: uniform random values in `0..100`.
pub fn random_items() -> impl FnMut() -> Item + Send {
    use rand::SeedableRng;
    let mut rng = rand::rngs::StdRng::from_entropy();
    move || rng.gen_range(0..100)
}

/// Run one producer until shutdown. Returns the number of items produced.
pub fn producer_loop<F>(belt: &Belt, pacing: &Pacing, mut next_item: F) -> u64
where
    F: FnMut() -> Item,
{
    let mut produced = 0u64;
    while !belt.producers_stopped() {
        pacing.pause();
        let item = next_item();
        if !belt.produce(item) {
            break;
        }
        produced += 1;
        trace!(item, "produced");
    }
    debug!(produced, "producer exiting");
    produced
}

/// Run one consumer until shutdown. Returns the number of items consumed.
///
/// `on_item` runs after the critical section so the buffer lock is
/// never held across the side effect.
pub fn consumer_loop<F>(belt: &Belt, pacing: &Pacing, mut on_item: F) -> u64
where
    F: FnMut(Item),
{
    let mut consumed = 0u64;
    while !belt.consumers_stopped() {
        pacing.pause();
        let Some(item) = belt.consume() else {
            break;
        };
        consumed += 1;
        debug!(item, "consumed");
        on_item(item);
    }
    debug!(consumed, "consumer exiting");
    consumed
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Instant;

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn test_single_producer_single_consumer_fifo() {
        // Scripted source: [3, 7, 1] first, then a counter. With one
        // producer and one consumer the first three consumed items must
        // be exactly [3, 7, 1].
        let belt = Arc::new(Belt::new(5).unwrap());
        let consumed = Arc::new(Mutex::new(Vec::new()));

        let producer = {
            let belt = belt.clone();
            thread::spawn(move || {
                let script = [3u64, 7, 1];
                let mut n = 0usize;
                producer_loop(&belt, &Pacing::None, move || {
                    let item = script.get(n).copied().unwrap_or(100 + n as u64);
                    n += 1;
                    item
                })
            })
        };
        let consumer = {
            let belt = belt.clone();
            let consumed = consumed.clone();
            thread::spawn(move || {
                consumer_loop(&belt, &Pacing::None, move |item| consumed.lock().push(item))
            })
        };

        assert!(
            wait_until(Duration::from_secs(5), || consumed.lock().len() >= 3),
            "consumer never saw three items"
        );
        belt.stop_producers();
        belt.stop_consumers();
        producer.join().unwrap();
        consumer.join().unwrap();

        assert_eq!(&consumed.lock()[..3], &[3, 7, 1]);
    }

    #[test]
    fn test_no_loss_no_duplication_single_pair() {
        // Producer emits 0, 1, 2, ...; whatever the consumer sees must
        // be exactly that prefix, in order.
        let belt = Arc::new(Belt::new(5).unwrap());
        let consumed = Arc::new(Mutex::new(Vec::new()));

        let producer = {
            let belt = belt.clone();
            thread::spawn(move || {
                let mut next = 0u64;
                producer_loop(&belt, &Pacing::None, move || {
                    let item = next;
                    next += 1;
                    item
                })
            })
        };
        let consumer = {
            let belt = belt.clone();
            let consumed = consumed.clone();
            thread::spawn(move || {
                consumer_loop(&belt, &Pacing::None, move |item| consumed.lock().push(item))
            })
        };

        assert!(wait_until(Duration::from_secs(5), || {
            consumed.lock().len() >= 1000
        }));
        belt.stop_producers();
        belt.stop_consumers();
        let produced = producer.join().unwrap();
        let count = consumer.join().unwrap();

        let consumed = consumed.lock();
        assert_eq!(count, consumed.len() as u64);
        assert!(count <= produced);
        for (i, &item) in consumed.iter().enumerate() {
            assert_eq!(item, i as u64, "loss or reorder at position {}", i);
        }
    }

    #[test]
    fn test_loops_exit_promptly_after_stop() {
        let belt = Arc::new(Belt::new(5).unwrap());
        let mut handles = Vec::new();
        for _ in 0..3 {
            let belt = belt.clone();
            handles.push(thread::spawn(move || {
                producer_loop(&belt, &Pacing::None, random_items());
            }));
        }
        for _ in 0..3 {
            let belt = belt.clone();
            handles.push(thread::spawn(move || {
                consumer_loop(&belt, &Pacing::None, |_| {});
            }));
        }

        thread::sleep(Duration::from_millis(50));
        belt.stop_producers();
        belt.stop_consumers();

        let deadline = Instant::now() + Duration::from_secs(5);
        for handle in handles {
            assert!(Instant::now() < deadline, "tasks did not exit in time");
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_pacing_none_does_not_sleep() {
        let start = Instant::now();
        for _ in 0..1000 {
            Pacing::None.pause();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_jittered_pacing_bounded_by_max() {
        let pacing = Pacing::Jittered {
            max: Duration::from_millis(5),
        };
        let start = Instant::now();
        for _ in 0..10 {
            pacing.pause();
        }
        // Ten sleeps of at most 5ms each, plus scheduling slack.
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
