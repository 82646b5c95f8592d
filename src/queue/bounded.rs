//! Fixed-Capacity FIFO Ring Buffer with Permit-Based Synchronization
//!
//! This is the classic bounded-buffer scheme: two counting semaphores plus
//! a mutex over the ring structure.
//!
//! - `slots` starts at `capacity` and gates producers: an `insert` first
//!   consumes a slot permit, so a full queue parks the producer.
//! - `items` starts at 0 and gates consumers: a `remove` first consumes an
//!   item permit, so an empty queue parks the consumer.
//! - The mutex serializes the actual ring mutation (`front`/`rear`/storage),
//!   which is a short, never-awaiting critical section.
//!
//! The permit hand-off is what makes the ordering argument simple: a slot
//! permit guarantees the position at `rear` is vacant, an item permit
//! guarantees the position at `front` is occupied, and the mutex makes each
//! advance atomic. `front` and `rear` are monotonically increasing counters
//! indexed mod capacity, so wraparound needs no special casing.

use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors that can occur when constructing a queue.
///
/// Note that `insert` and `remove` have no error surface: full and empty
/// queues park the caller instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The requested capacity was zero
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,
}

/// The ring structure guarded by the mutex.
///
/// `front` and `rear` only ever increase; the index into `storage` is
/// taken mod capacity. Their difference is the current occupancy.
#[derive(Debug)]
struct Ring<T> {
    storage: Vec<Option<T>>,
    front: u64,
    rear: u64,
}

/// A fixed-capacity FIFO queue whose insert and remove operations await
/// instead of failing when the queue is full or empty.
///
/// One producer and any number of consumers may share the queue through an
/// `Arc`. Items are delivered in strict insertion order, each to exactly
/// one consumer.
///
/// # Example
///
/// ```
/// use spellserv::queue::BoundedQueue;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = BoundedQueue::new(3).unwrap();
/// queue.insert("hello").await;
/// assert_eq!(queue.remove().await, "hello");
/// # }
/// ```
#[derive(Debug)]
pub struct BoundedQueue<T> {
    /// Permits for vacant positions; producers park here when full
    slots: Semaphore,
    /// Permits for occupied positions; consumers park here when empty
    items: Semaphore,
    /// The ring itself
    ring: Mutex<Ring<T>>,
    /// Fixed at construction
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let mut storage = Vec::with_capacity(capacity);
        storage.resize_with(capacity, || None);

        Ok(Self {
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            ring: Mutex::new(Ring {
                storage,
                front: 0,
                rear: 0,
            }),
            capacity,
        })
    }

    /// Returns the fixed capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items currently buffered.
    ///
    /// Under concurrent use this is a snapshot; it is still bounded by
    /// `capacity` at every observable point.
    pub fn len(&self) -> usize {
        let ring = self.ring.lock().unwrap();
        (ring.rear - ring.front) as usize
    }

    /// Returns `true` when no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an item, awaiting while the queue is full.
    ///
    /// This is the producer side of the hand-off: once a slot permit is
    /// held, the position at `rear` is guaranteed vacant, so nothing
    /// pending removal is ever overwritten. Releasing an item permit at
    /// the end wakes exactly one parked consumer.
    pub async fn insert(&self, item: T) {
        // The semaphores are owned by the queue and never closed.
        let permit = self
            .slots
            .acquire()
            .await
            .expect("queue slot semaphore closed");
        permit.forget();

        {
            let mut ring = self.ring.lock().unwrap();
            let idx = (ring.rear % self.capacity as u64) as usize;
            ring.storage[idx] = Some(item);
            ring.rear += 1;
        }

        self.items.add_permits(1);
    }

    /// Removes the oldest item, awaiting while the queue is empty.
    ///
    /// The item permit guarantees the position at `front` is occupied, so
    /// the `take` below always yields a value. Releasing a slot permit at
    /// the end wakes the producer if it was parked on a full queue.
    pub async fn remove(&self) -> T {
        let permit = self
            .items
            .acquire()
            .await
            .expect("queue item semaphore closed");
        permit.forget();

        let item = {
            let mut ring = self.ring.lock().unwrap();
            let idx = (ring.front % self.capacity as u64) as usize;
            let item = ring.storage[idx]
                .take()
                .expect("item permit held for vacant ring position");
            ring.front += 1;
            item
        };

        self.slots.add_permits(1);
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::time::{sleep, timeout, Duration};

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BoundedQueue::<u32>::new(0).unwrap_err();
        assert_eq!(err, QueueError::ZeroCapacity);
    }

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let queue = BoundedQueue::new(8).unwrap();

        for i in 0..8 {
            queue.insert(i).await;
        }
        for i in 0..8 {
            assert_eq!(queue.remove().await, i);
        }
    }

    #[tokio::test]
    async fn fifo_order_survives_wraparound() {
        let queue = BoundedQueue::new(3).unwrap();

        // Cycle enough items through a small ring that front/rear wrap
        // several times.
        for i in 0..10 {
            queue.insert(i).await;
            assert_eq!(queue.remove().await, i);
        }
    }

    #[tokio::test]
    async fn remove_parks_on_empty_until_insert() {
        let queue = Arc::new(BoundedQueue::new(2).unwrap());

        // An empty queue must park the consumer, not return or error.
        let parked = timeout(Duration::from_millis(50), queue.remove()).await;
        assert!(parked.is_err(), "remove returned from an empty queue");

        // A later insert must wake it.
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.remove().await })
        };
        sleep(Duration::from_millis(20)).await;
        queue.insert(99u32).await;

        let got = timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer stayed parked after insert")
            .unwrap();
        assert_eq!(got, 99);
    }

    #[tokio::test]
    async fn insert_parks_on_full_until_remove() {
        let queue = Arc::new(BoundedQueue::new(3).unwrap());

        queue.insert('a').await;
        queue.insert('b').await;
        queue.insert('c').await;

        // The fourth insert must park, not drop or overwrite.
        let blocked = timeout(Duration::from_millis(50), queue.insert('d')).await;
        assert!(blocked.is_err(), "insert returned on a full queue");
        assert_eq!(queue.len(), 3);

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.insert('d').await })
        };
        sleep(Duration::from_millis(20)).await;

        // Removing one item frees a slot and unparks the producer, and
        // the freed item is the oldest.
        assert_eq!(queue.remove().await, 'a');
        timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer stayed parked after remove")
            .unwrap();

        assert_eq!(queue.remove().await, 'b');
        assert_eq!(queue.remove().await, 'c');
        assert_eq!(queue.remove().await, 'd');
    }

    #[tokio::test]
    async fn each_item_is_delivered_exactly_once() {
        const ITEMS: u32 = 200;
        const CONSUMERS: usize = 4;

        let queue = Arc::new(BoundedQueue::new(5).unwrap());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        for _ in 0..CONSUMERS {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            tokio::spawn(async move {
                loop {
                    let item: u32 = queue.remove().await;
                    if tx.send(item).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                for i in 0..ITEMS {
                    queue.insert(i).await;
                }
            })
        };

        let mut seen = HashSet::new();
        for _ in 0..ITEMS {
            let item = timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("consumers stalled")
                .expect("consumer channel closed early");
            assert!(seen.insert(item), "item {item} delivered twice");
        }
        assert_eq!(seen.len(), ITEMS as usize);
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn occupancy_never_exceeds_capacity() {
        const CAPACITY: usize = 4;

        let queue = Arc::new(BoundedQueue::new(CAPACITY).unwrap());

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                for i in 0..100u32 {
                    queue.insert(i).await;
                }
            })
        };

        let mut drained = 0;
        while drained < 100 {
            assert!(
                queue.len() <= CAPACITY,
                "occupancy {} exceeded capacity {}",
                queue.len(),
                CAPACITY
            );
            let _ = queue.remove().await;
            drained += 1;
        }
        producer.await.unwrap();
    }
}
