// cartflow/src/locks.rs

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::trace;

const PRUNE_THRESHOLD: usize = 256;

/// One async mutex per customer. Every read-modify-write of a customer's
/// draft order runs while holding that customer's guard, so two concurrent
/// adds for the same variant cannot both read the same stale quantity.
///
/// Keys are compared case-insensitively. Different customers never block
/// each other.
#[derive(Debug, Default)]
pub struct CustomerLocks {
  inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl CustomerLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn acquire(&self, customer_email: &str) -> OwnedMutexGuard<()> {
    let key = customer_email.trim().to_ascii_lowercase();
    let lock = {
      let mut map = self.inner.lock();
      if map.len() >= PRUNE_THRESHOLD {
        // Idle entries are only referenced by the map itself.
        map.retain(|_, m| Arc::strong_count(m) > 1);
      }
      map.entry(key).or_default().clone()
    };
    trace!(customer = %customer_email, "Waiting for customer lock.");
    lock.lock_owned().await
  }

  pub fn tracked(&self) -> usize {
    self.inner.lock().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn same_customer_is_serialized() {
    let locks = Arc::new(CustomerLocks::new());
    let guard = locks.acquire("a@shop.io").await;

    let locks2 = locks.clone();
    let waiter = tokio::spawn(async move {
      let _g = locks2.acquire("A@shop.io").await;
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());
    drop(guard);
    tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
  }

  #[tokio::test]
  async fn different_customers_do_not_block() {
    let locks = CustomerLocks::new();
    let _a = locks.acquire("a@shop.io").await;
    let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("b@shop.io")).await;
    assert!(b.is_ok());
    assert_eq!(locks.tracked(), 2);
  }
}
