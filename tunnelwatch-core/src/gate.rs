//! Bounded-capacity gate guarding the tunnel occupancy count.
//!
//! The count sits behind one async mutex. Admission waits on a [`Notify`]
//! until the count is below capacity and re-checks after every wakeup, so a
//! spurious or stale notification can never push the count over capacity.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify};

/// Occupancy counter with blocking admission and capacity release.
#[derive(Debug)]
pub struct CapacityGate {
    /// Maximum permitted occupancy.
    capacity: u32,
    /// Vehicles currently inside.
    cars: Mutex<u32>,
    /// Signalled whenever the count drops.
    released: Notify,
    /// Lifetime admissions.
    admissions: AtomicU64,
    /// Lifetime releases.
    releases: AtomicU64,
}

impl CapacityGate {
    /// Create an empty gate.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            cars: Mutex::new(0),
            released: Notify::new(),
            admissions: AtomicU64::new(0),
            releases: AtomicU64::new(0),
        }
    }

    /// Maximum permitted occupancy.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Current occupancy.
    pub async fn occupancy(&self) -> u32 {
        *self.cars.lock().await
    }

    /// Vehicles admitted since the gate was created. Overwrites don't count.
    pub fn admissions(&self) -> u64 {
        self.admissions.load(Ordering::SeqCst)
    }

    /// Vehicles released since the gate was created. Overwrites don't count.
    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::SeqCst)
    }

    /// Block until there is room, then admit one vehicle.
    ///
    /// Returns the occupancy after admission.
    pub async fn admit(&self) -> u32 {
        loop {
            if let Some(count) = self.admit_if(|| true).await {
                return count;
            }
        }
    }

    /// Block until there is room, then admit one vehicle, as long as
    /// `allowed` holds.
    ///
    /// `allowed` is evaluated under the occupancy guard on every wakeup,
    /// before the capacity check, so a waiter on a full tunnel gives up as
    /// soon as `allowed` turns false and [`Self::wake_waiters`] is called.
    /// Returns the new occupancy, or `None` when `allowed` refused and
    /// nothing changed.
    pub async fn admit_if<F>(&self, allowed: F) -> Option<u32>
    where
        F: Fn() -> bool,
    {
        let mut announced = false;
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            // Register before checking so a release between the check and
            // the await is not lost.
            notified.as_mut().enable();

            {
                let mut cars = self.cars.lock().await;
                if !allowed() {
                    return None;
                }
                if *cars < self.capacity {
                    *cars += 1;
                    self.admissions.fetch_add(1, Ordering::SeqCst);
                    return Some(*cars);
                }
            }

            if !announced {
                tracing::debug!(capacity = self.capacity, "Max capacity reached, pausing entry");
                announced = true;
            }
            notified.await;
        }
    }

    /// Wake every pending admission so it re-evaluates its predicate.
    pub fn wake_waiters(&self) {
        self.released.notify_waiters();
    }

    /// Let one vehicle out. No-op when the tunnel is empty.
    ///
    /// Returns the occupancy after release, or `None` if nothing changed.
    pub async fn release(&self) -> Option<u32> {
        self.release_if(|| true).await
    }

    /// Let one vehicle out if the tunnel is not empty and `allowed` holds.
    ///
    /// `allowed` is evaluated under the occupancy guard.
    pub async fn release_if<F>(&self, allowed: F) -> Option<u32>
    where
        F: FnOnce() -> bool,
    {
        let mut cars = self.cars.lock().await;
        if *cars == 0 || !allowed() {
            return None;
        }
        *cars -= 1;
        self.releases.fetch_add(1, Ordering::SeqCst);
        let remaining = *cars;
        drop(cars);

        // At most one admission became possible.
        self.released.notify_one();
        Some(remaining)
    }

    /// Evacuate the tunnel and wake every pending admission.
    pub async fn reset(&self) {
        self.overwrite(0).await;
    }

    /// Force the occupancy to `cars`, bypassing the capacity check.
    ///
    /// Used by operator reset and test injection. Waiters re-check and go
    /// back to sleep if the tunnel is still full.
    pub async fn overwrite(&self, cars: u32) {
        *self.cars.lock().await = cars;
        self.wake_waiters();
    }
}
