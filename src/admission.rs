use std::sync::{Arc, Condvar, Mutex};

/// Bounded-concurrency gate for client sessions.
///
/// The acceptor loop claims a [`Permit`] before pulling the next
/// connection; while the gate is full the acceptor simply stops
/// accepting and pending connections queue up in the OS backlog. Each
/// admitted session holds its permit until it exits, so a session that
/// blocks forever (an unfulfillable buy) pins its slot forever — that
/// is the documented cost of the blocking buy protocol, not something
/// the gate works around.
#[derive(Debug)]
pub struct AdmissionGate {
    /// Maximum number of concurrent sessions; `None` admits everyone.
    limit: Option<usize>,

    /// Number of currently admitted sessions.
    active: Mutex<usize>,

    /// Signalled each time a permit is dropped.
    released: Condvar,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `limit` concurrent sessions.
    ///
    /// `None` disables admission control. A limit of zero would admit
    /// nobody, so it is raised to one.
    pub fn new(limit: Option<usize>) -> Self {
        AdmissionGate {
            limit: limit.map(|n| n.max(1)),
            active: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    /// The configured session limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Number of sessions currently holding a permit.
    pub fn active(&self) -> usize {
        *self.active.lock().unwrap()
    }
}

/// One unit of permitted concurrent session execution.
///
/// Dropping the permit decrements the active count and wakes the
/// acceptor if it is waiting at the gate.
#[derive(Debug)]
pub struct Permit {
    gate: Arc<AdmissionGate>,
}

impl Permit {
    /// Blocks until the gate has a free slot, then claims it.
    ///
    /// The returned permit releases the slot when dropped.
    pub fn acquire(gate: &Arc<AdmissionGate>) -> Permit {
        let mut active = gate.active.lock().unwrap();
        if let Some(limit) = gate.limit {
            while *active >= limit {
                log::debug!("Admission gate full ({}/{}), waiting", *active, limit);
                active = gate.released.wait(active).unwrap();
            }
        }
        *active += 1;
        log::debug!("Session admitted, {} active", *active);
        drop(active);

        Permit {
            gate: Arc::clone(gate),
        }
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Ok(mut active) = self.gate.active.lock() {
            *active = active.saturating_sub(1);
            log::debug!("Session finished, {} active", *active);
        }
        self.gate.released.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_unlimited_gate_admits_immediately() {
        let gate = Arc::new(AdmissionGate::new(None));
        let permits: Vec<_> = (0..64).map(|_| Permit::acquire(&gate)).collect();
        assert_eq!(gate.active(), 64);
        drop(permits);
        assert_eq!(gate.active(), 0);
    }

    #[test]
    fn test_zero_limit_is_raised_to_one() {
        let gate = AdmissionGate::new(Some(0));
        assert_eq!(gate.limit(), Some(1));
    }

    #[test]
    fn test_gate_bounds_observed_concurrency() {
        let gate = Arc::new(AdmissionGate::new(Some(3)));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::new();
        for _ in 0..16 {
            let gate = gate.clone();
            let active = active.clone();
            let peak = peak.clone();
            workers.push(thread::spawn(move || {
                let _permit = Permit::acquire(&gate);
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gate.active(), 0);
    }

    #[test]
    fn test_held_permit_blocks_next_acquire() {
        // A session that never finishes (a buy that is never restocked)
        // keeps its slot; the gate must not admit past it.
        let gate = Arc::new(AdmissionGate::new(Some(1)));
        let held = Permit::acquire(&gate);

        let (tx, rx) = mpsc::channel();
        let waiter_gate = gate.clone();
        let waiter = thread::spawn(move || {
            let _permit = Permit::acquire(&waiter_gate);
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        drop(held);
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_ok());
        waiter.join().unwrap();
    }
}
