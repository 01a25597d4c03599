//! Client Request Table
//!
//! Bounded set of `(sensor, client) → (rate, latency)` records, the input
//! to rate/latency aggregation. Backed by the [`Slab`](crate::slab::Slab)
//! pool: dense index-order scans, stable indices, no allocation. At most
//! one live record exists per `(sensor, client)` pair; `add` rejects
//! duplicates so that `amend` and `release` always have a unique target.
//!
//! Deleting overwrites the record with neutral values (`Off`,
//! `INVALID`) before returning the slot, so a scanner that still sees the
//! slot as live reads values that cannot skew an aggregate.

use crate::rate::{Latency, Rate};
use crate::registry::Handle;
use crate::slab::Slab;

/// Identifier of a client of the sensor manager.
///
/// Opaque to the manager; hubs typically use the requesting task's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(
    /// Raw client identifier.
    pub u32,
);

/// One client's subscription to one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Request {
    pub(crate) handle: Handle,
    pub(crate) client: ClientId,
    pub(crate) rate: Rate,
    pub(crate) latency: Latency,
}

/// Request table over a bounded pool of `N` records.
pub(crate) struct RequestTable<const N: usize> {
    pool: Slab<Request, N>,
}

impl<const N: usize> RequestTable<N> {
    pub(crate) fn new() -> Self {
        Self { pool: Slab::new() }
    }

    /// Record a new subscription. Fails when the pool is full; the caller
    /// pre-checks for duplicates.
    pub(crate) fn add(&self, request: Request) -> bool {
        self.pool.insert(request).is_some()
    }

    /// The live record for `(handle, client)`, if any.
    pub(crate) fn get(&self, handle: Handle, client: ClientId) -> Option<Request> {
        self.find(handle, client).map(|(_, r)| r)
    }

    /// Update the matching record in place.
    pub(crate) fn amend(
        &self,
        handle: Handle,
        client: ClientId,
        rate: Rate,
        latency: Latency,
    ) -> bool {
        match self.find(handle, client) {
            Some((idx, mut record)) => {
                record.rate = rate;
                record.latency = latency;
                self.pool.set(idx, record)
            }
            None => false,
        }
    }

    /// Drop the matching record, neutralizing it first.
    pub(crate) fn delete(&self, handle: Handle, client: ClientId) -> bool {
        match self.find(handle, client) {
            Some((idx, mut record)) => {
                record.rate = Rate::Off;
                record.latency = Latency::INVALID;
                self.pool.set(idx, record);
                self.pool.free(idx)
            }
            None => false,
        }
    }

    /// Live records for one sensor, in pool order.
    pub(crate) fn for_sensor(&self, handle: Handle) -> impl Iterator<Item = Request> + '_ {
        self.pool
            .iter()
            .map(|(_, r)| r)
            .filter(move |r| r.handle == handle)
    }

    /// Count of live records across all sensors.
    pub(crate) fn len(&self) -> usize {
        self.pool.len()
    }

    fn find(&self, handle: Handle, client: ClientId) -> Option<(usize, Request)> {
        self.pool
            .iter()
            .find(|(_, r)| r.handle == handle && r.client == client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(raw: u32) -> Handle {
        Handle::from_raw(raw).unwrap()
    }

    fn req(handle: u32, client: u32, rate: Rate) -> Request {
        Request {
            handle: h(handle),
            client: ClientId(client),
            rate,
            latency: Latency::INVALID,
        }
    }

    #[test]
    fn add_get_amend_delete() {
        let table: RequestTable<4> = RequestTable::new();
        assert!(table.add(req(1, 7, Rate::Continuous(50))));
        assert_eq!(
            table.get(h(1), ClientId(7)).unwrap().rate,
            Rate::Continuous(50)
        );

        assert!(table.amend(h(1), ClientId(7), Rate::OnChange, Latency::from_millis(5)));
        let r = table.get(h(1), ClientId(7)).unwrap();
        assert_eq!(r.rate, Rate::OnChange);
        assert_eq!(r.latency, Latency::from_millis(5));

        assert!(table.delete(h(1), ClientId(7)));
        assert!(table.get(h(1), ClientId(7)).is_none());
        assert!(!table.delete(h(1), ClientId(7)));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let table: RequestTable<2> = RequestTable::new();
        assert!(table.add(req(1, 1, Rate::OnDemand)));
        assert!(table.add(req(1, 2, Rate::OnDemand)));
        assert!(!table.add(req(1, 3, Rate::OnDemand)));
        assert!(table.delete(h(1), ClientId(1)));
        assert!(table.add(req(1, 3, Rate::OnDemand)));
    }

    #[test]
    fn per_sensor_iteration_filters() {
        let table: RequestTable<8> = RequestTable::new();
        table.add(req(1, 1, Rate::Continuous(10)));
        table.add(req(2, 1, Rate::Continuous(20)));
        table.add(req(1, 2, Rate::OnChange));

        let for_one: std::vec::Vec<_> = table.for_sensor(h(1)).collect();
        assert_eq!(for_one.len(), 2);
        assert!(for_one.iter().all(|r| r.handle == h(1)));
        assert_eq!(table.for_sensor(h(3)).count(), 0);
    }

    #[test]
    fn amend_misses_unknown_pairs() {
        let table: RequestTable<4> = RequestTable::new();
        table.add(req(1, 1, Rate::Continuous(10)));
        assert!(!table.amend(h(1), ClientId(2), Rate::Off, Latency::INVALID));
        assert!(!table.amend(h(2), ClientId(1), Rate::Off, Latency::INVALID));
    }
}
