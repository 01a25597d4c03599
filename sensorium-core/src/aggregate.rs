//! Rate and Latency Aggregation
//!
//! ## Overview
//!
//! Many clients, one piece of hardware. The aggregator folds every live
//! request for a sensor into the single configuration the hardware must
//! run at:
//!
//! - **Rate**: the smallest supported rate that is at least the fastest
//!   continuous request. On-demand requests contribute presence only (any
//!   powered sensor can serve them); on-change requests are satisfied by
//!   the on-change pseudo-rate unless a continuous request forces a real
//!   rate. No requests at all means `Off`.
//! - **Latency**: the minimum across requests: a lower batching bound is
//!   the stricter one. No requests means `INVALID`.
//!
//! ## Hypotheticals
//!
//! `calc_hw_rate` takes two hypothetical adjustments so the API layer can
//! validate before mutating the table:
//!
//! - `extra`: a rate to consider *as if* it were in the table. `request`
//!   passes the incoming rate to pre-validate a subscription that does not
//!   exist yet.
//! - `removed`: one request value to ignore *once*. `amend` passes the
//!   client's old rate so its current contribution does not double-count
//!   against its replacement. Only the first matching occurrence is
//!   skipped; after that the marker is consumed.
//!
//! Feasibility is the caller's rejection point: a demand above the
//! sensor's fastest supported rate yields [`Error::RateInfeasible`] and
//! the API layer refuses the request without touching any state.

use crate::errors::{Error, ManagerResult};
use crate::info::SensorInfo;
use crate::rate::{Latency, Rate};
use crate::registry::Handle;
use crate::table::RequestTable;

/// Hardware rate satisfying every live request for `handle`, plus the
/// `extra`/`removed` hypotheticals.
pub(crate) fn calc_hw_rate<const N: usize>(
    info: &SensorInfo,
    table: &RequestTable<N>,
    handle: Handle,
    extra: Rate,
    removed: Rate,
) -> ManagerResult<Rate> {
    let mut have_users = false;
    let mut have_onchange = matches!(extra, Rate::OnChange);
    let mut highest: u32 = 0;

    match extra {
        Rate::Off => {}
        Rate::OnDemand | Rate::OnChange => have_users = true,
        Rate::Continuous(units) => {
            have_users = true;
            highest = units;
        }
    }

    let mut removed = removed;
    for request in table.for_sensor(handle) {
        // Skip one instance of a removed rate if one was given.
        if request.rate == removed {
            removed = Rate::Off;
            continue;
        }

        have_users = true;
        match request.rate {
            // Any powered sensor can serve on-demand subscribers.
            Rate::OnDemand => {}
            Rate::OnChange => have_onchange = true,
            Rate::Continuous(units) => highest = highest.max(units),
            Rate::Off => {}
        }
    }

    if highest == 0 {
        return Ok(if !have_users {
            Rate::Off
        } else if have_onchange {
            Rate::OnChange
        } else {
            Rate::OnDemand
        });
    }

    info.smallest_rate_at_least(highest)
        .map(Rate::Continuous)
        .ok_or(Error::RateInfeasible)
}

/// Strictest (minimum) latency across live requests for `handle`;
/// `INVALID` when there are none.
pub(crate) fn calc_hw_latency<const N: usize>(
    table: &RequestTable<N>,
    handle: Handle,
) -> Latency {
    table
        .for_sensor(handle)
        .fold(Latency::INVALID, |acc, r| acc.min(r.latency))
}
