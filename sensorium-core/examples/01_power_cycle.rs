//! Sensor Power Cycle Example
//!
//! This example walks one sensor through a complete managed life cycle:
//! a client subscribes, the manager powers the sensor up and pushes
//! firmware, a second client raises the rate, and both release until the
//! sensor powers back down.
//!
//! ## What You'll Learn
//!
//! - Registering an in-process driver with the manager
//! - How client requests aggregate into one hardware configuration
//! - Driving the state machine by replaying driver completions
//!
//! ## Control Flow
//!
//! ```text
//! request ──► reconcile ──► driver op ──► signal_internal_evt
//!                 ▲                              │
//!                 └────────── deliver ◄──────────┘
//! ```
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_power_cycle
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use sensorium_core::{
    ClientId, EvtToken, Latency, Rate, Runtime, SensorEvent, SensorInfo, SensorKind,
    SensorManager, SensorOps, TaskId, TaskMessage,
};

/// Single-threaded deferral queue: `defer` enqueues, `main` drains.
#[derive(Default)]
struct LoopRuntime {
    deferred: RefCell<VecDeque<EvtToken>>,
}

impl Runtime for LoopRuntime {
    fn defer(&self, evt: EvtToken) -> bool {
        self.deferred.borrow_mut().push_back(evt);
        true
    }

    fn post(&self, _task: TaskId, _msg: TaskMessage) -> bool {
        true
    }
}

/// Demo driver: prints every operation and accepts it. Completions are
/// replayed by `main`, standing in for the hardware interrupt path.
struct DemoAccel;

impl SensorOps for DemoAccel {
    fn power(&self, on: bool) -> bool {
        println!("  [driver] power({on})");
        true
    }
    fn firmware_upload(&self) -> bool {
        println!("  [driver] firmware_upload()");
        true
    }
    fn set_rate(&self, rate: Rate, latency: Latency) -> bool {
        println!("  [driver] set_rate({rate:?}, {latency:?})");
        true
    }
    fn flush(&self) -> bool {
        println!("  [driver] flush()");
        true
    }
    fn trigger_ondemand(&self) -> bool {
        println!("  [driver] trigger_ondemand()");
        true
    }
}

static ACCEL_OPS: DemoAccel = DemoAccel;

static ACCEL: SensorInfo = SensorInfo {
    name: "demo-accel",
    kind: SensorKind::Accelerometer,
    supported_rates: &[10_240, 51_200, 102_400], // 10/50/100 Hz in Q10
};

fn main() {
    println!("Sensorium Power Cycle Example");
    println!("=============================\n");

    let rt = LoopRuntime::default();
    let manager: SensorManager<&LoopRuntime> = SensorManager::new(&rt);
    let drain = |manager: &SensorManager<&LoopRuntime>| loop {
        let next = rt.deferred.borrow_mut().pop_front();
        match next {
            Some(token) => manager.deliver(token),
            None => break,
        }
    };

    let handle = manager.register(&ACCEL, &ACCEL_OPS).expect("free slot");
    println!("registered {} as {:?}\n", ACCEL.name, handle);

    // Client 1 wants ~40 Hz; the hardware will round up to 50 Hz.
    println!("client 1 requests ~40 Hz:");
    manager
        .request(
            ClientId(1),
            handle,
            Rate::Continuous(40_960),
            Latency::INVALID,
        )
        .expect("feasible request");
    println!("  state: {:?}", manager.current_state(handle));

    println!("\ndriver reports power-on:");
    manager
        .signal_internal_evt(handle, SensorEvent::PowerStateChanged { on: true })
        .expect("event accepted");
    drain(&manager);
    println!("  state: {:?}", manager.current_state(handle));

    println!("\ndriver reports firmware done at 50 Hz:");
    manager
        .signal_internal_evt(
            handle,
            SensorEvent::FwStateChanged {
                result: Some((Rate::Continuous(51_200), Latency::INVALID)),
            },
        )
        .expect("event accepted");
    drain(&manager);
    println!("  state: {:?}", manager.current_state(handle));

    // Client 2 raises the aggregate demand to 100 Hz.
    println!("\nclient 2 requests 100 Hz:");
    manager
        .request(
            ClientId(2),
            handle,
            Rate::Continuous(102_400),
            Latency::INVALID,
        )
        .expect("feasible request");
    manager
        .signal_internal_evt(
            handle,
            SensorEvent::RateChanged {
                rate: Rate::Continuous(102_400),
                latency: Latency::INVALID,
            },
        )
        .expect("event accepted");
    drain(&manager);
    println!("  state: {:?}", manager.current_state(handle));

    // Both clients leave; the sensor winds all the way down.
    println!("\nclient 2 releases:");
    manager.release(ClientId(2), handle).expect("live request");
    manager
        .signal_internal_evt(
            handle,
            SensorEvent::RateChanged {
                rate: Rate::Continuous(51_200),
                latency: Latency::INVALID,
            },
        )
        .expect("event accepted");
    drain(&manager);
    println!("  state: {:?}", manager.current_state(handle));

    println!("\nclient 1 releases:");
    manager.release(ClientId(1), handle).expect("live request");
    manager
        .signal_internal_evt(handle, SensorEvent::PowerStateChanged { on: false })
        .expect("event accepted");
    drain(&manager);
    println!("  state: {:?}", manager.current_state(handle));

    println!(
        "\ndone: {} completions deferred, {} dispatch failures",
        manager
            .stats()
            .deferred
            .load(std::sync::atomic::Ordering::Relaxed),
        manager
            .stats()
            .dispatch_failed
            .load(std::sync::atomic::Ordering::Relaxed),
    );
}
