//! Fuzz target: `SubscriptionRegistry` edits
//!
//! Decodes arbitrary bytes into a sequence of subscribe / unsubscribe /
//! clock edits and asserts that the registry never panics, never accepts
//! a duplicate (pin, edge) pair or two modes on one pin, and that a
//! rejected edit leaves it untouched.
//!
//! cargo fuzz run fuzz_registry_ops

#![no_main]

use core::time::Duration;

use libfuzzer_sys::fuzz_target;
use pinsub::{EdgeType, PinMode, SubscriptionRegistry};

const MODES: [PinMode; 4] = [
    PinMode::Input,
    PinMode::InputPullUp,
    PinMode::InputPullDown,
    PinMode::Output,
];
const EDGES: [EdgeType; 3] = [EdgeType::Rising, EdgeType::Falling, EdgeType::Both];

fuzz_target!(|data: &[u8]| {
    let mut registry = SubscriptionRegistry::new();

    for op in data.chunks_exact(3) {
        let before = registry.clone();
        // Small signed range so collisions and negative pins are common.
        let pin = i32::from(op[1] as i8 % 8);
        let edge = EDGES[usize::from(op[2]) % EDGES.len()];

        let rejected = match op[0] % 4 {
            0 => {
                let mode = MODES[usize::from(op[2] >> 4) % MODES.len()];
                registry.subscribe(pin, mode, edge).is_err()
            }
            1 => registry.unsubscribe(pin, edge).is_err(),
            2 => registry
                .set_clock_rate(Duration::from_millis(u64::from(op[1])))
                .is_err(),
            _ => {
                registry.set_clock_enabled(op[1] & 1 == 1);
                false
            }
        };

        if rejected {
            assert_eq!(registry.subscriptions(), before.subscriptions());
            assert_eq!(registry.clock_rate(), before.clock_rate());
        }

        let subs = registry.subscriptions();
        for (i, a) in subs.iter().enumerate() {
            assert!(a.pin() >= 0 && a.mode().is_input());
            for b in &subs[i + 1..] {
                assert!(a.pin() != b.pin() || a.edge() != b.edge());
                assert!(a.pin() != b.pin() || a.mode() == b.mode());
            }
        }
    }

    // Building never panics and the snapshot matches.
    let service = registry.build();
    assert_eq!(service.subscriptions(), registry.subscriptions());
});
