//! Tests for pool lifecycle management: starting, stopping, and the round-trip
//! idempotence guarantees from spec §8.

use super::*;

mod start_stop;
