//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements    | Connects to                        |
//! |------------|---------------|------------------------------------|
//! | `sim`      | PinController | In-memory latched edges, virtual time |
//! | `polled`   | PinController | Any `embedded-hal` input pin        |
//! | `log_sink` | EventSink     | `log` facade                        |

pub mod log_sink;
pub mod polled;
pub mod sim;
