//! Millisecond clock used by the transport engine for timestamps and
//! retransmission scheduling.

mod clock;

pub use clock::Clock;
