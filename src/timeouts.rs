use std::time::Duration;

/// The two deadlines from spec.md §4.1: the socket-level receive timeout
/// used for connecting and for the first chunk of any response, and the
/// inter-chunk deadline that applies once a multi-chunk drain is underway.
#[derive(Clone, Copy, Debug)]
pub struct Timeouts {
    pub connect: Duration,
    pub per_recv: Duration,
    pub inter_chunk: Duration,
    pub probe: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            connect: Duration::from_secs(10),
            per_recv: Duration::from_secs(10),
            inter_chunk: Duration::from_secs(5),
            probe: Duration::from_secs(5),
        }
    }
}
