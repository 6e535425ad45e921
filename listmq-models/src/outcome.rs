use bitflags::bitflags;

bitflags! {
    /// Processing outcome returned by a message handler.
    ///
    /// Flags are independent and combine with `|`; a single outcome may ask
    /// for several side effects at once (e.g. `NACK | EXIT`).
    ///
    /// - `ACK`: processed, nothing else to do
    /// - `NACK`: rejected, routed to the pipe's dead letter when one is set
    /// - `REQUEUE`: pushed back onto the pipe it came from
    /// - `EXIT`: stop consuming after this message
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Outcome: u8 {
        const ACK = 1 << 0;
        const NACK = 1 << 1;
        const REQUEUE = 1 << 2;
        const EXIT = 1 << 3;
    }
}

impl Outcome {
    pub fn is_nack(self) -> bool {
        self.contains(Outcome::NACK)
    }

    pub fn is_requeue(self) -> bool {
        self.contains(Outcome::REQUEUE)
    }

    pub fn is_exit(self) -> bool {
        self.contains(Outcome::EXIT)
    }
}
