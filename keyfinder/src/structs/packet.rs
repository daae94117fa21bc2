use crate::process::toolkit::{CompressedPacket, Container};

/// Owns at most one compressed packet together with its consumption cursor.
///
/// The held packet is released before every fetch, when the remainder is discarded
/// and when the handle is dropped. An empty handle is the end-of-stream sentinel and
/// reports a size of 0.
#[derive(Debug)]
pub struct ScopedPacket<P> {
    packet: Option<P>,
    size: usize,
    consumed: usize,
}

impl<P> Default for ScopedPacket<P> {
    fn default() -> Self {
        Self {
            packet: None,
            size: 0,
            consumed: 0,
        }
    }
}

impl<P: CompressedPacket> ScopedPacket<P> {
    /// Reads packets from `container` until one of stream `stream_id` turns up or the
    /// container runs dry. Packets of other streams are released as they are skipped.
    pub fn read<C>(&mut self, container: &mut C, stream_id: u32)
    where
        C: Container<Packet = P> + ?Sized,
    {
        loop {
            self.release();

            match container.read_packet() {
                Some(packet) if packet.stream_id() == stream_id => {
                    self.size = packet.data().len();
                    self.packet = Some(packet);
                    return;
                }
                Some(_) => continue,
                None => return,
            }
        }
    }

    pub fn packet(&self) -> Option<&P> {
        self.packet.as_ref()
    }
}

impl<P> ScopedPacket<P> {
    /// Bytes still to be handed to the decoder are `size - consumed`.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_exhausted(&self) -> bool {
        self.consumed >= self.size
    }

    /// Moves the cursor forward, never past the end of the packet.
    pub fn advance(&mut self, bytes: usize) {
        self.consumed = self.size.min(self.consumed.saturating_add(bytes));
    }

    /// Gives up on the rest of the packet; the next read fetches a fresh one.
    pub fn discard(&mut self) {
        self.size = 0;
        self.consumed = 0;
    }

    fn release(&mut self) {
        self.packet = None;
        self.size = 0;
        self.consumed = 0;
    }
}

impl<P> Drop for ScopedPacket<P> {
    fn drop(&mut self) {
        self.release();
    }
}
