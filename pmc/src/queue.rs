use std::fmt;

use crate::Error;

/// Maximum number of commands per batch; one extra slot always holds the
/// Stop sentinel.
pub const MAX_QUE_ENTRIES: usize = 32;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ignore = 0,
    Stop = 1,
    ReadMsr = 2,
    WriteMsr = 3,
    ReadCr = 4,
    WriteCr = 5,
    EnablePmc = 6,
    DisablePmc = 7,
    GetProcessor = 8,
    SetProcessor = 9,
}

/// One register operation in the wire format shared with the driver:
/// command tag, register number, and a 64-bit value as two 32-bit halves.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MsrRequest {
    pub command: Command,
    pub register_number: u32,
    val: [u32; 2],
}

impl MsrRequest {
    pub const STOP: MsrRequest = MsrRequest::new(Command::Stop, 0, 0);

    pub const fn new(command: Command, register_number: u32, value: u64) -> MsrRequest {
        MsrRequest {
            command,
            register_number,
            val: [value as u32, (value >> 32) as u32],
        }
    }

    pub fn value(&self) -> u64 {
        self.val[0] as u64 | (self.val[1] as u64) << 32
    }

    pub fn set_value(&mut self, value: u64) {
        self.val = [value as u32, (value >> 32) as u32];
    }
}

/// Fixed-capacity command sequence, always closed by a Stop sentinel.
pub struct CommandQueue {
    entries: [MsrRequest; MAX_QUE_ENTRIES + 1],
    len: usize,
}

impl Default for CommandQueue {
    fn default() -> CommandQueue {
        CommandQueue::new()
    }
}

impl CommandQueue {
    pub fn new() -> CommandQueue {
        CommandQueue {
            entries: [MsrRequest::STOP; MAX_QUE_ENTRIES + 1],
            len: 0,
        }
    }

    /// Append a command. Fails with [`Error::QueueFull`] once all
    /// MAX_QUE_ENTRIES data slots are taken; the sentinel slot is never
    /// handed out.
    pub fn put(&mut self, command: Command, register_number: u32, value: u64) -> Result<(), Error> {
        if self.len >= MAX_QUE_ENTRIES {
            return Err(Error::QueueFull);
        }
        self.entries[self.len] = MsrRequest::new(command, register_number, value);
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn commands(&self) -> &[MsrRequest] {
        &self.entries[..self.len]
    }

    pub fn commands_mut(&mut self) -> &mut [MsrRequest] {
        &mut self.entries[..self.len]
    }

    /// Full buffer including the trailing Stop slots, used as the in/out
    /// area of a driver batch.
    pub(crate) fn buffer_mut(&mut self) -> &mut [MsrRequest; MAX_QUE_ENTRIES + 1] {
        &mut self.entries
    }
}

impl fmt::Display for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.commands().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match r.command {
                Command::Ignore => write!(f, "ignore")?,
                Command::Stop => write!(f, "stop")?,
                Command::ReadMsr => write!(f, "rdmsr {:#x}", r.register_number)?,
                Command::WriteMsr => {
                    write!(f, "wrmsr {:#x} <- {:#x}", r.register_number, r.value())?
                }
                Command::ReadCr => write!(f, "rdcr {}", r.register_number)?,
                Command::WriteCr => write!(f, "wrcr {} <- {:#x}", r.register_number, r.value())?,
                Command::EnablePmc => write!(f, "enable_rdpmc")?,
                Command::DisablePmc => write!(f, "disable_rdpmc")?,
                Command::GetProcessor => write!(f, "get_processor")?,
                Command::SetProcessor => write!(f, "set_processor {}", r.value())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_queue_is_empty_with_stop_in_every_slot() {
        let mut q = CommandQueue::new();
        assert_eq!(q.len(), 0);
        assert!(q.is_empty());
        assert!(q
            .buffer_mut()
            .iter()
            .all(|r| r.command == Command::Stop));
    }

    #[test]
    fn put_fails_past_capacity_with_distinct_error() {
        let mut q = CommandQueue::new();
        for i in 0..MAX_QUE_ENTRIES {
            q.put(Command::WriteMsr, i as u32, 0).unwrap();
        }
        assert_eq!(q.len(), MAX_QUE_ENTRIES);
        assert_eq!(
            q.put(Command::WriteMsr, 0, 0),
            Err(Error::QueueFull)
        );
        assert_eq!(q.len(), MAX_QUE_ENTRIES);
    }

    #[test]
    fn queue_stays_closed_by_stop_sentinel() {
        let mut q = CommandQueue::new();
        q.put(Command::SetProcessor, 0, 2).unwrap();
        q.put(Command::WriteMsr, 0x186, 0x4100C0).unwrap();
        assert_eq!(q.buffer_mut()[2].command, Command::Stop);
    }

    #[test]
    fn value_splits_into_halves() {
        let mut r = MsrRequest::new(Command::WriteMsr, 0x38F, 0x0000_0007_0000_0003);
        assert_eq!(r.value(), 0x0000_0007_0000_0003);
        r.set_value(u64::MAX);
        assert_eq!(r.value(), u64::MAX);
    }

    #[test]
    fn display_formats_each_entry() {
        let mut q = CommandQueue::new();
        q.put(Command::SetProcessor, 0, 3).unwrap();
        q.put(Command::EnablePmc, 0, 0).unwrap();
        q.put(Command::WriteMsr, 0xC1, 0).unwrap();
        assert_eq!(
            q.to_string(),
            "set_processor 3\nenable_rdpmc\nwrmsr 0xc1 <- 0x0"
        );
    }
}
