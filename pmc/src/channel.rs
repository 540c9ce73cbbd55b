use crate::queue::{Command, CommandQueue};
use crate::Error;

/// Privileged register access, modeled as a single batched-execute
/// capability so the programming engine can be exercised against a fake
/// implementation that never touches hardware.
pub trait MsrChannel: Sync {
    /// Execute a queue as one atomic batch. Entries are processed in order
    /// until the Stop sentinel; read results come back in the same buffer.
    fn execute(&self, queue: &mut CommandQueue) -> Result<(), Error>;

    fn read_msr(&self, register: u32) -> Result<u64, Error> {
        let mut q = CommandQueue::new();
        q.put(Command::ReadMsr, register, 0)?;
        self.execute(&mut q)?;
        Ok(q.commands()[0].value())
    }

    fn write_msr(&self, register: u32, value: u64) -> Result<(), Error> {
        let mut q = CommandQueue::new();
        q.put(Command::WriteMsr, register, value)?;
        self.execute(&mut q)
    }

    fn read_cr(&self, register: u32) -> Result<u64, Error> {
        if register != 0 && register != 4 {
            return Err(Error::InvalidControlRegister(register));
        }
        let mut q = CommandQueue::new();
        q.put(Command::ReadCr, register, 0)?;
        self.execute(&mut q)?;
        Ok(q.commands()[0].value())
    }

    fn write_cr(&self, register: u32, value: u64) -> Result<(), Error> {
        if register != 0 && register != 4 {
            return Err(Error::InvalidControlRegister(register));
        }
        let mut q = CommandQueue::new();
        q.put(Command::WriteCr, register, value)?;
        self.execute(&mut q)
    }
}

#[cfg(target_os = "linux")]
pub use dev::DevMsrChannel;

#[cfg(target_os = "linux")]
mod dev {
    use super::*;

    pub const DEVICE_PATH: &str = "/dev/MSRdrv";

    // _IO(222, 1), matching the driver's device major number
    const IOCTL_PROCESS_LIST: libc::c_ulong = 0xDE01;

    /// Channel backed by the MSR driver device node.
    pub struct DevMsrChannel {
        fd: libc::c_int,
    }

    impl DevMsrChannel {
        pub fn open() -> Result<DevMsrChannel, Error> {
            let fd = unsafe { libc::open(c"/dev/MSRdrv".as_ptr(), libc::O_RDONLY) };
            if fd < 0 {
                return Err(Error::ChannelOpen {
                    device: DEVICE_PATH,
                });
            }
            Ok(DevMsrChannel { fd })
        }
    }

    impl MsrChannel for DevMsrChannel {
        fn execute(&self, queue: &mut CommandQueue) -> Result<(), Error> {
            if queue.is_empty() {
                return Ok(());
            }
            // the driver walks the buffer in place until the Stop sentinel
            let status = unsafe {
                libc::ioctl(
                    self.fd,
                    IOCTL_PROCESS_LIST,
                    queue.buffer_mut().as_mut_ptr(),
                )
            };
            if status < 0 {
                return Err(Error::ChannelStatus { status });
            }
            Ok(())
        }
    }

    impl Drop for DevMsrChannel {
        fn drop(&mut self) {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct LoopbackChannel {
        msr_value: Mutex<u64>,
    }

    impl MsrChannel for LoopbackChannel {
        fn execute(&self, queue: &mut CommandQueue) -> Result<(), Error> {
            let mut stored = self.msr_value.lock().unwrap();
            for r in queue.commands_mut() {
                match r.command {
                    Command::Stop => break,
                    Command::ReadMsr => {
                        let v = *stored;
                        r.set_value(v);
                    }
                    Command::WriteMsr => *stored = r.value(),
                    _ => {}
                }
            }
            Ok(())
        }
    }

    #[test]
    fn single_record_helpers_round_through_execute() {
        let channel = LoopbackChannel {
            msr_value: Mutex::new(0),
        };
        channel.write_msr(0x186, 0x4100C0).unwrap();
        assert_eq!(channel.read_msr(0x186).unwrap(), 0x4100C0);
    }

    #[test]
    fn only_cr0_and_cr4_are_accessible() {
        let channel = LoopbackChannel {
            msr_value: Mutex::new(0),
        };
        assert_eq!(
            channel.read_cr(2),
            Err(Error::InvalidControlRegister(2))
        );
        assert_eq!(
            channel.write_cr(3, 0),
            Err(Error::InvalidControlRegister(3))
        );
        assert!(channel.read_cr(0).is_ok());
    }
}
