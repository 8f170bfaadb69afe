pub mod io;

/// Parks the CPU forever.
///
/// Interrupts stay disabled during early boot, so each `hlt` only returns on an NMI or SMI and
/// the loop puts the core straight back to sleep.
#[cfg(target_arch = "x86_64")]
pub fn halt_loop() -> ! {
    loop {
        ::x86_64::instructions::hlt();
    }
}
