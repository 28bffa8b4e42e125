//! Re-armable single-shot timers.
//!
//! Arming an armed watchdog restarts its countdown, it never stacks a second expiry.
use embassy_futures::select::{select, Either};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogCommand {
    Arm,
    Disarm,
}

pub struct Watchdog {
    name: &'static str,
    timeout: Duration,
    command: Signal<CriticalSectionRawMutex, WatchdogCommand>,
}

impl Watchdog {
    pub const fn new(name: &'static str, timeout: Duration) -> Self {
        Self {
            name,
            timeout,
            command: Signal::new(),
        }
    }

    pub fn arm(&self) {
        self.command.signal(WatchdogCommand::Arm);
    }

    pub fn disarm(&self) {
        self.command.signal(WatchdogCommand::Disarm);
    }

    /// Calls `on_expire` each time a countdown runs out without being re-armed or disarmed.
    pub async fn run(&self, mut on_expire: impl FnMut()) {
        loop {
            if self.command.wait().await == WatchdogCommand::Disarm {
                continue;
            }

            debug!("[WATCHDOG] {} armed for {}ms", self.name, self.timeout.as_millis());
            loop {
                match select(Timer::after(self.timeout), self.command.wait()).await {
                    Either::First(()) => {
                        debug!("[WATCHDOG] {} expired", self.name);
                        on_expire();
                        break;
                    }
                    Either::Second(WatchdogCommand::Arm) => {
                        trace!("[WATCHDOG] {} re-armed", self.name)
                    }
                    Either::Second(WatchdogCommand::Disarm) => {
                        debug!("[WATCHDOG] {} disarmed", self.name);
                        break;
                    }
                }
            }
        }
    }
}
