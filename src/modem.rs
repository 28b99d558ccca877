// Telenode — LoRa Modem AT Session
//
// Protocol side of the UART modem, kept free of I/O so it runs on a host:
//   AT\r              → +OK           (probe, repeated until answered)
//   AT+UTX <n>\r<n B> → +OK | +ERR=…  (unconfirmed uplink)
//   +EVENT=0,0                        (modem rebooted → probe again)
//
// The driver feeds received bytes and the current uptime; whenever a method
// returns `true` it must write a fresh probe.  An uplink that is never
// answered times out into an error and a new probe.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::MODEM_LINE_MAX;
use crate::events::TransportEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemState {
    Probing,
    Idle,
    Sending,
}

pub struct ModemSession {
    state: ModemState,
    probe_retry: Duration,
    send_timeout: Duration,
    /// Uptime of the last probe or uplink command.
    last_command: Duration,
    line: Vec<u8>,
    events: VecDeque<TransportEvent>,
}

impl ModemSession {
    pub fn new(probe_retry: Duration, send_timeout: Duration) -> Self {
        Self {
            state: ModemState::Probing,
            probe_retry,
            send_timeout,
            last_command: Duration::ZERO,
            line: Vec::with_capacity(MODEM_LINE_MAX),
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> ModemState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ModemState::Idle
    }

    pub fn probe_sent(&mut self, now: Duration) {
        self.state = ModemState::Probing;
        self.last_command = now;
    }

    pub fn uplink_sent(&mut self, now: Duration) {
        self.state = ModemState::Sending;
        self.last_command = now;
        self.events.push_back(TransportEvent::SendStarted);
    }

    /// Consume received bytes.  Returns `true` if a probe must be written.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        let mut reprobe = false;
        for &b in bytes {
            if b == b'\r' || b == b'\n' {
                if !self.line.is_empty() {
                    let line = String::from_utf8_lossy(&self.line).into_owned();
                    self.line.clear();
                    reprobe |= self.on_line(line.trim());
                }
            } else if self.line.len() < MODEM_LINE_MAX {
                self.line.push(b);
            }
        }
        reprobe
    }

    /// Check the timers.  Returns `true` if a probe must be written.
    pub fn tick(&mut self, now: Duration) -> bool {
        let waited = now.saturating_sub(self.last_command);
        match self.state {
            ModemState::Probing if waited >= self.probe_retry => {
                self.last_command = now;
                true
            }
            ModemState::Sending if waited >= self.send_timeout => {
                log::warn!("Uplink unanswered after {:?}, re-probing modem", waited);
                self.events.push_back(TransportEvent::Error);
                self.state = ModemState::Probing;
                self.last_command = now;
                true
            }
            _ => false,
        }
    }

    pub fn pop_event(&mut self) -> Option<TransportEvent> {
        self.events.pop_front()
    }

    fn on_line(&mut self, line: &str) -> bool {
        log::debug!("Modem: {}", line);

        if line.starts_with("+EVENT=0") {
            log::warn!("Modem rebooted");
            if self.state == ModemState::Sending {
                self.events.push_back(TransportEvent::Error);
            }
            self.state = ModemState::Probing;
            return true;
        }

        match (self.state, line.starts_with("+OK"), line.starts_with("+ERR")) {
            (ModemState::Probing, true, _) => {
                self.state = ModemState::Idle;
                self.events.push_back(TransportEvent::Ready);
            }
            (ModemState::Sending, true, _) => {
                self.state = ModemState::Idle;
                self.events.push_back(TransportEvent::SendDone);
            }
            (ModemState::Sending, _, true) => {
                log::warn!("Uplink failed: {}", line);
                self.state = ModemState::Idle;
                self.events.push_back(TransportEvent::Error);
            }
            (_, _, true) => {
                self.events.push_back(TransportEvent::Error);
            }
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn joined() -> ModemSession {
        let mut session = ModemSession::new(ms(1000), ms(20_000));
        session.probe_sent(ms(0));
        assert!(!session.feed(b"+OK\r\n"));
        assert_eq!(session.pop_event(), Some(TransportEvent::Ready));
        session
    }

    #[test]
    fn probe_is_repeated_until_answered() {
        let mut session = ModemSession::new(ms(1000), ms(20_000));
        session.probe_sent(ms(0));
        assert!(!session.tick(ms(999)));
        assert!(session.tick(ms(1000)));
        session.probe_sent(ms(1000));
        assert!(!session.tick(ms(1500)));
        assert!(!session.is_idle());

        session.feed(b"+O");
        assert_eq!(session.pop_event(), None);
        session.feed(b"K\r");
        assert!(session.is_idle());
        assert_eq!(session.pop_event(), Some(TransportEvent::Ready));
    }

    #[test]
    fn uplink_completes_or_fails() {
        let mut session = joined();

        session.uplink_sent(ms(5000));
        assert_eq!(session.pop_event(), Some(TransportEvent::SendStarted));
        session.feed(b"+OK\r\n");
        assert_eq!(session.pop_event(), Some(TransportEvent::SendDone));
        assert!(session.is_idle());

        session.uplink_sent(ms(6000));
        session.feed(b"+ERR=-5\r\n");
        assert_eq!(session.pop_event(), Some(TransportEvent::SendStarted));
        assert_eq!(session.pop_event(), Some(TransportEvent::Error));
        assert!(session.is_idle());
    }

    #[test]
    fn unanswered_uplink_times_out_and_reprobes() {
        let mut session = joined();
        session.uplink_sent(ms(5000));
        session.pop_event();

        assert!(!session.tick(ms(24_999)));
        assert_eq!(session.state(), ModemState::Sending);

        assert!(session.tick(ms(25_000)));
        assert_eq!(session.pop_event(), Some(TransportEvent::Error));
        assert_eq!(session.state(), ModemState::Probing);
        assert!(!session.tick(ms(25_500)));

        session.feed(b"+OK\r\n");
        assert!(session.is_idle());
        assert_eq!(session.pop_event(), Some(TransportEvent::Ready));
    }

    #[test]
    fn reboot_during_uplink_reports_error() {
        let mut session = joined();
        session.uplink_sent(ms(5000));
        session.pop_event();

        assert!(session.feed(b"+EVENT=0,0\r\n"));
        assert_eq!(session.pop_event(), Some(TransportEvent::Error));
        assert!(!session.is_idle());
    }

    #[test]
    fn overlong_line_is_truncated_not_buffered_forever() {
        let mut session = joined();
        let noise = vec![b'x'; MODEM_LINE_MAX * 3];
        session.feed(&noise);
        session.feed(b"\r\n");
        session.uplink_sent(ms(0));
        session.pop_event();
        session.feed(b"+OK\r\n");
        assert_eq!(session.pop_event(), Some(TransportEvent::SendDone));
    }
}
