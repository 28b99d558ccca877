// Telenode — UART LoRa Modem Transport
//
// Byte pump between UART1 and the AT session.  The modem is assumed to be
// provisioned for ABP already; radio-level retries and duty-cycle limits are
// its business.

use std::time::{Duration, Instant};

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;

use telenode::config::{MODEM_PROBE_RETRY_MS, MODEM_SEND_TIMEOUT_MS};
use telenode::events::TransportEvent;
use telenode::modem::ModemSession;
use telenode::Transport;

pub struct UartModem {
    uart: UartDriver<'static>,
    session: ModemSession,
    started: Instant,
}

impl UartModem {
    pub fn new(uart: UartDriver<'static>) -> anyhow::Result<Self> {
        let mut modem = Self {
            uart,
            session: ModemSession::new(
                Duration::from_millis(MODEM_PROBE_RETRY_MS),
                Duration::from_millis(MODEM_SEND_TIMEOUT_MS),
            ),
            started: Instant::now(),
        };
        modem.probe()?;
        Ok(modem)
    }

    fn probe(&mut self) -> anyhow::Result<()> {
        self.session.probe_sent(self.started.elapsed());
        self.uart.write(b"AT\r")?;
        Ok(())
    }

    /// Pull whatever the modem has sent and advance the session.
    fn service(&mut self) {
        let mut reprobe = false;
        let mut buf = [0u8; 32];
        loop {
            match self.uart.read(&mut buf, NON_BLOCK) {
                Ok(0) => break,
                Ok(n) => reprobe |= self.session.feed(&buf[..n]),
                Err(e) => {
                    log::warn!("Modem UART read error: {}", e);
                    break;
                }
            }
        }

        reprobe |= self.session.tick(self.started.elapsed());
        if reprobe {
            if let Err(e) = self.probe() {
                log::warn!("Modem probe failed: {}", e);
            }
        }
    }
}

impl Transport for UartModem {
    fn is_ready(&self) -> bool {
        self.session.is_idle()
    }

    fn send(&mut self, payload: &[u8]) -> bool {
        if !self.session.is_idle() {
            return false;
        }

        let command = format!("AT+UTX {}\r", payload.len());
        let written = self
            .uart
            .write(command.as_bytes())
            .and_then(|_| self.uart.write(payload));
        if let Err(e) = written {
            log::warn!("Modem UART write error: {}", e);
            return false;
        }

        self.session.uplink_sent(self.started.elapsed());
        true
    }

    fn poll_event(&mut self) -> Option<TransportEvent> {
        self.service();
        self.session.pop_event()
    }
}
