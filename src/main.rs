// Telenode — Firmware Entry Point
//
// Start-up:
//   1. Initialise logging and the collaborators for the target (board drivers
//      on ESP-IDF, the simulator on a host).
//   2. Build the node: LED on, sensors measured immediately, battery after
//      ~2 s, boot report after the warm-up delay.
//   3. Run the cooperative loop forever: poll inputs, dispatch, idle until
//      the next deadline (at most one input poll interval).
//
// The AT console is read from stdin by a helper thread that only forwards
// lines; all node state stays on the main thread.

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod input;
#[cfg(not(target_os = "espidf"))]
mod sim;

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use telenode::config::LOOP_POLL_INTERVAL_MS;

const STACK_CONSOLE: usize = 4096;

/// Forward stdin lines to the main loop.
fn spawn_console() -> anyhow::Result<Receiver<String>> {
    let (line_tx, line_rx) = mpsc::channel();
    thread::Builder::new()
        .name("console".into())
        .stack_size(STACK_CONSOLE)
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
            log::debug!("Console input closed");
        })?;
    Ok(line_rx)
}

/// Sleep until `next_deadline`, capped at the input poll interval.
fn idle(next_deadline: Option<Duration>, now: Duration) {
    let cap = Duration::from_millis(LOOP_POLL_INTERVAL_MS);
    let wait = next_deadline
        .map(|at| at.saturating_sub(now))
        .unwrap_or(cap)
        .min(cap);
    if !wait.is_zero() {
        thread::sleep(wait);
    }
}

// ---------------------------------------------------------------------------
// ESP-IDF firmware
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::Mutex;
    use std::time::Instant;

    use esp_idf_hal::gpio::{AnyIOPin, InputPin, OutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::uart::{self, UartDriver};

    use telenode::config::MODEM_BAUDRATE;
    use telenode::events::NodeEvent;
    use telenode::{ClassifierConfig, Node, NodeConfig};

    use crate::drivers::battery::BatteryMonitor;
    use crate::drivers::led::StatusLed;
    use crate::drivers::lis2dh12::Lis2dh12;
    use crate::drivers::modem::UartModem;
    use crate::drivers::tmp112::Tmp112;
    use crate::drivers::{Board, SharedBus};
    use crate::input::ButtonInput;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Telenode firmware starting…");

    let boot = Instant::now();
    let peripherals = Peripherals::take()?;

    // ---- I2C bus (shared between TMP112 and LIS2DH12) ---------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c: I2cDriver<'static> = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

    let thermometer = Tmp112::new(i2c_bus);
    if let Err(e) = thermometer.init() {
        log::error!("TMP112 init failed: {}", e);
    }
    let accelerometer = Lis2dh12::new(i2c_bus);
    if let Err(e) = accelerometer.init() {
        log::error!("LIS2DH12 init failed: {}", e);
    }
    let battery = BatteryMonitor::new()?;
    let board = Board::new(thermometer, accelerometer, battery);

    // ---- LED + button -----------------------------------------------------
    let led = StatusLed::new(PinDriver::output(peripherals.pins.gpio5.downgrade_output())?);
    let mut button = ButtonInput::new(PinDriver::input(peripherals.pins.gpio3.downgrade_input())?);

    // ---- LoRa modem on UART1 ----------------------------------------------
    let uart_config = uart::config::Config::new().baudrate(Hertz(MODEM_BAUDRATE));
    let uart: UartDriver<'static> = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio21, // TX
        peripherals.pins.gpio20, // RX
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let modem = UartModem::new(uart)?;

    let mut node = Node::new(
        NodeConfig::default(),
        ClassifierConfig::default(),
        board,
        modem,
        led,
        boot.elapsed(),
    )?;

    let console = spawn_console()?;
    log::info!("Boot complete — entering normal operation");

    loop {
        let now = boot.elapsed();

        if let Some(event) = button.update() {
            node.post(NodeEvent::Button(event));
        }
        while let Ok(line) = console.try_recv() {
            for reply in node.console_line(&line, now) {
                println!("{}", reply);
            }
        }

        node.poll(now);
        for line in node.take_console_output() {
            println!("{}", line);
        }
        node.indicator_mut().tick(now);

        idle(node.next_deadline(), boot.elapsed());
    }
}

// ---------------------------------------------------------------------------
// Host simulator
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    use telenode::events::{ButtonEvent, NodeEvent, Vector3};
    use telenode::{ClassifierConfig, Node, NodeConfig};

    use crate::sim::{SimClock, SimLed, SimRadio, SimSensors};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional time-scale factor: `telenode 60` runs an hourly window per minute.
    let scale: u32 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("invalid time scale {:?}", arg))?,
        None => 1,
    };

    let clock = SimClock::new(scale);
    let config = NodeConfig::default().scaled(scale);
    log::info!("Telenode simulator starting (time scale ×{})", scale);

    let mut node = Node::new(
        config,
        ClassifierConfig::default(),
        SimSensors::new(clock),
        SimRadio::new(clock),
        SimLed::default(),
        clock.uptime(),
    )?;

    let console = spawn_console()?;
    log::info!("Console: AT commands, `click`, `hold`, `tilt <x> <y> <z>`, `drop`, `quit`");

    loop {
        let now = clock.uptime();

        while let Ok(line) = console.try_recv() {
            let mut words = line.split_whitespace();
            match words.next() {
                None => {}
                Some("quit") | Some("exit") => return Ok(()),
                Some("click") => node.post(NodeEvent::Button(ButtonEvent::Click)),
                Some("hold") => node.post(NodeEvent::Button(ButtonEvent::Hold)),
                Some("drop") => node.transport_mut().fail_next(),
                Some("tilt") => {
                    let axes: Result<Vec<f32>, _> = words.map(str::parse).collect();
                    match axes.as_deref() {
                        Ok([x, y, z]) => node.sensors_mut().set_gravity(Vector3::new(*x, *y, *z)),
                        _ => println!("usage: tilt <x> <y> <z>"),
                    }
                }
                Some(_) => {
                    for reply in node.console_line(&line, now) {
                        println!("{}", reply);
                    }
                }
            }
        }

        let transmitting = node.transport().is_transmitting();
        node.sensors_mut().set_under_load(transmitting);
        node.poll(now);
        for line in node.take_console_output() {
            println!("{}", line);
        }

        idle(node.next_deadline(), clock.uptime());
    }
}
