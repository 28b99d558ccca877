// Telenode — Node context & dispatcher
//
// Owns every piece of mutable state and runs it from one cooperative loop:
// queued events first, then due timer tasks, then the events those tasks
// raised.  Callers post input events and call `poll` with the current
// uptime; nothing here blocks or runs concurrently.

use std::collections::VecDeque;
use std::time::Duration;

use crate::collaborators::{Indicator, Sensors, Transport};
use crate::config::{ClassifierConfig, ConfigError, NodeConfig};
use crate::console::{self, Command};
use crate::events::{LedMode, NodeEvent, ReportHeader, SensorKind, TransportEvent};
use crate::frame::Frame;
use crate::ingest::{Aggregates, Snapshot};
use crate::scheduler::{ReportScheduler, SchedulerState};
use crate::timer::{Task, TimerQueue};

pub struct Node<S, T, I> {
    sensors: S,
    transport: T,
    indicator: I,
    config: NodeConfig,
    aggregates: Aggregates,
    scheduler: ReportScheduler,
    timers: TimerQueue,
    queue: VecDeque<NodeEvent>,
    last_frame: Option<Frame>,
    frames_sent: u32,
    battery_failures: u32,
    console_out: VecDeque<String>,
}

impl<S: Sensors, T: Transport, I: Indicator> Node<S, T, I> {
    pub fn new(
        config: NodeConfig,
        classifier: ClassifierConfig,
        sensors: S,
        transport: T,
        mut indicator: I,
        now: Duration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        indicator.set_mode(LedMode::On);

        let mut timers = TimerQueue::new();
        let mut scheduler = ReportScheduler::new(&config);
        scheduler.start(&mut timers, now);
        timers.plan_now(Task::SensorMeasure, now);
        timers.plan_relative(Task::BatteryMeasure, now, config.battery_first_measure);

        log::info!(
            "Node started: window {:?}, measure every {:?}, first report in {:?}",
            config.send_interval,
            config.measure_interval,
            config.warmup_delay
        );

        Ok(Self {
            sensors,
            transport,
            indicator,
            config,
            aggregates: Aggregates::new(classifier),
            scheduler,
            timers,
            queue: VecDeque::new(),
            last_frame: None,
            frames_sent: 0,
            battery_failures: 0,
            console_out: VecDeque::new(),
        })
    }

    /// Queue an input event for the next `poll`.
    pub fn post(&mut self, event: NodeEvent) {
        self.queue.push_back(event);
    }

    /// One dispatch pass at uptime `now`.  Tasks due when the pass starts
    /// run in it; anything planned during the pass waits for the next one.
    pub fn poll(&mut self, now: Duration) {
        let due = self.timers.take_due(now);

        while let Some(event) = self.transport.poll_event() {
            self.queue.push_back(NodeEvent::Transport(event));
        }
        self.drain_events(now);

        for task in due {
            self.run_task(task, now);
        }
        self.drain_events(now);
    }

    /// When `poll` next has timer work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Run one console line; the reply ends with `OK` or is `ERROR`.
    pub fn console_line(&mut self, line: &str, now: Duration) -> Vec<String> {
        match Command::parse(line) {
            Ok(command) => {
                let mut reply = self.execute(command, now);
                reply.push("OK".to_string());
                reply
            }
            Err(e) => {
                log::warn!("Console: {}", e);
                vec!["ERROR".to_string()]
            }
        }
    }

    /// Unsolicited console lines (send echoes) raised since the last call.
    pub fn take_console_output(&mut self) -> Vec<String> {
        self.console_out.drain(..).collect()
    }

    pub fn execute(&mut self, command: Command, now: Duration) -> Vec<String> {
        match command {
            Command::Ping => Vec::new(),
            Command::Send => {
                self.scheduler.request_send(&mut self.timers, now);
                Vec::new()
            }
            Command::Led(on) => {
                self.indicator.set_mode(if on { LedMode::On } else { LedMode::Off });
                Vec::new()
            }
            Command::Blink => {
                self.indicator.set_mode(LedMode::Blink(console::BLINK_COUNT));
                Vec::new()
            }
            Command::LedRange => vec!["$LED: (0-1)".to_string()],
            Command::Status => console::status_lines(&self.aggregates.snapshot()),
            Command::Clac => console::clac_lines(),
            Command::Help => console::help_lines(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.aggregates.snapshot()
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.aggregates
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn header(&self) -> ReportHeader {
        self.scheduler.header()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    fn drain_events(&mut self, now: Duration) {
        while let Some(event) = self.queue.pop_front() {
            self.handle_event(event, now);
        }
    }

    fn handle_event(&mut self, event: NodeEvent, now: Duration) {
        match event {
            NodeEvent::SensorUpdate(kind) => {
                self.aggregates.on_sensor_update(kind, &self.sensors);
            }

            NodeEvent::Button(button) => {
                self.aggregates.on_button(button);
                self.scheduler.on_button(button, &mut self.timers, now);
            }

            NodeEvent::Transport(signal) => match signal {
                TransportEvent::Error => {
                    log::warn!("Transport error");
                    self.indicator.set_mode(LedMode::BlinkFast);
                }
                TransportEvent::SendStarted => {
                    self.indicator.set_mode(LedMode::On);
                    self.scheduler.on_send_started(&mut self.timers, now);
                }
                TransportEvent::SendDone => {
                    log::debug!("Transmission done");
                    self.indicator.set_mode(LedMode::Off);
                }
                TransportEvent::Ready => {
                    log::info!("Transport ready");
                    self.indicator.set_mode(LedMode::Off);
                }
            },
        }
    }

    fn run_task(&mut self, task: Task, now: Duration) {
        match task {
            Task::Report => {
                let snapshot = self.aggregates.snapshot();
                if let Some(frame) =
                    self.scheduler
                        .on_report_task(&mut self.transport, &snapshot, &mut self.timers, now)
                {
                    self.frames_sent = self.frames_sent.wrapping_add(1);
                    self.console_out.push_back(format!("$SEND: {}", frame));
                    self.last_frame = Some(frame);
                }
            }

            Task::BatteryMeasure => {
                if self.sensors.measure(SensorKind::Battery) {
                    self.battery_failures = 0;
                    self.queue.push_back(NodeEvent::SensorUpdate(SensorKind::Battery));
                } else {
                    self.battery_failures = self.battery_failures.saturating_add(1);
                    if self.battery_failures == 1 {
                        log::warn!(
                            "Battery measurement unavailable, retrying every {:?}",
                            self.config.battery_retry_delay
                        );
                    }
                    self.timers
                        .plan_relative(Task::BatteryMeasure, now, self.config.battery_retry_delay);
                }
            }

            Task::SensorMeasure => {
                for kind in [SensorKind::Thermometer, SensorKind::Accelerometer] {
                    if self.sensors.measure(kind) {
                        self.queue.push_back(NodeEvent::SensorUpdate(kind));
                    } else {
                        log::warn!("{:?} measurement failed", kind);
                    }
                }
                self.timers
                    .plan_relative(Task::SensorMeasure, now, self.config.measure_interval);
            }
        }
    }
}
