// Telenode — Report Scheduler
//
// WarmingUp ──(warm-up delay)──▶ Sending ──(frame handed over)──▶ Waiting
//                                   ▲  │                            │
//                                   │  └─(not ready: re-poll)       │
//                                   └──────(window / button)────────┘
//
// Every attempt is the `Task::Report` timer firing.  A busy transport only
// re-plans the same attempt after a constant interval; nothing else changes
// until the frame is actually handed over.

use std::time::Duration;

use crate::collaborators::Transport;
use crate::config::NodeConfig;
use crate::events::{ButtonEvent, ReportHeader};
use crate::frame::Frame;
use crate::ingest::Snapshot;
use crate::timer::{Task, TimerQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    WarmingUp,
    Waiting,
    Sending,
}

pub struct ReportScheduler {
    state: SchedulerState,
    header: ReportHeader,
    send_interval: Duration,
    warmup_delay: Duration,
    ready_poll_interval: Duration,
    battery_remeasure_delay: Duration,
    /// Consecutive not-ready polls of the current attempt.
    busy_polls: u32,
}

impl ReportScheduler {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            state: SchedulerState::WarmingUp,
            header: ReportHeader::Boot,
            send_interval: config.send_interval,
            warmup_delay: config.warmup_delay,
            ready_poll_interval: config.ready_poll_interval,
            battery_remeasure_delay: config.battery_remeasure_delay,
            busy_polls: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn header(&self) -> ReportHeader {
        self.header
    }

    /// Plan the boot announcement.
    pub fn start(&mut self, timers: &mut TimerQueue, now: Duration) {
        self.state = SchedulerState::WarmingUp;
        self.header = ReportHeader::Boot;
        timers.plan_relative(Task::Report, now, self.warmup_delay);
    }

    /// Button events preempt the window (and warm-up or a pending poll).
    pub fn on_button(&mut self, event: ButtonEvent, timers: &mut TimerQueue, now: Duration) {
        self.header = match event {
            ButtonEvent::Click => ReportHeader::ButtonClick,
            ButtonEvent::Hold => ReportHeader::ButtonHold,
        };
        log::info!("Priority report requested ({})", self.header);
        timers.plan_now(Task::Report, now);
    }

    /// Send at the next opportunity, keeping the current header.
    pub fn request_send(&mut self, timers: &mut TimerQueue, now: Duration) {
        timers.plan_now(Task::Report, now);
    }

    /// `Task::Report` fired.  Returns the frame if it was handed to the
    /// transport.
    pub fn on_report_task<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        snapshot: &Snapshot,
        timers: &mut TimerQueue,
        now: Duration,
    ) -> Option<Frame> {
        self.state = SchedulerState::Sending;

        if !transport.is_ready() {
            self.retry_later(timers, now);
            return None;
        }

        let frame = Frame::encode(&snapshot.frame_fields(self.header));

        if !transport.send(frame.as_bytes()) {
            log::warn!("Transport rejected the frame, retrying");
            self.retry_later(timers, now);
            return None;
        }

        log::info!("$SEND: {}", frame);

        self.busy_polls = 0;
        self.header = ReportHeader::ScheduledUpdate;
        self.state = SchedulerState::Waiting;
        timers.plan_relative(Task::Report, now, self.send_interval);

        Some(frame)
    }

    /// Transport began transmitting: re-measure the battery under load.
    pub fn on_send_started(&mut self, timers: &mut TimerQueue, now: Duration) {
        timers.plan_relative(Task::BatteryMeasure, now, self.battery_remeasure_delay);
    }

    fn retry_later(&mut self, timers: &mut TimerQueue, now: Duration) {
        self.busy_polls = self.busy_polls.saturating_add(1);
        if self.busy_polls == 1 {
            log::debug!("Transport not ready, polling every {:?}", self.ready_poll_interval);
        }
        timers.plan_relative(Task::Report, now, self.ready_poll_interval);
    }
}
