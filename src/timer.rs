// Telenode — Task Timer Queue
//
// One pending deadline per task token.  Planning a task overwrites whatever
// was pending for it.  Planning "now" makes the task due on the next dispatch
// pass; nothing ever runs inline from `plan_*`.

use std::time::Duration;

const TASK_COUNT: usize = 3;

/// Tasks the node plans on its timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Build and send the report frame (readiness-polled).
    Report,
    /// Kick a battery voltage measurement.
    BatteryMeasure,
    /// Periodic thermometer + accelerometer measurement.
    SensorMeasure,
}

impl Task {
    pub const ALL: [Task; TASK_COUNT] = [Task::Report, Task::BatteryMeasure, Task::SensorMeasure];

    fn index(self) -> usize {
        match self {
            Task::Report => 0,
            Task::BatteryMeasure => 1,
            Task::SensorMeasure => 2,
        }
    }
}

/// Fixed-size deadline table; times are uptime offsets.
#[derive(Debug, Default)]
pub struct TimerQueue {
    deadlines: [Option<Duration>; TASK_COUNT],
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan_absolute(&mut self, task: Task, at: Duration) {
        self.deadlines[task.index()] = Some(at);
    }

    pub fn plan_relative(&mut self, task: Task, now: Duration, delay: Duration) {
        self.plan_absolute(task, now.saturating_add(delay));
    }

    pub fn plan_now(&mut self, task: Task, now: Duration) {
        self.plan_absolute(task, now);
    }

    pub fn deadline(&self, task: Task) -> Option<Duration> {
        self.deadlines[task.index()]
    }

    /// Earliest pending deadline of any task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Remove and return every task due at `now`, earliest first.
    /// Tasks planned while the caller runs the returned batch wait for the
    /// next call.
    pub fn take_due(&mut self, now: Duration) -> Vec<Task> {
        let mut due: Vec<(Duration, Task)> = Task::ALL
            .iter()
            .filter_map(|&task| match self.deadlines[task.index()] {
                Some(at) if at <= now => Some((at, task)),
                _ => None,
            })
            .collect();
        due.sort_by_key(|(at, _)| *at);

        for (_, task) in &due {
            self.deadlines[task.index()] = None;
        }
        due.into_iter().map(|(_, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn task_fires_once_at_deadline() {
        let mut timers = TimerQueue::new();
        timers.plan_relative(Task::Report, ms(0), ms(100));

        assert!(timers.take_due(ms(99)).is_empty());
        assert_eq!(timers.take_due(ms(100)), vec![Task::Report]);
        assert!(timers.take_due(ms(500)).is_empty());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn replanning_overwrites_pending_deadline() {
        let mut timers = TimerQueue::new();
        timers.plan_relative(Task::Report, ms(0), ms(3_600_000));
        timers.plan_now(Task::Report, ms(10));

        assert_eq!(timers.deadline(Task::Report), Some(ms(10)));
        assert_eq!(timers.take_due(ms(10)), vec![Task::Report]);
        assert!(timers.take_due(ms(3_600_000)).is_empty());
    }

    #[test]
    fn due_tasks_come_out_earliest_first() {
        let mut timers = TimerQueue::new();
        timers.plan_absolute(Task::SensorMeasure, ms(30));
        timers.plan_absolute(Task::Report, ms(20));
        timers.plan_absolute(Task::BatteryMeasure, ms(50));

        assert_eq!(timers.next_deadline(), Some(ms(20)));
        assert_eq!(
            timers.take_due(ms(40)),
            vec![Task::Report, Task::SensorMeasure]
        );
        assert_eq!(timers.next_deadline(), Some(ms(50)));
    }
}
