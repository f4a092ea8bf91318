use std::time::{Duration, Instant};

/// Logical loops the panel can run. Each slot holds at most one task at a
/// time; scheduling into an occupied slot replaces the previous task, so
/// duplicate overlapping loops cannot exist by construction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slot {
    Firing,
    BurstPause,
    Cooldown,
    TestRamp,
    TestFinish,
    TestHide,
}

impl Slot {
    const ALL: [Slot; 6] = [
        Slot::Firing,
        Slot::BurstPause,
        Slot::Cooldown,
        Slot::TestRamp,
        Slot::TestFinish,
        Slot::TestHide,
    ];

    fn index(self) -> usize {
        match self {
            Slot::Firing => 0,
            Slot::BurstPause => 1,
            Slot::Cooldown => 2,
            Slot::TestRamp => 3,
            Slot::TestFinish => 4,
            Slot::TestHide => 5,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Task {
    due: Instant,
    /// Repeat period; `None` for one-shot tasks.
    period: Option<Duration>,
}

/// Deadline scheduler for the panel's timer-driven loops. All progress is
/// made by the owner polling `pop_due` from its event loop; nothing runs
/// concurrently.
pub struct Scheduler {
    tasks: [Option<Task>; 6],
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { tasks: [None; 6] }
    }

    /// Schedules a one-shot task, replacing any task already in the slot.
    pub fn schedule_once(&mut self, slot: Slot, delay: Duration, now: Instant) {
        self.tasks[slot.index()] = Some(Task {
            due: now + delay,
            period: None,
        });
    }

    /// Schedules a repeating task, replacing any task already in the slot.
    /// The first tick fires one full period from `now`.
    pub fn schedule_repeating(&mut self, slot: Slot, period: Duration, now: Instant) {
        self.tasks[slot.index()] = Some(Task {
            due: now + period,
            period: Some(period),
        });
    }

    /// Cancels the slot's task. Cancelling an empty slot is a no-op.
    pub fn cancel(&mut self, slot: Slot) {
        self.tasks[slot.index()] = None;
    }

    pub fn is_scheduled(&self, slot: Slot) -> bool {
        self.tasks[slot.index()].is_some()
    }

    /// Earliest pending deadline, for sizing event-loop poll timeouts.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().flatten().map(|t| t.due).min()
    }

    /// Pops every slot due at `now`, in slot order. One-shot tasks leave
    /// their slot empty; repeating tasks are re-armed one period ahead.
    /// Each slot fires at most once per call, so a stalled loop cannot
    /// burst-replay missed ticks.
    pub fn pop_due(&mut self, now: Instant) -> Vec<Slot> {
        let mut due = Vec::new();
        for slot in Slot::ALL {
            let index = slot.index();
            let Some(task) = self.tasks[index] else {
                continue;
            };
            if task.due > now {
                continue;
            }
            match task.period {
                Some(period) => {
                    self.tasks[index] = Some(Task {
                        due: now + period,
                        period: Some(period),
                    });
                }
                None => self.tasks[index] = None,
            }
            due.push(slot);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once() {
        let start = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_once(Slot::BurstPause, ms(200), start);
        assert!(sched.pop_due(start + ms(199)).is_empty());
        assert_eq!(sched.pop_due(start + ms(200)), vec![Slot::BurstPause]);
        assert!(!sched.is_scheduled(Slot::BurstPause));
        assert!(sched.pop_due(start + ms(1000)).is_empty());
    }

    #[test]
    fn repeating_rearms() {
        let start = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Slot::Firing, ms(100), start);
        assert_eq!(sched.pop_due(start + ms(100)), vec![Slot::Firing]);
        assert_eq!(sched.pop_due(start + ms(200)), vec![Slot::Firing]);
        assert!(sched.is_scheduled(Slot::Firing));
    }

    #[test]
    fn rescheduling_replaces_prior_task() {
        let start = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Slot::Firing, ms(100), start);
        sched.schedule_repeating(Slot::Firing, ms(500), start);
        assert!(sched.pop_due(start + ms(400)).is_empty());
        assert_eq!(sched.pop_due(start + ms(500)), vec![Slot::Firing]);
        // Only one task can live in the slot, so only one tick fires.
        assert!(sched.pop_due(start + ms(500)).is_empty());
    }

    #[test]
    fn cancel_clears_slot() {
        let start = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Slot::Cooldown, ms(500), start);
        sched.cancel(Slot::Cooldown);
        assert!(!sched.is_scheduled(Slot::Cooldown));
        assert!(sched.pop_due(start + ms(5000)).is_empty());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn next_deadline_is_minimum() {
        let start = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule_once(Slot::TestFinish, ms(3000), start);
        sched.schedule_repeating(Slot::TestRamp, ms(150), start);
        assert_eq!(sched.next_deadline(), Some(start + ms(150)));
    }
}
