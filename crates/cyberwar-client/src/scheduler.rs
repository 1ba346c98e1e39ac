use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use cyberwar_core::snapshot::Team;

use crate::minigame::session::SessionId;

/// Identifier of a scheduled task, unique for the lifetime of a scheduler.
pub type TaskId = u64;

/// Timers owned by a challenge session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeTimer {
    /// One-second step of the shared countdown.
    Countdown,
    /// Challenge-defined timer, identified by a tag the challenge chose.
    Custom(u32),
}

/// Everything that can fire from the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    ClockTick,
    ShieldTick,
    AnnotationExpiry { team: Team },
    BatteryRestore,
    BatteryFlashEnd,
    Challenge {
        session: SessionId,
        timer: ChallengeTimer,
    },
    FeedbackDone { session: SessionId },
}

#[derive(Debug)]
struct Entry {
    task: TimerTask,
    period_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: TaskId,
    queue: BTreeMap<(u64, TaskId), Entry>,
    deadlines: HashMap<TaskId, u64>,
}

impl Inner {
    fn insert(&mut self, deadline_ms: u64, entry: Entry) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.queue.insert((deadline_ms, id), entry);
        self.deadlines.insert(id, deadline_ms);
        id
    }
}

/// Single-threaded timer queue shared by every component of the client.
///
/// Clones are handles onto the same queue. Nothing fires on its own: the
/// owner drains due tasks with [`Scheduler::pop_due`] and dispatches them.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Inner>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire once at `deadline_ms`.
    pub fn once(&self, deadline_ms: u64, task: TimerTask) -> TaskId {
        self.inner.borrow_mut().insert(
            deadline_ms,
            Entry {
                task,
                period_ms: None,
            },
        )
    }

    /// Schedule `task` to fire at `first_ms` and then every `period_ms`.
    pub fn every(&self, first_ms: u64, period_ms: u64, task: TimerTask) -> TaskId {
        self.inner.borrow_mut().insert(
            first_ms,
            Entry {
                task,
                period_ms: Some(period_ms.max(1)),
            },
        )
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.deadlines.remove(&id) {
            Some(deadline) => inner.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.borrow().deadlines.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.inner
            .borrow()
            .queue
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest task due at `now_ms`.
    ///
    /// Repeating tasks are re-queued at their next period boundary after
    /// `now_ms`; missed periods are skipped rather than replayed.
    pub fn pop_due(&self, now_ms: u64) -> Option<(TaskId, TimerTask)> {
        let mut inner = self.inner.borrow_mut();
        let (deadline, id) = *inner.queue.keys().next()?;
        if deadline > now_ms {
            return None;
        }
        let entry = inner.queue.remove(&(deadline, id))?;
        let task = entry.task;
        match entry.period_ms {
            Some(period) => {
                let behind = (now_ms - deadline) / period + 1;
                let next = deadline + behind * period;
                inner.queue.insert((next, id), entry);
                inner.deadlines.insert(id, next);
            },
            None => {
                inner.deadlines.remove(&id);
            },
        }
        Some((id, task))
    }
}

/// Timers owned by one component. All of them are cancelled on
/// [`TimerSet::cancel_all`] and when the set is dropped.
#[derive(Debug)]
pub struct TimerSet {
    scheduler: Scheduler,
    ids: Vec<TaskId>,
}

impl TimerSet {
    pub fn new(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: scheduler.clone(),
            ids: Vec::new(),
        }
    }

    pub fn once(&mut self, deadline_ms: u64, task: TimerTask) -> TaskId {
        self.prune();
        let id = self.scheduler.once(deadline_ms, task);
        self.ids.push(id);
        id
    }

    pub fn every(&mut self, first_ms: u64, period_ms: u64, task: TimerTask) -> TaskId {
        self.prune();
        let id = self.scheduler.every(first_ms, period_ms, task);
        self.ids.push(id);
        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.ids.retain(|owned| *owned != id);
        self.scheduler.cancel(id)
    }

    pub fn cancel_all(&mut self) {
        for id in self.ids.drain(..) {
            self.scheduler.cancel(id);
        }
    }

    /// Number of owned timers still queued.
    pub fn live(&self) -> usize {
        self.ids
            .iter()
            .filter(|id| self.scheduler.is_pending(**id))
            .count()
    }

    fn prune(&mut self) {
        let scheduler = &self.scheduler;
        self.ids.retain(|id| scheduler.is_pending(*id));
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
