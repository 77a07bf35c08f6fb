//! Scheduler
//!
//! Holds the ready queue and the running thread ID, and applies the
//! round-robin selection policies. The running thread sits at the head of
//! the queue in steady state; every policy returns the new head, which the
//! dispatcher compares against the outgoing thread to decide whether a
//! context switch is due.

use crate::sched::ReadyQueue;
use crate::Tid;

pub struct Scheduler {
    ready: ReadyQueue,
    running: Tid,
}

impl Scheduler {
    /// A scheduler with the main thread queued and running.
    pub fn new() -> Self {
        let mut ready = ReadyQueue::new();
        ready.push(0);
        Self { ready, running: 0 }
    }

    pub fn running(&self) -> Tid {
        self.running
    }

    /// Record the dispatcher's choice.
    pub fn set_running(&mut self, tid: Tid) {
        self.running = tid;
    }

    /// Admit a thread at the tail (spawned, resumed, or woken).
    pub fn admit(&mut self, tid: Tid) {
        self.ready.push(tid);
    }

    pub fn is_ready(&self, tid: Tid) -> bool {
        self.ready.contains(tid)
    }

    /// Quantum expiry: rotate the head to the tail; the new head runs. With
    /// a single runnable thread the rotation is the identity and the same
    /// thread continues into a fresh quantum.
    pub fn next_after_timeout(&mut self) -> Tid {
        self.ready.rotate();
        self.head()
    }

    /// Termination of `tid`: drop it; the head runs. On self-termination the
    /// head is by construction a different thread.
    pub fn next_after_termination(&mut self, tid: Tid) -> Tid {
        self.ready.remove(tid);
        self.head()
    }

    /// Block of `tid`: drop it; the head runs. Blocking a thread that was
    /// not running leaves the head (and thus the runner) unchanged.
    pub fn next_after_block(&mut self, tid: Tid) -> Tid {
        self.ready.remove(tid);
        self.head()
    }

    /// Sleep of the running thread: identical to a self-block.
    pub fn next_after_sleep(&mut self) -> Tid {
        let running = self.running;
        self.next_after_block(running)
    }

    fn head(&self) -> Tid {
        // The main thread can be neither blocked nor put to sleep, so the
        // queue is never empty.
        self.ready
            .head()
            .expect("ready queue can never be empty: the main thread is always schedulable")
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler_with(tids: &[Tid]) -> Scheduler {
        let mut sched = Scheduler::new();
        for &tid in tids {
            sched.admit(tid);
        }
        sched
    }

    #[test]
    fn starts_with_main_running() {
        let sched = Scheduler::new();
        assert_eq!(sched.running(), 0);
        assert!(sched.is_ready(0));
    }

    #[test]
    fn timeout_rotates_round_robin() {
        let mut sched = scheduler_with(&[1, 2]);
        assert_eq!(sched.next_after_timeout(), 1);
        sched.set_running(1);
        assert_eq!(sched.next_after_timeout(), 2);
        sched.set_running(2);
        assert_eq!(sched.next_after_timeout(), 0);
    }

    #[test]
    fn timeout_with_single_thread_keeps_it() {
        let mut sched = Scheduler::new();
        assert_eq!(sched.next_after_timeout(), 0);
    }

    #[test]
    fn self_termination_selects_next_head() {
        let mut sched = scheduler_with(&[1, 2]);
        // thread 0 terminates itself
        assert_eq!(sched.next_after_termination(0), 1);
        assert!(!sched.is_ready(0));
    }

    #[test]
    fn terminating_a_ready_thread_keeps_the_runner() {
        let mut sched = scheduler_with(&[1, 2]);
        assert_eq!(sched.next_after_termination(2), 0);
        assert_eq!(sched.running(), 0);
    }

    #[test]
    fn blocking_the_runner_hands_off() {
        let mut sched = scheduler_with(&[1]);
        assert_eq!(sched.next_after_block(0), 1);
    }

    #[test]
    fn sleep_is_a_self_block() {
        let mut sched = scheduler_with(&[3]);
        assert_eq!(sched.next_after_sleep(), 3);
        assert!(!sched.is_ready(0));
    }
}
