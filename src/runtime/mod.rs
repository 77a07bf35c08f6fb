//! Process-wide runtime
//!
//! One owner holds everything the two signal handlers and the public
//! operations share: the registry, the scheduler, the sleep queue, both
//! timers, the global quantum counter and the graveyard of a
//! self-terminated thread. It is built by `init`, torn down by
//! `terminate(0)` or a fatal system error, and lives in a static the
//! handlers reach by name.
//!
//! Locking here is belt over the real safety story: callers mask both
//! managed signals before taking the lock, so it is never contended; its
//! job is to keep the single-owner regime explicit. Every hand-off drops
//! the lock (and keeps the mask) before jumping stacks.

use spin::Mutex;

use crate::error::{ThreadError, ThreadResult};
use crate::sched::{Scheduler, SleepQueue};
use crate::signals::{self, Masked};
use crate::switch::{self, Handoff};
use crate::thread::{Registry, Thread};
use crate::time;
use crate::timer::{self, RealTimer, VirtualTimer};
use crate::Tid;

static RUNTIME: Mutex<Option<Runtime>> = Mutex::new(None);

struct Runtime {
    registry: Registry,
    sched: Scheduler,
    sleepers: SleepQueue,
    vtimer: VirtualTimer,
    rtimer: RealTimer,
    /// Total quanta since init, the current one included.
    total_quants: u64,
    /// Record of a thread that terminated itself. Its stack must survive
    /// until the dispatcher has switched away; the next public library call
    /// drops it, by then on another thread's stack. The signal handlers
    /// never free it: releasing memory re-enters the allocator, which is
    /// not async-signal-safe no matter how the library masks its own
    /// critical sections.
    graveyard: Option<Box<Thread>>,
}

impl Runtime {
    fn new(quantum_usecs: u64) -> Self {
        Self {
            registry: Registry::new(),
            sched: Scheduler::new(),
            sleepers: SleepQueue::new(),
            vtimer: VirtualTimer::new(quantum_usecs),
            rtimer: RealTimer::new(),
            total_quants: 1,
            graveyard: None,
        }
    }

    /// Drop a graveyarded record. Called only from library-call context,
    /// never from a handler: the interrupted application code may be inside
    /// the allocator already.
    fn reap(&mut self) {
        self.graveyard = None;
    }

    fn restart_quantum_timer(&self) {
        if self.vtimer.start().is_err() {
            fatal("failed to start the quantum timer");
        }
    }

    fn arm_wake_timer(&self, delay_usecs: u64) {
        if self.rtimer.start(delay_usecs).is_err() {
            fatal("failed to start the wake timer");
        }
    }

    /// Hand the CPU to `to`, bookkeeping done here so the resumed path
    /// re-executes none of it: `to` becomes the running thread and starts a
    /// quantum. A self hand-off only re-arms the quantum timer.
    fn dispatch(&mut self, from: Tid, to: Tid) -> Handoff {
        self.sched.set_running(to);
        self.registry
            .record_mut(to)
            .expect("selected thread is live")
            .bump_quants();

        if from == to {
            self.restart_quantum_timer();
            return Handoff::None;
        }

        log::trace!("switch {} -> {}", from, to);
        let save = self
            .registry
            .record_mut(from)
            .expect("outgoing thread is live")
            .env_ptr();
        let resume = self
            .registry
            .record_mut(to)
            .expect("selected thread is live")
            .env_ptr();
        Handoff::Switch { save, resume }
    }

    fn spawn(&mut self, entry: fn()) -> ThreadResult<Tid> {
        let tid = self.registry.create(entry)?;
        self.sched.admit(tid);
        Ok(tid)
    }

    /// Terminate a worker (`tid != 0`; the main thread tears the library
    /// down instead and never reaches this).
    fn terminate(&mut self, tid: Tid) -> ThreadResult<Handoff> {
        let record = self.registry.kill(tid)?;
        self.sleepers.remove(tid);

        let curr = self.sched.running();
        let next = self.sched.next_after_termination(tid);

        if tid == curr {
            // Self-termination: the record must outlive the jump off its
            // stack; control never returns here.
            self.graveyard = Some(record);
            self.restart_quantum_timer();
            self.total_quants += 1;
            self.sched.set_running(next);
            self.registry
                .record_mut(next)
                .expect("selected thread is live")
                .bump_quants();
            let resume = self
                .registry
                .record_mut(next)
                .expect("selected thread is live")
                .env_ptr();
            return Ok(Handoff::Jump { resume });
        }

        // The dead thread was not running; its stack can go now.
        drop(record);

        if next != curr {
            // The ready head changed under the runner: re-arm and switch,
            // as a fresh quantum begins for the new head.
            self.restart_quantum_timer();
            self.total_quants += 1;
            return Ok(self.dispatch(curr, next));
        }
        Ok(Handoff::None)
    }

    fn block(&mut self, tid: Tid) -> ThreadResult<Handoff> {
        if tid == 0 {
            return Err(ThreadError::MainThreadBlock);
        }
        self.registry.block(tid)?;

        let curr = self.sched.running();
        let next = self.sched.next_after_block(tid);
        if next != curr {
            self.restart_quantum_timer();
            self.total_quants += 1;
            return Ok(self.dispatch(curr, next));
        }
        Ok(Handoff::None)
    }

    fn resume(&mut self, tid: Tid) -> ThreadResult<()> {
        self.registry.unblock(tid)?;
        // A sleeper re-enters the ready queue when its wake time arrives;
        // everyone else goes to the tail now. Admission is idempotent, so
        // resuming a running or ready thread is the documented no-op.
        if !self.registry.is_sleeping(tid)? {
            self.sched.admit(tid);
        }
        Ok(())
    }

    fn sleep_current(&mut self, usecs: u64) -> ThreadResult<Handoff> {
        let curr = self.sched.running();
        if curr == 0 {
            return Err(ThreadError::MainThreadSleep);
        }

        let wake_at = time::wake_at(usecs);
        let old_head = self.sleepers.peek().map(|sleeper| sleeper.tid);
        self.sleepers.insert(curr, wake_at);
        let new_head = self.sleepers.peek().expect("just inserted").tid;

        // Only a new earliest deadline moves the wake timer; later wake-ups
        // are re-armed by the wake handler as heads pop off.
        if old_head != Some(new_head) {
            self.arm_wake_timer(usecs);
        }

        self.registry.sleep(curr)?;
        let next = self.sched.next_after_sleep();

        self.restart_quantum_timer();
        self.total_quants += 1;
        Ok(self.dispatch(curr, next))
    }

    /// Quantum expiry: re-arm, count the new quantum, rotate, switch.
    fn quantum_tick(&mut self) -> Handoff {
        self.restart_quantum_timer();
        self.total_quants += 1;

        let curr = self.sched.running();
        let next = self.sched.next_after_timeout();
        self.dispatch(curr, next)
    }

    /// Wake expiry: reinstate every due sleeper and re-arm for the next
    /// head. Never switches; the next quantum expiry schedules the woken
    /// threads normally.
    fn wake_tick(&mut self) {
        loop {
            let Some(due) = self.sleepers.pop() else { return };

            // A thread terminated while sleeping has no record left; its
            // entry is simply dropped.
            if self.registry.wake(due.tid).is_ok()
                && !self.registry.is_blocked(due.tid).unwrap_or(true)
            {
                self.sched.admit(due.tid);
                log::trace!("thread {} woke", due.tid);
            }

            let Some(head) = self.sleepers.peek() else { return };
            let now = time::now_micros();
            if head.wake_at > now {
                self.arm_wake_timer(head.wake_at - now);
                return;
            }
            // The next head is already due; cascade in this invocation.
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let _ = self.vtimer.stop();
        let _ = self.rtimer.stop();
    }
}

// ---------------------------------------------------------------------------
// Entry points used by the façade and the signal handlers.
// ---------------------------------------------------------------------------

pub(crate) fn init(quantum_usecs: u64) -> ThreadResult<()> {
    let _mask = Masked::new();
    let mut guard = RUNTIME.lock();
    if guard.is_some() {
        return Err(ThreadError::AlreadyInitialized);
    }

    // State first, handlers second, timer last: a quantum signal delivered
    // the instant the mask drops must find a complete scheduler.
    let runtime = Runtime::new(quantum_usecs);
    *guard = Some(runtime);
    signals::install_handlers();
    if guard.as_ref().expect("stored above").vtimer.start().is_err() {
        fatal("failed to start the quantum timer");
    }
    log::debug!("thread library initialized, quantum = {} us", quantum_usecs);
    Ok(())
}

pub(crate) fn spawn(entry: fn()) -> ThreadResult<Tid> {
    let _mask = Masked::new();
    let mut guard = RUNTIME.lock();
    let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
    rt.reap();
    rt.spawn(entry)
}

pub(crate) fn terminate(tid: Tid) -> ThreadResult<()> {
    if tid == 0 {
        return teardown_and_exit();
    }

    let _mask = Masked::new();
    let handoff = {
        let mut guard = RUNTIME.lock();
        let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
        rt.reap();
        rt.terminate(tid)?
    };
    // Self-termination jumps away here and never returns.
    unsafe { switch::perform(handoff) };
    Ok(())
}

pub(crate) fn block(tid: Tid) -> ThreadResult<()> {
    let _mask = Masked::new();
    let handoff = {
        let mut guard = RUNTIME.lock();
        let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
        rt.reap();
        rt.block(tid)?
    };
    // A self-block suspends here until resumed; the mask guard on this
    // frozen frame unmasks when the call finally returns.
    unsafe { switch::perform(handoff) };
    Ok(())
}

pub(crate) fn resume(tid: Tid) -> ThreadResult<()> {
    let _mask = Masked::new();
    let mut guard = RUNTIME.lock();
    let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
    rt.reap();
    rt.resume(tid)
}

pub(crate) fn sleep(usecs: u64) -> ThreadResult<()> {
    let _mask = Masked::new();
    let handoff = {
        let mut guard = RUNTIME.lock();
        let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
        rt.reap();
        rt.sleep_current(usecs)?
    };
    unsafe { switch::perform(handoff) };
    Ok(())
}

pub(crate) fn current_tid() -> Option<Tid> {
    let _mask = Masked::new();
    let guard = RUNTIME.lock();
    guard.as_ref().map(|rt| rt.sched.running())
}

pub(crate) fn total_quantums() -> u64 {
    let _mask = Masked::new();
    let guard = RUNTIME.lock();
    guard.as_ref().map(|rt| rt.total_quants).unwrap_or(0)
}

pub(crate) fn quantums(tid: Tid) -> ThreadResult<u64> {
    let _mask = Masked::new();
    let mut guard = RUNTIME.lock();
    let rt = guard.as_mut().ok_or(ThreadError::NotInitialized)?;
    rt.reap();
    rt.registry.quants(tid)
}

/// Quantum-signal handler body. The handler runs with both managed signals
/// masked via `sa_mask`; no guard is needed.
pub(crate) fn on_quantum_signal() {
    let handoff = {
        let mut guard = RUNTIME.lock();
        match guard.as_mut() {
            Some(rt) => rt.quantum_tick(),
            // Torn down between delivery and dispatch.
            None => return,
        }
    };
    unsafe { switch::perform(handoff) };
}

/// Wake-signal handler body. Reinstates sleepers, never switches.
pub(crate) fn on_wake_signal() {
    let mut guard = RUNTIME.lock();
    if let Some(rt) = guard.as_mut() {
        rt.wake_tick();
    }
}

/// Tear the library down and exit(0): every stack is released except the
/// one this call is executing on (leaked to the process exit, since control
/// never returns to it). Only errors out when there is nothing to tear
/// down.
fn teardown_and_exit() -> ThreadResult<()> {
    let _mask = Masked::new();
    {
        let mut guard = RUNTIME.lock();
        let Some(mut rt) = guard.take() else {
            return Err(ThreadError::NotInitialized);
        };
        let curr = rt.sched.running();
        rt.registry.drain_for_exit(curr);
        // Runtime::drop stops both timers.
    }
    log::debug!("thread library shut down");
    std::process::exit(0);
}

/// Unrecoverable system-call failure: disarm the timers, release what can
/// be released without re-entering a held lock, report and exit(1).
pub(crate) fn fatal(msg: &str) -> ! {
    timer::disarm_all();
    if let Some(mut guard) = RUNTIME.try_lock() {
        if let Some(mut rt) = guard.take() {
            let curr = rt.sched.running();
            rt.registry.drain_for_exit(curr);
        }
    }
    eprintln!("system error: {}", msg);
    std::process::exit(1);
}
