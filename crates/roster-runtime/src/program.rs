#![forbid(unsafe_code)]

//! Elm-style update loop driven by an explicit clock.
//!
//! A [`Model`] reacts to messages by returning a [`Cmd`]. [`Program`] runs
//! those commands: messages are delivered immediately, scheduled messages go
//! into a [`TimerQueue`] and are delivered when [`Program::advance_to`]
//! passes their deadline.
//!
//! Timers are addressed by [`TimerKey`]. Scheduling under a key that already
//! has a pending timer replaces it, so a model can restart a debounce or
//! supersede an in-flight fetch without tracking timer ids itself.
//!
//! # Example
//!
//! ```ignore
//! use roster_runtime::program::{Cmd, Model, Program, TimerKey};
//!
//! const BLINK: TimerKey = TimerKey("blink");
//!
//! struct Blinker { on: bool }
//!
//! impl Model for Blinker {
//!     type Message = ();
//!     fn update(&mut self, _: ()) -> Cmd<()> {
//!         self.on = !self.on;
//!         Cmd::schedule(BLINK, Duration::from_millis(500), ())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::timer::{TimerId, TimerQueue};

/// Application state and behavior.
pub trait Model {
    type Message;

    /// Commands to run when the program starts.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// State transition for one message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Called once when the program shuts down, after every timer is dropped.
    fn teardown(&mut self) {}
}

/// Name of a replaceable timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey(pub &'static str);

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Side effects requested by a model.
#[derive(Default)]
pub enum Cmd<M> {
    /// No operation.
    #[default]
    None,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model.
    Msg(M),
    /// Deliver `msg` after `delay`, replacing any timer pending under `key`.
    Schedule {
        key: TimerKey,
        delay: Duration,
        msg: M,
    },
    /// Drop the timer pending under the key, if any.
    Cancel(TimerKey),
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Schedule { key, delay, msg } => f
                .debug_struct("Schedule")
                .field("key", key)
                .field("delay", delay)
                .field("msg", msg)
                .finish(),
            Self::Cancel(key) => f.debug_tuple("Cancel").field(key).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn schedule(key: TimerKey, delay: Duration, msg: M) -> Self {
        Self::Schedule { key, delay, msg }
    }

    #[inline]
    pub fn cancel(key: TimerKey) -> Self {
        Self::Cancel(key)
    }

    /// Create a batch of commands, flattening the trivial cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|cmd| !matches!(cmd, Self::None))
            .collect();
        if cmds.len() <= 1 {
            return cmds.pop().unwrap_or(Self::None);
        }
        Self::Batch(cmds)
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Schedule { .. } => "Schedule",
            Self::Cancel(_) => "Cancel",
        }
    }
}

/// Record of a command executed by a [`Program`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    Msg,
    Batch(usize),
    Schedule { key: TimerKey, deadline: Instant },
    Cancel { key: TimerKey, was_pending: bool },
    Fired { key: TimerKey, deadline: Instant },
}

/// Deterministic driver for a [`Model`].
pub struct Program<M: Model> {
    model: M,
    now: Instant,
    timers: TimerQueue<(TimerKey, M::Message)>,
    slots: HashMap<TimerKey, TimerId>,
    running: bool,
    record_commands: bool,
    command_log: Vec<CmdRecord>,
}

impl<M: Model> Program<M> {
    /// Wrap `model`, with the clock starting at `now`.
    pub fn new(model: M, now: Instant) -> Self {
        Self {
            model,
            now,
            timers: TimerQueue::new(),
            slots: HashMap::new(),
            running: true,
            record_commands: false,
            command_log: Vec::new(),
        }
    }

    /// Record executed commands into [`Program::command_log`].
    ///
    /// Off by default; the log is unbounded while enabled.
    #[must_use]
    pub fn with_command_log(mut self, enabled: bool) -> Self {
        self.record_commands = enabled;
        self
    }

    /// Run the model's startup commands.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute(cmd);
    }

    /// Deliver `msg` at the current time.
    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute(cmd);
    }

    /// Advance the clock to `now` and deliver `msg`.
    pub fn send_at(&mut self, msg: M::Message, now: Instant) {
        self.advance_to(now);
        self.send(msg);
    }

    /// Fire every timer due at or before `target`, in deadline order, then
    /// set the clock to `target`. Returns the number of timers fired.
    ///
    /// Each timer fires with the clock at its own deadline, so timers it
    /// schedules are relative to that deadline.
    pub fn advance_to(&mut self, target: Instant) -> usize {
        let mut fired = 0;
        while self.running {
            let Some(timer) = self.timers.pop_due(target) else {
                break;
            };
            let (key, msg) = timer.msg;
            if self.slots.get(&key) == Some(&timer.id) {
                self.slots.remove(&key);
            }
            self.now = self.now.max(timer.deadline);
            trace!(%key, "timer fired");
            self.record(CmdRecord::Fired {
                key,
                deadline: timer.deadline,
            });
            fired += 1;
            let cmd = self.model.update(msg);
            self.execute(cmd);
        }
        self.now = self.now.max(target);
        fired
    }

    /// Advance the clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let target = self.now + delta;
        self.advance_to(target)
    }

    /// Fire every remaining timer, however far in the future.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            if !self.running {
                break;
            }
            fired += self.advance_to(deadline);
        }
        fired
    }

    /// Stop the program: pending timers are dropped, the model is torn down,
    /// and later messages are ignored.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        debug!(pending_timers = self.timers.len(), "program shutdown");
        self.timers.clear();
        self.slots.clear();
        self.running = false;
        self.model.teardown();
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a timer is pending under `key`.
    #[must_use]
    pub fn is_scheduled(&self, key: TimerKey) -> bool {
        self.slots.contains_key(&key)
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Commands executed since the log was last cleared. Empty unless
    /// enabled with [`Program::with_command_log`].
    #[must_use]
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn clear_command_log(&mut self) {
        self.command_log.clear();
    }

    fn record(&mut self, record: CmdRecord) {
        if self.record_commands {
            self.command_log.push(record);
        }
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) {
        if !self.running {
            return;
        }
        match cmd {
            Cmd::None => {}
            Cmd::Msg(m) => {
                self.record(CmdRecord::Msg);
                let next = self.model.update(m);
                self.execute(next);
            }
            Cmd::Batch(cmds) => {
                self.record(CmdRecord::Batch(cmds.len()));
                for cmd in cmds {
                    self.execute(cmd);
                }
            }
            Cmd::Schedule { key, delay, msg } => {
                let replaced = self
                    .slots
                    .remove(&key)
                    .and_then(|previous| self.timers.cancel(previous))
                    .is_some();
                if replaced {
                    trace!(%key, "timer replaced");
                }
                let deadline = self.now + delay;
                let id = self.timers.schedule_at(deadline, (key, msg));
                self.slots.insert(key, id);
                trace!(%key, delay_ms = delay.as_millis() as u64, "timer scheduled");
                self.record(CmdRecord::Schedule { key, deadline });
            }
            Cmd::Cancel(key) => {
                let was_pending = self
                    .slots
                    .remove(&key)
                    .and_then(|id| self.timers.cancel(id))
                    .is_some();
                if was_pending {
                    trace!(%key, "timer cancelled");
                }
                self.record(CmdRecord::Cancel { key, was_pending });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING: TimerKey = TimerKey("ping");
    const OTHER: TimerKey = TimerKey("other");

    #[derive(Debug, Clone, PartialEq)]
    enum TestMsg {
        Add(i32),
        Later(i32, u64),
        Stop,
        Chain,
    }

    #[derive(Default)]
    struct Counter {
        value: i32,
        torn_down: bool,
        init_ran: bool,
    }

    impl Model for Counter {
        type Message = TestMsg;

        fn init(&mut self) -> Cmd<TestMsg> {
            self.init_ran = true;
            Cmd::none()
        }

        fn update(&mut self, msg: TestMsg) -> Cmd<TestMsg> {
            match msg {
                TestMsg::Add(n) => {
                    self.value += n;
                    Cmd::none()
                }
                TestMsg::Later(n, ms) => {
                    Cmd::schedule(PING, Duration::from_millis(ms), TestMsg::Add(n))
                }
                TestMsg::Stop => Cmd::cancel(PING),
                TestMsg::Chain => Cmd::batch(vec![
                    Cmd::msg(TestMsg::Add(1)),
                    Cmd::schedule(OTHER, Duration::from_millis(10), TestMsg::Add(100)),
                ]),
            }
        }

        fn teardown(&mut self) {
            self.torn_down = true;
        }
    }

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn batch_flattens_trivial_cases() {
        let cmd: Cmd<TestMsg> = Cmd::batch(vec![]);
        assert!(matches!(cmd, Cmd::None));
        let cmd: Cmd<TestMsg> = Cmd::batch(vec![Cmd::none(), Cmd::msg(TestMsg::Stop)]);
        assert!(matches!(cmd, Cmd::Msg(TestMsg::Stop)));
        let cmd: Cmd<TestMsg> = Cmd::batch(vec![Cmd::msg(TestMsg::Stop), Cmd::cancel(PING)]);
        assert_eq!(cmd.type_name(), "Batch");
    }

    #[test]
    fn messages_apply_immediately() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0);
        program.init();
        assert!(program.model().init_ran);
        program.send(TestMsg::Add(2));
        program.send(TestMsg::Add(3));
        assert_eq!(program.model().value, 5);
    }

    #[test]
    fn scheduled_message_waits_for_deadline() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0);
        program.send(TestMsg::Later(7, 250));
        assert!(program.is_scheduled(PING));
        assert_eq!(program.advance_to(at(t0, 249)), 0);
        assert_eq!(program.model().value, 0);
        assert_eq!(program.advance_to(at(t0, 250)), 1);
        assert_eq!(program.model().value, 7);
        assert!(!program.is_scheduled(PING));
    }

    #[test]
    fn rescheduling_a_key_replaces_the_timer() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0);
        program.send_at(TestMsg::Later(1, 250), at(t0, 0));
        program.send_at(TestMsg::Later(2, 250), at(t0, 100));
        program.send_at(TestMsg::Later(3, 250), at(t0, 150));
        assert_eq!(program.pending_timers(), 1);
        assert_eq!(program.next_deadline(), Some(at(t0, 400)));

        assert_eq!(program.advance_to(at(t0, 399)), 0);
        assert_eq!(program.advance_to(at(t0, 400)), 1);
        assert_eq!(program.model().value, 3);
    }

    #[test]
    fn cancel_prevents_delivery() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0).with_command_log(true);
        program.send(TestMsg::Later(9, 50));
        program.send(TestMsg::Stop);
        assert_eq!(program.run_until_idle(), 0);
        assert_eq!(program.model().value, 0);
        assert!(program.command_log().contains(&CmdRecord::Cancel {
            key: PING,
            was_pending: true
        }));
    }

    #[test]
    fn batch_runs_in_order_and_logs() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0).with_command_log(true);
        program.send(TestMsg::Chain);
        assert_eq!(program.model().value, 1);
        program.advance_by(Duration::from_millis(10));
        assert_eq!(program.model().value, 101);
        let log = program.command_log();
        assert_eq!(log[0], CmdRecord::Batch(2));
        assert_eq!(log[1], CmdRecord::Msg);
        assert!(matches!(log[2], CmdRecord::Schedule { key: OTHER, .. }));
        assert!(matches!(log[3], CmdRecord::Fired { key: OTHER, .. }));
    }

    #[test]
    fn command_log_is_off_by_default() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0);
        for i in 0..10_000 {
            program.send(TestMsg::Later(1, 250));
            program.send(TestMsg::Chain);
            if i % 100 == 0 {
                program.advance_by(Duration::from_millis(300));
            }
        }
        program.run_until_idle();
        assert!(program.command_log().is_empty());
    }

    #[test]
    fn clock_only_moves_forward() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), at(t0, 100));
        program.advance_to(t0);
        assert_eq!(program.now(), at(t0, 100));
    }

    #[test]
    fn shutdown_drops_timers_and_ignores_messages() {
        let t0 = Instant::now();
        let mut program = Program::new(Counter::default(), t0);
        program.send(TestMsg::Later(5, 10));
        program.shutdown();
        assert!(program.model().torn_down);
        assert!(!program.is_running());
        assert_eq!(program.pending_timers(), 0);

        program.send(TestMsg::Add(1));
        assert_eq!(program.advance_to(at(t0, 1000)), 0);
        assert_eq!(program.model().value, 0);
    }
}
