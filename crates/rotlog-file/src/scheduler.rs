//! Wall-clock scheduler driving time based rotation
//!
//! A scheduler owns one background thread. The thread waits on a command
//! channel and, while armed, on an alarm for the next trigger instant. When
//! the alarm goes off the registered callback runs once; the scheduler then
//! stays idle until [`Scheduler::reset`] arms it again.

use chrono::{DateTime, DurationRound, FixedOffset, Local, TimeDelta, Utc};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use rotlog_core::{Error, Result, DAILY_CYCLE_SECS};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::diagnostics::{Diagnostics, FileEvent, TracingDiagnostics};

const MINUTE: Duration = Duration::from_secs(60);

type Callback = Box<dyn FnMut() -> Result<()> + Send + 'static>;

/// One-shot, resettable timer that runs a callback on its own thread
pub struct Scheduler {
    state: Arc<Mutex<TimerState>>,
    commands: Sender<Command>,
}

#[derive(Debug)]
struct TimerState {
    anchor: DateTime<FixedOffset>,
    next_trigger: DateTime<FixedOffset>,
    cycle: Duration,
    cycle_delta: TimeDelta,
    /// Pinned zone; `None` follows the local clock, offset changes included
    zone: Option<FixedOffset>,
    /// Bumped on every arm so alarms from an earlier arm are ignored
    generation: u64,
    armed: bool,
}

enum Command {
    Arm { generation: u64, deadline: Instant },
    Disarm,
    Shutdown,
}

impl Scheduler {
    /// Start a timer that fires `cycle` after the current minute
    ///
    /// Cycles shorter than a minute are measured from the exact current
    /// instant. A missing zone means the local zone.
    pub fn start<F>(cycle: Duration, zone: Option<FixedOffset>, callback: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self::start_with(cycle, zone, Arc::new(TracingDiagnostics), callback)
    }

    pub fn start_with<F>(
        cycle: Duration,
        zone: Option<FixedOffset>,
        diagnostics: Arc<dyn Diagnostics>,
        callback: F,
    ) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let anchor = align(now_in(zone), cycle);
        Self::spawn(cycle, zone, anchor, diagnostics, Box::new(callback))
    }

    /// Start a timer that fires at the next midnight of `zone`
    pub fn daily<F>(zone: Option<FixedOffset>, callback: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self::daily_with(zone, Arc::new(TracingDiagnostics), callback)
    }

    pub fn daily_with<F>(
        zone: Option<FixedOffset>,
        diagnostics: Arc<dyn Diagnostics>,
        callback: F,
    ) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let anchor = midnight(now_in(zone))?;
        Self::spawn(
            Duration::from_secs(DAILY_CYCLE_SECS),
            zone,
            anchor,
            diagnostics,
            Box::new(callback),
        )
    }

    fn spawn(
        cycle: Duration,
        zone: Option<FixedOffset>,
        anchor: DateTime<FixedOffset>,
        diagnostics: Arc<dyn Diagnostics>,
        callback: Callback,
    ) -> Result<Self> {
        if cycle.is_zero() {
            return Err(Error::invalid("scheduler cycle must be greater than zero"));
        }
        let cycle_delta = TimeDelta::from_std(cycle)
            .map_err(|_| Error::invalid(format!("scheduler cycle out of range: {:?}", cycle)))?;
        let next_trigger = anchor
            .checked_add_signed(cycle_delta)
            .ok_or_else(|| Error::invalid(format!("scheduler cycle out of range: {:?}", cycle)))?;

        let state = Arc::new(Mutex::new(TimerState {
            anchor,
            next_trigger,
            cycle,
            cycle_delta,
            zone,
            generation: 1,
            armed: true,
        }));
        let (commands, rx) = unbounded();

        let delay = (next_trigger - now_in(zone)).to_std().unwrap_or_default();
        let deadline = Instant::now()
            .checked_add(delay)
            .ok_or_else(|| Error::invalid(format!("scheduler cycle out of range: {:?}", cycle)))?;
        commands
            .send(Command::Arm {
                generation: 1,
                deadline,
            })
            .map_err(|e| Error::scheduler(e.to_string()))?;

        let worker = Worker {
            state: Arc::clone(&state),
            callback,
            diagnostics,
        };
        thread::Builder::new()
            .name("rotlog-scheduler".to_string())
            .spawn(move || worker.run(rx))?;

        Ok(Self { state, commands })
    }

    /// Cancel the pending firing; safe to call repeatedly
    pub fn stop(&self) {
        let mut state = self.state.lock();
        state.armed = false;
        // Sent under the lock so commands reach the worker in state order
        let _ = self.commands.send(Command::Disarm);
    }

    /// Re-arm to fire one cycle from now
    ///
    /// The new trigger is measured from the reset call, so alignment to a
    /// minute or midnight is not carried over. If the next trigger cannot be
    /// represented the timer is left as it was and an error is returned.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state.lock();
        let now = now_in(state.zone);
        let out_of_range = || Error::scheduler(format!("cannot re-arm {:?} cycle", state.cycle));
        let next_trigger = now.checked_add_signed(state.cycle_delta).ok_or_else(out_of_range)?;
        let deadline = Instant::now().checked_add(state.cycle).ok_or_else(out_of_range)?;

        state.generation += 1;
        state.armed = true;
        state.anchor = now;
        state.next_trigger = next_trigger;
        let _ = self.commands.send(Command::Arm {
            generation: state.generation,
            deadline,
        });
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.state.lock().cycle
    }

    /// The instant the callback is expected to run
    pub fn trigger_time(&self) -> DateTime<FixedOffset> {
        self.state.lock().next_trigger
    }

    pub fn anchor(&self) -> DateTime<FixedOffset> {
        self.state.lock().anchor
    }

    /// The zone trigger times are computed in; the current local offset
    /// unless a zone was pinned
    pub fn location(&self) -> FixedOffset {
        self.state.lock().zone.unwrap_or_else(local_zone)
    }

    pub fn is_armed(&self) -> bool {
        self.state.lock().armed
    }

    /// Check whether `now` has reached the trigger time
    ///
    /// For cycles of a minute or more `now` is rounded to the nearest minute.
    pub fn is_due(&self, now: DateTime<FixedOffset>) -> bool {
        let state = self.state.lock();
        let now = if state.cycle >= MINUTE {
            now.duration_round(TimeDelta::minutes(1)).unwrap_or(now)
        } else {
            now
        };
        now >= state.next_trigger
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        // The worker may be the thread dropping us, so it is never joined
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Scheduler")
            .field("anchor", &state.anchor)
            .field("next_trigger", &state.next_trigger)
            .field("cycle", &state.cycle)
            .field("armed", &state.armed)
            .finish()
    }
}

struct Worker {
    state: Arc<Mutex<TimerState>>,
    callback: Callback,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Worker {
    fn run(mut self, commands: Receiver<Command>) {
        let mut pending: Option<(u64, Instant)> = None;

        loop {
            let alarm = match pending {
                Some((_, deadline)) => crossbeam_channel::at(deadline),
                None => crossbeam_channel::never(),
            };

            select! {
                recv(commands) -> command => match command {
                    Ok(Command::Arm { generation, deadline }) => pending = Some((generation, deadline)),
                    Ok(Command::Disarm) => pending = None,
                    Ok(Command::Shutdown) | Err(_) => break,
                },
                recv(alarm) -> _ => {
                    if let Some((generation, _)) = pending.take() {
                        self.fire(generation);
                    }
                }
            }
        }
    }

    fn fire(&mut self, generation: u64) {
        {
            let mut state = self.state.lock();
            if !state.armed || state.generation != generation {
                return;
            }
            state.armed = false;
            state.anchor = state.next_trigger;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.callback)()));
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("panic: {}", panic_message(payload.as_ref())),
        };
        self.diagnostics.record(FileEvent::CallbackFailed { error });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The zone of the local clock right now
pub(crate) fn local_zone() -> FixedOffset {
    *Local::now().offset()
}

/// Current time in `zone`, or in the local zone as of this instant
pub(crate) fn now_in(zone: Option<FixedOffset>) -> DateTime<FixedOffset> {
    match zone {
        Some(zone) => Utc::now().with_timezone(&zone),
        None => {
            let now = Local::now();
            now.with_timezone(now.offset())
        }
    }
}

fn align(now: DateTime<FixedOffset>, cycle: Duration) -> DateTime<FixedOffset> {
    if cycle >= MINUTE {
        now.duration_trunc(TimeDelta::minutes(1)).unwrap_or(now)
    } else {
        now
    }
}

fn midnight(now: DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(*now.offset()).single())
        .ok_or_else(|| Error::scheduler(format!("no midnight for {}", now)))
}
