//! Daily rotation at local midnight
//!
//! The wait is recomputed on every cycle from the wall clock in the configured
//! zone, so days of 23 or 25 hours around daylight-saving transitions are
//! honoured and no drift accumulates.

use super::error::{LoggerError, Result};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

/// Subtracted from every wait so the action fires at, or a hair before, the boundary
pub const BOUNDARY_EPSILON: Duration = Duration::from_nanos(1);

/// Next local midnight strictly after `now`, in `now`'s zone
///
/// When midnight does not exist on the next day (a zone that springs forward
/// at 00:00), the first valid instant after it is used. When it occurs twice,
/// the earlier one is used.
pub fn next_midnight<Z: TimeZone>(now: &DateTime<Z>) -> DateTime<Z> {
    let tz = now.timezone();
    let Some(next_day) = now.date_naive().succ_opt() else {
        return now.clone() + chrono::Duration::days(1);
    };
    let midnight = next_day.and_time(NaiveTime::MIN);

    (0..=48)
        .find_map(|half_hours| {
            let local = midnight + chrono::Duration::minutes(30 * half_hours);
            tz.from_local_datetime(&local).earliest()
        })
        .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
}

/// Time to sleep from `now` until the next local midnight, minus [`BOUNDARY_EPSILON`]
pub fn duration_until_next_midnight<Z: TimeZone>(now: &DateTime<Z>) -> Duration {
    (next_midnight(now) - now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO)
        .saturating_sub(BOUNDARY_EPSILON)
}

/// Background thread invoking a rotation action at every local midnight
///
/// Failures of the action are reported and counted by the caller's closure,
/// never fatal to the loop. Dropping the scheduler (or calling
/// [`shutdown`](Self::shutdown)) stops the thread and joins it.
///
/// # Example
///
/// ```no_run
/// use rust_event_logger::RotationScheduler;
///
/// let scheduler = RotationScheduler::spawn(chrono_tz::Europe::Berlin, || {
///     println!("rotating");
///     Ok(())
/// })
/// .unwrap();
///
/// // ... at shutdown
/// scheduler.shutdown();
/// ```
pub struct RotationScheduler {
    stop: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
    timezone: Tz,
}

impl RotationScheduler {
    /// Start the scheduler thread
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn spawn<F>(timezone: Tz, rotate: F) -> Result<Self>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        Self::spawn_with_clock(timezone, Utc::now, rotate)
    }

    /// Start the scheduler thread reading the wall clock from `clock`
    ///
    /// Waits are still real time: the thread sleeps for the gap between
    /// `clock()` and the next midnight it implies.
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn spawn_with_clock<C, F>(timezone: Tz, clock: C, mut rotate: F) -> Result<Self>
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let (stop, stopped) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("log-rotation".to_string())
            .spawn(move || {
                let mut last_boundary: Option<DateTime<Tz>> = None;

                loop {
                    let now = clock().with_timezone(&timezone);
                    let mut boundary = next_midnight(&now);
                    // Woken inside the epsilon window: this boundary is already done.
                    if last_boundary.as_ref() == Some(&boundary) {
                        boundary = next_midnight(&boundary);
                    }
                    let wait = (boundary.clone() - now)
                        .to_std()
                        .unwrap_or(Duration::ZERO)
                        .saturating_sub(BOUNDARY_EPSILON);

                    match stopped.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {
                            run_rotation(&mut rotate);
                            last_boundary = Some(boundary);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| {
                LoggerError::io_operation("spawn rotation scheduler", "thread spawn failed", e)
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
            timezone,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Stop the thread and wait for it to exit
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Rotation scheduler thread panicked: {:?}", e);
            }
        }
    }
}

/// Run one rotation; errors and panics are reported and never end the loop
fn run_rotation<F>(rotate: &mut F)
where
    F: FnMut() -> Result<()>,
{
    match catch_unwind(AssertUnwindSafe(|| rotate())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!(
                "[LOGGER WARNING] Scheduled log rotation failed: {}. \
                 Retrying at the next midnight.",
                e
            );
        }
        Err(panic_info) => {
            let reason = panic_info
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_info.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown panic".to_string());
            eprintln!(
                "[LOGGER CRITICAL] Scheduled log rotation panicked: {}. \
                 Retrying at the next midnight.",
                reason
            );
        }
    }
}

impl Drop for RotationScheduler {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
