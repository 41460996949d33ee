//! Appointment reminders.
//!
//! A single tokio task wakes every `REMINDER_INTERVAL_SECS`, scans the
//! record store and hands every appointment falling in `(now, now + 2h]`
//! to a [`NotificationSink`]. Delivery itself (desktop toast, SMS, ...)
//! belongs to the sink.
//!
//! With the default [`ReminderPolicy::EveryTick`] an appointment is
//! re-announced on every tick while it stays inside the window.
//! [`ReminderPolicy::OncePerAppointment`] announces it once.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config;
use crate::models::{format_record_time, AppointmentRecord};
use crate::store::{RecordStore, StoreError};

// ═══════════════════════════════════════════════════════════
// Notification sink
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers one reminder. `appointment_time` is `YYYY-MM-DD HH:MM`.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, patient_name: &str, appointment_time: &str) -> Result<(), NotifyError>;
}

/// Writes reminders to the application log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, patient_name: &str, appointment_time: &str) -> Result<(), NotifyError> {
        tracing::info!(
            patient = patient_name,
            appointment_time,
            "Appointment reminder: {patient_name} has an appointment at {appointment_time}"
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Window computation
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Position of the record in the store.
    pub position: usize,
    pub patient_name: String,
    pub appointment_time: String,
}

/// Appointments strictly after `now` and at or before `now + lookahead`.
pub fn due_reminders(
    records: &[AppointmentRecord],
    now: NaiveDateTime,
    lookahead: chrono::Duration,
) -> Vec<Reminder> {
    let horizon = now + lookahead;
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.appointment_time > now && r.appointment_time <= horizon)
        .map(|(position, r)| Reminder {
            position,
            patient_name: r.patient_name.clone(),
            appointment_time: format_record_time(&r.appointment_time),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Scheduler
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReminderPolicy {
    /// Notify on every tick while the appointment is inside the window.
    #[default]
    EveryTick,
    /// Notify once per appointment (after the first successful delivery).
    OncePerAppointment,
}

pub struct ReminderScheduler {
    store: Arc<RecordStore>,
    sink: Arc<dyn NotificationSink>,
    interval: Duration,
    lookahead: chrono::Duration,
    policy: ReminderPolicy,
    notified: Mutex<HashSet<usize>>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<RecordStore>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            interval: config::reminder_interval(),
            lookahead: config::reminder_lookahead(),
            policy: ReminderPolicy::default(),
            notified: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_lookahead(mut self, lookahead: chrono::Duration) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_policy(mut self, policy: ReminderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run one scan at `now`. Returns how many reminders were delivered.
    ///
    /// The store read lock is released before any sink call.
    pub fn tick(&self, now: NaiveDateTime) -> Result<usize, StoreError> {
        let due = self
            .store
            .with_records(|records| due_reminders(records, now, self.lookahead))?;

        let mut delivered = 0;
        for reminder in due {
            let once = self.policy == ReminderPolicy::OncePerAppointment;
            if once && self.was_notified(reminder.position)? {
                continue;
            }

            match self
                .sink
                .notify(&reminder.patient_name, &reminder.appointment_time)
            {
                Ok(()) => {
                    delivered += 1;
                    if once {
                        self.mark_notified(reminder.position)?;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        position = reminder.position,
                        "Reminder delivery failed"
                    );
                }
            }
        }
        Ok(delivered)
    }

    /// Spawn the recurring scan on the current tokio runtime.
    ///
    /// The first scan runs one interval after start.
    pub fn start(self) -> ReminderHandle {
        let scheduler = Arc::new(self);
        let period = scheduler.interval;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                interval_ms = period.as_millis() as u64,
                policy = ?scheduler.policy,
                "Reminder scheduler started"
            );

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        let now = Local::now().naive_local();
                        match scheduler.tick(now) {
                            Ok(0) => {}
                            Ok(sent) => tracing::debug!(sent, "Reminders delivered"),
                            Err(e) => tracing::warn!(error = %e, "Reminder scan failed"),
                        }
                    }
                }
            }

            tracing::info!("Reminder scheduler stopped");
        });

        ReminderHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    fn was_notified(&self, position: usize) -> Result<bool, StoreError> {
        let set = self.notified.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(set.contains(&position))
    }

    fn mark_notified(&self, position: usize) -> Result<(), StoreError> {
        let mut set = self.notified.lock().map_err(|_| StoreError::LockPoisoned)?;
        set.insert(position);
        Ok(())
    }
}

/// Handle to the running reminder task. Dropping it stops the task.
pub struct ReminderHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReminderHandle {
    /// Ask the task to stop after its current tick.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Reminder scheduler shutdown signal sent");
        }
    }

    /// Shut down and wait for the task to exit.
    pub async fn stopped(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ReminderHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
