//! Pomodoro focus timer.
//!
//! The timer never reads the wall clock; every call takes `now` so phase
//! transitions are deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bounds for the work phase, in minutes.
pub const WORK_MINUTES: std::ops::RangeInclusive<u32> = 5..=60;
/// Bounds for the break phase, in minutes.
pub const BREAK_MINUTES: std::ops::RangeInclusive<u32> = 1..=30;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PomodoroError {
    #[error("Work minutes must be between 5 and 60")]
    WorkOutOfRange,

    #[error("Break minutes must be between 1 and 30")]
    BreakOutOfRange,

    #[error("Focus level must be between 1 and 10")]
    FocusOutOfRange,

    #[error("No pomodoro is running")]
    NotStarted,
}

/// Current phase of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Focus,
    Break,
    Finished,
}

/// Body of `POST /api/pomodoro/start`.
#[derive(Debug, Clone, Deserialize)]
pub struct PomodoroSettings {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub subject: String,
    pub focus_level: u8,
}

impl PomodoroSettings {
    fn validate(&self) -> Result<(), PomodoroError> {
        if !WORK_MINUTES.contains(&self.work_minutes) {
            return Err(PomodoroError::WorkOutOfRange);
        }
        if !BREAK_MINUTES.contains(&self.break_minutes) {
            return Err(PomodoroError::BreakOutOfRange);
        }
        if !(1..=10).contains(&self.focus_level) {
            return Err(PomodoroError::FocusOutOfRange);
        }
        Ok(())
    }
}

/// A point-in-time view of the timer for clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PomodoroStatus {
    pub phase: Phase,
    pub paused: bool,
    pub remaining_seconds: i64,
    pub focused_minutes: u32,
    pub subject: String,
}

/// What `end` hands back so the caller can record a study session.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedPomodoro {
    pub focused_minutes: u32,
    pub subject: String,
    pub focus_level: u8,
}

#[derive(Debug, Clone)]
pub struct Pomodoro {
    settings: PomodoroSettings,
    phase: Phase,
    /// Time spent in the current phase up to `running_since`.
    phase_elapsed: Duration,
    running_since: Option<DateTime<Utc>>,
    focused: Duration,
}

impl Pomodoro {
    pub fn start(settings: PomodoroSettings, now: DateTime<Utc>) -> Result<Self, PomodoroError> {
        settings.validate()?;
        Ok(Self {
            settings,
            phase: Phase::Focus,
            phase_elapsed: Duration::zero(),
            running_since: Some(now),
            focused: Duration::zero(),
        })
    }

    fn work_len(&self) -> Duration {
        Duration::minutes(i64::from(self.settings.work_minutes))
    }

    fn break_len(&self) -> Duration {
        Duration::minutes(i64::from(self.settings.break_minutes))
    }

    /// Fold running time into the phase and cross any phase boundaries.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.running_since {
            self.phase_elapsed += (now - since).max(Duration::zero());
            self.running_since = Some(now);
        }

        if self.phase == Phase::Focus && self.phase_elapsed >= self.work_len() {
            self.focused += self.work_len();
            self.phase_elapsed -= self.work_len();
            self.phase = Phase::Break;
        }
        if self.phase == Phase::Break && self.phase_elapsed >= self.break_len() {
            self.phase = Phase::Finished;
            self.phase_elapsed = Duration::zero();
            self.running_since = None;
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.advance(now);
        self.running_since = None;
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.running_since.is_none() && self.phase != Phase::Finished {
            self.running_since = Some(now);
        }
    }

    /// Count the focus time so far and jump straight into the break.
    pub fn skip_to_break(&mut self, now: DateTime<Utc>) {
        self.advance(now);
        if self.phase == Phase::Focus {
            self.focused += self.phase_elapsed;
            self.phase_elapsed = Duration::zero();
            self.phase = Phase::Break;
            if self.running_since.is_some() {
                self.running_since = Some(now);
            }
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> PomodoroStatus {
        let mut view = self.clone();
        view.advance(now);
        let remaining = match view.phase {
            Phase::Focus => view.work_len() - view.phase_elapsed,
            Phase::Break => view.break_len() - view.phase_elapsed,
            Phase::Finished => Duration::zero(),
        };
        PomodoroStatus {
            phase: view.phase,
            paused: view.running_since.is_none() && view.phase != Phase::Finished,
            remaining_seconds: remaining.num_seconds().max(0),
            focused_minutes: view.focused_minutes(),
            subject: view.settings.subject.clone(),
        }
    }

    /// Stop the timer, returning the whole focused minutes.
    pub fn end(mut self, now: DateTime<Utc>) -> FinishedPomodoro {
        self.advance(now);
        if self.phase == Phase::Focus {
            self.focused += self.phase_elapsed;
        }
        FinishedPomodoro {
            focused_minutes: self.focused_minutes(),
            subject: self.settings.subject,
            focus_level: self.settings.focus_level,
        }
    }

    fn focused_minutes(&self) -> u32 {
        u32::try_from(self.focused.num_minutes()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    fn settings(work: u32, brk: u32) -> PomodoroSettings {
        PomodoroSettings {
            work_minutes: work,
            break_minutes: brk,
            subject: "Physics".into(),
            focus_level: 7,
        }
    }

    #[test]
    fn start_validates_ranges() {
        assert_eq!(
            Pomodoro::start(settings(4, 5), t0()).unwrap_err(),
            PomodoroError::WorkOutOfRange
        );
        assert_eq!(
            Pomodoro::start(settings(25, 31), t0()).unwrap_err(),
            PomodoroError::BreakOutOfRange
        );
        let mut s = settings(25, 5);
        s.focus_level = 11;
        assert_eq!(
            Pomodoro::start(s, t0()).unwrap_err(),
            PomodoroError::FocusOutOfRange
        );
        assert!(Pomodoro::start(settings(60, 30), t0()).is_ok());
    }

    #[test]
    fn phases_advance_with_the_clock() {
        let p = Pomodoro::start(settings(25, 5), t0()).unwrap();

        let s = p.status(t0() + Duration::minutes(10));
        assert_eq!(s.phase, Phase::Focus);
        assert_eq!(s.remaining_seconds, 15 * 60);

        let s = p.status(t0() + Duration::minutes(27));
        assert_eq!(s.phase, Phase::Break);
        assert_eq!(s.remaining_seconds, 3 * 60);
        assert_eq!(s.focused_minutes, 25);

        let s = p.status(t0() + Duration::minutes(31));
        assert_eq!(s.phase, Phase::Finished);
        assert_eq!(s.remaining_seconds, 0);
    }

    #[test]
    fn paused_time_does_not_count() {
        let mut p = Pomodoro::start(settings(25, 5), t0()).unwrap();
        p.pause(t0() + Duration::minutes(10));
        let s = p.status(t0() + Duration::minutes(40));
        assert!(s.paused);
        assert_eq!(s.phase, Phase::Focus);
        assert_eq!(s.remaining_seconds, 15 * 60);

        p.resume(t0() + Duration::minutes(40));
        let s = p.status(t0() + Duration::minutes(45));
        assert!(!s.paused);
        assert_eq!(s.remaining_seconds, 10 * 60);
    }

    #[test]
    fn skip_to_break_keeps_partial_focus() {
        let mut p = Pomodoro::start(settings(25, 5), t0()).unwrap();
        p.skip_to_break(t0() + Duration::minutes(12));
        let s = p.status(t0() + Duration::minutes(13));
        assert_eq!(s.phase, Phase::Break);
        assert_eq!(s.remaining_seconds, 4 * 60);
        let done = p.end(t0() + Duration::minutes(13));
        assert_eq!(done.focused_minutes, 12);
        assert_eq!(done.focus_level, 7);
    }

    #[test]
    fn ending_early_reports_whole_minutes() {
        let p = Pomodoro::start(settings(25, 5), t0()).unwrap();
        let done = p.end(t0() + Duration::seconds(150));
        assert_eq!(done.focused_minutes, 2);
        assert_eq!(done.subject, "Physics");

        let p = Pomodoro::start(settings(25, 5), t0()).unwrap();
        assert_eq!(p.end(t0() + Duration::seconds(30)).focused_minutes, 0);
    }
}
