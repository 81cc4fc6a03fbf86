//! Study sessions and the pomodoro focus timer.

pub mod model;
pub mod pomodoro;
pub mod routes;

pub use model::{StudySession, StudySummary};
pub use pomodoro::{Phase, Pomodoro, PomodoroSettings, PomodoroStatus};
