//! Study habit summary: streaks, daily goal, week-over-week review.
//!
//! Days are calendar days in the caller's time zone.

use crate::types::AnswerRecord;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_DAILY_GOAL_QUESTIONS: u32 = 20;
pub const DEFAULT_WEEKLY_GOAL_STUDY_DAYS: u32 = 5;

/// Learner goals feeding the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyGoals {
    pub daily_questions: u32,
    pub weekly_study_days: u32,
}

impl Default for StudyGoals {
    fn default() -> Self {
        Self {
            daily_questions: DEFAULT_DAILY_GOAL_QUESTIONS,
            weekly_study_days: DEFAULT_WEEKLY_GOAL_STUDY_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoalProgress {
    pub goal_questions: u32,
    pub answered_today: u32,
    pub remaining_questions: u32,
    pub achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub answered: u32,
    pub correct_count: u32,
    /// Percent, rounded.
    pub correct_rate: u32,
    pub active_days: u32,
    pub average_per_active_day: u32,
    pub goal_study_days: u32,
    pub goal_achieved: bool,
    pub answered_diff: i64,
    pub correct_rate_diff: i64,
    pub active_days_diff: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyInsights {
    pub total_study_days: u32,
    pub current_streak_days: u32,
    pub studied_today: bool,
    pub last_studied_at: Option<i64>,
    pub daily_goal: DailyGoalProgress,
    pub weekly_review: WeeklyReview,
}

#[derive(Debug, Default)]
struct WindowMetrics {
    answered: u32,
    correct: u32,
    days: BTreeSet<NaiveDate>,
}

impl WindowMetrics {
    fn correct_rate(&self) -> u32 {
        if self.answered == 0 {
            return 0;
        }
        (f64::from(self.correct) / f64::from(self.answered) * 100.0).round() as u32
    }
}

fn local_day<Tz: TimeZone>(tz: &Tz, millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Summarize study habits as of `now` (epoch ms) in time zone `tz`.
pub fn calculate_insights<Tz: TimeZone>(
    answers: &[AnswerRecord],
    goals: StudyGoals,
    tz: &Tz,
    now: i64,
) -> StudyInsights {
    let daily_goal = goals.daily_questions.max(1);
    let weekly_goal = goals.weekly_study_days.clamp(1, 7);

    let today = local_day(tz, now).unwrap_or_else(|| DateTime::<Utc>::default().date_naive());
    let week_start = today - Days::new(6);
    let previous_week_start = week_start - Days::new(7);

    let mut study_days = BTreeSet::new();
    let mut last_studied_at: Option<i64> = None;
    let mut answered_today = 0;
    let mut current = WindowMetrics::default();
    let mut previous = WindowMetrics::default();

    for answer in answers {
        let Some(day) = local_day(tz, answer.answered_at) else {
            continue;
        };
        study_days.insert(day);
        if day == today {
            answered_today += 1;
        }
        if last_studied_at.map_or(true, |at| answer.answered_at > at) {
            last_studied_at = Some(answer.answered_at);
        }

        let window = if day >= week_start && day <= today {
            &mut current
        } else if day >= previous_week_start && day < week_start {
            &mut previous
        } else {
            continue;
        };
        window.answered += 1;
        if answer.is_correct {
            window.correct += 1;
        }
        window.days.insert(day);
    }

    let correct_rate = current.correct_rate();
    let active_days = current.days.len() as u32;

    StudyInsights {
        total_study_days: study_days.len() as u32,
        current_streak_days: streak(&study_days, today),
        studied_today: answered_today > 0,
        last_studied_at,
        daily_goal: DailyGoalProgress {
            goal_questions: daily_goal,
            answered_today,
            remaining_questions: daily_goal.saturating_sub(answered_today),
            achieved: answered_today >= daily_goal,
        },
        weekly_review: WeeklyReview {
            answered: current.answered,
            correct_count: current.correct,
            correct_rate,
            active_days,
            average_per_active_day: if active_days > 0 {
                (f64::from(current.answered) / f64::from(active_days)).round() as u32
            } else {
                0
            },
            goal_study_days: weekly_goal,
            goal_achieved: active_days >= weekly_goal,
            answered_diff: i64::from(current.answered) - i64::from(previous.answered),
            correct_rate_diff: i64::from(correct_rate) - i64::from(previous.correct_rate()),
            active_days_diff: active_days as i64 - previous.days.len() as i64,
        },
    }
}

/// Consecutive study days ending at the latest one, if that was today or
/// yesterday.
fn streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&latest) = days.iter().next_back() else {
        return 0;
    };
    if today.pred_opt().is_some_and(|yesterday| latest < yesterday) {
        return 0;
    }
    let mut count = 0;
    let mut cursor = Some(latest);
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        count += 1;
        cursor = day.pred_opt();
    }
    count
}
