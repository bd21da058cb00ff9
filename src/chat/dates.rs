//! Typed leave parameters pulled out of free text.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use crate::models::{LeaveType, leave_day_count};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("static pattern"));

/// A leave request as understood from a chat message, validated before it
/// is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveDraft {
    /// Inferred kind of leave.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day (inclusive). Check [`LeaveDraft::is_reversed`] before filing.
    pub end_date: NaiveDate,
}

impl LeaveDraft {
    /// Reads dates and leave type from `text` (already lower-cased).
    ///
    /// Recognized date tokens are ISO dates (`2025-10-20`), "today",
    /// "tomorrow" and "next week" (the following Monday to Friday). The
    /// first date mentioned is the start and the last is the end, in the
    /// order they appear. Returns `None` when the message holds no date.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use hcm_assistant::chat::LeaveDraft;
    /// use hcm_assistant::models::LeaveType;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 10, 14).unwrap();
    /// let draft = LeaveDraft::parse("request leave tomorrow, i'm sick", today).unwrap();
    /// assert_eq!(draft.leave_type, LeaveType::SickLeave);
    /// assert_eq!(draft.start_date, NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
    /// assert_eq!(draft.day_count(), 1);
    /// ```
    pub fn parse(text: &str, today: NaiveDate) -> Option<Self> {
        let mut found: Vec<(usize, NaiveDate)> = ISO_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                let year = caps[1].parse().ok()?;
                let month = caps[2].parse().ok()?;
                let day = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day).map(|date| (at, date))
            })
            .collect();

        if let Some(at) = word_position(text, "today") {
            found.push((at, today));
        }
        if let Some(at) = word_position(text, "tomorrow") {
            found.push((at, today + Duration::days(1)));
        }
        if let Some(at) = text.find("next week") {
            let monday = next_monday(today);
            found.push((at, monday));
            found.push((at, monday + Duration::days(4)));
        }

        // Stable sort keeps next week's Monday ahead of its Friday.
        found.sort_by_key(|(at, _)| *at);
        let start_date = found.first()?.1;
        let end_date = found.last()?.1;
        Some(Self {
            leave_type: infer_leave_type(text),
            start_date,
            end_date,
        })
    }

    /// Returns true if the last date given falls before the first.
    pub fn is_reversed(&self) -> bool {
        self.end_date < self.start_date
    }

    /// Days covered, both ends included.
    pub fn day_count(&self) -> i64 {
        leave_day_count(self.start_date, self.end_date)
    }
}

/// The Monday after `today`; a full week ahead when `today` is a Monday.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    let days_ahead = 7 - i64::from(today.weekday().num_days_from_monday());
    today + Duration::days(days_ahead)
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

fn has_word(text: &str, word: &str) -> bool {
    words(text).any(|w| w == word)
}

/// Byte offset of the first whole-word occurrence of `word`.
fn word_position(text: &str, word: &str) -> Option<usize> {
    text.match_indices(word).map(|(at, _)| at).find(|&at| {
        let before = text[..at].chars().next_back();
        let after = text[at + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Keyword inference; vacation when nothing else fits.
pub fn infer_leave_type(text: &str) -> LeaveType {
    if text.contains("sick") || has_word(text, "ill") || has_word(text, "unwell") {
        LeaveType::SickLeave
    } else if text.contains("emergency") {
        LeaveType::Emergency
    } else if text.contains("personal") {
        LeaveType::Personal
    } else {
        LeaveType::Vacation
    }
}
