//! Sleep reconstruction
//!
//! Derives one sleep duration per calendar day from a user's "Sleep" and
//! "Wake up" tags. A wake event belongs to its own date; a sleep event belongs
//! to the following date (the day the sleeper wakes into). Events are paired by
//! that date, so a day with only one side of the pair produces no record.

use crate::types::{DailySleepRecord, Event, EventLabel};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

/// Sleep reconstructor for tagged event streams
pub struct SleepReconstructor;

impl SleepReconstructor {
    /// Reconstruct nightly sleep for one user, one record per resolvable date.
    ///
    /// When several sleep/wake pairs land on the same date every combination
    /// is measured and the durations are averaged. Irregular tagging is not
    /// corrected, so a pairing can yield a negative or implausible duration.
    pub fn reconstruct(user_id: &str, events: &[Event]) -> Vec<DailySleepRecord> {
        let mut wakes: BTreeMap<NaiveDate, Vec<NaiveDateTime>> = BTreeMap::new();
        let mut sleeps: HashMap<NaiveDate, Vec<NaiveDateTime>> = HashMap::new();

        for event in events {
            match event.label {
                EventLabel::WakeUp => {
                    wakes.entry(event.date()).or_default().push(event.start);
                }
                EventLabel::Sleep => {
                    if let Some(date) = wake_date_for_sleep(event.start) {
                        sleeps.entry(date).or_default().push(event.start);
                    }
                }
                _ => {}
            }
        }

        let mut records = Vec::new();
        for (date, wake_times) in wakes {
            let Some(sleep_times) = sleeps.get(&date) else {
                continue;
            };

            let durations: Vec<f64> = wake_times
                .iter()
                .flat_map(|wake| sleep_times.iter().map(move |sleep| duration_hours(*sleep, *wake)))
                .collect();

            let sleep_hours = durations.iter().sum::<f64>() / durations.len() as f64;
            records.push(DailySleepRecord {
                user_id: user_id.to_string(),
                date,
                sleep_hours,
            });
        }

        records
    }
}

/// Date a sleep event is attributed to: the day after it was tagged
fn wake_date_for_sleep(start: NaiveDateTime) -> Option<NaiveDate> {
    start.date().succ_opt()
}

/// Elapsed time from `sleep` to `wake` in hours.
///
/// The negated interval `sleep - wake` is floored to whole minutes, so a
/// partial minute counts as a full one.
fn duration_hours(sleep: NaiveDateTime, wake: NaiveDateTime) -> f64 {
    let elapsed = wake - sleep;
    let mut minutes = elapsed.num_minutes();
    if elapsed > Duration::minutes(minutes) {
        minutes += 1;
    }
    minutes as f64 / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_night_is_eight_hours() {
        let events = vec![
            Event::new("u1", "Sleep", at("2023-03-01", "22:00:00")),
            Event::new("u1", "Wake up", at("2023-03-02", "06:00:00")),
        ];

        let records = SleepReconstructor::reconstruct("u1", &events);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, day("2023-03-02"));
        assert_eq!(records[0].sleep_hours, 8.0);
        assert_eq!(records[0].user_id, "u1");
    }

    #[test]
    fn test_one_record_per_wake_date() {
        let mut events = Vec::new();
        for d in 1..=5 {
            events.push(Event::new("u1", "Sleep", at(&format!("2023-03-{:02}", d), "23:30:00")));
            events.push(Event::new("u1", "Wake up", at(&format!("2023-03-{:02}", d + 1), "07:00:00")));
            events.push(Event::new("u1", "Drink", at(&format!("2023-03-{:02}", d + 1), "08:00:00")));
        }

        let records = SleepReconstructor::reconstruct("u1", &events);

        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.sleep_hours == 7.5));
        assert!(records.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_unpaired_dates_are_omitted() {
        let events = vec![
            // Wake with no prior sleep
            Event::new("u1", "Wake up", at("2023-03-01", "07:00:00")),
            // Sleep with no following wake
            Event::new("u1", "Sleep", at("2023-03-05", "22:00:00")),
        ];

        assert!(SleepReconstructor::reconstruct("u1", &events).is_empty());
    }

    #[test]
    fn test_no_sleep_tags_yields_empty() {
        let events = vec![Event::new("u1", "Eat", at("2023-03-01", "12:00:00"))];
        assert!(SleepReconstructor::reconstruct("u1", &events).is_empty());
        assert!(SleepReconstructor::reconstruct("u1", &[]).is_empty());
    }

    #[test]
    fn test_multiple_pairs_on_one_date_are_averaged() {
        let events = vec![
            Event::new("u1", "Sleep", at("2023-03-01", "22:00:00")),
            Event::new("u1", "Wake up", at("2023-03-02", "06:00:00")),
            Event::new("u1", "Wake up", at("2023-03-02", "08:00:00")),
        ];

        let records = SleepReconstructor::reconstruct("u1", &events);

        // 8h and 10h against the same sleep event
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sleep_hours, 9.0);
    }

    #[test]
    fn test_partial_minute_rounds_up() {
        let events = vec![
            Event::new("u1", "Sleep", at("2023-03-01", "22:00:00")),
            Event::new("u1", "Wake up", at("2023-03-02", "06:29:01")),
        ];

        let records = SleepReconstructor::reconstruct("u1", &events);
        // 8h29m01s counts as 510 minutes
        assert_eq!(records[0].sleep_hours, 8.5);
    }

    #[test]
    fn test_negative_pairing_rounds_toward_zero() {
        // Wake tagged before the previous evening's sleep: -90m30s -> -90 minutes
        let sleep = at("2023-03-01", "23:00:00");
        let wake = at("2023-03-01", "21:29:30");
        assert_eq!(duration_hours(sleep, wake), -1.5);
        assert_eq!(duration_hours(sleep, at("2023-03-02", "07:00:00")), 8.0);
    }

    #[test]
    fn test_after_midnight_sleep_shifts_to_next_day() {
        // Falling asleep at 00:30 attributes the night to the following date,
        // so the same-morning wake is left unpaired.
        let events = vec![
            Event::new("u1", "Sleep", at("2023-03-02", "00:30:00")),
            Event::new("u1", "Wake up", at("2023-03-02", "07:00:00")),
        ];

        assert!(SleepReconstructor::reconstruct("u1", &events).is_empty());
    }
}
