//! Reduces the provider's 3-hour forecast timeline into an hourly slice for
//! the next ~24h and a per-day summary for the next five calendar days.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{
    model::{Condition, ForecastTimeline, RawSample, to_local},
    units::{self, Reading, UnitPreference},
};

/// Eight 3-hour samples cover the next 24 hours.
pub const HOURLY_SLICE_LEN: usize = 8;
pub const MAX_FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IconCategory {
    Sun,
    Moon,
    Cloud,
    CloudSun,
    CloudMoon,
    CloudRain,
    CloudLightning,
    CloudSnow,
}

impl IconCategory {
    pub fn symbol(&self) -> &'static str {
        match self {
            IconCategory::Sun => "☀",
            IconCategory::Moon => "☾",
            IconCategory::Cloud => "☁",
            IconCategory::CloudSun => "⛅",
            IconCategory::CloudMoon => "☁☾",
            IconCategory::CloudRain => "🌧",
            IconCategory::CloudLightning => "🌩",
            IconCategory::CloudSnow => "🌨",
        }
    }
}

/// Provider icon codes end in `n` for night (`01n`); anything else, or no
/// code at all, is day.
pub fn is_night(icon_code: Option<&str>) -> bool {
    icon_code.is_some_and(|code| code.ends_with('n'))
}

pub fn icon_category(condition: Condition, icon_code: Option<&str>) -> IconCategory {
    let night = is_night(icon_code);

    match condition {
        Condition::Clear if night => IconCategory::Moon,
        Condition::Clear => IconCategory::Sun,
        Condition::Clouds if night => IconCategory::CloudMoon,
        Condition::Clouds => IconCategory::Cloud,
        Condition::Rain | Condition::Drizzle => IconCategory::CloudRain,
        Condition::Thunderstorm => IconCategory::CloudLightning,
        Condition::Snow => IconCategory::CloudSnow,
        Condition::Other if night => IconCategory::CloudMoon,
        Condition::Other => IconCategory::CloudSun,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub timestamp: i64,
    /// 12-hour clock, e.g. `3 PM`.
    pub time: String,
    pub icon: IconCategory,
    pub temperature: Reading<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Short weekday name, e.g. `Mon`.
    pub weekday: String,
    pub icon: IconCategory,
    pub high: Reading<i64>,
    pub low: Reading<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastView {
    pub hourly: Vec<HourlyEntry>,
    pub daily: Vec<DailySummary>,
}

pub fn aggregate(timeline: &ForecastTimeline, prefs: &UnitPreference) -> ForecastView {
    ForecastView { hourly: hourly_slice(timeline, prefs), daily: daily_summary(timeline, prefs) }
}

/// The first eight samples in timeline order; no sorting or filtering.
pub fn hourly_slice(timeline: &ForecastTimeline, prefs: &UnitPreference) -> Vec<HourlyEntry> {
    timeline
        .samples
        .iter()
        .take(HOURLY_SLICE_LEN)
        .map(|sample| {
            let local = to_local(sample.timestamp, timeline.utc_offset_secs);
            HourlyEntry {
                timestamp: sample.timestamp,
                time: local.format("%-I %p").to_string(),
                icon: icon_category(sample.condition, sample.icon_code.as_deref()),
                temperature: units::temperature(sample.temperature_c, prefs),
            }
        })
        .collect()
}

/// One summary per calendar date, for the first five dates in the order they
/// first appear. Dates are the provider's UTC dates (the `dt_txt` date); the
/// timeline offset only affects hourly labels.
///
/// The representative condition comes from the middle sample of each date's
/// group (`len / 2`), an approximation of midday that can be off for partial
/// first or last days.
pub fn daily_summary(timeline: &ForecastTimeline, prefs: &UnitPreference) -> Vec<DailySummary> {
    group_by_date(timeline)
        .into_iter()
        .take(MAX_FORECAST_DAYS)
        .filter_map(|(date, readings)| summarize_day(date, &readings, prefs))
        .collect()
}

fn group_by_date(timeline: &ForecastTimeline) -> Vec<(NaiveDate, Vec<&RawSample>)> {
    let mut groups: Vec<(NaiveDate, Vec<&RawSample>)> = Vec::new();

    for sample in &timeline.samples {
        let date = utc_date(sample.timestamp);

        match groups.iter_mut().find(|(d, _)| *d == date) {
            Some((_, readings)) => readings.push(sample),
            None => groups.push((date, vec![sample])),
        }
    }

    groups
}

fn utc_date(timestamp: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default().date_naive()
}

fn summarize_day(
    date: NaiveDate,
    readings: &[&RawSample],
    prefs: &UnitPreference,
) -> Option<DailySummary> {
    let mid = readings.get(readings.len() / 2)?;

    let low = readings.iter().map(|r| r.temperature_min_c).fold(f64::INFINITY, f64::min);
    let high = readings.iter().map(|r| r.temperature_max_c).fold(f64::NEG_INFINITY, f64::max);

    Some(DailySummary {
        date,
        weekday: date.format("%a").to_string(),
        icon: icon_category(mid.condition, mid.icon_code.as_deref()),
        high: units::temperature(high, prefs),
        low: units::temperature(low, prefs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::TemperatureUnit;

    // 2024-01-15 00:00:00 UTC, a Monday
    const MON_MIDNIGHT: i64 = 1_705_276_800;
    const THREE_HOURS: i64 = 3 * 3600;

    fn sample(ts: i64, min: f64, max: f64, condition: Condition, icon: &str) -> RawSample {
        RawSample {
            timestamp: ts,
            temperature_c: (min + max) / 2.0,
            temperature_min_c: min,
            temperature_max_c: max,
            condition,
            icon_code: Some(icon.to_string()),
            description: String::new(),
            humidity_pct: 50,
            wind_speed_mps: 3.0,
            precipitation_mm: None,
        }
    }

    fn timeline_from(start: i64, count: usize) -> ForecastTimeline {
        let samples = (0..count)
            .map(|i| {
                let ts = start + i as i64 * THREE_HOURS;
                sample(ts, 10.0, 15.0, Condition::Clouds, "04d")
            })
            .collect();
        ForecastTimeline::new(samples)
    }

    #[test]
    fn icon_mapping_respects_night_suffix() {
        assert_eq!(icon_category(Condition::Clear, Some("01d")), IconCategory::Sun);
        assert_eq!(icon_category(Condition::Clear, Some("01n")), IconCategory::Moon);
        assert_eq!(icon_category(Condition::Clouds, Some("03n")), IconCategory::CloudMoon);
        assert_eq!(icon_category(Condition::Clouds, None), IconCategory::Cloud);
        assert_eq!(icon_category(Condition::Drizzle, Some("09n")), IconCategory::CloudRain);
        assert_eq!(
            icon_category(Condition::Thunderstorm, Some("11d")),
            IconCategory::CloudLightning
        );
        assert_eq!(icon_category(Condition::Snow, Some("13n")), IconCategory::CloudSnow);
        assert_eq!(icon_category(Condition::Other, Some("50d")), IconCategory::CloudSun);
        assert_eq!(icon_category(Condition::Other, Some("50n")), IconCategory::CloudMoon);
    }

    #[test]
    fn empty_timeline_gives_empty_outputs() {
        let view = aggregate(&ForecastTimeline::default(), &UnitPreference::default());
        assert!(view.hourly.is_empty());
        assert!(view.daily.is_empty());
    }

    #[test]
    fn hourly_slice_is_capped_at_eight() {
        let prefs = UnitPreference::default();
        assert_eq!(hourly_slice(&timeline_from(MON_MIDNIGHT, 40), &prefs).len(), 8);
        assert_eq!(hourly_slice(&timeline_from(MON_MIDNIGHT, 5), &prefs).len(), 5);
    }

    #[test]
    fn hourly_entries_use_twelve_hour_labels() {
        let tl = timeline_from(MON_MIDNIGHT + 12 * 3600, 4);
        let labels: Vec<_> =
            hourly_slice(&tl, &UnitPreference::default()).into_iter().map(|h| h.time).collect();
        assert_eq!(labels, vec!["12 PM", "3 PM", "6 PM", "9 PM"]);
    }

    #[test]
    fn hourly_labels_follow_utc_offset() {
        let mut tl = timeline_from(MON_MIDNIGHT, 1);
        tl.utc_offset_secs = 2 * 3600;
        assert_eq!(hourly_slice(&tl, &UnitPreference::default())[0].time, "2 AM");
    }

    #[test]
    fn day_high_low_and_middle_icon() {
        let samples = vec![
            sample(MON_MIDNIGHT + 9 * 3600, 10.0, 18.0, Condition::Clouds, "04d"),
            sample(MON_MIDNIGHT + 12 * 3600, 12.0, 20.0, Condition::Rain, "10d"),
            sample(MON_MIDNIGHT + 15 * 3600, 9.0, 19.0, Condition::Clear, "01d"),
        ];
        let daily = daily_summary(&ForecastTimeline::new(samples), &UnitPreference::default());

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].weekday, "Mon");
        assert_eq!(daily[0].low.value, 9);
        assert_eq!(daily[0].high.value, 20);
        assert_eq!(daily[0].icon, IconCategory::CloudRain);
    }

    #[test]
    fn high_low_do_not_depend_on_sample_order() {
        let samples = vec![
            sample(MON_MIDNIGHT + 9 * 3600, 9.0, 19.0, Condition::Snow, "13d"),
            sample(MON_MIDNIGHT + 12 * 3600, 10.0, 18.0, Condition::Clear, "01d"),
            sample(MON_MIDNIGHT + 15 * 3600, 12.0, 20.0, Condition::Rain, "10d"),
        ];
        let daily = daily_summary(&ForecastTimeline::new(samples), &UnitPreference::default());

        assert_eq!(daily[0].low.value, 9);
        assert_eq!(daily[0].high.value, 20);
        assert_eq!(daily[0].icon, IconCategory::Sun);
    }

    #[test]
    fn single_sample_day_keeps_its_own_min_and_max() {
        let samples = vec![sample(MON_MIDNIGHT + 21 * 3600, 7.6, 8.4, Condition::Clear, "01n")];
        let daily = daily_summary(&ForecastTimeline::new(samples), &UnitPreference::default());

        assert_eq!(daily[0].low.value, 8);
        assert_eq!(daily[0].high.value, 8);
        assert_eq!(daily[0].icon, IconCategory::Moon);
    }

    #[test]
    fn never_more_than_five_days() {
        // starts mid-afternoon, 48 samples = 6 days
        let tl = timeline_from(MON_MIDNIGHT + 15 * 3600, 48);
        let daily = daily_summary(&tl, &UnitPreference::default());

        assert_eq!(daily.len(), 5);
        let names: Vec<_> = daily.iter().map(|d| d.weekday.as_str()).collect();
        assert_eq!(names, vec!["Mon", "Tue", "Wed", "Thu", "Fri"]);
    }

    #[test]
    fn partial_first_day_is_its_own_group() {
        // 21:00 Monday, then Tuesday onwards
        let tl = timeline_from(MON_MIDNIGHT + 21 * 3600, 9);
        let daily = daily_summary(&tl, &UnitPreference::default());

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(daily[1].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn daily_groups_ignore_utc_offset() {
        // 00/03/06/09 UTC on Tuesday, in a city five hours behind UTC
        let tue = MON_MIDNIGHT + 24 * 3600;
        let samples = vec![
            sample(tue, 0.0, 4.0, Condition::Clear, "01n"),
            sample(tue + THREE_HOURS, 1.0, 6.0, Condition::Clear, "01n"),
            sample(tue + 2 * THREE_HOURS, 2.0, 11.0, Condition::Clouds, "04n"),
            sample(tue + 3 * THREE_HOURS, 5.0, 13.0, Condition::Clouds, "04d"),
        ];
        let mut tl = ForecastTimeline::new(samples);
        tl.utc_offset_secs = -5 * 3600;

        let daily = daily_summary(&tl, &UnitPreference::default());

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(daily[0].weekday, "Tue");
        assert_eq!(daily[0].low.value, 0);
        assert_eq!(daily[0].high.value, 13);
        assert_eq!(hourly_slice(&tl, &UnitPreference::default())[0].time, "7 PM");
    }

    #[test]
    fn daily_temperatures_follow_unit_preference() {
        let samples = vec![sample(MON_MIDNIGHT, 0.0, 100.0, Condition::Clear, "01d")];
        let prefs =
            UnitPreference { temperature: TemperatureUnit::Fahrenheit, ..Default::default() };
        let daily = daily_summary(&ForecastTimeline::new(samples), &prefs);

        assert_eq!(daily[0].low.degrees(), "32°");
        assert_eq!(daily[0].high.degrees(), "212°");
    }
}
