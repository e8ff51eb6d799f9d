// Daily availability and time slots of a restaurant
// A restaurant owns its days and a day owns its slots. Children only keep the
// keys of their parent (restaurant id, day) plus the context they need to compute times.

use crate::wire::{DailyAvailabilityView, TimeSlotView};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;
use std::fmt;

// Places a local date-time in a zone. Ambiguous times take the earliest instant,
// times inside a DST gap are pushed forward by an hour.
pub(crate) fn localize(time_zone: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    time_zone
        .from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            time_zone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| time_zone.from_utc_datetime(&local))
}

fn format_local_time(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    day: NaiveDate,
    time_zone: Tz,
    granularity: Duration,
    start: DateTime<Tz>,
    duration: Duration,
    party_sizes: Vec<u32>,
}

impl TimeSlot {
    pub(crate) fn new(day: NaiveDate, start_time: NaiveTime, time_zone: Tz, granularity: Duration) -> Self {
        Self {
            day,
            time_zone,
            granularity,
            start: localize(&time_zone, day.and_time(start_time)),
            duration: granularity,
            party_sizes: Vec::new(),
        }
    }

    /// Day of the owning [`DailyAvailability`].
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.start + self.duration
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end().time()
    }

    pub fn set_start_time(&mut self, start_time: NaiveTime) {
        self.start = localize(&self.time_zone, self.day.and_time(start_time));
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Bookable party sizes, ascending and without duplicates.
    pub fn party_sizes(&self) -> &[u32] {
        &self.party_sizes
    }

    pub fn add_party_size(&mut self, size: u32) {
        if let Err(index) = self.party_sizes.binary_search(&size) {
            self.party_sizes.insert(index, size);
        }
    }

    pub fn min_party_size(&self) -> Option<u32> {
        self.party_sizes.first().copied()
    }

    pub fn max_party_size(&self) -> Option<u32> {
        self.party_sizes.last().copied()
    }

    // Grows the slot by one granularity unit
    pub fn expand(&mut self) {
        self.duration = self.duration + self.granularity;
    }

    // Timing is ignored, only the bookable sizes matter
    pub fn has_same_properties(&self, other: &TimeSlot) -> bool {
        self.party_sizes == other.party_sizes
    }

    // True at the exact start or strictly inside the slot
    pub fn covers(&self, instant: &DateTime<Tz>) -> bool {
        *instant == self.start || (*instant > self.start && *instant < self.end())
    }

    pub fn to_view(&self) -> TimeSlotView {
        TimeSlotView {
            start: format_local_time(self.start_time()),
            duration: self.duration.num_minutes(),
            end: format_local_time(self.end_time()),
            party_sizes: self.party_sizes.clone(),
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.to_view()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyAvailability {
    restaurant_id: String,
    time_zone: Tz,
    granularity: Duration,
    day: NaiveDate,
    time_slots: Vec<TimeSlot>,
}

impl DailyAvailability {
    pub(crate) fn new(restaurant_id: String, time_zone: Tz, granularity: Duration, day: NaiveDate) -> Self {
        Self {
            restaurant_id,
            time_zone,
            granularity,
            day,
            time_slots: Vec::new(),
        }
    }

    /// Id of the owning restaurant.
    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    pub fn time_slot_mut(&mut self, index: usize) -> Option<&mut TimeSlot> {
        self.time_slots.get_mut(index)
    }

    // New slot spans one granularity unit from `start_time`
    pub fn add_time_slot(&mut self, start_time: NaiveTime) -> &mut TimeSlot {
        let slot = TimeSlot::new(self.day, start_time, self.time_zone, self.granularity);
        self.time_slots.push(slot);
        let last = self.time_slots.len() - 1;
        &mut self.time_slots[last]
    }

    pub fn remove_time_slot(&mut self, index: usize) -> Option<TimeSlot> {
        (index < self.time_slots.len()).then(|| self.time_slots.remove(index))
    }

    pub fn has_availability(&self) -> bool {
        !self.time_slots.is_empty()
    }

    pub fn to_view(&self) -> DailyAvailabilityView {
        DailyAvailabilityView {
            day: self.day.format("%Y-%m-%d").to_string(),
            time_slots: self.time_slots.iter().map(TimeSlot::to_view).collect(),
        }
    }
}

impl fmt::Display for DailyAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.to_view()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Montreal;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 8, 29).unwrap()
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn availability() -> DailyAvailability {
        DailyAvailability::new("R1".to_string(), Montreal, Duration::minutes(15), day())
    }

    #[test]
    fn test_party_sizes_sorted_and_unique() {
        let mut daily = availability();
        let slot = daily.add_time_slot(time(18, 0));
        for size in [4, 2, 6, 2, 4, 1] {
            slot.add_party_size(size);
        }

        assert_eq!(slot.party_sizes(), &[1, 2, 4, 6]);
        assert_eq!(slot.min_party_size(), Some(1));
        assert_eq!(slot.max_party_size(), Some(6));
    }

    #[test]
    fn test_empty_slot_has_no_bounds() {
        let mut daily = availability();
        let slot = daily.add_time_slot(time(18, 0));
        assert_eq!(slot.min_party_size(), None);
        assert_eq!(slot.max_party_size(), None);
    }

    #[test]
    fn test_slot_times_follow_zone_and_granularity() {
        let mut daily = availability();
        let slot = daily.add_time_slot(time(18, 0));

        assert_eq!(slot.day(), day());
        assert_eq!(slot.start(), Montreal.with_ymd_and_hms(2014, 8, 29, 18, 0, 0).unwrap());
        assert_eq!(slot.duration(), Duration::minutes(15));
        assert_eq!(slot.end_time(), time(18, 15));

        slot.expand();
        slot.expand();
        assert_eq!(slot.duration(), Duration::minutes(45));
        assert_eq!(slot.end_time(), time(18, 45));

        slot.set_start_time(time(19, 0));
        assert_eq!(slot.start_time(), time(19, 0));
        assert_eq!(slot.end_time(), time(19, 45));
    }

    #[test]
    fn test_same_properties_ignores_timing() {
        let mut daily = availability();
        daily.add_time_slot(time(18, 0)).add_party_size(2);
        daily.add_time_slot(time(21, 0)).add_party_size(2);
        daily.add_time_slot(time(21, 0)).add_party_size(3);

        let slots = daily.time_slots();
        assert!(slots[0].has_same_properties(&slots[1]));
        assert!(!slots[0].has_same_properties(&slots[2]));
    }

    #[test]
    fn test_covers_is_half_open() {
        let mut daily = availability();
        let slot = daily.add_time_slot(time(18, 0));
        slot.expand();

        let at = |h, m| Montreal.with_ymd_and_hms(2014, 8, 29, h, m, 0).unwrap();
        assert!(slot.covers(&at(18, 0)));
        assert!(slot.covers(&at(18, 29)));
        assert!(!slot.covers(&at(18, 30)));
        assert!(!slot.covers(&at(17, 59)));
    }

    #[test]
    fn test_remove_time_slot() {
        let mut daily = availability();
        daily.add_time_slot(time(18, 0));
        assert!(daily.has_availability());

        assert!(daily.remove_time_slot(3).is_none());
        assert!(daily.remove_time_slot(0).is_some());
        assert!(!daily.has_availability());
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        // 2014-03-09 02:30 does not exist in Montreal
        let gap_day = NaiveDate::from_ymd_opt(2014, 3, 9).unwrap();
        let slot = TimeSlot::new(gap_day, time(2, 30), Montreal, Duration::minutes(15));
        assert_eq!(slot.start_time(), time(3, 30));
    }

    #[test]
    fn test_display_renders_json() {
        let mut daily = availability();
        let slot = daily.add_time_slot(time(9, 0));
        slot.add_party_size(4);
        slot.add_party_size(2);
        slot.expand();

        assert_eq!(
            daily.to_string(),
            r#"{"day":"2014-08-29","timeSlots":[{"start":"09:00","duration":30,"end":"09:30","partySizes":[2,4]}]}"#
        );
    }
}
