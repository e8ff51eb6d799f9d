// Availability compaction
// The search endpoint answers with one entry per granularity bucket. Runs of contiguous
// buckets offering the same party sizes are folded into a single wider slot.

use crate::availability::DailyAvailability;
use crate::error::ValidationError;
use crate::restaurant::Restaurant;
use crate::wire::{parse_day, parse_time24, parse_time_zone, AvailabilityRestaurant, AvailabilitySlot};
use chrono::Duration;

/// Compacts a whole search response. Restaurants left without any bookable day are dropped.
pub fn compact(restaurants: &[AvailabilityRestaurant]) -> Result<Vec<Restaurant>, ValidationError> {
    let mut compacted = Vec::with_capacity(restaurants.len());
    for raw in restaurants {
        if let Some(restaurant) = compact_restaurant(raw)? {
            compacted.push(restaurant);
        }
    }
    Ok(compacted)
}

pub fn compact_restaurant(raw: &AvailabilityRestaurant) -> Result<Option<Restaurant>, ValidationError> {
    let days = match raw.availability.as_deref() {
        Some(days) if !days.is_empty() => days,
        _ => return Ok(None),
    };

    let time_zone = raw
        .time_zone
        .as_deref()
        .ok_or(ValidationError::MissingField("timeZone"))?;
    let slot_size = raw.slot_size.ok_or(ValidationError::MissingField("slotSize"))?;

    let mut restaurant = Restaurant::new(raw.id.clone(), parse_time_zone(time_zone)?);
    restaurant.set_granularity(Duration::minutes(slot_size))?;

    for day in days {
        let slots = match day.slots.as_deref() {
            Some(slots) if !slots.is_empty() => slots,
            _ => continue,
        };
        let index = restaurant.availabilities().len();
        let daily = restaurant.add_availability(parse_day(&day.date)?);
        compact_day(daily, slots)?;
        if !daily.has_availability() {
            restaurant.remove_availability(index);
        }
    }

    Ok(restaurant.has_availability().then_some(restaurant))
}

/// Greedy left-to-right merge of one day's raw slots into `daily`.
///
/// A raw slot without party sizes is skipped and breaks the current run. A new slot
/// joins the previous one only when it starts exactly where the previous one ends
/// and offers the same party sizes; the previous slot then grows by one granularity unit.
pub fn compact_day(daily: &mut DailyAvailability, slots: &[AvailabilitySlot]) -> Result<(), ValidationError> {
    let mut previous: Option<usize> = None;

    for raw in slots {
        let party_sizes = raw.party_sizes.as_deref().unwrap_or_default();
        if party_sizes.is_empty() {
            previous = None;
            continue;
        }

        let index = daily.time_slots().len();
        let slot = daily.add_time_slot(parse_time24(&raw.time24)?);
        for entry in party_sizes {
            slot.add_party_size(entry.size);
        }

        let mergeable = previous.map_or(false, |prev| {
            let slots = daily.time_slots();
            slots[prev].end() == slots[index].start() && slots[prev].has_same_properties(&slots[index])
        });

        match previous {
            Some(prev) if mergeable => {
                daily.remove_time_slot(index);
                if let Some(slot) = daily.time_slot_mut(prev) {
                    slot.expand();
                }
            }
            _ => previous = Some(index),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::{json, Value};

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn restaurants(value: Value) -> Vec<AvailabilityRestaurant> {
        serde_json::from_value(value).unwrap()
    }

    fn single_day(slots: Value) -> Vec<AvailabilityRestaurant> {
        restaurants(json!([{
            "id": "R1",
            "timeZone": "America/Montreal",
            "slotSize": 15,
            "availability": [{"date": "2014-08-29T00:00:00", "slots": slots}]
        }]))
    }

    fn summary(restaurant: &Restaurant) -> Vec<(NaiveTime, NaiveTime, Vec<u32>)> {
        restaurant.availabilities()[0]
            .time_slots()
            .iter()
            .map(|s| (s.start_time(), s.end_time(), s.party_sizes().to_vec()))
            .collect()
    }

    #[test]
    fn test_empty_slot_breaks_the_run() {
        let result = compact(&single_day(json!([
            {"time24": "09:00", "partySizes": [{"size": 2}, {"size": 4}]},
            {"time24": "09:15", "partySizes": [{"size": 4}, {"size": 2}]},
            {"time24": "09:30", "partySizes": []},
            {"time24": "09:45", "partySizes": [{"size": 2}]}
        ])))
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(
            summary(&result[0]),
            vec![
                (time(9, 0), time(9, 30), vec![2, 4]),
                (time(9, 45), time(10, 0), vec![2]),
            ]
        );
        assert_eq!(result[0].availabilities()[0].time_slots()[0].duration(), Duration::minutes(30));
    }

    #[test]
    fn test_gap_prevents_merge() {
        let result = compact(&single_day(json!([
            {"time24": "09:00", "partySizes": [{"size": 2}]},
            {"time24": "09:30", "partySizes": [{"size": 2}]}
        ])))
        .unwrap();

        assert_eq!(
            summary(&result[0]),
            vec![
                (time(9, 0), time(9, 15), vec![2]),
                (time(9, 30), time(9, 45), vec![2]),
            ]
        );
    }

    #[test]
    fn test_different_party_sizes_prevent_merge() {
        let result = compact(&single_day(json!([
            {"time24": "18:00", "partySizes": [{"size": 2}]},
            {"time24": "18:15", "partySizes": [{"size": 2}, {"size": 3}]},
            {"time24": "18:30", "partySizes": [{"size": 3}, {"size": 2}]},
            {"time24": "18:45", "partySizes": [{"size": 3}, {"size": 2}]}
        ])))
        .unwrap();

        assert_eq!(
            summary(&result[0]),
            vec![
                (time(18, 0), time(18, 15), vec![2]),
                (time(18, 15), time(19, 0), vec![2, 3]),
            ]
        );
    }

    #[test]
    fn test_missing_party_sizes_count_as_empty() {
        let result = compact(&single_day(json!([
            {"time24": "12:00", "partySizes": [{"size": 2}]},
            {"time24": "12:15"},
            {"time24": "12:30", "partySizes": [{"size": 2}]}
        ])))
        .unwrap();

        assert_eq!(result[0].availabilities()[0].time_slots().len(), 2);
    }

    #[test]
    fn test_empty_days_and_restaurants_are_dropped() {
        let result = compact(&restaurants(json!([
            {
                "id": "EMPTY",
                "timeZone": "UTC",
                "slotSize": 15,
                "availability": [
                    {"date": "2014-08-29", "slots": [{"time24": "09:00", "partySizes": []}]},
                    {"date": "2014-08-30", "slots": []}
                ]
            },
            {
                "id": "MIXED",
                "timeZone": "UTC",
                "slotSize": 30,
                "availability": [
                    {"date": "2014-08-29", "slots": [{"time24": "09:00", "partySizes": []}]},
                    {"date": "2014-08-30", "slots": [{"time24": "19:00", "partySizes": [{"size": 6}]}]}
                ]
            },
            {"id": "CLOSED", "availability": []}
        ])))
        .unwrap();

        assert_eq!(result.len(), 1);
        let restaurant = &result[0];
        assert_eq!(restaurant.id(), "MIXED");
        assert_eq!(restaurant.granularity(), Duration::minutes(30));
        assert_eq!(restaurant.availabilities().len(), 1);
        let daily = &restaurant.availabilities()[0];
        assert_eq!(daily.day().to_string(), "2014-08-30");
        assert_eq!(daily.restaurant_id(), "MIXED");
        assert_eq!(daily.time_slots()[0].end_time(), time(19, 30));
    }

    #[test]
    fn test_days_without_slots_are_skipped_before_parsing() {
        let result = compact(&restaurants(json!([{
            "id": "R1",
            "timeZone": "UTC",
            "slotSize": 15,
            "availability": [
                {"date": "not a date", "slots": []},
                {"date": "still not a date"},
                {"date": "2014-08-30", "slots": [{"time24": "19:00", "partySizes": [{"size": 2}]}]}
            ]
        }])))
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].availabilities().len(), 1);
        assert_eq!(result[0].availabilities()[0].day().to_string(), "2014-08-30");
    }

    #[test]
    fn test_invalid_restaurant_fields() {
        let missing_zone = restaurants(json!([{
            "id": "R1",
            "slotSize": 15,
            "availability": [{"date": "2014-08-29", "slots": []}]
        }]));
        assert_eq!(compact(&missing_zone), Err(ValidationError::MissingField("timeZone")));

        let bad_slot_size = restaurants(json!([{
            "id": "R1",
            "timeZone": "UTC",
            "slotSize": 20,
            "availability": [{"date": "2014-08-29", "slots": []}]
        }]));
        assert_eq!(compact(&bad_slot_size), Err(ValidationError::InvalidGranularity(20)));
    }

    #[test]
    fn test_compacted_restaurant_answers_availability_queries() {
        let result = compact(&single_day(json!([
            {"time24": "19:00", "partySizes": [{"size": 2}, {"size": 4}]},
            {"time24": "19:15", "partySizes": [{"size": 2}, {"size": 4}]}
        ])))
        .unwrap();
        let restaurant = &result[0];
        let at = |h, m| {
            chrono::NaiveDate::from_ymd_opt(2014, 8, 29)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };

        assert!(restaurant.has_availability_at(at(19, 0), 4));
        assert!(restaurant.has_availability_at(at(19, 20), 2));
        assert!(!restaurant.has_availability_at(at(19, 30), 2));
        assert!(!restaurant.has_availability_at(at(19, 0), 3));
    }
}
