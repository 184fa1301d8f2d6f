//! Spreads restaurants and activities across the days of a trip

use crate::models::VenueRecord;

const MIN_PER_DAY: usize = 2;
const MAX_RESTAURANTS_PER_DAY: usize = 3;
const MAX_ACTIVITIES_PER_DAY: usize = 4;

/// Venues claimed by one day, in pool order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayVenues {
    pub restaurants: Vec<VenueRecord>,
    pub activities: Vec<VenueRecord>,
}

/// Allocate both pools over `days` days.
///
/// Each day claims up to its quota of still unassigned records, in order.
/// Claimed records in the pools are tagged with the day number; leftovers
/// stay unassigned.
pub fn allocate(restaurants: &mut [VenueRecord], activities: &mut [VenueRecord], days: u32) -> Vec<DayVenues> {
    if days == 0 {
        return Vec::new();
    }
    let restaurant_quota = quota(restaurants.len(), days, MAX_RESTAURANTS_PER_DAY);
    let activity_quota = quota(activities.len(), days, MAX_ACTIVITIES_PER_DAY);
    (1..=days)
        .map(|day| DayVenues {
            restaurants: claim(restaurants, day, restaurant_quota),
            activities: claim(activities, day, activity_quota),
        })
        .collect()
}

fn quota(pool: usize, days: u32, max: usize) -> usize {
    let days = usize::try_from(days).unwrap_or(usize::MAX).max(1);
    (pool / days).clamp(MIN_PER_DAY, max)
}

fn claim(pool: &mut [VenueRecord], day: u32, quota: usize) -> Vec<VenueRecord> {
    pool.iter_mut()
        .filter(|record| !record.is_assigned())
        .take(quota)
        .map(|record| {
            record.assigned_day = Some(day);
            record.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;
    use std::collections::HashSet;

    fn pool(prefix: &str, n: usize) -> Vec<VenueRecord> {
        (0..n)
            .map(|i| VenueRecord::from(Activity::generic(format!("{prefix} {i}"), "sight", "Jaipur", "INR")))
            .collect()
    }

    #[test]
    fn test_zero_days_allocates_nothing() {
        let mut restaurants = pool("R", 4);
        let mut activities = pool("A", 4);
        assert!(allocate(&mut restaurants, &mut activities, 0).is_empty());
        assert!(restaurants.iter().all(|r| !r.is_assigned()));
    }

    #[test]
    fn test_quota_is_clamped() {
        let mut restaurants = pool("R", 20);
        let mut activities = pool("A", 3);
        let days = allocate(&mut restaurants, &mut activities, 2);
        assert_eq!(days[0].restaurants.len(), 3);
        assert_eq!(days[0].activities.len(), 2);
        assert_eq!(days[1].activities.len(), 1);
        assert_eq!(days[1].activities[0].assigned_day, Some(2));
    }

    #[test]
    fn test_no_record_is_allocated_twice() {
        let mut restaurants = pool("R", 7);
        let mut activities = pool("A", 9);
        let days = allocate(&mut restaurants, &mut activities, 3);
        let mut seen = HashSet::new();
        for venue in days.iter().flat_map(|d| d.restaurants.iter().chain(&d.activities)) {
            assert!(seen.insert(venue.name().to_string()));
        }
        let assigned = restaurants.iter().chain(&activities).filter(|r| r.is_assigned()).count();
        assert_eq!(assigned, seen.len());
    }
}
