//! Builds one time-blocked day from allocated venues and the day's weather

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::allocator::DayVenues;
use crate::generators::request_structured;
use crate::models::{
    Activity, BlockType, Cost, DayItinerary, DayWeather, Links, TimeBlock, TravelOption, TripRequest,
    VenueRecord, Warning,
};
use crate::providers::ContentProvider;

const BLOCKS_REQUESTED: usize = 5;
const MIN_USABLE_BLOCKS: usize = 3;
const LOCAL_TRANSFER_MINUTES: u32 = 20;
pub(crate) const LOCAL_OPERATOR: &str = "Local operator";

const SYSTEM: &str = "You are an expert travel planner. Build realistic, well-paced daily \
schedules using only the venues provided, with sensible travel between them.";

#[derive(Debug, Deserialize)]
struct DraftDay {
    #[serde(default)]
    time_blocks: Vec<Value>,
}

pub struct DayAssembler<'a> {
    content: &'a dyn ContentProvider,
    request: &'a TripRequest,
}

impl<'a> DayAssembler<'a> {
    #[must_use]
    pub fn new(content: &'a dyn ContentProvider, request: &'a TripRequest) -> Self {
        Self { content, request }
    }

    /// Generated schedule, or the fixed meal and activity layout when generation falls short
    #[instrument(skip(self, weather, venues), fields(destination = %self.request.destination()))]
    pub async fn assemble(
        &self,
        day_number: u32,
        date: NaiveDate,
        weather: &DayWeather,
        venues: &DayVenues,
    ) -> DayItinerary {
        let drafted = match self.draft(day_number, date, weather, venues).await {
            Ok(blocks) if blocks.len() >= MIN_USABLE_BLOCKS => Some(blocks),
            Ok(blocks) => {
                warn!(usable = blocks.len(), "Too few usable blocks, using default layout");
                None
            }
            Err(err) => {
                warn!(error = %err, "Day generation failed, using default layout");
                None
            }
        };
        let mut time_blocks = match drafted {
            Some(blocks) => blocks
                .into_iter()
                .map(|block| self.enrich(block, venues))
                .collect(),
            None => self.fallback_blocks(venues),
        };
        for block in &mut time_blocks {
            self.finish(block, weather);
        }
        info!(day_number, blocks = time_blocks.len(), "Day assembled");
        DayItinerary {
            day_number,
            date,
            weather: weather.clone(),
            time_blocks,
        }
    }

    async fn draft(
        &self,
        day_number: u32,
        date: NaiveDate,
        weather: &DayWeather,
        venues: &DayVenues,
    ) -> crate::Result<Vec<TimeBlock>> {
        let prompt = self.prompt(day_number, date, weather, venues);
        let draft: DraftDay = request_structured(self.content, &prompt, SYSTEM).await?;
        Ok(usable_blocks(draft.time_blocks))
    }

    fn prompt(&self, day_number: u32, date: NaiveDate, weather: &DayWeather, venues: &DayVenues) -> String {
        let request = self.request;
        format!(
            r#"Plan day {day_number} ({date}) of a trip to {destination}.

Weather: {conditions}, {min:.0}-{max:.0} °C. {advisory}
Pace: {pace}. Travelers: {travelers}. Dietary preferences: {dietary}.
Restaurants for this day: {restaurants}
Activities for this day: {activities}

Create exactly {count} time blocks in chronological order. Use the restaurant and activity
names above verbatim as activity titles.

Return JSON:
{{
  "time_blocks": [{{
    "type": "fixed" | "flexible",
    "start_time": "HH:MM", "end_time": "HH:MM",
    "activity": {{"title": string, "type": string, "description": string}},
    "travel": {{"mode": string, "details": string, "duration": integer (minutes),
               "cost": {{"currency": "{currency}", "range": string}}, "operator": string}},
    "warnings": [{{"type": string, "message": string, "priority": integer (1-3)}}]
  }}]
}}"#,
            destination = request.destination(),
            conditions = weather.conditions,
            min = weather.temperature.min,
            max = weather.temperature.max,
            advisory = weather.advisory,
            pace = request.preferences.pace,
            travelers = request.travelers_label(),
            dietary = request.dietary_label(),
            restaurants = venue_names(&venues.restaurants),
            activities = venue_names(&venues.activities),
            count = BLOCKS_REQUESTED,
            currency = request.currency(),
        )
    }

    /// Replace the drafted activity with the matching venue, or a generic record
    fn enrich(&self, mut block: TimeBlock, venues: &DayVenues) -> TimeBlock {
        let drafted = block.activity.take().unwrap_or_else(|| {
            Activity::generic("Free time", "leisure", self.request.destination(), self.request.currency())
        });
        let matched = find_venue(&venues.restaurants, &drafted.title)
            .or_else(|| find_venue(&venues.activities, &drafted.title));
        block.activity = Some(match matched {
            Some(venue) => self.from_venue(venue),
            None => {
                debug!(title = %drafted.title, "No venue match");
                let kind = if drafted.activity_type.trim().is_empty() {
                    "activity"
                } else {
                    drafted.activity_type.as_str()
                };
                let mut generic =
                    Activity::generic(&drafted.title, kind, self.request.destination(), self.request.currency());
                if !drafted.description.trim().is_empty() {
                    generic.description = drafted.description;
                }
                generic
            }
        });
        block
    }

    fn from_venue(&self, venue: &VenueRecord) -> Activity {
        let mut activity = venue.activity.clone();
        activity.cost.currency = self.request.currency().to_string();
        activity.location.ensure_map_link(&format!("{} {}", venue.name(), self.request.destination()));
        activity.links.canonicalize();
        activity
    }

    fn fallback_blocks(&self, venues: &DayVenues) -> Vec<TimeBlock> {
        let destination = self.request.destination();
        let currency = self.request.currency();
        let restaurant = |i: usize| venues.restaurants.get(i).map(|v| self.from_venue(v));
        let activity = |i: usize| venues.activities.get(i).map(|v| self.from_venue(v));

        let slots = [
            (
                BlockType::Fixed,
                (8, 0),
                (9, 0),
                restaurant(0).or_else(|| Some(Activity::generic("Breakfast at a local café", "dining", destination, currency))),
            ),
            (
                BlockType::Flexible,
                (9, 30),
                (12, 30),
                activity(0).or_else(|| Some(Activity::generic(format!("Explore {destination}"), "sightseeing", destination, currency))),
            ),
            (BlockType::Fixed, (13, 0), (14, 0), restaurant(1)),
            (BlockType::Flexible, (14, 30), (17, 30), activity(1)),
            (
                BlockType::Fixed,
                (19, 0),
                (20, 30),
                restaurant(2)
                    .or_else(|| restaurant(0))
                    .or_else(|| Some(Activity::generic("Dinner at a local restaurant", "dining", destination, currency))),
            ),
        ];
        slots
            .into_iter()
            .filter_map(|(block_type, start, end, activity)| {
                let mut block = TimeBlock::new(block_type, clock(start), clock(end));
                block.activity = Some(activity?);
                Some(block)
            })
            .collect()
    }

    /// Every block travels somewhere and carries at least one warning
    fn finish(&self, block: &mut TimeBlock, weather: &DayWeather) {
        let currency = self.request.currency();
        let title = block.title().unwrap_or("the next stop").to_string();
        let travel = block.travel.get_or_insert_with(|| TravelOption {
            mode: "taxi".to_string(),
            details: format!("Local transfer to {title}"),
            duration: Some(LOCAL_TRANSFER_MINUTES),
            cost: Cost::new(currency, "Varies"),
            links: Links::default(),
            operator: None,
        });
        if travel.mode.trim().is_empty() {
            travel.mode = "taxi".to_string();
        }
        if travel.details.trim().is_empty() {
            travel.details = format!("Local transfer to {title}");
        }
        travel.duration.get_or_insert(LOCAL_TRANSFER_MINUTES);
        let walking = travel.mode.to_lowercase().contains("walk");
        if travel.operator.as_deref().is_none_or(|o| o.trim().is_empty()) {
            travel.operator = Some(if walking { "On foot" } else { LOCAL_OPERATOR }.to_string());
        }
        if walking {
            travel.cost = Cost::new(currency, "0");
        } else if travel.cost.currency.trim().is_empty() {
            travel.cost.currency = currency.to_string();
        }
        if block.warnings.is_empty() {
            block.warnings.push(Warning::new("weather", weather.advisory.clone(), 3));
        }
    }
}

fn venue_names(records: &[VenueRecord]) -> String {
    let names: Vec<&str> = records.iter().map(VenueRecord::name).collect();
    serde_json::to_string(&names).unwrap_or_default()
}

fn clock((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Blocks that parse, have a titled activity and a positive span, in start order
fn usable_blocks(raw: Vec<Value>) -> Vec<TimeBlock> {
    let mut blocks: Vec<TimeBlock> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value::<TimeBlock>(value).ok())
        .filter(|block| block.title().is_some_and(|t| !t.trim().is_empty()))
        .filter(|block| block.end_time > block.start_time)
        .map(|mut block| {
            block.duration_minutes = crate::models::itinerary::minutes_between(block.start_time, block.end_time);
            block
        })
        .collect();
    blocks.sort_by_key(|block| block.start_time);
    blocks
}

/// Venue whose name contains the title or is contained in it, ignoring case
fn find_venue<'v>(pool: &'v [VenueRecord], title: &str) -> Option<&'v VenueRecord> {
    let title = title.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }
    pool.iter().find(|venue| {
        let name = venue.name().trim().to_lowercase();
        !name.is_empty() && (title.contains(&name) || name.contains(&title))
    })
}
