//! Final structural passes that make an assembled document uniform
//!
//! The passes run in a fixed order and are idempotent: normalizing an already
//! normalized document changes nothing.

use tracing::debug;

use crate::models::{BudgetBreakdown, BudgetShares, GeoLocation, ItineraryDocument, Links};

/// Budget assumed when the stated total cannot be read as a number
pub const DEFAULT_BUDGET: u64 = 50_000;

const DEFAULT_CONTEXT: &str = "Personalized travel experience";

/// Request details the passes need
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    pub destination: String,
    pub additional_context: Option<String>,
}

/// Apply every pass to `doc` in order
pub fn normalize(doc: &mut ItineraryDocument, ctx: &NormalizeContext) {
    canonicalize_links(doc);
    ensure_map_links(doc, &ctx.destination);
    adjust_budget(doc);
    hoist_activity_warnings(doc);
    default_context(doc, ctx.additional_context.as_deref());
    debug!(days = doc.itinerary.len(), "Document normalized");
}

fn all_links(doc: &mut ItineraryDocument) -> impl Iterator<Item = &mut Links> {
    let recs = &mut doc.recommendations;
    let blocks = doc.itinerary.iter_mut().flat_map(|day| day.time_blocks.iter_mut());
    blocks
        .flat_map(|block| {
            let activity = block.activity.as_mut().map(|a| &mut a.links);
            let travel = block.travel.as_mut().map(|t| &mut t.links);
            activity.into_iter().chain(travel)
        })
        .chain(recs.accommodations.iter_mut().map(|a| &mut a.links))
        .chain(recs.dining.iter_mut().map(|d| &mut d.links))
        .chain(recs.transportation.iter_mut().map(|t| &mut t.links))
}

fn all_locations(doc: &mut ItineraryDocument) -> impl Iterator<Item = &mut GeoLocation> {
    let recs = &mut doc.recommendations;
    doc.itinerary
        .iter_mut()
        .flat_map(|day| day.time_blocks.iter_mut())
        .filter_map(|block| block.activity.as_mut().map(|a| &mut a.location))
        .chain(recs.accommodations.iter_mut().map(|a| &mut a.location))
        .chain(recs.dining.iter_mut().map(|d| &mut d.location))
}

fn canonicalize_links(doc: &mut ItineraryDocument) {
    all_links(doc).for_each(Links::canonicalize);
}

fn ensure_map_links(doc: &mut ItineraryDocument, destination: &str) {
    for location in all_locations(doc) {
        location.ensure_map_link(destination);
    }
}

fn adjust_budget(doc: &mut ItineraryDocument) {
    let budget = &mut doc.metadata.total_budget;
    if budget.total.is_none() {
        budget.total = budget.range.take();
    }
    if budget.breakdown.is_none() {
        let total = budget
            .total
            .as_deref()
            .and_then(|t| t.replace(',', "").trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_BUDGET);
        budget.breakdown = Some(BudgetBreakdown::split(total, BudgetShares::STANDARD));
    }
}

fn hoist_activity_warnings(doc: &mut ItineraryDocument) {
    for block in doc.itinerary.iter_mut().flat_map(|day| day.time_blocks.iter_mut()) {
        if let Some(activity) = block.activity.as_mut() {
            block.warnings.append(&mut activity.warnings);
        }
    }
}

fn default_context(doc: &mut ItineraryDocument, additional_context: Option<&str>) {
    let preferences = &mut doc.metadata.preferences;
    let missing = preferences
        .context
        .as_deref()
        .is_none_or(|c| c.trim().is_empty());
    if missing {
        let context = additional_context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTEXT);
        preferences.context = Some(context.to_string());
    }
}
