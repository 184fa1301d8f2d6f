//! End-to-end itinerary generation
//!
//! The coordinator validates the request, runs the five component generators
//! concurrently, spreads venues over the days, assembles each day, and hands
//! the aggregated document to the schema normalizer. Every outbound call goes
//! through a semaphore owned by the coordinator.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use futures::future::join_all;
use rand::RngExt;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument};

use crate::config::{AventraConfig, DayScheduling, GenerationConfig};
use crate::generators::{accommodations, activities, essentials, meta, transport, weather};
use crate::models::components::fallback_travel_option;
use crate::models::{
    BudgetBreakdown, BudgetShares, DayItinerary, DayWeather, ItineraryDocument, Metadata, MetaInfo,
    Recommendations, TotalBudget, TransportOptions, TripPreferences, TripRequest, VenueRecord,
};
use crate::normalize::schema::DEFAULT_BUDGET;
use crate::normalize::{NormalizeContext, normalize};
use crate::planning::{DayAssembler, DayVenues, allocate, transit_block};
use crate::providers::Providers;
use crate::{Result, TravelAiError};

const DEFAULT_DAY_START: (u32, u32) = (8, 0);

struct DayPlan {
    day_number: u32,
    date: NaiveDate,
    weather: DayWeather,
    venues: DayVenues,
}

pub struct ItineraryCoordinator {
    providers: Providers,
    config: GenerationConfig,
    permits: Arc<Semaphore>,
}

impl ItineraryCoordinator {
    /// Wrap every provider behind a shared semaphore of `max_concurrency` permits
    #[must_use]
    pub fn new(providers: Providers, config: GenerationConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            providers: providers.throttled(&permits),
            config,
            permits,
        }
    }

    pub fn from_config(config: &AventraConfig) -> Result<Self> {
        let providers = Providers::from_config(config)?;
        Ok(Self::new(providers, config.generation.clone()))
    }

    /// Stop accepting work; calls still queued for a permit fail
    pub fn shutdown(&self) {
        info!("Closing provider permits");
        self.permits.close();
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.permits.is_closed()
    }

    #[instrument(skip_all, fields(destination = %request.destination(), days = request.duration_days()))]
    pub async fn generate_itinerary(&self, request: TripRequest) -> Result<ItineraryDocument> {
        request.validate()?;
        if self.is_shut_down() {
            return Err(TravelAiError::generation("Coordinator has been shut down"));
        }
        let budget = self.config.request_timeout();
        let document = tokio::time::timeout(budget, self.run(&request))
            .await
            .map_err(|_| TravelAiError::timeout(budget.as_secs()))?;
        info!(days = document.itinerary.len(), "Itinerary generated");
        Ok(document)
    }

    async fn run(&self, request: &TripRequest) -> ItineraryDocument {
        let providers = &self.providers;
        let mut metadata = build_metadata(request);

        let (meta_info, transport, catalog, lodging, forecast) = tokio::join!(
            meta::generate(providers, request),
            transport::generate(providers, request),
            activities::generate(providers, request),
            accommodations::generate(providers, request),
            weather::generate(providers, request),
        );
        debug!(
            activities = catalog.len(),
            dining = lodging.dining.len(),
            "Components generated"
        );

        let mut restaurants: Vec<VenueRecord> = lodging.dining.iter().cloned().map(VenueRecord::from).collect();
        let mut sights: Vec<VenueRecord> = catalog.iter().cloned().map(VenueRecord::from).collect();
        let day_count = u32::try_from(request.duration_days()).unwrap_or(0);
        let allocation = allocate(&mut restaurants, &mut sights, day_count);

        let plans: Vec<DayPlan> = request
            .date_range()
            .into_iter()
            .zip(allocation)
            .zip(1..)
            .map(|((date, venues), day_number)| DayPlan {
                day_number,
                date,
                weather: forecast.for_date(date),
                venues,
            })
            .collect();

        let (mut days, essential_info, trip_name) = tokio::join!(
            self.build_days(request, &plans),
            essentials::essential_info(providers, request),
            essentials::trip_name(providers, request),
        );
        prepend_transit(&mut days, request, &meta_info, &transport);

        metadata.trip_name = trip_name.trip_name;
        let mut document = ItineraryDocument {
            metadata,
            itinerary: days,
            recommendations: Recommendations {
                accommodations: lodging.accommodations,
                dining: lodging.dining,
                transportation: transportation(&transport, request),
            },
            essential_info,
            journey_path: meta_info.journey_path,
        };
        normalize(
            &mut document,
            &NormalizeContext {
                destination: request.destination().to_string(),
                additional_context: request.additional_context.clone(),
            },
        );
        document
    }

    /// Assemble every day, concurrently or one after another, keeping day order
    async fn build_days(&self, request: &TripRequest, plans: &[DayPlan]) -> Vec<DayItinerary> {
        let assembler = DayAssembler::new(self.providers.content.as_ref(), request);
        match self.config.day_scheduling {
            DayScheduling::Concurrent => {
                join_all(
                    plans
                        .iter()
                        .map(|plan| assembler.assemble(plan.day_number, plan.date, &plan.weather, &plan.venues)),
                )
                .await
            }
            DayScheduling::Sequential => {
                let mut days = Vec::with_capacity(plans.len());
                for (i, plan) in plans.iter().enumerate() {
                    if i > 0 && self.config.inter_day_delay_ms > 0 {
                        tokio::time::sleep(self.inter_day_delay()).await;
                    }
                    days.push(
                        assembler
                            .assemble(plan.day_number, plan.date, &plan.weather, &plan.venues)
                            .await,
                    );
                }
                days
            }
        }
    }

    fn inter_day_delay(&self) -> Duration {
        let jitter: f64 = rand::rng().random_range(0.9..1.1);
        Duration::from_millis((self.config.inter_day_delay_ms as f64 * jitter) as u64)
    }
}

/// Metadata computed from the request alone
fn build_metadata(request: &TripRequest) -> Metadata {
    let shares = BudgetShares::for_styles(&request.trip_style);
    let (total, ceiling) = match &request.budget {
        Some(budget) => (budget.ceiling.to_string(), budget.ceiling),
        None => ("Budget not specified".to_string(), DEFAULT_BUDGET),
    };
    Metadata {
        trip_name: String::new(),
        origin: request.origin().to_string(),
        destination: request.destination().to_string(),
        trip_type: request.trip_style.clone(),
        duration_days: u32::try_from(request.duration_days()).unwrap_or(0),
        total_budget: TotalBudget {
            currency: request.currency().to_string(),
            total: Some(total),
            range: None,
            breakdown: Some(BudgetBreakdown::split(ceiling, shares)),
        },
        preferences: TripPreferences {
            dietary_restrictions: request.preferences.dietary_preferences.clone(),
            accessibility_needs: request.accessibility_needs(),
            pace: request.preferences.pace.clone(),
            context: request.additional_context.clone(),
        },
    }
}

fn prepend_transit(days: &mut [DayItinerary], request: &TripRequest, meta: &MetaInfo, transport: &TransportOptions) {
    let Some(first_day) = days.first_mut() else {
        return;
    };
    let first_start = first_day
        .time_blocks
        .first()
        .map(|block| block.start_time)
        .or_else(|| NaiveTime::from_hms_opt(DEFAULT_DAY_START.0, DEFAULT_DAY_START.1, 0))
        .unwrap_or(NaiveTime::MIN);
    let mode = transport.primary_mode();
    let block = transit_block(request, meta.origin, meta.destination, mode.as_deref(), first_start);
    first_day.time_blocks.insert(0, block);
}

fn transportation(transport: &TransportOptions, request: &TripRequest) -> Vec<crate::models::TravelOption> {
    let options = transport.flatten();
    if options.is_empty() {
        vec![fallback_travel_option(request)]
    } else {
        options
    }
}
