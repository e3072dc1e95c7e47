use std::error::Error;

use booking::{
    domain::{
        core::{
            build_nearby_graph, validate_guests, City, HotelId, NearbyOptions, Reservation,
            ReservationId, RoomId, RouteEdge, RouteGraph,
        },
        reserve::ReservationService,
        IdGeneratorTask, ID_GENERATOR,
    },
    infrastructure::core::{InMemoryAvailabilityChecker, InMemoryReservationRepository},
    BookingConfig,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() {
    match BookingConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .with_writer(std::io::stderr)
                .init();
            if let Err(error) = run(config).await {
                error!("replay failed: {}", error);
                std::process::exit(1);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            error!("could not load configuration: {}", error);
            std::process::exit(1);
        }
    }
}

async fn run(config: BookingConfig) -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: booking_replay <journal.json>")?;
    let journal = tokio::fs::read_to_string(&path).await?;
    let commands: Vec<Command> = serde_json::from_str(&journal)?;
    info!(path = %path, commands = commands.len(), "replaying journal");

    let mut replay = Replay::new(config, ID_GENERATOR.clone());
    for command in commands {
        println!("{}", replay.apply(command).await);
    }
    Ok(())
}

/// One journal entry
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command {
    Create {
        id: Option<ReservationId>,
        hotel_id: HotelId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: u32,
    },
    EditDates {
        id: ReservationId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    Cancel {
        id: ReservationId,
    },
    Find {
        id: ReservationId,
    },
    Nearby {
        destination: City,
        cities: Vec<City>,
        options: Option<NearbyOptions>,
    },
    Route {
        edges: Vec<RouteEdge>,
        city: String,
    },
}

struct Replay {
    config: BookingConfig,
    ids: IdGeneratorTask,
    service: ReservationService<InMemoryReservationRepository, InMemoryAvailabilityChecker>,
}

impl Replay {
    fn new(config: BookingConfig, ids: IdGeneratorTask) -> Self {
        let repository = InMemoryReservationRepository::new();
        let availability = repository.availability();
        Self {
            config,
            ids,
            service: ReservationService::new(repository, availability),
        }
    }

    /// Runs one command; failures become an `error` line and never stop the replay.
    async fn apply(&mut self, command: Command) -> Value {
        match self.execute(command).await {
            Ok(value) => json!({ "ok": value }),
            Err(e) => {
                warn!("command failed: {}", e);
                json!({ "error": e.to_string() })
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Result<Value, Box<dyn Error>> {
        match command {
            Command::Create {
                id,
                hotel_id,
                room_id,
                check_in,
                check_out,
                guests,
            } => {
                if let Some(capacity) = self.config.capacity_of(&room_id) {
                    if !validate_guests(guests, capacity) {
                        return Err(format!(
                            "{} guests do not fit in {} (capacity {})",
                            guests, room_id, capacity
                        )
                        .into());
                    }
                }
                let id = match id {
                    Some(id) => id,
                    None => self
                        .ids
                        .generate::<ReservationId>()
                        .await
                        .ok_or("id generator stopped")?,
                };
                let rsvp =
                    Reservation::confirmed(id, hotel_id, room_id, check_in, check_out, guests)?;
                Ok(serde_json::to_value(self.service.create(rsvp).await?)?)
            }
            Command::EditDates {
                id,
                check_in,
                check_out,
            } => Ok(serde_json::to_value(
                self.service.edit_dates(&id, check_in, check_out).await?,
            )?),
            Command::Cancel { id } => Ok(serde_json::to_value(self.service.cancel(&id).await?)?),
            Command::Find { id } => Ok(serde_json::to_value(self.service.find(&id).await?)?),
            Command::Nearby {
                destination,
                cities,
                options,
            } => {
                let options = options.unwrap_or(self.config.nearby);
                Ok(serde_json::to_value(build_nearby_graph(
                    &destination,
                    cities,
                    &options,
                )?)?)
            }
            Command::Route { edges, city } => {
                let graph = RouteGraph::from_edges(&edges)?;
                Ok(json!({
                    "city": city,
                    "neighbors": graph.neighbors(&city),
                    "size": graph.size(),
                    "edge_count": graph.edge_count(),
                }))
            }
        }
    }
}
