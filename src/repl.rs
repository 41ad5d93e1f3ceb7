//! Interactive terminal chat
//!
//! Line-oriented front end over [`Workflows`]: plain input is a chat turn,
//! slash commands drive the location features. Failures are printed as chat
//! lines; nothing is retried without an explicit command.

use crate::api::{ChatHistoryEntry, NearbyPlace, PlaceCard, RouteResponse};
use crate::format::{format_distance, format_fare, format_time};
use crate::route_flow::RouteFlowState;
use crate::workflow::Workflows;
use std::io::{BufRead, Write};

const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
const DEFAULT_NEARBY_LIMIT: u32 = 10;
const ALL_HISTORY_LIMIT: u32 = 50;

/// Connector printed between itinerary steps, never after the last one.
const STEP_CONNECTOR: &str = "   ↓";

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Chat(&'a str),
    Route(&'a str),
    Retry,
    Nearby { radius_km: f64, limit: u32 },
    Distance(&'a str),
    History { all: bool },
    Context,
    Reset,
    Help,
    Quit,
    Empty,
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        if !line.starts_with('/') {
            return Command::Chat(line);
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("/route") => match words.next() {
                Some(id) => Command::Route(id),
                None => Command::Help,
            },
            Some("/retry") => Command::Retry,
            Some("/nearby") => {
                let radius_km = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
                let limit = words
                    .next()
                    .and_then(|w| w.parse().ok())
                    .unwrap_or(DEFAULT_NEARBY_LIMIT);
                Command::Nearby { radius_km, limit }
            }
            Some("/distance") => {
                // The rest of the line is the place name, spaces included.
                let name = line["/distance".len()..].trim();
                if name.is_empty() {
                    Command::Help
                } else {
                    Command::Distance(name)
                }
            }
            Some("/history") => Command::History {
                all: words.next() == Some("all"),
            },
            Some("/context") => Command::Context,
            Some("/reset") => Command::Reset,
            Some("/quit") | Some("/exit") => Command::Quit,
            _ => Command::Help,
        }
    }
}

pub async fn run(workflows: &Workflows) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    println!("LocaTour. Ask about places in Ilocos, or /help for commands.");

    // The last route flow, kept across turns so /retry can resume it.
    let mut last_flow: Option<FlowMemory> = None;

    loop {
        print!("you> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => print_help(),
            command => dispatch(workflows, command, &mut last_flow).await,
        }
    }

    Ok(())
}

/// Route flow retained between turns so `/retry` can resume it.
struct FlowMemory {
    destination_id: String,
    state: RouteFlowState,
}

async fn dispatch(
    workflows: &Workflows,
    command: Command<'_>,
    last_flow: &mut Option<FlowMemory>,
) {
    match command {
        Command::Chat(message) => match workflows.send_chat_message(message).await {
            Ok(resp) => {
                println!("bot> {}", resp.response);
                if let Some(card) = resp.display_card() {
                    println!("{}", render_card(card));
                }
            }
            Err(e) => println!("bot> {e}"),
        },

        Command::Route(destination_id) => {
            let state = workflows.fetch_route_details(destination_id).await;
            print_flow_outcome(&state);
            *last_flow = Some(FlowMemory {
                destination_id: destination_id.to_string(),
                state,
            });
        }

        Command::Retry => match last_flow.take() {
            Some(flow) => {
                let state = workflows
                    .retry_route_details(&flow.destination_id, flow.state)
                    .await;
                print_flow_outcome(&state);
                *last_flow = Some(FlowMemory {
                    destination_id: flow.destination_id,
                    state,
                });
            }
            None => println!("bot> Nothing to retry yet. Use /route first."),
        },

        Command::Nearby { radius_km, limit } => {
            match workflows.nearby_from_current_location(radius_km, limit).await {
                Ok(places) if places.is_empty() => {
                    println!("bot> No places found within {}.", format_distance(radius_km));
                }
                Ok(places) => print!("{}", render_nearby(&places)),
                Err(e) => println!("bot> {e}"),
            }
        }

        Command::Distance(name) => match workflows.distance_to_place(name).await {
            Ok((place, km)) => println!(
                "bot> {} is {} away as the crow flies.",
                place.location,
                format_distance(km)
            ),
            Err(e) => println!("bot> {e}"),
        },

        Command::History { all } => {
            let result = if all {
                workflows.all_history(ALL_HISTORY_LIMIT).await
            } else {
                workflows.conversation_history().await
            };
            match result {
                Ok(entries) if entries.is_empty() => println!("bot> No conversation yet."),
                Ok(entries) => print!("{}", render_history(&entries)),
                Err(e) => println!("bot> {e}"),
            }
        }

        Command::Context => match workflows.conversation_context().await {
            Ok(context) => println!(
                "bot> {}",
                serde_json::to_string_pretty(&context).unwrap_or_default()
            ),
            Err(e) => println!("bot> {e}"),
        },

        Command::Reset => match workflows.reset_conversation().await {
            Ok(()) => println!("bot> Conversation reset. Starting fresh!"),
            Err(e) => println!("bot> Reset failed: {e}. Try /reset again."),
        },

        Command::Empty | Command::Help | Command::Quit => unreachable!("handled by caller"),
    }
}

fn print_flow_outcome(state: &RouteFlowState) {
    match state {
        RouteFlowState::Ready { route, .. } => print!("{}", render_route(route)),
        RouteFlowState::Error { message, kind } => {
            println!("bot> {message}");
            if kind.is_retryable() {
                println!("     Type /retry to try again.");
            }
        }
        // The driver only settles in Ready or Error.
        other => tracing::warn!(state = ?other, "route flow settled in unexpected state"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /route <destination_id>   travel details from your location");
    println!("  /retry                    retry a failed /route");
    println!("  /nearby [radius_km] [n]   places around you (default 5km, 10 results)");
    println!("  /distance <place>         straight-line distance from you to a place");
    println!("  /history [all]            this session's conversation, or all sessions");
    println!("  /context                  server-side conversation context");
    println!("  /reset                    start a fresh conversation");
    println!("  /quit                     exit");
    println!("Anything else is sent to the chatbot.");
}

fn render_card(card: &PlaceCard) -> String {
    let mut out = String::new();
    out.push_str(&format!("     ┌ {}", card.name));
    if let Some(kind) = &card.kind {
        out.push_str(&format!(" ({kind})"));
    }
    out.push('\n');
    if !card.location.is_empty() {
        out.push_str(&format!("     │ {}\n", card.location));
    }
    if let Some(best) = &card.best_time_to_visit {
        out.push_str(&format!("     │ Best time: {best}\n"));
    }
    if card.has_routing {
        out.push_str(&format!(
            "     └ Directions: /route {}\n",
            card.destination_id
        ));
    } else {
        out.push_str("     └ No routing data for this spot.\n");
    }
    out
}

fn render_route(route: &RouteResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Route to {} ({})\n",
        route.destination_name, route.destination_location
    ));

    for (i, step) in route.steps.iter().enumerate() {
        let mut line = format!(
            " {}. [{}] {}: {} · {}",
            step.step_number,
            step.transport_mode.label(),
            step.instruction,
            format_distance(step.distance_km),
            format_time(step.estimated_time_minutes),
        );
        if let Some(fare) = step.fare {
            line.push_str(&format!(" · {}", format_fare(fare)));
        }
        if let Some(landmark) = &step.landmark {
            line.push_str(&format!(" (near {landmark})"));
        }
        out.push_str(&line);
        out.push('\n');

        // Connector between steps; the final step closes the list.
        if i + 1 < route.steps.len() {
            out.push_str(STEP_CONNECTOR);
            out.push('\n');
        }
    }

    out.push_str(&format!(
        "Total: {} · {} · {}\n",
        format_distance(route.total_distance_km),
        format_time(route.total_time_minutes),
        format_fare(route.total_fare),
    ));
    for warning in &route.warnings {
        out.push_str(&format!("! {warning}\n"));
    }
    out
}

fn render_nearby(places: &[NearbyPlace]) -> String {
    let mut out = String::new();
    for place in places {
        out.push_str(&format!(
            " • {} ({}): {}, {} away",
            place.name,
            place.kind,
            place.location,
            format_distance(place.distance_km),
        ));
        if place.walking_distance {
            match place.estimated_walking_time {
                Some(mins) => out.push_str(&format!(", {} on foot", format_time(mins))),
                None => out.push_str(", walkable"),
            }
        }
        out.push('\n');
    }
    out
}

fn render_history(entries: &[ChatHistoryEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("you> {}\n", entry.user_message));
        out.push_str(&format!("bot> {}\n", entry.bot_response));
    }
    out
}
