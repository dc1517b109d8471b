//! Single binary web server: REST API over the tournament engine, plus the daily
//! open/close scheduler.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, ENGINE_CONFIG (JSON file), SCHEDULER_INTERVAL_SECS,
//! SEED_DEMO_PLAYERS (seeds yesterday's tournament with random players at startup).

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{Duration as DateDuration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tournament_engine::{
    demo, tournament_id_for, write_leaderboard_csv, CloseOutcome, Engine, EngineConfig, EngineError,
    ErrorKind, GroupId, MemoryStore, PlayerId, TournamentId,
};

type AppState = Data<Engine<MemoryStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreatePlayerBody {
    username: String,
    country: String,
}

#[derive(Serialize)]
struct EnterResponse {
    group_id: GroupId,
}

#[derive(Serialize)]
struct ProgressResponse {
    tournament_id: TournamentId,
    /// Present when the event raised a tournament score.
    score: Option<u32>,
}

#[derive(Serialize)]
struct ClaimResponse {
    amount: u64,
}

#[derive(Serialize)]
struct CloseResponse<'a> {
    already_closed: bool,
    leaderboards: &'a tournament_engine::Leaderboards,
}

/// Path segment: player id (e.g. /api/players/{id})
#[derive(Deserialize)]
struct PlayerPath {
    id: PlayerId,
}

/// Path segments: player id and tournament id
#[derive(Deserialize)]
struct PlayerTournamentPath {
    id: PlayerId,
    tournament_id: TournamentId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and country code
#[derive(Deserialize)]
struct LeaderboardPath {
    id: TournamentId,
    country: String,
}

/// Path segments: tournament id and group id
#[derive(Deserialize)]
struct GroupPath {
    tournament_id: TournamentId,
    group_id: GroupId,
}

fn error_response(err: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err.kind() {
        ErrorKind::Eligibility => HttpResponse::Forbidden().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Rejected => match err {
            EngineError::AlreadyClaimed(_) => HttpResponse::Conflict().json(body),
            _ => HttpResponse::BadRequest().json(body),
        },
        ErrorKind::Conflict => HttpResponse::ServiceUnavailable().json(body),
        ErrorKind::Integrity | ErrorKind::Infra => {
            log::error!("{err}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn today() -> TournamentId {
    tournament_id_for(Utc::now().date_naive())
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine",
    })
}

/// Sign up a player.
#[post("/api/players")]
async fn api_create_player(state: AppState, body: Json<CreatePlayerBody>) -> HttpResponse {
    match state.create_player(&body.username, &body.country) {
        Ok(player) => HttpResponse::Created().json(player),
        Err(e) => error_response(&e),
    }
}

#[get("/api/players")]
async fn api_list_players(state: AppState) -> HttpResponse {
    match state.players() {
        Ok(players) => HttpResponse::Ok().json(players),
        Err(e) => error_response(&e),
    }
}

#[get("/api/players/{id}")]
async fn api_get_player(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    match state.player(path.id) {
        Ok(player) => HttpResponse::Ok().json(player),
        Err(e) => error_response(&e),
    }
}

/// Progress event (level completed) during today's tournament.
#[post("/api/players/{id}/progress")]
async fn api_record_progress(state: AppState, path: Path<PlayerPath>) -> HttpResponse {
    let tournament_id = today();
    match state.record_progress(path.id, &tournament_id) {
        Ok(score) => HttpResponse::Ok().json(ProgressResponse { tournament_id, score }),
        Err(e) => error_response(&e),
    }
}

/// Enter a tournament; returns the assigned group.
#[post("/api/players/{id}/tournaments/{tournament_id}/enter")]
async fn api_enter(state: AppState, path: Path<PlayerTournamentPath>) -> HttpResponse {
    match state.enter(&path.tournament_id, path.id) {
        Ok(group_id) => HttpResponse::Ok().json(EnterResponse { group_id }),
        Err(e) => error_response(&e),
    }
}

/// The player's group, ranked by score.
#[get("/api/players/{id}/tournaments/{tournament_id}/leaderboard")]
async fn api_group_leaderboard(state: AppState, path: Path<PlayerTournamentPath>) -> HttpResponse {
    match state.group_standings(&path.tournament_id, path.id) {
        Ok(standings) => HttpResponse::Ok().json(standings),
        Err(e) => error_response(&e),
    }
}

#[post("/api/players/{id}/tournaments/{tournament_id}/claim-reward")]
async fn api_claim_reward(state: AppState, path: Path<PlayerTournamentPath>) -> HttpResponse {
    match state.claim_reward(&path.tournament_id, path.id) {
        Ok(amount) => HttpResponse::Ok().json(ClaimResponse { amount }),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState) -> HttpResponse {
    match state.tournaments() {
        Ok(tournaments) => HttpResponse::Ok().json(tournaments),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.tournament(&path.id) {
        Ok(tournament) => HttpResponse::Ok().json(tournament),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/groups")]
async fn api_list_groups(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.groups(&path.id) {
        Ok(groups) => HttpResponse::Ok().json(groups),
        Err(e) => error_response(&e),
    }
}

#[get("/api/groups/{tournament_id}/{group_id}")]
async fn api_get_group(state: AppState, path: Path<GroupPath>) -> HttpResponse {
    match state.group(&path.tournament_id, path.group_id) {
        Ok(group) => HttpResponse::Ok().json(group),
        Err(e) => error_response(&e),
    }
}

/// Leaderboard of a closed tournament for a country code or ALL.
#[get("/api/tournaments/{id}/leaderboards/{country}")]
async fn api_leaderboard(state: AppState, path: Path<LeaderboardPath>) -> HttpResponse {
    match state.leaderboard(&path.id, &path.country) {
        Ok(board) => HttpResponse::Ok().json(board),
        Err(e) => error_response(&e),
    }
}

/// Same leaderboard as CSV.
#[get("/api/tournaments/{id}/leaderboards/{country}/csv")]
async fn api_leaderboard_csv(state: AppState, path: Path<LeaderboardPath>) -> HttpResponse {
    let board = match state.leaderboard(&path.id, &path.country) {
        Ok(board) => board,
        Err(e) => return error_response(&e),
    };
    let mut out = Vec::new();
    match write_leaderboard_csv(&board, &mut out) {
        Ok(()) => HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(out),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

/// Scheduler trigger: open a tournament (no-op if it exists).
#[post("/api/tournaments/{id}/open")]
async fn api_open_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.open_tournament(&path.id) {
        Ok(created) => HttpResponse::Ok().json(serde_json::json!({ "created": created })),
        Err(e) => error_response(&e),
    }
}

/// Scheduler trigger: close a tournament and compute its leaderboards.
#[post("/api/tournaments/{id}/close")]
async fn api_close_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.close(&path.id) {
        Ok(outcome) => HttpResponse::Ok().json(CloseResponse {
            already_closed: matches!(outcome, CloseOutcome::AlreadyClosed(_)),
            leaderboards: outcome.leaderboards(),
        }),
        Err(e) => error_response(&e),
    }
}

/// Open today's and tomorrow's tournaments and close yesterday's.
fn run_daily_jobs(engine: &Engine<MemoryStore>) {
    let date = Utc::now().date_naive();
    for day in [date, date + DateDuration::days(1)] {
        if let Err(e) = engine.open_tournament(&tournament_id_for(day)) {
            log::error!("Could not open tournament for {day}: {e}");
        }
    }
    let yesterday = tournament_id_for(date - DateDuration::days(1));
    match engine.close(&yesterday) {
        Ok(_) | Err(EngineError::TournamentNotFound(_)) => {}
        Err(e) => log::error!("Could not close tournament {yesterday}: {e}"),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_scheduler_interval() -> u64 {
    3600
}

fn load_config() -> EngineConfig {
    match std::env::var("ENGINE_CONFIG") {
        Ok(path) => match EngineConfig::from_json_file(&path) {
            Ok(config) => {
                log::info!("Loaded engine config from {path}");
                config
            }
            Err(e) => {
                log::warn!("Ignoring engine config {path}: {e}");
                EngineConfig::default()
            }
        },
        Err(_) => EngineConfig::default(),
    }
}

/// Fill yesterday's tournament with random players so the close job has data.
fn seed_demo_players(engine: &Engine<MemoryStore>, count: usize) {
    let yesterday = Utc::now().date_naive() - DateDuration::days(1);
    let entered_at = yesterday.and_time(NaiveTime::MIN).and_utc();
    let tournament_id = tournament_id_for(yesterday);
    if let Err(e) = demo::seed_demo(engine, &tournament_id, count, entered_at, &mut rand::thread_rng()) {
        log::error!("Could not seed demo players: {e}");
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let interval_secs: u64 = std::env::var("SCHEDULER_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(default_scheduler_interval);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(Engine::new(MemoryStore::new(), load_config()));

    if let Some(count) = std::env::var("SEED_DEMO_PLAYERS")
        .ok()
        .and_then(|n| n.parse::<usize>().ok())
    {
        seed_demo_players(&state, count);
    }

    // Background task: open/close tournaments; runs immediately, then every interval
    let state_scheduler = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            interval.tick().await;
            run_daily_jobs(&state_scheduler);
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_player)
            .service(api_list_players)
            .service(api_get_player)
            .service(api_record_progress)
            .service(api_enter)
            .service(api_group_leaderboard)
            .service(api_claim_reward)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_list_groups)
            .service(api_get_group)
            .service(api_leaderboard_csv)
            .service(api_leaderboard)
            .service(api_open_tournament)
            .service(api_close_tournament)
    })
    .bind(bind)?
    .run()
    .await
}
