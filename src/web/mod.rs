//! Local observer server.
//!
//! Runs the simulation on a blocking worker and streams one frame per tick
//! over SSE. Strictly a consumer of the engine's update feed; nothing here
//! feeds back into the simulation.

mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Response,
    },
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::info;

use crate::{
    engine::{EngineBuilder, EngineSettings},
    scenario::Scenario,
};

#[derive(Clone, Serialize)]
struct PlayerFrame {
    name: String,
    alive: bool,
    tiles_owned: usize,
    troops: f64,
    workers: f64,
    gold: u64,
}

#[derive(Clone, Serialize)]
pub struct UiFrame {
    tick: u64,
    state_hash: u64,
    update_count: usize,
    players: Vec<PlayerFrame>,
    completed: bool,
}

#[derive(Clone, Serialize)]
struct StateEnvelope {
    scenario: String,
    total_ticks: u64,
    frame: Option<UiFrame>,
    completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<UiFrame>>>,
    total_ticks: u64,
    scenario_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub ticks: u64,
    pub snapshot_interval: u64,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        ticks,
        snapshot_interval,
        snapshot_dir,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let mut game = scenario.build_game();
    let settings = EngineSettings {
        scenario_name: scenario_name.clone(),
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };
    let mut engine = EngineBuilder::new(settings)
        .with_standard_executions(&game)
        .build();

    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<UiFrame>>> = Arc::new(Mutex::new(None));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        engine.run_with_hook(&mut game, ticks, |game, summary| {
            let frame = UiFrame {
                tick: summary.tick,
                state_hash: summary.state_hash,
                update_count: summary.updates.len(),
                players: game_frames(game),
                completed: false,
            };
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        })?;

        done_for_sim.store(true, Ordering::SeqCst);
        let final_frame = {
            let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
            if let Some(frame) = guard.as_mut() {
                frame.completed = true;
            }
            guard.clone()
        };
        if let Some(frame) = final_frame {
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        }
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx,
        latest_frame,
        total_ticks: ticks,
        scenario_name,
        simulation_done,
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/state", get(latest_state))
        .route("/api/stream", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "observer listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    sim_handle.await??;
    Ok(())
}

fn game_frames(game: &crate::game::Game) -> Vec<PlayerFrame> {
    game.players()
        .map(|p| PlayerFrame {
            name: p.name.clone(),
            alive: p.alive,
            tiles_owned: p.tiles_owned(),
            troops: p.troops,
            workers: p.workers,
            gold: p.gold,
        })
        .collect()
}

async fn index() -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(Bytes::from_static(assets::INDEX_HTML.as_bytes())))
        .expect("static response")
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = state
        .latest_frame
        .lock()
        .expect("latest frame lock poisoned")
        .clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        total_ticks: state.total_ticks,
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
