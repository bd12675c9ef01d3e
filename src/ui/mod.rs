mod analysis_view;
mod chat_view;
mod command_view;
pub mod config;
mod telemetry_view;

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        mpsc::{self, Receiver, TryRecvError},
    },
    thread,
    time::SystemTime,
};

use config::AppConfig;
use egui::{Color32, Visuals, style::Widgets};
use log::error;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use simple_moving_average::{SMA, SumTreeSMA};

use crate::assistant::{ChatLog, ChatMessage, first_sentence};
use crate::race::{RaceState, SessionMeta, SessionOutput};
use crate::strategy::{CommandType, StrategyEngine, StrategyResponse};

pub const HISTORY_SECONDS: usize = 60;
const MAX_POINTS_PER_REFRESH: usize = 10;
const MAX_TIME_PER_REFRESH_MS: u128 = 50;

/// Ticks of rival pace history folded into the smoothed trend line.
const PACE_TREND_WINDOW: usize = 15;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_GRAY: Color32 = Color32::from_rgb(120, 120, 120);
pub(crate) const PALETTE_RED: Color32 = Color32::from_rgb(220, 38, 38);
pub(crate) const PALETTE_AMBER: Color32 = Color32::from_rgb(245, 158, 11);
pub(crate) const PALETTE_GREEN: Color32 = Color32::from_rgb(22, 163, 74);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ViewTab {
    Command,
    Analysis,
}

/// The dashboard application.
///
/// Owns all mutable presentation state: the latest race snapshot plus a
/// bounded history for the trace plots, the current strategy response, and
/// the radio transcript. Snapshots arrive over a channel from the collector
/// thread; strategy and chat requests each run on a worker thread with at
/// most one outstanding request, so nothing here needs locking.
pub struct PitwallApp {
    session_receiver: Receiver<SessionOutput>,
    session_meta: SessionMeta,
    race_state: RaceState,
    state_history: VecDeque<RaceState>,
    window_size_points: usize,

    engine: Arc<StrategyEngine>,
    strategy: Option<StrategyResponse>,
    strategy_pending: Option<Receiver<(StrategyResponse, Option<ChatMessage>)>>,

    chat_log: ChatLog,
    chat_input: String,
    chat_pending: Option<Receiver<ChatMessage>>,

    pace_sma: SumTreeSMA<f32, f32, PACE_TREND_WINDOW>,
    pace_trend: VecDeque<(f32, f32)>,

    view: ViewTab,
    rng: SmallRng,
    app_config: AppConfig,
}

impl PitwallApp {
    pub fn new(
        session_receiver: Receiver<SessionOutput>,
        engine: StrategyEngine,
        app_config: AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            faint_bg_color: PALETTE_BLACK,
            panel_fill: PALETTE_BLACK,
            button_frame: true,
            widgets: Widgets::dark(),
            striped: false,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        // one snapshot per second, so seconds of history == points of history
        let window_size_points = app_config.history_window_s;

        Self {
            session_receiver,
            session_meta: SessionMeta::default(),
            race_state: RaceState::default(),
            state_history: VecDeque::new(),
            window_size_points,
            engine: Arc::new(engine),
            strategy: None,
            strategy_pending: None,
            chat_log: ChatLog::new(),
            chat_input: String::new(),
            chat_pending: None,
            pace_sma: SumTreeSMA::new(),
            pace_trend: VecDeque::new(),
            view: ViewTab::Command,
            rng: SmallRng::from_entropy(),
            app_config,
        }
    }

    fn drain_snapshots(&mut self) {
        let start_refresh = SystemTime::now();
        let mut points_processed = 0;
        while let Ok(output) = self.session_receiver.try_recv() {
            match output {
                SessionOutput::Snapshot(state) => {
                    self.pace_sma.add_sample(state.rival_pace_delta);
                    self.pace_trend
                        .push_back((state.rival_pace_delta, self.pace_sma.get_average()));
                    if self.pace_trend.len() > self.window_size_points {
                        self.pace_trend.pop_front();
                    }

                    self.state_history.push_back((*state).clone());
                    if self.state_history.len() > self.window_size_points {
                        self.state_history.pop_front();
                    }
                    self.race_state = *state;

                    points_processed += 1;
                    if points_processed > MAX_POINTS_PER_REFRESH
                        || SystemTime::now()
                            .duration_since(start_refresh)
                            .unwrap_or_default()
                            .as_millis()
                            >= MAX_TIME_PER_REFRESH_MS
                    {
                        break;
                    }
                }
                SessionOutput::SessionChange(meta) => {
                    self.session_meta = meta;
                    self.state_history.clear();
                    self.pace_trend.clear();
                    self.strategy = None;
                }
            }
        }
    }

    /// Kick off a strategy request on a worker thread. A single request may
    /// be outstanding; the button is disabled until it completes.
    fn request_strategy(&mut self) {
        if self.strategy_pending.is_some() {
            return;
        }

        let (result_tx, result_rx) = mpsc::channel();
        let engine = self.engine.clone();
        let state = self.race_state.clone();
        let seed = self.rng.r#gen::<u64>();
        thread::spawn(move || {
            let mut rng = SmallRng::seed_from_u64(seed);
            let response = engine.recommend(&state, &mut rng);

            // urgent calls also go out over the radio, with best-effort audio
            let alert = (response.primary_command != CommandType::HoldStint).then(|| {
                let call = format!(
                    "{}. {}.",
                    response.primary_command.call_sign(),
                    first_sentence(&response.strategy_rationale)
                );
                let audio = engine.synthesize_speech(&call);
                ChatMessage::engineer(
                    format!("ALERT: {}", response.primary_command),
                    audio,
                )
            });
            let _ = result_tx.send((response, alert));
        });
        self.strategy_pending = Some(result_rx);
    }

    fn poll_strategy(&mut self) {
        if let Some(pending) = self.strategy_pending.take() {
            match pending.try_recv() {
                Ok((response, alert)) => {
                    if let Some(alert) = alert {
                        self.chat_log.push(alert);
                        self.view = ViewTab::Command;
                    }
                    self.strategy = Some(response);
                }
                Err(TryRecvError::Empty) => self.strategy_pending = Some(pending),
                Err(TryRecvError::Disconnected) => {
                    error!("Strategy worker hung up without a response");
                }
            }
        }
    }

    /// Forward the typed question to the engine on a worker thread.
    fn send_chat_query(&mut self) {
        let query = self.chat_input.trim().to_string();
        if query.is_empty() || self.chat_pending.is_some() {
            return;
        }
        self.chat_input.clear();
        self.chat_log.push(ChatMessage::driver(query.clone()));

        let (result_tx, result_rx) = mpsc::channel();
        let engine = self.engine.clone();
        let state = self.race_state.clone();
        thread::spawn(move || {
            let text = engine.answer_query(&query, &state);
            let audio = engine.synthesize_speech(&text);
            let _ = result_tx.send(ChatMessage::engineer(text, audio));
        });
        self.chat_pending = Some(result_rx);
    }

    fn poll_chat(&mut self) {
        if let Some(pending) = self.chat_pending.take() {
            match pending.try_recv() {
                Ok(message) => self.chat_log.push(message),
                Err(TryRecvError::Empty) => self.chat_pending = Some(pending),
                Err(TryRecvError::Disconnected) => {
                    error!("Chat worker hung up without a response");
                }
            }
        }
    }

    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new("PITWALL")
                    .size(24.)
                    .color(PALETTE_RED)
                    .strong(),
            );
            ui.label(
                egui::RichText::new(&self.session_meta.event_name)
                    .size(12.)
                    .color(PALETTE_GRAY),
            );

            ui.separator();
            ui.selectable_value(&mut self.view, ViewTab::Command, "Action Center");
            ui.selectable_value(&mut self.view, ViewTab::Analysis, "Analysis Console");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.strategy_pending.is_some() {
                    "Calculating..."
                } else {
                    "Vet & Generate"
                };
                let request_button = ui.add_enabled(
                    self.strategy_pending.is_none(),
                    egui::Button::new(egui::RichText::new(label).strong()).fill(PALETTE_RED),
                );
                if request_button.clicked() {
                    self.request_strategy();
                }

                if ui.button("Radio").clicked() {
                    self.app_config.show_chat = !self.app_config.show_chat;
                }
            });
        });
    }
}

impl eframe::App for PitwallApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_snapshots();
        self.poll_strategy();
        self.poll_chat();

        egui::TopBottomPanel::top("header")
            .min_height(36.)
            .show(ctx, |ui| self.header(ui));

        if self.app_config.show_chat {
            egui::SidePanel::right("radio")
                .resizable(true)
                .default_width(280.)
                .show(ctx, |ui| self.chat_view(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.view {
            ViewTab::Command => self.command_view(ui),
            ViewTab::Analysis => self.analysis_view(ui),
        });

        // snapshots arrive once a second regardless of input, keep painting
        ctx.request_repaint();
    }
}
