//! Arcade session engine
//!
//! Owns at most one live [`Session`] and the collaborators around it: the
//! attempt gate consulted on start, the render sink fed after every tick and
//! the reward sink told about every finished session.

use serde::Serialize;

use crate::config::ArcadeConfig;
use crate::error::StartError;
use crate::platform;
use crate::rewards::{AttemptGate, RewardSink, SessionResult, Unlimited};
use crate::sim::{
    self, ActivePowerUp, Catcher, FallingItem, GameEvent, Session, SessionPhase, TickInput,
};

/// Read-only view of a session for a renderer
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: SessionPhase,
    pub score: u64,
    pub time_remaining: f32,
    pub combo_count: u32,
    pub combo_multiplier: f32,
    pub active_power_ups: Vec<ActivePowerUp>,
    pub items: Vec<FallingItem>,
    pub catcher: Option<Catcher>,
    pub events: Vec<GameEvent>,
}

/// Draws snapshots; the engine never renders itself
pub trait RenderSink {
    fn present(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> RenderSink for F {
    fn present(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

pub struct ArcadeEngine {
    config: ArcadeConfig,
    session: Option<Session>,
    seed: u64,
    sessions_started: u64,
    gate: Box<dyn AttemptGate>,
    /// Wall clock (ms since the Unix epoch) handed to the gate on start
    clock: Box<dyn FnMut() -> f64>,
    render: Option<Box<dyn RenderSink>>,
    reward: Option<Box<dyn RewardSink>>,
    last_result: Option<SessionResult>,
    warned_no_render: bool,
}

impl ArcadeEngine {
    pub fn new(config: ArcadeConfig, seed: u64) -> Self {
        Self {
            config,
            session: None,
            seed,
            sessions_started: 0,
            gate: Box::new(Unlimited),
            clock: Box::new(platform::now_ms),
            render: None,
            reward: None,
            last_result: None,
            warned_no_render: false,
        }
    }

    pub fn with_gate(mut self, gate: impl AttemptGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_clock(mut self, clock: impl FnMut() -> f64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_render_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.render = Some(Box::new(sink));
        self.warned_no_render = false;
        self
    }

    pub fn with_reward_sink(mut self, sink: impl RewardSink + 'static) -> Self {
        self.reward = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &ArcadeConfig {
        &self.config
    }

    /// Replace the configuration; refused while a session is live
    pub fn set_config(&mut self, config: ArcadeConfig) -> bool {
        if self.is_live() {
            log::warn!("Configuration change ignored while a session is live");
            return false;
        }
        self.config = config;
        true
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.as_ref().map(|s| s.phase).unwrap_or_default()
    }

    pub fn is_live(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_live)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn attempts_remaining(&self) -> Option<u32> {
        self.gate.remaining()
    }

    /// Result of the most recently finished session
    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    /// Start a session from `Idle` or `Ended`
    ///
    /// Nothing changes on rejection; in particular no attempt is consumed
    /// unless the session actually starts.
    pub fn start(&mut self) -> Result<(), StartError> {
        if self.is_live() {
            log::warn!("Start ignored: a session is already running");
            return Err(StartError::AlreadyRunning);
        }
        self.config.validate()?;
        self.gate.refresh((self.clock)());
        if !self.gate.try_consume() {
            log::warn!("Start rejected: no attempts remaining");
            return Err(StartError::AttemptsExhausted);
        }

        let seed = self.seed.wrapping_add(self.sessions_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.sessions_started += 1;
        self.session = Some(sim::start_session(&self.config, seed)?);
        self.emit();
        Ok(())
    }

    /// Advance the live session by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Option<SessionResult> {
        let session = self.session.as_mut()?;
        let result = sim::tick(session, &self.config, input, dt);
        self.emit();
        if let Some(result) = &result {
            self.report(result);
        }
        result
    }

    /// Cancel the live session
    pub fn stop(&mut self) -> Option<SessionResult> {
        let session = self.session.as_mut()?;
        let result = sim::stop_session(session, &self.config)?;
        self.emit();
        self.report(&result);
        Some(result)
    }

    pub fn pause(&mut self) -> bool {
        let paused = self.session.as_mut().is_some_and(sim::pause);
        if paused {
            self.emit();
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.session.as_mut().is_some_and(sim::resume);
        if resumed {
            self.emit();
        }
        resumed
    }

    /// Current view of the session (an empty idle view before the first start)
    pub fn snapshot(&self) -> Snapshot {
        match &self.session {
            Some(session) => Snapshot {
                phase: session.phase,
                score: session.score,
                time_remaining: session.time_remaining,
                combo_count: session.combo.count,
                combo_multiplier: session.combo.current_multiplier(&self.config.combo),
                active_power_ups: session.effects.active.clone(),
                items: session.items.clone(),
                catcher: Some(session.catcher.clone()),
                events: session.events.clone(),
            },
            None => Snapshot {
                phase: SessionPhase::Idle,
                score: 0,
                time_remaining: self.config.duration,
                combo_count: 0,
                combo_multiplier: 1.0,
                active_power_ups: Vec::new(),
                items: Vec::new(),
                catcher: None,
                events: Vec::new(),
            },
        }
    }

    fn emit(&mut self) {
        if self.render.is_none() {
            if !self.warned_no_render {
                log::warn!("No render sink attached - snapshots are not emitted");
                self.warned_no_render = true;
            }
            return;
        }
        let snapshot = self.snapshot();
        if let Some(render) = self.render.as_mut() {
            render.present(&snapshot);
        }
    }

    fn report(&mut self, result: &SessionResult) {
        match self.reward.as_mut() {
            Some(reward) => reward.session_finished(result),
            None => log::debug!("No reward sink attached; result not forwarded"),
        }
        self.last_result = Some(result.clone());
    }
}
