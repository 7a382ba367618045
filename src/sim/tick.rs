//! Session lifecycle and per-tick update
//!
//! Core game loop that advances a session deterministically. Order inside a
//! running tick: clocks, input, spawning, motion and catches, expiry.

use super::collision::aabb_overlap;
use super::state::{FallingItem, GameEvent, ItemKind, Session, SessionPhase};
use crate::config::ArcadeConfig;
use crate::error::ConfigError;
use crate::rewards::{RewardPayout, SessionResult};

/// Input latched for a single tick (last pointer position wins)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Target catcher centre x (from mouse/touch position)
    pub target_x: Option<f32>,
    /// Keyboard steering axis in [-1, 1]
    pub steer: f32,
}

/// Validate the configuration and create a running session
pub fn start_session(config: &ArcadeConfig, seed: u64) -> Result<Session, ConfigError> {
    config.validate()?;
    log::info!(
        "Session starting: seed={}, duration={}s, {} item kinds",
        seed,
        config.duration,
        config.items.len()
    );
    Ok(Session::new(config, seed))
}

/// Advance a session by `dt` seconds
///
/// Returns the result when this tick ran the clock out.
pub fn tick(
    session: &mut Session,
    config: &ArcadeConfig,
    input: &TickInput,
    dt: f32,
) -> Option<SessionResult> {
    session.events.clear();
    if session.phase != SessionPhase::Running {
        return None;
    }
    // Nothing is simulated past the end of the session
    let dt = if dt.is_finite() && dt > 0.0 {
        dt.min(session.time_remaining)
    } else {
        0.0
    };

    session.ticks += 1;
    session.time_remaining = (session.time_remaining - dt).max(0.0);
    session.combo.advance(dt);
    session.effects.advance(dt);

    // Catcher movement
    let field_width = config.field.width;
    if let Some(target) = input.target_x {
        session
            .catcher
            .follow(target, config.catcher.max_follow_speed, dt, field_width);
    }
    if input.steer != 0.0 {
        session
            .catcher
            .steer(input.steer, config.catcher.speed, dt, field_width);
    }

    spawn_items(session, dt);
    move_items(session, dt);
    resolve_catches(session, config);
    remove_missed(session, config);

    // Expiry
    for kind in session.effects.expire() {
        log::debug!("Power-up expired: {}", kind.as_str());
        session.events.push(GameEvent::PowerUpExpired { kind });
    }
    if session.combo.lapsed(&config.combo) {
        break_combo(session);
    }

    if session.time_remaining <= 0.0 {
        return Some(finalize(session, config, false));
    }
    None
}

/// Freeze a running session
pub fn pause(session: &mut Session) -> bool {
    if session.phase == SessionPhase::Running {
        session.phase = SessionPhase::Paused;
        log::info!("Session paused at {:.1}s remaining", session.time_remaining);
        true
    } else {
        false
    }
}

/// Resume a paused session
pub fn resume(session: &mut Session) -> bool {
    if session.phase == SessionPhase::Paused {
        session.phase = SessionPhase::Running;
        log::info!("Session resumed");
        true
    } else {
        false
    }
}

/// Cancel a live session; no reward unless configured otherwise
pub fn stop_session(session: &mut Session, config: &ArcadeConfig) -> Option<SessionResult> {
    if !session.is_live() {
        return None;
    }
    session.events.clear();
    Some(finalize(session, config, true))
}

fn spawn_items(session: &mut Session, dt: f32) {
    let due = session.spawner.attempts_due(dt, &mut session.rng);
    for _ in 0..due {
        let id = session.next_entity_id();
        if let Some(item) = session.spawner.spawn(id, &mut session.rng) {
            log::debug!("Spawned {} #{} at x={:.0}", item.kind.as_str(), item.id, item.pos.x);
            session.stats.spawned += 1;
            session.items.push(item);
        }
    }
}

fn move_items(session: &mut Session, dt: f32) {
    let speed_factor = session.effects.speed_factor();
    let magnet = session.effects.magnet();
    let catcher_center = session.catcher.center();

    for item in &mut session.items {
        item.pos.y += item.fall_speed * speed_factor * dt;

        // Magnet pulls horizontally only, so items never rise
        if let Some((radius, pull_speed)) = magnet {
            let center = item.center();
            if center.distance(catcher_center) <= radius {
                let dx = catcher_center.x - center.x;
                let max_step = pull_speed * dt;
                item.pos.x += dx.clamp(-max_step, max_step);
            }
        }
    }
}

fn resolve_catches(session: &mut Session, config: &ArcadeConfig) {
    let catcher = session.catcher.rect();
    let (caught, remaining): (Vec<FallingItem>, Vec<FallingItem>) = std::mem::take(&mut session.items)
        .into_iter()
        .partition(|item| aabb_overlap(&catcher, &item.rect()));
    session.items = remaining;

    for item in caught {
        apply_catch(session, config, item);
    }
}

/// Score or activate a caught item
fn apply_catch(session: &mut Session, config: &ArcadeConfig, item: FallingItem) {
    match item.kind {
        ItemKind::Common | ItemKind::Rare | ItemKind::Epic => {
            let multiplier = session.combo.current_multiplier(&config.combo)
                * session.effects.score_multiplier();
            let delta = (item.value as f32 * multiplier).round().max(0.0) as i64;
            let gained = session.apply_delta(delta);
            session.combo.register_catch(&config.combo);
            session.stats.caught += 1;
            session.stats.best_combo = session.stats.best_combo.max(session.combo.count);
            session.events.push(GameEvent::Caught {
                item_id: item.id,
                kind: item.kind,
                delta: gained,
                pos: item.pos,
            });
        }
        ItemKind::Hazard => {
            let lost = session.apply_delta(item.value.min(0));
            session.stats.hazards_hit += 1;
            session.events.push(GameEvent::HazardHit {
                item_id: item.id,
                delta: lost,
                pos: item.pos,
            });
            break_combo(session);
        }
        ItemKind::PowerUp(kind) => {
            if let Some(effect) = item.effect {
                session.effects.activate(effect, item.effect_duration);
                session.stats.power_ups += 1;
                log::debug!("Power-up activated: {} for {}s", kind.as_str(), item.effect_duration);
                session.events.push(GameEvent::PowerUpActivated {
                    kind,
                    duration: item.effect_duration,
                });
            }
        }
    }
}

fn remove_missed(session: &mut Session, config: &ArcadeConfig) {
    let bottom = config.field.height;
    let (missed, remaining): (Vec<FallingItem>, Vec<FallingItem>) = std::mem::take(&mut session.items)
        .into_iter()
        .partition(|item| item.pos.y > bottom);
    session.items = remaining;

    for item in missed {
        if item.kind.is_valuable() {
            session.stats.missed += 1;
        }
        let mut penalty = 0;
        if config.miss_policy.penalizes(item.kind) {
            penalty = session.apply_delta(-(config.miss_penalty.min(i64::MAX as u64) as i64));
            break_combo(session);
        }
        session.events.push(GameEvent::Missed {
            item_id: item.id,
            kind: item.kind,
            penalty,
        });
    }
}

fn break_combo(session: &mut Session) {
    let count = session.combo.reset();
    if count > 0 {
        session.events.push(GameEvent::ComboReset { count });
    }
}

/// End the session: compute rewards, clear the field
fn finalize(session: &mut Session, config: &ArcadeConfig, cancelled: bool) -> SessionResult {
    let score = session.score;
    let rewarded = !cancelled || config.rewards.reward_on_cancel;
    let (tier, payout) = if rewarded {
        (config.rewards.tier_for(score), config.rewards.payout_for(score))
    } else {
        (None, RewardPayout::default())
    };

    session.items.clear();
    session.effects.clear();
    session.combo.reset();
    session.phase = SessionPhase::Ended;

    log::info!(
        "Session {}: score={}, tier={:?}, caught={}, missed={}",
        if cancelled { "cancelled" } else { "finished" },
        score,
        tier,
        session.stats.caught,
        session.stats.missed
    );

    SessionResult {
        final_score: score,
        tier,
        payout,
        cancelled,
        time_played: (config.duration - session.time_remaining).max(0.0),
        stats: session.stats,
    }
}
