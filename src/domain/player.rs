/// Player state machine.
///
/// States:
///   - **Moving** — direction-driven (idle is just `Direction::None`).
///   - **Immune** — overlay on Moving; timed, damage is suppressed.
///   - **Dead**   — terminal for this life; motion stops.
///
/// Timed states store deadlines that are compared against the clock
/// reading passed into each call. Nothing here reads the wall clock.

use crate::config::PlayerConfig;

use super::entity::{Body, Effect, Food};
use super::geom::{Direction, Rect};

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub score: u32,
    pub health: u32,
    pub max_health: u32,
    pub immune: bool,
    /// Blink flag for the renderer; never gates collision or scoring.
    pub visible: bool,
    pub dead: bool,
    immune_until: u64,
    blink_until: u64,
    death_time: u64,
    immunity_ms: u64,
    blink_ms: u64,
}

impl Player {
    pub fn new(x: i32, y: i32, cfg: &PlayerConfig) -> Self {
        Player {
            body: Body::new(Rect::square(x, y, cfg.size), cfg.speed),
            score: 0,
            health: cfg.max_health,
            max_health: cfg.max_health,
            immune: false,
            visible: true,
            dead: false,
            immune_until: 0,
            blink_until: 0,
            death_time: 0,
            immunity_ms: cfg.immunity_ms,
            blink_ms: cfg.blink_ms,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Last command wins; there is no diagonal composition.
    pub fn handle_direction_input(&mut self, dir: Direction) {
        if !self.dead {
            self.body.dir = dir;
        }
    }

    /// Lose one health point and become immune. Suppressed (not queued)
    /// while already immune. Returns true if damage was applied.
    pub fn take_damage(&mut self, now: u64) -> bool {
        if self.immune || self.dead {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.grant_immunity(now);
        true
    }

    pub fn grant_immunity(&mut self, now: u64) {
        self.immune = true;
        self.immune_until = now + self.immunity_ms;
    }

    pub fn heal(&mut self) {
        self.health = (self.health + 1).min(self.max_health);
    }

    /// Add the food's points and apply its effect.
    pub fn eat(&mut self, food: &Food, now: u64) -> Effect {
        self.score = self.score.saturating_add(food.points);
        let effect = food.kind.effect();
        match effect {
            Effect::Heal => self.heal(),
            Effect::Immunity => self.grant_immunity(now),
            Effect::None => {}
        }
        effect
    }

    /// Enter the Dead state. Idempotent; returns true only on the transition.
    pub fn die(&mut self, now: u64) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.death_time = now;
        self.body.dir = Direction::None;
        self.immune = false;
        self.visible = true;
        true
    }

    /// Milliseconds since death, 0 while alive.
    pub fn time_since_death(&self, now: u64) -> u64 {
        if self.dead { now.saturating_sub(self.death_time) } else { 0 }
    }

    /// Expire immunity and toggle the blink flag.
    pub fn tick_timers(&mut self, now: u64) {
        if self.immune && now >= self.immune_until {
            self.immune = false;
        }

        if self.immune {
            if now >= self.blink_until {
                self.visible = !self.visible;
                self.blink_until = now + self.blink_ms;
            }
        } else {
            self.visible = true;
        }
    }

    /// Move to a new level's spawn tile. Health, immunity and score carry over.
    pub fn place_at_spawn(&mut self, x: i32, y: i32) {
        self.body.dir = Direction::None;
        self.body.place_at(x, y);
    }

    /// Back to full health at `(x, y)`. Score is preserved.
    pub fn respawn(&mut self, x: i32, y: i32) {
        self.health = self.max_health;
        self.dead = false;
        self.death_time = 0;
        self.immune = false;
        self.immune_until = 0;
        self.visible = true;
        self.blink_until = 0;
        self.body.dir = Direction::None;
        self.body.place_at(x, y);
    }

    /// Full game restart: respawn and zero the score.
    pub fn restart(&mut self, x: i32, y: i32) {
        self.respawn(x, y);
        self.score = 0;
    }
}
