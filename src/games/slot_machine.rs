//! Slot Machine
//!
//! Three reels, four symbols. A spin costs coins up front and settles after a
//! fixed delay; three of a kind pays by symbol, any pair pays a flat amount.
//! Running too low to afford a spin ends the game.

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Game, GameConfig, GameEvent, Setup};
use crate::catalog::GameKind;
use crate::error::ConfigError;
use crate::input::{Intent, Intents};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    Cherry,
    Diamond,
    Dollar,
    Star,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [Symbol::Cherry, Symbol::Diamond, Symbol::Dollar, Symbol::Star];

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Diamond => "diamond",
            Symbol::Dollar => "dollar",
            Symbol::Star => "star",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotMachineConfig {
    pub reels: usize,
    pub starting_coins: u32,
    pub spin_cost: u32,
    pub spin_ms: u32,
    /// Three of a kind pays `jackpot_base * multiplier`
    pub jackpot_base: u32,
    pub cherry_multiplier: u32,
    pub star_multiplier: u32,
    pub dollar_multiplier: u32,
    pub diamond_multiplier: u32,
    pub pair_payout: u32,
}

impl Default for SlotMachineConfig {
    fn default() -> Self {
        Self {
            reels: 3,
            starting_coins: 100,
            spin_cost: 10,
            spin_ms: 1000,
            jackpot_base: 10,
            cherry_multiplier: 5,
            star_multiplier: 10,
            dollar_multiplier: 15,
            diamond_multiplier: 30,
            pair_payout: 15,
        }
    }
}

impl SlotMachineConfig {
    pub fn multiplier(&self, symbol: Symbol) -> u32 {
        match symbol {
            Symbol::Cherry => self.cherry_multiplier,
            Symbol::Star => self.star_multiplier,
            Symbol::Dollar => self.dollar_multiplier,
            Symbol::Diamond => self.diamond_multiplier,
        }
    }

    /// Coins paid for a settled set of reels
    pub fn payout(&self, reels: &[Symbol]) -> Payout {
        let Some(&first) = reels.first() else {
            return Payout::Nothing;
        };
        if reels.iter().all(|&s| s == first) {
            return Payout::Jackpot {
                symbol: first,
                coins: self.jackpot_base * self.multiplier(first),
            };
        }
        let pair = reels
            .iter()
            .enumerate()
            .any(|(i, s)| reels[i + 1..].contains(s));
        if pair {
            Payout::Pair {
                coins: self.pair_payout,
            }
        } else {
            Payout::Nothing
        }
    }
}

impl GameConfig for SlotMachineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.reels < 2 {
            return Err(ConfigError::invalid("slot machine needs at least two reels"));
        }
        if self.spin_cost == 0 {
            return Err(ConfigError::invalid("spin cost must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payout {
    Jackpot { symbol: Symbol, coins: u32 },
    Pair { coins: u32 },
    Nothing,
}

impl Payout {
    pub fn coins(self) -> u32 {
        match self {
            Payout::Jackpot { coins, .. } | Payout::Pair { coins } => coins,
            Payout::Nothing => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlotMachine {
    config: SlotMachineConfig,
    rng: Pcg32,
    /// Symbols showing; they flicker while a spin is running
    pub reels: Vec<Symbol>,
    coins: u32,
    spin_ticks: u32,
    last: Option<Payout>,
    broke: bool,
}

impl SlotMachine {
    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn is_spinning(&self) -> bool {
        self.spin_ticks > 0
    }

    /// Result of the last settled spin
    pub fn last_payout(&self) -> Option<Payout> {
        self.last
    }

    fn roll(&mut self) {
        for reel in self.reels.iter_mut() {
            *reel = Symbol::ALL[self.rng.random_range(0..Symbol::ALL.len())];
        }
    }

    fn spin(&mut self) {
        if self.broke || self.is_spinning() || self.coins < self.config.spin_cost {
            return;
        }
        self.coins -= self.config.spin_cost;
        self.last = None;
        self.spin_ticks = crate::ms_to_ticks(self.config.spin_ms);
        debug!("Slot Machine: spin, {} coins left", self.coins);
    }
}

impl Game for SlotMachine {
    type Config = SlotMachineConfig;

    const KIND: GameKind = GameKind::SlotMachine;

    fn new(config: SlotMachineConfig, setup: &Setup) -> Self {
        let mut game = Self {
            rng: Pcg32::seed_from_u64(setup.seed),
            reels: Vec::new(),
            coins: 0,
            spin_ticks: 0,
            last: None,
            broke: false,
            config,
        };
        game.reset();
        game
    }

    fn reset(&mut self) {
        self.reels = vec![Symbol::Cherry; self.config.reels];
        self.coins = self.config.starting_coins;
        self.spin_ticks = 0;
        self.last = None;
        self.broke = false;
    }

    fn apply_intents(&mut self, intents: &Intents) {
        let pulled = intents.was_pressed(Intent::Shoot)
            || intents.was_pressed(Intent::Jump)
            || !intents.taps().is_empty();
        if pulled {
            self.spin();
        }
    }

    fn integrate(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_spinning() {
            return;
        }
        self.spin_ticks -= 1;
        self.roll();
        if self.spin_ticks > 0 {
            return;
        }

        let payout = self.config.payout(&self.reels);
        self.last = Some(payout);
        let won = payout.coins();
        if won > 0 {
            self.coins += won;
            events.push(GameEvent::scored(won));
        }
        debug!("Slot Machine: {:?}", payout);
    }

    fn resolve_collisions(&mut self, events: &mut Vec<GameEvent>) {
        if !self.broke && !self.is_spinning() && self.coins < self.config.spin_cost {
            info!("Slot Machine: out of coins");
            self.broke = true;
            events.push(GameEvent::Defeated);
        }
    }
}
