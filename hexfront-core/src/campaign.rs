//! Campaign: consecutive levels against the CPU on freshly generated boards

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MatchConfig;
use crate::engine::{MatchPhase, TurnEngine};
use crate::error::GenerationFailure;

/// Consecutive seeds tried when building a level
const SEED_RETRIES: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Won,
    Lost,
}

pub struct Campaign {
    config: MatchConfig,
    levels: u32,
    level: u32,
    seed: u64,
    next_seed: u64,
    engine: TurnEngine,
    status: CampaignStatus,
}

impl Campaign {
    pub const DEFAULT_LEVELS: u32 = 3;

    /// Build level 1. Seeds count up from `config.seed`, one per generated board.
    pub fn start(config: MatchConfig, levels: u32) -> Result<Self, GenerationFailure> {
        let mut next_seed = config.seed;
        let (engine, seed) = build_level(&config, &mut next_seed)?;
        info!(level = 1, seed, "campaign started");
        Ok(Self {
            config,
            levels: levels.max(1),
            level: 1,
            seed,
            next_seed,
            engine,
            status: CampaignStatus::Active,
        })
    }

    /// 1-based index of the current level
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Seed the current level's board was generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> CampaignStatus {
        self.status
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TurnEngine {
        &mut self.engine
    }

    /// Move on once the current match is over: next level on a win, replay
    /// on a draw, campaign lost on a defeat.
    pub fn advance(&mut self) -> Result<CampaignStatus, GenerationFailure> {
        if self.status != CampaignStatus::Active {
            return Ok(self.status);
        }

        match self.engine.phase() {
            MatchPhase::InProgress => {}
            MatchPhase::CpuWon => {
                info!(level = self.level, "campaign lost");
                self.status = CampaignStatus::Lost;
            }
            MatchPhase::PlayerWon if self.level >= self.levels => {
                info!(levels = self.levels, "campaign won");
                self.status = CampaignStatus::Won;
            }
            MatchPhase::PlayerWon => {
                self.next_level(self.level + 1)?;
            }
            MatchPhase::Draw => {
                info!(level = self.level, "level drawn, replaying");
                self.next_level(self.level)?;
            }
        }

        Ok(self.status)
    }

    fn next_level(&mut self, level: u32) -> Result<(), GenerationFailure> {
        let (engine, seed) = build_level(&self.config, &mut self.next_seed)?;
        info!(level, seed, "level started");
        self.engine = engine;
        self.level = level;
        self.seed = seed;
        Ok(())
    }
}

fn build_level(
    config: &MatchConfig,
    next_seed: &mut u64,
) -> Result<(TurnEngine, u64), GenerationFailure> {
    let mut last_error = None;

    for _ in 0..SEED_RETRIES {
        let seed = *next_seed;
        *next_seed = next_seed.wrapping_add(1);

        match TurnEngine::start(&config.clone().with_seed(seed)) {
            Ok(engine) => return Ok((engine, seed)),
            Err(err @ GenerationFailure::RetriesExhausted { .. }) => {
                warn!(seed, %err, "level generation failed, trying next seed");
                last_error = Some(err);
            }
            // Another seed will not fix a bad extent or config
            Err(err) => return Err(err),
        }
    }

    Err(last_error.unwrap_or(GenerationFailure::RetriesExhausted {
        attempts: 0,
        seed: *next_seed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;
    use crate::config::{CombatConfig, RulesConfig};
    use crate::engine::Move;

    /// One unit per side that can reach anywhere, fighting without modifiers
    fn duel_config() -> MatchConfig {
        let rules = RulesConfig::default()
            .with_starting_units(1, 3)
            .with_move_range(20)
            .with_combat(CombatConfig::flat());
        MatchConfig::new(6, 5, 11).with_rules(rules)
    }

    /// Leave the unit holding `side`'s base at strength 1
    fn weaken_base(campaign: &mut Campaign, side: Side) {
        let mut board = campaign.engine.board().clone();
        let base = board.base_of(side);
        if let Some(unit) = board.unit_mut(base) {
            unit.strength = 1;
        }
        let state = campaign.engine.state();
        let rules = campaign.engine.rules().clone();
        campaign.engine = TurnEngine::resume(board, state, rules);
    }

    fn storm_base(campaign: &mut Campaign) {
        weaken_base(campaign, Side::Cpu);
        let board = campaign.engine().board();
        let mv = Move::movement(board.player_base(), board.cpu_base());
        campaign.engine_mut().submit_player_move(mv).unwrap();
    }

    #[test]
    fn test_win_every_level() {
        let mut campaign = Campaign::start(duel_config(), 2).unwrap();
        assert_eq!(campaign.seed(), 11);

        storm_base(&mut campaign);
        assert_eq!(campaign.engine().phase(), MatchPhase::PlayerWon);
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Active);
        assert_eq!(campaign.level(), 2);
        assert!(campaign.seed() > 11);
        assert_eq!(campaign.engine().phase(), MatchPhase::InProgress);

        storm_base(&mut campaign);
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Won);
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Won);
    }

    #[test]
    fn test_defeat_loses_campaign() {
        let mut campaign = Campaign::start(duel_config(), 3).unwrap();
        weaken_base(&mut campaign, Side::Player);
        campaign.engine_mut().submit_player_move(Move::Pass).unwrap();
        campaign.engine_mut().play_cpu_turn().unwrap();
        assert_eq!(campaign.engine().phase(), MatchPhase::CpuWon);
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Lost);
        assert_eq!(campaign.level(), 1);
    }

    #[test]
    fn test_draw_replays_level_on_new_board() {
        let rules = RulesConfig::default()
            .with_starting_units(1, 3)
            .with_max_turns(1);
        let config = MatchConfig::new(6, 5, 3).with_rules(rules);
        let mut campaign = Campaign::start(config, 3).unwrap();
        let first_seed = campaign.seed();

        campaign.engine_mut().play_turn(Move::Pass).unwrap();
        assert_eq!(campaign.engine().phase(), MatchPhase::Draw);
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Active);
        assert_eq!(campaign.level(), 1);
        assert_ne!(campaign.seed(), first_seed);
        assert_eq!(campaign.engine().state().turn, 1);
    }

    #[test]
    fn test_advance_mid_match_is_noop() {
        let mut campaign = Campaign::start(duel_config(), 3).unwrap();
        let seed = campaign.seed();
        assert_eq!(campaign.advance().unwrap(), CampaignStatus::Active);
        assert_eq!(campaign.level(), 1);
        assert_eq!(campaign.seed(), seed);
    }

    #[test]
    fn test_bad_extent_fails_without_retrying() {
        let config = MatchConfig::new(1, 1, 0);
        assert!(matches!(
            Campaign::start(config, 1),
            Err(GenerationFailure::ExtentTooSmall { .. })
        ));
    }
}
