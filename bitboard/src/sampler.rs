use crate::encoding::{encode, FeatureVector};
use crate::error::{SampleError, SamplerConfigError};
use crate::game::Game;
use crate::indexer::{find_eligible, EligibleIndexSet};
use crate::outcome::GameOutcome;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// What to do when a game has fewer eligible positions than requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortagePolicy {
    /// Fail with [`SampleError::InsufficientEligiblePositions`]
    #[default]
    Strict,
    /// Keep every eligible position there is
    Clamp,
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Plies at the start of the game that are never sampled
    pub opening_plies: usize,
    /// Positions to draw from each included game
    pub samples_per_game: usize,
    /// Chance of a decisive game being included
    pub inclusion_probability: f64,
    pub shortage: ShortagePolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            opening_plies: 5,
            samples_per_game: 10,
            inclusion_probability: 0.5,
            shortage: ShortagePolicy::Strict,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> Result<(), SamplerConfigError> {
        if !(0.0..=1.0).contains(&self.inclusion_probability) {
            return Err(SamplerConfigError::InvalidProbability(
                self.inclusion_probability,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The game ended in a draw
    Draw,
    /// The inclusion coin flip failed
    NotSelected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameSample {
    Skipped(SkipReason),
    /// Encoded positions, in the order they occur in the game
    Sampled {
        outcome: GameOutcome,
        vectors: Vec<FeatureVector>,
    },
}

/// Draws encoded positions from games.
///
/// The random generator is owned by the sampler, so two samplers seeded the
/// same way make the same decisions on the same games.
pub struct GameSampler<R> {
    config: SamplerConfig,
    rng: R,
}

impl<R: Rng> GameSampler<R> {
    pub fn new(config: SamplerConfig, rng: R) -> Result<Self, SamplerConfigError> {
        config.validate()?;
        Ok(GameSampler { config, rng })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Restarts the random stream, e.g. once per game for reproducible workers
    pub fn reseed(&mut self, seed: u64)
    where
        R: SeedableRng,
    {
        self.rng = R::seed_from_u64(seed);
    }

    /// Runs the full pipeline on one game
    pub fn sample_game(&mut self, game: &Game) -> Result<GameSample, SampleError> {
        if let Some(reason) = self.inclusion_check(game) {
            return Ok(GameSample::Skipped(reason));
        }

        let eligible = self.eligible(game);
        let selected = self.select(&eligible)?;
        let vectors = self.replay_selected(game, &selected);

        Ok(GameSample::Sampled {
            outcome: game.outcome(),
            vectors,
        })
    }

    /// Decides whether the game is skipped.
    /// The coin is flipped for every game, draws included, so the random
    /// stream consumed per game does not depend on the result.
    pub fn inclusion_check(&mut self, game: &Game) -> Option<SkipReason> {
        let selected = self.rng.gen_bool(self.config.inclusion_probability);

        if game.outcome().is_draw() {
            Some(SkipReason::Draw)
        } else if !selected {
            Some(SkipReason::NotSelected)
        } else {
            None
        }
    }

    /// Non-capture moves after the opening
    pub fn eligible(&self, game: &Game) -> EligibleIndexSet {
        find_eligible(game, self.config.opening_plies, game.ply_count())
    }

    /// Picks distinct eligible indices uniformly, returned sorted
    pub fn select(&mut self, eligible: &EligibleIndexSet) -> Result<Vec<usize>, SampleError> {
        let required = self.config.samples_per_game;
        let amount = if eligible.len() >= required {
            required
        } else {
            match self.config.shortage {
                ShortagePolicy::Strict => {
                    return Err(SampleError::InsufficientEligiblePositions {
                        found: eligible.len(),
                        required,
                    })
                }
                ShortagePolicy::Clamp => eligible.len(),
            }
        };

        let candidates = eligible.as_slice();
        let mut selected: Vec<usize> = index::sample(&mut self.rng, candidates.len(), amount)
            .into_iter()
            .map(|i| candidates[i])
            .collect();
        selected.sort_unstable();

        Ok(selected)
    }

    /// Replays the window and encodes the position after each selected move
    pub fn replay_selected(&self, game: &Game, selected: &[usize]) -> Vec<FeatureVector> {
        let mut vectors = Vec::with_capacity(selected.len());
        if selected.is_empty() {
            return vectors;
        }

        let mut replay = game.replay();
        replay.advance_by(self.config.opening_plies);

        let window = game.ply_count().saturating_sub(self.config.opening_plies);
        let mut pending = selected.iter().peekable();

        for index in 0..window {
            if replay.advance().is_none() {
                break;
            }
            if pending.next_if(|&&next| next == index).is_some() {
                vectors.push(encode(replay.position()));
            }
            if pending.peek().is_none() {
                break;
            }
        }

        vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn sampler(config: SamplerConfig, seed: u64) -> GameSampler<StdRng> {
        GameSampler::new(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = SamplerConfig {
            inclusion_probability: 1.5,
            ..Default::default()
        };
        assert!(GameSampler::new(config, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_select_is_deterministic() {
        let eligible: EligibleIndexSet = (0..40).filter(|i| i % 3 != 0).collect();

        let first = sampler(SamplerConfig::default(), 42).select(&eligible).unwrap();
        let second = sampler(SamplerConfig::default(), 42).select(&eligible).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
        assert!(first.iter().all(|&i| eligible.contains(i)));
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let eligible: EligibleIndexSet = (0..50).collect();
        let mut sampler = sampler(SamplerConfig::default(), 11);

        sampler.reseed(99);
        let first = sampler.select(&eligible).unwrap();
        sampler.reseed(99);
        let second = sampler.select(&eligible).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_select_takes_everything_when_exact() {
        let eligible: EligibleIndexSet = (0..10).collect();
        let selected = sampler(SamplerConfig::default(), 7).select(&eligible).unwrap();

        assert_eq!(selected, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_shortage() {
        let eligible: EligibleIndexSet = (0..8).collect();

        let strict = sampler(SamplerConfig::default(), 1).select(&eligible);
        assert_eq!(
            strict,
            Err(SampleError::InsufficientEligiblePositions {
                found: 8,
                required: 10
            })
        );

        let config = SamplerConfig {
            shortage: ShortagePolicy::Clamp,
            ..Default::default()
        };
        let clamped = sampler(config, 1).select(&eligible).unwrap();
        assert_eq!(clamped, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_empty_under_clamp() {
        let config = SamplerConfig {
            shortage: ShortagePolicy::Clamp,
            ..Default::default()
        };
        let selected = sampler(config, 3).select(&EligibleIndexSet::default()).unwrap();
        assert!(selected.is_empty());
    }
}
