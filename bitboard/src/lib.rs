pub mod accumulator;
pub mod encoding;
pub mod error;
pub mod game;
pub mod indexer;
pub mod outcome;
pub mod sampler;
pub mod visitor;

pub use accumulator::{Dataset, DatasetAccumulator};
pub use encoding::{encode, FeatureVector, NUM_FEATURES};
pub use error::{MalformedGame, SampleError, SamplerConfigError};
pub use game::{Game, Replay};
pub use indexer::{find_eligible, EligibleIndexSet};
pub use outcome::GameOutcome;
pub use sampler::{GameSample, GameSampler, SamplerConfig, ShortagePolicy, SkipReason};
pub use visitor::GameVisitor;
