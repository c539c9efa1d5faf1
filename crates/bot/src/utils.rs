mod episode_range;

pub use episode_range::condense_episodes;
