use rand::Rng;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;

/// Messages rotated while a quiz is being generated.
pub const LOADING_MESSAGES: [&str; 6] = [
    "Getting your quiz ready… just a moment.",
    "Preparing questions that match your skill…",
    "Setting up something interesting for you…",
    "Almost there… polishing your quiz experience.",
    "Loading smart questions… stay with us.",
    "Finding the best questions for you…",
];

/// Random picker over `LOADING_MESSAGES`.
pub struct LoadingMessages<R: Rng = ThreadRng> {
    rng: R,
}

impl LoadingMessages {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(rand::rng())
    }
}

impl Default for LoadingMessages {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> LoadingMessages<R> {
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn next_message(&mut self) -> &'static str {
        LOADING_MESSAGES
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(LOADING_MESSAGES[0])
    }
}
