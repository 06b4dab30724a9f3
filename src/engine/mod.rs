pub mod narrowing;
pub mod selector;
pub mod session;

pub use narrowing::{EngineState, SwipeOutcome, SwipeResponse};
pub use selector::{
    rank_missing, select_next, FirstPicker, RandomPicker, Stage, Suggestion, SuggestionPicker,
    BROAD_STAGE_THRESHOLD, SUGGESTION_TOP_K,
};
pub use session::{SessionArena, SessionConfig, SessionSnapshot, SwipeSession};
