mod engine;
mod ticker;
mod workflow;

// Public API of the session subsystem.
pub use engine::{FlushEntry, ReviewedMarks, SessionEngine, SessionFlush};
pub use ticker::ElapsedTicker;
pub use workflow::StudySessionService;
