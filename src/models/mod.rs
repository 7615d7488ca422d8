pub mod memorization;
pub mod quiz;
pub mod quran;
pub mod revision_card;
pub mod revision_session;
pub mod scheduler;
pub mod store;

pub use memorization::{
    MemorizationRecord, MemorizationStatus, MemorizationSummary, MemorizationUpdate,
    NewMemorization,
};
pub use quiz::{QuizAnswer, QuizAttempt, QuizQuestion, QuizRound, SurahQuizStats};
pub use quran::{ReadingPosition, Surah, Verse};
pub use revision_card::RevisionCard;
pub use revision_session::RevisionSession;
pub use scheduler::compute_next_revision_date;
pub use store::MemorizationStore;
