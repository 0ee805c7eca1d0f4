pub mod api;
pub mod fuzzy;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod stages;

pub use api::{ApiConfig, JobsApiClient};
pub use fuzzy::MatcherConfig;
pub use io::{
    parse_roster_file, parse_roster_json, parse_user_file, read_transcript_file, DictationReport,
};
pub use models::{
    Capability, CandidateToken, Decision, MatchResult, PendingSuggestion, Role, Roster,
    SuggestionPayload, TeamMember, UserProfile,
};
pub use pipeline::{process_transcript, PipelineConfig};
pub use session::{DictationSession, ScriptedCapture, SessionError, SpeechCapture, StopOutcome};
pub use stages::{
    match_candidates, resolve, rewrite_mention, tokenize, Resolution, ResolverConfig,
    TokenizerConfig,
};
