mod config;
mod error;
mod event;
mod message;
mod policy;
mod render;
mod resource;
mod scheduler;
mod script;
mod session;
mod state;
mod trace;
mod version;

pub use config::{
    PlaybackConfig, DEFAULT_LEAD_IN_MS, DEFAULT_REVEAL_PAUSE_MS, DEFAULT_TYPING_DELAY_MS,
};
pub use error::{ReplayError, ReplayResult};
pub use event::PlaybackEvent;
pub use message::{Message, MessageRaw, Participant, ParticipantRaw, SharedStr};
pub use policy::ScriptPolicy;
pub use render::{initials, RenderBackend, RenderOutput, TextRenderer};
pub use resource::ResourceLimiter;
pub use scheduler::{Phase, Scheduler, Step, TimerRequest, TimerToken};
pub use script::{script_json_schema, ScriptRaw, ScriptStore};
pub use session::{PlaybackSession, PlaybackSnapshot, SessionHandle};
pub use state::{PlaybackState, TypingIndicator};
pub use trace::{simulate, PlaybackTrace, TraceEntry};
pub use version::SCRIPT_SCHEMA_VERSION;
