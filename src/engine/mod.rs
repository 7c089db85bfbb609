//! The orchestration engine: turn loop, confirmation gate, automode driver.

pub mod automode;
pub mod gate;
pub mod turn;

pub use automode::{run_automode, AutomodeOutcome, COMPLETION_SENTINEL, CONTINUE_PROMPT};
pub use gate::{decision_for_line, AutoApproveGate, ConfirmationGate, ConsoleGate, GateDecision};
pub use turn::{EventSink, TurnEngine, TurnEvent, EMPTY_RESPONSE_FALLBACK};
