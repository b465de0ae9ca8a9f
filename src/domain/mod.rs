//! Domain logic for substitution states and transitions

mod states;
mod transitions;
mod validation;


pub use states::{
    get_allowed_actions, get_state_index, is_terminal_state, target_state, SubstitutionAction,
    SUBSTITUTION_ACTIONS, SUBSTITUTION_STATES,
};
pub use transitions::{apply_action, TransitionResult};
pub use validation::{
    can_open_request, validate_action, validate_reason, CoveringWorker, ValidationContext,
};
