pub mod choseong;
pub mod dictionary;
pub mod identity;
pub mod ledger;
pub mod round;

// Re-export main components
pub use choseong::*;
pub use dictionary::*;
pub use identity::*;
pub use ledger::*;
pub use round::*;

use relay_store::StoreError;
use relay_types::GameError;

pub(crate) fn upstream(err: StoreError) -> GameError {
    GameError::UpstreamUnavailable {
        message: err.to_string(),
    }
}
