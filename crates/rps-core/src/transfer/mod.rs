//! External value transfer abstraction.

mod mock;
mod traits;

pub use mock::MockFundsTransfer;
pub use traits::{FundsTransfer, TransferError};
