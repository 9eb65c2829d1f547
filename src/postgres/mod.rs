// PostgreSQL module - the connection-facing half of the smoke test
//
// - session: one connection, autocommit handling, plain statements
// - prepared: server-side prepared statements bound with RowValues
// - params: RowValues -> wire encoding
// - query: result extraction into text result sets
// - transaction: autocommit/transaction state machine

pub mod params;
pub mod prepared;
pub mod query;
pub mod session;
pub mod transaction;

pub use params::Params;
pub use prepared::PreparedStatement;
pub use session::{CommandOutcome, Session};
pub use transaction::TxState;
