pub mod policy;
pub mod response;
pub mod session;
pub mod session_gate;

pub use policy::{AccessPolicy, Decision};
pub use response::{ApiResponse, ApiResult};
pub use session::Session;
pub use session_gate::session_gate;
