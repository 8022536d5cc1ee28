pub mod event;
pub mod event_type;
pub mod failure;
pub mod ids;
pub mod ledger;
pub mod resource_kind;
pub mod session;
pub mod tracking;

pub use event::ScanEvent;
pub use event_type::ScanEventType;
pub use failure::ScanFailure;
pub use ids::{GameId, ItemId, LocationId, ProfileId, SessionId, ShopId};
pub use ledger::{
  LedgerSnapshot, LedgerUpdate, ProgressLedger, ResourceState, ResourceStatus, ScanSummary,
};
pub use resource_kind::ResourceKind;
pub use session::{ScanParameters, ScanPhase, ScanSession};
