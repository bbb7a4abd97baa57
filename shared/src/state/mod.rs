mod connection_view;
mod state_unit;
mod sync_var;
mod unit_slot;

pub use connection_view::ConnectionView;
pub use state_unit::StateUnit;
pub use sync_var::SyncVar;
pub use unit_slot::UnitSlot;
