mod event_uplink;
mod list_uplink;
mod map_uplink;
mod uplink_session;

pub use event_uplink::EventUplink;
pub use list_uplink::ListUplink;
pub use map_uplink::MapUplink;
pub use uplink_session::UplinkSession;
