pub mod session_id;
pub mod actor_id;
pub mod camera_facing;

pub use session_id::SessionId;
pub use actor_id::ActorId;
pub use camera_facing::CameraFacing;
