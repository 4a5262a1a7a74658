pub mod error;
pub mod wire;
pub mod header;
pub mod block;
pub mod object;
pub mod frame;
mod relocate;
pub mod buffers;
pub mod names;

pub use error::FrameError;
pub use frame::FrameFile;
pub use header::{FrameHeader, SceneFolder};
pub use block::{SpaceEntry, SpaceKind};
pub use object::{FrameObject, ObjectKind};
