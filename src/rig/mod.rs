mod limb;
mod reference;
mod sample;
mod select;
mod solve;
mod switch;
mod system;

pub use limb::*;
pub use reference::*;
pub use sample::*;
pub use select::*;
pub use solve::*;
pub use switch::*;
