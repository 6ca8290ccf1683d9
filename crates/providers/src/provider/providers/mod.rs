pub mod cnv;
pub mod y2down;
pub mod ytmp3;
pub mod ytmp3gg;

pub use cnv::Cnv;
pub use y2down::Y2Down;
pub use ytmp3::Ytmp3;
pub use ytmp3gg::Ytmp3Gg;
