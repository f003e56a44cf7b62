mod color;
mod spherical;

pub use color::{parse_hex_color, Color};
pub use spherical::Spherical;
