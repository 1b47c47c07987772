pub mod bitmap;
pub mod channel;
pub mod color_space;
pub mod error;
pub mod output_sink;
pub mod pixel;
pub mod resolution;
pub mod smart_buffer;
pub mod utils;
