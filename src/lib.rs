mod config;
mod dataset;
mod error;
mod level;
mod mixer;
mod sampling;
mod speakers;
mod wav;

pub use config::*;
pub use dataset::*;
pub use error::*;
pub use level::*;
pub use mixer::*;
pub use sampling::*;
pub use speakers::*;
pub use wav::{WavInfo, read_wav_window, save_wav, wav_info};
