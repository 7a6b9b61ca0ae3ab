pub mod analysis;
pub mod capture;
pub mod detection;
pub mod gallery;
pub mod intake;
pub mod preview;
pub mod session;
pub mod shared;
