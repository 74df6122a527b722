pub mod config;
pub mod load;
pub mod scan;
pub mod toolchain;
