//! Service layer separating I/O concerns from the carving logic

pub mod io;

pub use io::ImageIOService;
