pub mod carousel;
pub mod download;
pub mod modal;

pub use carousel::{Carousel, NavKey, Slide};
pub use download::{Downloader, SlideSink, DOWNLOAD_PACING};
pub use modal::{ActionReplay, LoadingView, Modal, ModalState};
