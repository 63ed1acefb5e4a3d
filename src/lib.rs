pub mod app;
pub mod booth;
pub mod config;
pub mod error;
pub mod geometry;
pub mod strip;
pub mod timer;
pub mod ui;
pub mod platform {
    pub mod buttons;
    pub mod camera;
    pub mod display;
    pub mod printer;
    pub mod uploader;
}
