pub mod app;
pub mod beat_indicator;
pub mod widget;
