pub mod app;
pub mod fab;
pub mod theme;
