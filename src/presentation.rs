pub mod app;
pub mod form;
pub mod traffic_lights;
