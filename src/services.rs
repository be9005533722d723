pub mod map_service;
pub mod road_selector;
