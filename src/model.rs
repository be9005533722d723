pub mod google_api_model;
pub mod road;
