pub mod app;
pub mod auth;
pub mod config;
pub mod contact_info;
pub mod error;
pub mod exercises;
pub mod extract;
pub mod home_content;
pub mod meal_plans;
pub mod pagination;
pub mod patch;
pub mod seed;
pub mod state;
pub mod testimonials;
pub mod users;
pub mod videos;
pub mod weight_records;
pub mod workout_plans;
