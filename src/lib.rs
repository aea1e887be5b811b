pub mod benchmark;
pub mod confidence;
pub mod config;
pub mod export;
pub mod holes;
pub mod memo;
pub mod mental;
pub mod report;
pub mod root_cause;
pub mod sg_profile;
pub mod shots;
pub mod tiger5;
