//! HTTP endpoint layer

mod stories;

pub use stories::{all_stories, current_stories, health, index, special_story};
