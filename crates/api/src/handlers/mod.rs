pub mod export;
pub mod generation;
pub mod results;
pub mod scenarios;
pub mod session;
pub mod storyboard;
