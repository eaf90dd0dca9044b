pub mod add;
pub mod lists;
pub mod maintenance;
pub mod review;
pub mod settings;
pub mod words;
