pub mod lesson;
pub mod prompt;
