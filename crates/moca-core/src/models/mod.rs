pub mod answer;
pub mod assessment;
pub mod media;
pub mod question;
pub mod score;
