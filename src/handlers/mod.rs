pub mod auth;
pub mod boards;
pub mod cards;
pub mod collaborators;
pub mod lists;
